//! # Example 01: Credit Lifecycle
//!
//! A client borrows against a normal account:
//! 1. Open the account and the credit (principal lands on the account)
//! 2. Accrue one period of interest on the debt
//! 3. Repay part of it, try an overpayment, then pay off the rest
//!
//! Run with: `cargo run -p minibank-demos --example 01_credit_lifecycle`

use minibank_business::{Bank, OperationError, Repayment};
use minibank_demos::{init_tracing, load_config};
use minibank_reports::{BalanceReport, HistoryReport, MarkdownExporter, ReportExporter};
use rust_decimal_macros::dec;

fn main() -> anyhow::Result<()> {
    init_tracing();
    println!("=== Example 01: Credit Lifecycle ===\n");

    let mut bank = Bank::new(load_config()?)?;

    // =========================================================================
    // Part 1: Client, account, credit
    // =========================================================================

    let jan = bank.add_new_client("Jan", "Kowalski", "90010112345")?;
    let account = bank.add_new_normal_account(jan, "Main account")?;
    let credit = bank.add_new_credit(jan, account, dec!(1000), None, "Car loan")?;

    if let Some(acc) = bank.account(account) {
        println!("Account {} after disbursement: {}", account, acc.balance());
    }
    if let Some(c) = bank.credit(credit) {
        println!("{}", c);
    }

    // =========================================================================
    // Part 2: Interest
    // =========================================================================

    let interest = bank.accrue_credit_interest(credit, "Monthly interest")?;
    println!("\nInterest charged: {}", interest);

    // =========================================================================
    // Part 3: Repayments
    // =========================================================================

    match bank.repay_credit(credit, dec!(500), "First installment")? {
        Repayment::Installment { paid, outstanding } => {
            println!("Paid {}, still owed {}", paid, outstanding);
        }
        Repayment::PaidOff { paid } => println!("Paid off with {}", paid),
    }

    // Over the outstanding debt: rejected, nothing moves
    if let Err(err) = bank.repay_credit(credit, dec!(10000), "Too much") {
        let overpaid = err
            .downcast_ref::<OperationError>()
            .is_some_and(OperationError::is_overpayment);
        println!("Overpayment rejected ({}): {:#}", overpaid, err);
    }

    bank.payment(account, dec!(100), "Salary")?;
    let outstanding = bank.credit(credit).map(|c| c.outstanding()).unwrap_or_default();
    if let Repayment::PaidOff { paid } = bank.repay_credit(credit, outstanding, "Final payment")? {
        println!("Credit settled with {}", paid);
    }

    // =========================================================================
    // Part 4: Reports
    // =========================================================================

    let mut balances = BalanceReport::new("Open Products");
    bank.accept_all(&mut balances);
    let history = HistoryReport::for_actor("Jan's History", bank.history(), jan);

    let exporter = MarkdownExporter::new();
    println!("\n{}", exporter.export(&balances)?);
    println!("{}", exporter.export(&history)?);

    Ok(())
}
