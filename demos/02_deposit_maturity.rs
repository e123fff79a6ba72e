//! # Example 02: Deposit Maturity
//!
//! Deposits priced by the configured tiered mechanism:
//! - a mid-tier deposit held to maturity (principal plus interest)
//! - a large deposit broken early (principal only)
//! - a top-up and a partial withdrawal on a third deposit
//!
//! The audit history is written as JSONL next to a CSV balance report.
//!
//! Run with: `cargo run -p minibank-demos --example 02_deposit_maturity`

use minibank_business::Bank;
use minibank_core::{FinancialProduct, FlatRate};
use minibank_demos::{init_tracing, load_config};
use minibank_reports::{
    write_history_file, BalanceReport, CsvExporter, HistoryReport, JsonExporter, ReportExporter,
};
use rust_decimal_macros::dec;

fn main() -> anyhow::Result<()> {
    init_tracing();
    println!("=== Example 02: Deposit Maturity ===\n");

    let mut bank = Bank::new(load_config()?)?;

    let anna = bank.add_new_client("Anna", "Nowak", "85050554321")?;
    let account = bank.add_new_normal_account(anna, "Savings")?;
    bank.payment(account, dec!(20000), "Inheritance")?;

    // =========================================================================
    // Part 1: Open deposits
    // =========================================================================

    let held = bank.add_new_deposit(anna, account, dec!(5000), None, "One year")?;
    let broken = bank.add_new_deposit(anna, account, dec!(12000), None, "Two years")?;
    let flexible = bank.add_new_deposit(
        anna,
        account,
        dec!(500),
        Some(FlatRate::shared(dec!(0.01))?),
        "Flexible",
    )?;

    for id in [held, broken, flexible] {
        if let Some(deposit) = bank.deposit(id) {
            println!("{} at rate {}", deposit, deposit.interests());
        }
    }

    let mut opened = BalanceReport::new("Deposits Opened");
    bank.accept_all(&mut opened);
    println!("\n{}", CsvExporter::new().export(&opened)?);

    // =========================================================================
    // Part 2: Maturity and early break
    // =========================================================================

    let payout = bank.solve_deposit(held, "Matured")?;
    println!("Matured deposit paid out {}", payout);

    let principal = bank.break_up_deposit(broken, "Needed cash")?;
    println!("Broken deposit returned {}", principal);

    // =========================================================================
    // Part 3: Top-up and partial withdrawal
    // =========================================================================

    bank.top_up_deposit(flexible, dec!(250), "Top-up")?;
    bank.top_up_deposit(flexible, dec!(-100), "Partial withdrawal")?;
    bank.change_deposit_percentage(flexible, FlatRate::shared(dec!(0.015))?, "Promo rate")?;

    if let Some(acc) = bank.account(account) {
        println!("Account balance: {}", acc.balance());
    }

    // =========================================================================
    // Part 4: Export
    // =========================================================================

    let out_dir = std::env::temp_dir().join("minibank");
    std::fs::create_dir_all(&out_dir)?;

    let history_path = out_dir.join("history.jsonl");
    let lines = write_history_file(bank.history(), &history_path)?;
    println!("Wrote {} history entries to {}", lines, history_path.display());

    let mut remaining = BalanceReport::new("Remaining Deposits");
    bank.accept_all(&mut remaining);
    let csv = CsvExporter::new().export_to_dir(&remaining, &out_dir, "deposits")?;
    let audit = JsonExporter::new().export_to_dir(
        &HistoryReport::from_history("Audit", bank.history()),
        &out_dir,
        "audit",
    )?;
    println!("Reports: {} and {}", csv.display(), audit.display());

    Ok(())
}
