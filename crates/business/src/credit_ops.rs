//! Credit operations - open, accrue interest, repay, pay off
//!
//! A credit's balance is the negative of the outstanding debt. Repayments
//! are drawn from the funding account; a repayment larger than the debt is
//! refused with `OperationError::Overpayment` so the caller can settle the
//! credit with `pay_off_credit` instead.

use crate::error::{OperationError, OperationResult};
use crate::guards::{draw, ensure_covered, ensure_funded_by, ensure_open, ensure_positive, rejected};
use minibank_core::{
    Ack, BankAccount, ClientId, CoreError, Credit, FinancialProduct, History, IdAllocator, OperationKind,
    SharedMechanism,
};
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Engine for credit operations
pub struct CreditOperation;

impl CreditOperation {
    /// Open a credit of `|initial_balance|` against `funding_account`.
    ///
    /// Without an explicit mechanism the credit uses the account's one.
    /// No money moves here; disbursement is up to the caller.
    pub fn create_credit(
        ids: &mut IdAllocator,
        funding_account: &BankAccount,
        initial_balance: Decimal,
        owner_id: ClientId,
        mechanism: Option<SharedMechanism>,
        history: &mut History,
        description: &str,
    ) -> Credit {
        let mechanism = mechanism.unwrap_or_else(|| funding_account.mechanism().clone());
        let credit = Credit::open_for(
            ids.next_product(),
            funding_account,
            owner_id,
            initial_balance,
            mechanism,
        );

        history.append(
            Ack::new(OperationKind::CreateCredit, owner_id, description)
                .with_account(funding_account.id())
                .with_product(credit.id()),
        );
        info!(
            credit_id = %credit.id(),
            account_id = %funding_account.id(),
            balance = %credit.balance(),
            mechanism = credit.mechanism().name(),
            "Credit created"
        );
        credit
    }

    /// Swap the interest mechanism; allowed on settled credits too
    pub fn change_percentage(
        credit: &mut Credit,
        mechanism: SharedMechanism,
        history: &mut History,
        description: &str,
    ) -> SharedMechanism {
        let previous = credit.replace_mechanism(mechanism);
        history.append(
            Ack::new(OperationKind::ChangePercentage, credit.owner_id(), description)
                .with_account(credit.funding_account())
                .with_product(credit.id()),
        );
        info!(
            credit_id = %credit.id(),
            from = previous.name(),
            to = credit.mechanism().name(),
            "Credit interest mechanism changed"
        );
        previous
    }

    /// Accrue one period of interest: the debt grows by `|balance| * interests()`.
    ///
    /// Returns the interest charged.
    pub fn pay_percentage(
        credit: &mut Credit,
        history: &mut History,
        description: &str,
    ) -> OperationResult<Decimal> {
        ensure_open(credit).map_err(|e| rejected("pay_percentage", e))?;

        let rate = credit.interests();
        let due = credit
            .balance()
            .abs()
            .checked_mul(rate)
            .ok_or(CoreError::Overflow {
                balance: credit.balance(),
                change: rate,
            })
            .map_err(|e| rejected("pay_percentage", e.into()))?;
        debug!(credit_id = %credit.id(), %rate, %due, "Credit interest computed");
        credit
            .accrue(due)
            .map_err(|e| rejected("pay_percentage", e.into()))?;

        history.append(
            Ack::new(OperationKind::PayPercentage, credit.owner_id(), description)
                .with_account(credit.funding_account())
                .with_product(credit.id()),
        );
        info!(credit_id = %credit.id(), %due, balance = %credit.balance(), "Credit interest accrued");
        Ok(due)
    }

    /// Repay `amount` of the debt from the funding account.
    ///
    /// # Errors
    /// - `InvalidAmount` if `amount <= 0`
    /// - `ProductSettled` if nothing is owed
    /// - `AccountMismatch` if `funding_account` is not the credit's account
    /// - `Overpayment` if `amount` exceeds the outstanding debt
    /// - `InsufficientFunds` if the account cannot cover `amount`
    pub fn transfer(
        credit: &mut Credit,
        funding_account: &mut BankAccount,
        amount: Decimal,
        history: &mut History,
        description: &str,
    ) -> OperationResult<()> {
        Self::check_repayment(credit, funding_account, amount)
            .map_err(|e| rejected("credit_transfer", e))?;

        draw(funding_account, amount)?;
        credit.increase_balance(amount)?;

        history.append(
            Ack::new(OperationKind::Transfer, credit.owner_id(), description)
                .with_account(funding_account.id())
                .with_product(credit.id()),
        );
        info!(
            credit_id = %credit.id(),
            account_id = %funding_account.id(),
            %amount,
            outstanding = %credit.outstanding(),
            "Credit installment paid"
        );
        Ok(())
    }

    /// Settle the whole debt from the funding account.
    ///
    /// Returns the amount paid. Nothing changes if the account cannot
    /// cover the outstanding debt.
    pub fn pay_off_credit(
        credit: &mut Credit,
        funding_account: &mut BankAccount,
        history: &mut History,
        description: &str,
    ) -> OperationResult<Decimal> {
        Self::check_pay_off(credit, funding_account).map_err(|e| rejected("pay_off_credit", e))?;
        let outstanding = credit.outstanding();

        draw(funding_account, outstanding)?;
        credit.settle();

        history.append(
            Ack::new(OperationKind::PayOffCredit, credit.owner_id(), description)
                .with_account(funding_account.id())
                .with_product(credit.id()),
        );
        info!(
            credit_id = %credit.id(),
            account_id = %funding_account.id(),
            paid = %outstanding,
            "Credit paid off"
        );
        Ok(outstanding)
    }

    fn check_repayment(
        credit: &Credit,
        funding_account: &BankAccount,
        amount: Decimal,
    ) -> OperationResult<()> {
        ensure_positive(amount)?;
        ensure_open(credit)?;
        ensure_funded_by(credit, funding_account)?;

        let outstanding = credit.outstanding();
        if amount > outstanding {
            return Err(OperationError::Overpayment {
                product_id: credit.id(),
                amount,
                outstanding,
            });
        }
        ensure_covered(funding_account, amount)
    }

    fn check_pay_off(credit: &Credit, funding_account: &BankAccount) -> OperationResult<()> {
        ensure_open(credit)?;
        ensure_funded_by(credit, funding_account)?;
        ensure_covered(funding_account, credit.outstanding())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minibank_core::{AccountId, FlatRate, ProductId, ZeroRate};
    use rust_decimal_macros::dec;

    struct Fixture {
        ids: IdAllocator,
        history: History,
        account: BankAccount,
    }

    fn fixture(balance: Decimal) -> Fixture {
        let account =
            BankAccount::with_balance(AccountId(1), ClientId(1), balance, ZeroRate::shared());
        Fixture {
            ids: IdAllocator::new(),
            history: History::new(),
            account,
        }
    }

    fn open(f: &mut Fixture, principal: Decimal, rate: Decimal) -> Credit {
        CreditOperation::create_credit(
            &mut f.ids,
            &f.account,
            principal,
            ClientId(1),
            Some(FlatRate::shared(rate).unwrap()),
            &mut f.history,
            "loan",
        )
    }

    #[test]
    fn test_create_credit() {
        let mut f = fixture(dec!(0));
        let credit = open(&mut f, dec!(1000), dec!(0.1));

        assert_eq!(credit.id(), ProductId(1));
        assert_eq!(credit.balance(), dec!(-1000));
        assert_eq!(credit.funding_account(), AccountId(1));

        let ack = f.history.last().unwrap();
        assert_eq!(ack.kind, OperationKind::CreateCredit);
        assert_eq!(ack.product, Some(ProductId(1)));
        assert_eq!(ack.account, Some(AccountId(1)));
    }

    #[test]
    fn test_create_credit_defaults_to_account_mechanism() {
        let mut f = fixture(dec!(0));
        f.account.replace_mechanism(FlatRate::shared(dec!(0.07)).unwrap());

        let credit = CreditOperation::create_credit(
            &mut f.ids,
            &f.account,
            dec!(-200),
            ClientId(1),
            None,
            &mut f.history,
            "",
        );
        assert_eq!(credit.balance(), dec!(-200));
        assert_eq!(credit.interests(), dec!(0.07));
    }

    #[test]
    fn test_pay_percentage_grows_debt() {
        let mut f = fixture(dec!(0));
        let mut credit = open(&mut f, dec!(1000), dec!(0.1));

        let due = CreditOperation::pay_percentage(&mut credit, &mut f.history, "month 1").unwrap();
        assert_eq!(due, dec!(100));
        assert_eq!(credit.balance(), dec!(-1100));
    }

    #[test]
    fn test_pay_percentage_overflow_leaves_debt() {
        let mut f = fixture(dec!(0));
        let mut credit = open(&mut f, Decimal::MAX, dec!(0.5));
        let before = f.history.len();

        let err = CreditOperation::pay_percentage(&mut credit, &mut f.history, "").unwrap_err();
        assert!(matches!(err, OperationError::Core(CoreError::Overflow { .. })));
        assert_eq!(credit.balance(), -Decimal::MAX);
        assert_eq!(f.history.len(), before);
    }

    #[test]
    fn test_transfer_installment() {
        let mut f = fixture(dec!(500));
        let mut credit = open(&mut f, dec!(1000), dec!(0));

        CreditOperation::transfer(&mut credit, &mut f.account, dec!(300), &mut f.history, "")
            .unwrap();
        assert_eq!(credit.balance(), dec!(-700));
        assert_eq!(f.account.balance(), dec!(200));
        assert_eq!(f.history.by_kind(OperationKind::Transfer).len(), 1);
    }

    #[test]
    fn test_transfer_overpayment_rejected() {
        let mut f = fixture(dec!(5000));
        let mut credit = open(&mut f, dec!(1000), dec!(0));
        let before = f.history.len();

        let err =
            CreditOperation::transfer(&mut credit, &mut f.account, dec!(1500), &mut f.history, "")
                .unwrap_err();

        assert!(err.is_overpayment());
        assert_eq!(credit.balance(), dec!(-1000));
        assert_eq!(f.account.balance(), dec!(5000));
        assert_eq!(f.history.len(), before);
    }

    #[test]
    fn test_transfer_validation() {
        let mut f = fixture(dec!(50));
        let mut credit = open(&mut f, dec!(1000), dec!(0));

        let err = CreditOperation::transfer(&mut credit, &mut f.account, dec!(0), &mut f.history, "")
            .unwrap_err();
        assert_eq!(err, OperationError::InvalidAmount(dec!(0)));

        let err =
            CreditOperation::transfer(&mut credit, &mut f.account, dec!(100), &mut f.history, "")
                .unwrap_err();
        assert!(err.is_insufficient_funds());

        let mut other =
            BankAccount::with_balance(AccountId(9), ClientId(1), dec!(1000), ZeroRate::shared());
        let err = CreditOperation::transfer(&mut credit, &mut other, dec!(10), &mut f.history, "")
            .unwrap_err();
        assert!(matches!(err, OperationError::AccountMismatch { .. }));
        assert_eq!(credit.balance(), dec!(-1000));
    }

    #[test]
    fn test_pay_off_credit() {
        let mut f = fixture(dec!(1500));
        let mut credit = open(&mut f, dec!(1000), dec!(0.1));
        CreditOperation::pay_percentage(&mut credit, &mut f.history, "").unwrap();

        let paid =
            CreditOperation::pay_off_credit(&mut credit, &mut f.account, &mut f.history, "done")
                .unwrap();
        assert_eq!(paid, dec!(1100));
        assert!(credit.is_settled());
        assert_eq!(f.account.balance(), dec!(400));
        assert_eq!(f.history.last().map(|ack| ack.kind), Some(OperationKind::PayOffCredit));

        // Settled credits reject further balance operations
        let err = CreditOperation::pay_off_credit(&mut credit, &mut f.account, &mut f.history, "")
            .unwrap_err();
        assert_eq!(err, OperationError::ProductSettled(ProductId(1)));
        let err = CreditOperation::pay_percentage(&mut credit, &mut f.history, "").unwrap_err();
        assert_eq!(err, OperationError::ProductSettled(ProductId(1)));
    }

    #[test]
    fn test_pay_off_credit_insufficient_funds() {
        let mut f = fixture(dec!(100));
        let mut credit = open(&mut f, dec!(1000), dec!(0));

        let err = CreditOperation::pay_off_credit(&mut credit, &mut f.account, &mut f.history, "")
            .unwrap_err();
        assert!(err.is_insufficient_funds());
        assert_eq!(credit.balance(), dec!(-1000));
        assert_eq!(f.account.balance(), dec!(100));
    }

    #[test]
    fn test_change_percentage_on_settled_credit() {
        let mut f = fixture(dec!(1000));
        let mut credit = open(&mut f, dec!(100), dec!(0.1));
        CreditOperation::pay_off_credit(&mut credit, &mut f.account, &mut f.history, "").unwrap();

        let previous = CreditOperation::change_percentage(
            &mut credit,
            ZeroRate::shared(),
            &mut f.history,
            "",
        );
        assert_eq!(previous.name(), "flat");
        assert_eq!(credit.interests(), Decimal::ZERO);
    }
}
