//! Bank account operations - open, payment, withdraw, transfer, interest
//!
//! `BankAccountOperation` works on funding accounts only. Every successful
//! call appends exactly one Ack to the history it is given.

use crate::error::{OperationError, OperationResult};
use crate::guards::{draw, ensure_absorbs, ensure_positive, rejected};
use minibank_core::{
    AccountKind, Ack, BankAccount, ClientId, CoreError, History, IdAllocator, OperationKind, SharedMechanism,
};
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Engine for funding-account operations
pub struct BankAccountOperation;

impl BankAccountOperation {
    /// Open a normal account (balance may not go below zero)
    pub fn create_normal_account(
        ids: &mut IdAllocator,
        owner_id: ClientId,
        mechanism: SharedMechanism,
        history: &mut History,
        description: &str,
    ) -> BankAccount {
        let account = BankAccount::new(ids.next_account(), owner_id, AccountKind::Normal, mechanism);
        history.append(
            Ack::new(OperationKind::CreateAccount, owner_id, description).with_account(account.id()),
        );
        info!(account_id = %account.id(), owner_id = %owner_id, "Normal account created");
        account
    }

    /// Open a debit account that may be overdrawn down to `-limit`
    pub fn create_debit_account(
        ids: &mut IdAllocator,
        owner_id: ClientId,
        limit: Decimal,
        mechanism: SharedMechanism,
        history: &mut History,
        description: &str,
    ) -> OperationResult<BankAccount> {
        let kind = AccountKind::debit(limit)
            .map_err(|e| rejected("create_debit_account", e.into()))?;
        let account = BankAccount::new(ids.next_account(), owner_id, kind, mechanism);
        history.append(
            Ack::new(OperationKind::CreateAccount, owner_id, description).with_account(account.id()),
        );
        info!(account_id = %account.id(), owner_id = %owner_id, %limit, "Debit account created");
        Ok(account)
    }

    /// Cash in
    pub fn payment(
        account: &mut BankAccount,
        amount: Decimal,
        history: &mut History,
        description: &str,
    ) -> OperationResult<()> {
        ensure_positive(amount).map_err(|e| rejected("payment", e))?;
        account.increase_balance(amount)?;

        history.append(
            Ack::new(OperationKind::Payment, account.owner_id(), description)
                .with_account(account.id()),
        );
        info!(account_id = %account.id(), %amount, balance = %account.balance(), "Payment accepted");
        Ok(())
    }

    /// Cash out, within the account's floor
    pub fn withdraw(
        account: &mut BankAccount,
        amount: Decimal,
        history: &mut History,
        description: &str,
    ) -> OperationResult<()> {
        ensure_positive(amount).map_err(|e| rejected("withdraw", e))?;
        draw(account, amount).map_err(|e| rejected("withdraw", e))?;

        history.append(
            Ack::new(OperationKind::Withdraw, account.owner_id(), description)
                .with_account(account.id()),
        );
        info!(account_id = %account.id(), %amount, balance = %account.balance(), "Withdrawal completed");
        Ok(())
    }

    /// Move `amount` from one account to another.
    ///
    /// The Ack is attributed to the owner of `from`.
    pub fn transfer_from_to(
        from: &mut BankAccount,
        to: &mut BankAccount,
        amount: Decimal,
        history: &mut History,
        description: &str,
    ) -> OperationResult<()> {
        if from.id() == to.id() {
            return Err(rejected("transfer_from_to", OperationError::SameAccount(from.id())));
        }
        ensure_positive(amount)
            .and_then(|_| ensure_absorbs(to, amount))
            .map_err(|e| rejected("transfer_from_to", e))?;
        draw(from, amount).map_err(|e| rejected("transfer_from_to", e))?;
        to.increase_balance(amount)?;

        history.append(
            Ack::new(OperationKind::Transfer, from.owner_id(), description).with_account(from.id()),
        );
        info!(from = %from.id(), to = %to.id(), %amount, "Transfer completed");
        Ok(())
    }

    /// Apply one interest period to the account.
    ///
    /// A positive balance earns `balance * rate`; an overdrawn debit account
    /// is charged `|balance| * rate`, which must still fit under its limit.
    /// Returns the signed change applied to the balance.
    pub fn pay_percentage(
        account: &mut BankAccount,
        history: &mut History,
        description: &str,
    ) -> OperationResult<Decimal> {
        let balance = account.balance();
        if balance.is_zero() {
            return Err(rejected(
                "pay_percentage",
                OperationError::NothingToAccrue(account.id()),
            ));
        }

        let rate = account.interests();
        let change = balance
            .checked_mul(rate)
            .ok_or(OperationError::Core(CoreError::Overflow {
                balance,
                change: rate,
            }))
            .and_then(|change| ensure_absorbs(account, change).map(|_| change))
            .map_err(|e| rejected("pay_percentage", e))?;
        debug!(account_id = %account.id(), %balance, %rate, %change, "Account interest computed");

        if change < Decimal::ZERO {
            draw(account, -change).map_err(|e| rejected("pay_percentage", e))?;
        } else {
            account.increase_balance(change)?;
        }

        history.append(
            Ack::new(OperationKind::PayPercentage, account.owner_id(), description)
                .with_account(account.id()),
        );
        info!(account_id = %account.id(), %change, balance = %account.balance(), "Account interest applied");
        Ok(change)
    }

    /// Swap the interest mechanism; returns the previous one
    pub fn change_percentage(
        account: &mut BankAccount,
        mechanism: SharedMechanism,
        history: &mut History,
        description: &str,
    ) -> SharedMechanism {
        let previous = account.replace_mechanism(mechanism);
        history.append(
            Ack::new(OperationKind::ChangePercentage, account.owner_id(), description)
                .with_account(account.id()),
        );
        info!(
            account_id = %account.id(),
            from = previous.name(),
            to = account.mechanism().name(),
            "Account interest mechanism changed"
        );
        previous
    }

    /// Switch between normal and debit; returns the previous kind
    pub fn change_account_type(
        account: &mut BankAccount,
        kind: AccountKind,
        history: &mut History,
        description: &str,
    ) -> OperationResult<AccountKind> {
        let account_id = account.id();
        let previous = account.change_kind(kind).map_err(|source| {
            rejected(
                "change_account_type",
                OperationError::AccountTypeChange { account_id, source },
            )
        })?;

        history.append(
            Ack::new(OperationKind::ChangeAccountType, account.owner_id(), description)
                .with_account(account.id()),
        );
        info!(account_id = %account.id(), from = %previous, to = %kind, "Account type changed");
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minibank_core::{AccountId, CoreError, FlatRate, ZeroRate};
    use rust_decimal_macros::dec;

    fn setup() -> (IdAllocator, History) {
        (IdAllocator::new(), History::new())
    }

    fn funded(ids: &mut IdAllocator, history: &mut History, amount: Decimal) -> BankAccount {
        let mut account =
            BankAccountOperation::create_normal_account(ids, ClientId(1), ZeroRate::shared(), history, "");
        BankAccountOperation::payment(&mut account, amount, history, "initial").unwrap();
        account
    }

    #[test]
    fn test_create_accounts() {
        let (mut ids, mut history) = setup();

        let normal = BankAccountOperation::create_normal_account(
            &mut ids,
            ClientId(1),
            ZeroRate::shared(),
            &mut history,
            "main",
        );
        let debit = BankAccountOperation::create_debit_account(
            &mut ids,
            ClientId(1),
            dec!(300),
            ZeroRate::shared(),
            &mut history,
            "overdraft",
        )
        .unwrap();

        assert_eq!(normal.id(), AccountId(1));
        assert_eq!(debit.id(), AccountId(2));
        assert_eq!(debit.kind(), AccountKind::Debit { limit: dec!(300) });
        assert_eq!(history.by_kind(OperationKind::CreateAccount).len(), 2);
    }

    #[test]
    fn test_create_debit_account_negative_limit() {
        let (mut ids, mut history) = setup();

        let err = BankAccountOperation::create_debit_account(
            &mut ids,
            ClientId(1),
            dec!(-10),
            ZeroRate::shared(),
            &mut history,
            "",
        )
        .unwrap_err();

        assert_eq!(err, OperationError::Core(CoreError::InvalidLimit(dec!(-10))));
        assert!(history.is_empty());
    }

    #[test]
    fn test_payment_and_withdraw() {
        let (mut ids, mut history) = setup();
        let mut account = funded(&mut ids, &mut history, dec!(100));

        BankAccountOperation::withdraw(&mut account, dec!(30), &mut history, "atm").unwrap();
        assert_eq!(account.balance(), dec!(70));

        let err = BankAccountOperation::withdraw(&mut account, dec!(71), &mut history, "atm")
            .unwrap_err();
        assert!(err.is_insufficient_funds());
        assert_eq!(account.balance(), dec!(70));

        let err = BankAccountOperation::payment(&mut account, dec!(0), &mut history, "")
            .unwrap_err();
        assert_eq!(err, OperationError::InvalidAmount(dec!(0)));

        // create + payment + withdraw
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_transfer_from_to() {
        let (mut ids, mut history) = setup();
        let mut from = funded(&mut ids, &mut history, dec!(100));
        let mut to = funded(&mut ids, &mut history, dec!(0.01));

        BankAccountOperation::transfer_from_to(&mut from, &mut to, dec!(40), &mut history, "rent")
            .unwrap();
        assert_eq!(from.balance(), dec!(60));
        assert_eq!(to.balance(), dec!(40.01));

        let err = BankAccountOperation::transfer_from_to(
            &mut from,
            &mut to,
            dec!(61),
            &mut history,
            "",
        )
        .unwrap_err();
        assert!(err.is_insufficient_funds());
        assert_eq!(to.balance(), dec!(40.01));
        assert_eq!(history.last().map(|ack| ack.kind), Some(OperationKind::Transfer));
    }

    #[test]
    fn test_transfer_into_full_account_rejected() {
        let (mut ids, mut history) = setup();
        let mut from = funded(&mut ids, &mut history, dec!(100));
        let mut to = funded(&mut ids, &mut history, Decimal::MAX);

        let err =
            BankAccountOperation::transfer_from_to(&mut from, &mut to, dec!(1), &mut history, "")
                .unwrap_err();
        assert!(matches!(err, OperationError::Core(CoreError::Overflow { .. })));
        assert_eq!(from.balance(), dec!(100));
        assert_eq!(to.balance(), Decimal::MAX);
    }

    #[test]
    fn test_transfer_to_same_account_rejected() {
        let (mut ids, mut history) = setup();
        let mut account = funded(&mut ids, &mut history, dec!(100));
        let mut copy = account.clone();

        let err = BankAccountOperation::transfer_from_to(
            &mut account,
            &mut copy,
            dec!(10),
            &mut history,
            "",
        )
        .unwrap_err();
        assert_eq!(err, OperationError::SameAccount(account.id()));
        assert_eq!(account.balance(), dec!(100));
    }

    #[test]
    fn test_pay_percentage_positive_balance() {
        let (mut ids, mut history) = setup();
        let mut account = funded(&mut ids, &mut history, dec!(1000));
        BankAccountOperation::change_percentage(
            &mut account,
            FlatRate::shared(dec!(0.01)).unwrap(),
            &mut history,
            "",
        );

        let earned = BankAccountOperation::pay_percentage(&mut account, &mut history, "").unwrap();
        assert_eq!(earned, dec!(10));
        assert_eq!(account.balance(), dec!(1010));
    }

    #[test]
    fn test_pay_percentage_overdraft_charge() {
        let (mut ids, mut history) = setup();
        let mut account = BankAccountOperation::create_debit_account(
            &mut ids,
            ClientId(1),
            dec!(500),
            FlatRate::shared(dec!(0.1)).unwrap(),
            &mut history,
            "",
        )
        .unwrap();
        BankAccountOperation::withdraw(&mut account, dec!(450), &mut history, "").unwrap();

        let charged = BankAccountOperation::pay_percentage(&mut account, &mut history, "").unwrap();
        assert_eq!(charged, dec!(-45));
        assert_eq!(account.balance(), dec!(-495));

        // 49.5 more would break the limit of 500
        let err = BankAccountOperation::pay_percentage(&mut account, &mut history, "").unwrap_err();
        assert!(err.is_insufficient_funds());
        assert_eq!(account.balance(), dec!(-495));
    }

    #[test]
    fn test_pay_percentage_zero_balance() {
        let (mut ids, mut history) = setup();
        let mut account = BankAccountOperation::create_normal_account(
            &mut ids,
            ClientId(1),
            ZeroRate::shared(),
            &mut history,
            "",
        );

        let err = BankAccountOperation::pay_percentage(&mut account, &mut history, "").unwrap_err();
        assert_eq!(err, OperationError::NothingToAccrue(account.id()));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_change_account_type() {
        let (mut ids, mut history) = setup();
        let mut account = BankAccountOperation::create_debit_account(
            &mut ids,
            ClientId(1),
            dec!(100),
            ZeroRate::shared(),
            &mut history,
            "",
        )
        .unwrap();
        BankAccountOperation::withdraw(&mut account, dec!(50), &mut history, "").unwrap();

        let err = BankAccountOperation::change_account_type(
            &mut account,
            AccountKind::Normal,
            &mut history,
            "",
        )
        .unwrap_err();
        assert!(matches!(err, OperationError::AccountTypeChange { .. }));

        BankAccountOperation::payment(&mut account, dec!(50), &mut history, "").unwrap();
        let previous = BankAccountOperation::change_account_type(
            &mut account,
            AccountKind::Normal,
            &mut history,
            "",
        )
        .unwrap();
        assert_eq!(previous, AccountKind::Debit { limit: dec!(100) });
        assert_eq!(history.by_kind(OperationKind::ChangeAccountType).len(), 1);
    }
}
