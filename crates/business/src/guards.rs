//! Shared preconditions for the operation engines
//!
//! Every check runs before anything is mutated, so a rejected operation
//! never leaves a half-applied state behind.

use crate::error::{OperationError, OperationResult};
use minibank_core::{BankAccount, CoreError, FinancialProduct};
use rust_decimal::Decimal;
use tracing::warn;

/// Log a rejected operation and hand the error back
pub(crate) fn rejected(operation: &'static str, err: OperationError) -> OperationError {
    warn!(operation, error = %err, "Operation rejected");
    err
}

pub(crate) fn ensure_positive(amount: Decimal) -> OperationResult<()> {
    if amount <= Decimal::ZERO {
        return Err(OperationError::InvalidAmount(amount));
    }
    Ok(())
}

pub(crate) fn ensure_open(product: &dyn FinancialProduct) -> OperationResult<()> {
    if product.is_settled() {
        return Err(OperationError::ProductSettled(product.id()));
    }
    Ok(())
}

pub(crate) fn ensure_funded_by(
    product: &dyn FinancialProduct,
    account: &BankAccount,
) -> OperationResult<()> {
    if product.funding_account() != account.id() {
        return Err(OperationError::AccountMismatch {
            product_id: product.id(),
            expected: product.funding_account(),
            actual: account.id(),
        });
    }
    Ok(())
}

pub(crate) fn ensure_covered(account: &BankAccount, amount: Decimal) -> OperationResult<()> {
    if !account.can_cover(amount) {
        return Err(OperationError::insufficient_funds(
            account.id(),
            amount,
            account.available(),
        ));
    }
    Ok(())
}

/// `balance + change`, or an overflow error
pub(crate) fn checked_sum(balance: Decimal, change: Decimal) -> OperationResult<Decimal> {
    balance
        .checked_add(change)
        .ok_or(OperationError::Core(CoreError::Overflow { balance, change }))
}

/// The account can take `amount` in without overflowing
pub(crate) fn ensure_absorbs(account: &BankAccount, amount: Decimal) -> OperationResult<()> {
    checked_sum(account.balance(), amount).map(|_| ())
}

/// Take `amount` out of the account, respecting its floor
pub(crate) fn draw(account: &mut BankAccount, amount: Decimal) -> OperationResult<()> {
    ensure_covered(account, amount)?;
    account.increase_balance(-amount)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use minibank_core::{AccountId, ClientId, Credit, ProductId, ZeroRate};
    use rust_decimal_macros::dec;

    fn account(id: u64, balance: Decimal) -> BankAccount {
        BankAccount::with_balance(AccountId(id), ClientId(1), balance, ZeroRate::shared())
    }

    #[test]
    fn test_ensure_positive() {
        assert!(ensure_positive(dec!(0.01)).is_ok());
        assert_eq!(
            ensure_positive(dec!(0)).unwrap_err(),
            OperationError::InvalidAmount(dec!(0))
        );
        assert!(ensure_positive(dec!(-5)).is_err());
    }

    #[test]
    fn test_funding_account_checks() {
        let funding = account(1, dec!(100));
        let other = account(2, dec!(100));
        let credit = Credit::open(ProductId(1), &funding, dec!(50), ZeroRate::shared());

        assert!(ensure_funded_by(&credit, &funding).is_ok());
        assert_eq!(
            ensure_funded_by(&credit, &other).unwrap_err(),
            OperationError::AccountMismatch {
                product_id: ProductId(1),
                expected: AccountId(1),
                actual: AccountId(2),
            }
        );
        assert!(ensure_open(&credit).is_ok());
    }

    #[test]
    fn test_ensure_absorbs_detects_overflow() {
        let full = account(1, Decimal::MAX);

        assert!(ensure_absorbs(&full, dec!(0)).is_ok());
        assert_eq!(
            ensure_absorbs(&full, dec!(1)).unwrap_err(),
            OperationError::Core(CoreError::Overflow {
                balance: Decimal::MAX,
                change: dec!(1),
            })
        );
    }

    #[test]
    fn test_draw_keeps_balance_on_failure() {
        let mut account = account(1, dec!(100));

        assert!(draw(&mut account, dec!(60)).is_ok());
        assert_eq!(account.balance(), dec!(40));

        let err = draw(&mut account, dec!(41)).unwrap_err();
        assert!(err.is_insufficient_funds());
        assert_eq!(account.balance(), dec!(40));
    }
}
