//! # Credit Module
//!
//! Khoản vay (credit) - số dư luôn <= 0, biểu diễn số tiền còn nợ.

use crate::account::BankAccount;
use crate::id::{ClientId, ProductId};
use crate::interest::SharedMechanism;
use crate::product::{FinancialProduct, ProductCore, ProductKind, ProductVisitor};
use rust_decimal::Decimal;
use std::fmt;

/// Credit gắn với một funding account.
///
/// `increase_balance(value)` chỉ thành công nếu `balance + value <= 0`:
/// trả nợ vượt quá số còn nợ bị từ chối chứ không bị cắt bớt.
#[derive(Debug, Clone)]
pub struct Credit {
    core: ProductCore,
}

impl Credit {
    /// Mở credit cho chủ của `funding_account`.
    ///
    /// Số dư khởi tạo luôn được đưa về `-|principal|`.
    pub fn open(
        id: ProductId,
        funding_account: &BankAccount,
        principal: Decimal,
        mechanism: SharedMechanism,
    ) -> Self {
        Self::open_for(id, funding_account, funding_account.owner_id(), principal, mechanism)
    }

    /// Mở credit với owner chỉ định (owner đã được kiểm tra ở tầng trên)
    pub fn open_for(
        id: ProductId,
        funding_account: &BankAccount,
        owner_id: ClientId,
        principal: Decimal,
        mechanism: SharedMechanism,
    ) -> Self {
        Self {
            core: ProductCore::new(
                id,
                owner_id,
                funding_account.id(),
                -principal.abs(),
                mechanism,
            ),
        }
    }

    /// Số tiền còn nợ (số dương)
    pub fn outstanding(&self) -> Decimal {
        self.core.balance.abs()
    }
}

impl FinancialProduct for Credit {
    fn core(&self) -> &ProductCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ProductCore {
        &mut self.core
    }

    fn kind(&self) -> ProductKind {
        ProductKind::Credit
    }

    fn admits(&self, balance: Decimal) -> bool {
        balance <= Decimal::ZERO
    }

    fn accept(&self, visitor: &mut dyn ProductVisitor) {
        visitor.visit_credit(self);
    }
}

impl fmt::Display for Credit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Credit {} (owner: {}, account: {}, balance: {})",
            self.core.id, self.core.owner_id, self.core.funding_account, self.core.balance
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::id::AccountId;
    use crate::interest::ZeroRate;
    use rust_decimal_macros::dec;

    fn credit(principal: Decimal) -> Credit {
        let account =
            BankAccount::with_balance(AccountId(1), ClientId(1), dec!(1000), ZeroRate::shared());
        Credit::open(ProductId(1), &account, principal, ZeroRate::shared())
    }

    #[test]
    fn test_balance_forced_non_positive() {
        assert_eq!(credit(dec!(100)).balance(), dec!(-100));
        assert_eq!(credit(dec!(-100)).balance(), dec!(-100));
        assert_eq!(credit(dec!(100)).outstanding(), dec!(100));
    }

    #[test]
    fn test_repayment_within_debt() {
        let mut credit = credit(dec!(100));

        assert!(credit.increase_balance(dec!(40)).is_ok());
        assert_eq!(credit.balance(), dec!(-60));

        // Trả đúng số còn nợ -> về 0
        assert!(credit.increase_balance(dec!(60)).is_ok());
        assert!(credit.is_settled());
    }

    #[test]
    fn test_settled_credit_owes_plain_zero() {
        let mut credit = credit(dec!(25));
        credit.settle();

        assert!(!credit.outstanding().is_sign_negative());
        assert_eq!(credit.outstanding().to_string(), "0");
    }

    #[test]
    fn test_overpayment_rejected() {
        let mut credit = credit(dec!(50));

        let err = credit.increase_balance(dec!(100)).unwrap_err();
        assert_eq!(
            err,
            CoreError::SignViolation {
                product_id: ProductId(1),
                kind: ProductKind::Credit,
                balance: dec!(-50),
                change: dec!(100),
            }
        );
        assert_eq!(credit.balance(), dec!(-50));
    }

    #[test]
    fn test_credit_metadata() {
        let credit = credit(dec!(10));
        assert_eq!(credit.kind(), ProductKind::Credit);
        assert_eq!(credit.funding_account(), AccountId(1));
        assert_eq!(credit.owner_id(), ClientId(1));
        assert!(credit.to_string().contains("PRD_001"));
    }
}
