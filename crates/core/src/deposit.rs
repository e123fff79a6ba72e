//! # Deposit Module
//!
//! Tiền gửi (deposit) - số dư luôn >= 0.

use crate::account::BankAccount;
use crate::error::{CoreError, CoreResult};
use crate::id::{ClientId, ProductId};
use crate::interest::SharedMechanism;
use crate::product::{FinancialProduct, ProductCore, ProductKind, ProductVisitor};
use rust_decimal::Decimal;
use std::fmt;

/// Deposit gắn với một funding account; không bao giờ âm.
#[derive(Debug, Clone)]
pub struct Deposit {
    core: ProductCore,
}

impl Deposit {
    /// Mở deposit cho chủ của `funding_account` với số dư `|principal|`
    pub fn open(
        id: ProductId,
        funding_account: &BankAccount,
        principal: Decimal,
        mechanism: SharedMechanism,
    ) -> Self {
        Self::open_for(id, funding_account, funding_account.owner_id(), principal, mechanism)
    }

    /// Mở deposit với owner chỉ định
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
                principal.abs(),
                mechanism,
            ),
        }
    }

    /// Lãi nếu tất toán ngay bây giờ: `balance * interests()`
    pub fn accrued_interest(&self) -> CoreResult<Decimal> {
        let rate = self.interests();
        self.core
            .balance
            .checked_mul(rate)
            .ok_or(CoreError::Overflow {
                balance: self.core.balance,
                change: rate,
            })
    }
}

impl FinancialProduct for Deposit {
    fn core(&self) -> &ProductCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ProductCore {
        &mut self.core
    }

    fn kind(&self) -> ProductKind {
        ProductKind::Deposit
    }

    fn admits(&self, balance: Decimal) -> bool {
        balance >= Decimal::ZERO
    }

    fn accept(&self, visitor: &mut dyn ProductVisitor) {
        visitor.visit_deposit(self);
    }
}

impl fmt::Display for Deposit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Deposit {} (owner: {}, account: {}, balance: {})",
            self.core.id, self.core.owner_id, self.core.funding_account, self.core.balance
        )
    }
}
