//! # Error Module
//!
//! Định nghĩa các domain errors cho Minibank sử dụng thiserror.

use crate::id::{AccountId, ProductId};
use crate::product::ProductKind;
use rust_decimal::Decimal;
use thiserror::Error;

/// Core domain errors.
///
/// Các lỗi vi phạm invariant của balance, không liên quan đến registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // === Product errors ===
    #[error("Balance change {change} would break the {kind} sign invariant of {product_id} (balance {balance})")]
    SignViolation {
        product_id: ProductId,
        kind: ProductKind,
        balance: Decimal,
        change: Decimal,
    },

    #[error("Balance {balance} cannot absorb {change} without overflow")]
    Overflow { balance: Decimal, change: Decimal },

    // === Account errors ===
    #[error("Insufficient funds on {account_id}: need {needed}, available {available}")]
    InsufficientFunds {
        account_id: AccountId,
        needed: Decimal,
        available: Decimal,
    },

    #[error("Balance {balance} of {account_id} is below the floor {floor} of the requested account kind")]
    BelowFloor {
        account_id: AccountId,
        balance: Decimal,
        floor: Decimal,
    },

    #[error("Invalid overdraft limit: {0}")]
    InvalidLimit(Decimal),

    // === Interest errors ===
    #[error("Interest rate must not be negative: {0}")]
    NegativeRate(Decimal),

    #[error("Interest tier is empty: min {min}, max {max}")]
    EmptyTier { min: Decimal, max: Decimal },
}

/// Result type alias với CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Kiểm tra có phải lỗi sign invariant không
    pub fn is_sign_violation(&self) -> bool {
        matches!(self, CoreError::SignViolation { .. })
    }

    /// Kiểm tra có phải lỗi tràn số không
    pub fn is_overflow(&self) -> bool {
        matches!(self, CoreError::Overflow { .. })
    }

    /// Kiểm tra có phải lỗi không đủ tiền không
    pub fn is_insufficient_funds(&self) -> bool {
        matches!(self, CoreError::InsufficientFunds { .. })
    }
}
