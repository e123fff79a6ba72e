//! # Minibank Business
//!
//! Business logic layer - operation engines for bank accounts, credits and
//! deposits, and the `Bank` aggregate that owns them.

pub mod account_ops;
pub mod bank;
pub mod config;
pub mod credit_ops;
pub mod deposit_ops;
pub mod error;
mod guards;

pub use account_ops::BankAccountOperation;
pub use bank::{Bank, Repayment};
pub use config::BankConfig;
pub use credit_ops::CreditOperation;
pub use deposit_ops::DepositOperation;
pub use error::{BankError, BankResult, OperationError, OperationResult};
