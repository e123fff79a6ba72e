//! Business layer errors
//!
//! `OperationError` is what the operation engines return for expected
//! business conditions. `BankError` covers the registry lookups of the
//! `Bank` aggregate, which aggregates both through anyhow.

use minibank_core::{AccountId, ClientId, CoreError, ProductId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors returned by `BankAccountOperation`, `CreditOperation` and
/// `DepositOperation`. A failed operation leaves every balance untouched
/// and appends nothing to the history.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    // === Validation errors ===
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    #[error("Product {0} is already settled")]
    ProductSettled(ProductId),

    #[error("Product {product_id} is funded by {expected}, not {actual}")]
    AccountMismatch {
        product_id: ProductId,
        expected: AccountId,
        actual: AccountId,
    },

    #[error("Payment {amount} exceeds the outstanding debt {outstanding} of {product_id}")]
    Overpayment {
        product_id: ProductId,
        amount: Decimal,
        outstanding: Decimal,
    },

    #[error("Insufficient funds on {account_id}: required {required}, available {available}")]
    InsufficientFunds {
        account_id: AccountId,
        required: Decimal,
        available: Decimal,
    },

    #[error("Cannot transfer from {0} to itself")]
    SameAccount(AccountId),

    #[error("Nothing to accrue on {0}: balance is zero")]
    NothingToAccrue(AccountId),

    #[error("Cannot change type of {account_id}: {source}")]
    AccountTypeChange {
        account_id: AccountId,
        source: CoreError,
    },

    // === Wrapped errors ===
    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

/// Result type alias for engine operations
pub type OperationResult<T> = Result<T, OperationError>;

impl OperationError {
    /// Create insufficient funds error
    pub fn insufficient_funds(account_id: AccountId, required: Decimal, available: Decimal) -> Self {
        Self::InsufficientFunds {
            account_id,
            required,
            available,
        }
    }

    /// The repayment was larger than the debt; settle with `pay_off_credit` instead
    pub fn is_overpayment(&self) -> bool {
        matches!(self, Self::Overpayment { .. })
    }

    pub fn is_insufficient_funds(&self) -> bool {
        match self {
            Self::InsufficientFunds { .. } => true,
            Self::Core(core) => core.is_insufficient_funds(),
            _ => false,
        }
    }
}

/// Registry errors of the `Bank` aggregate
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    // === Not found errors ===
    #[error("Client not found: {0}")]
    ClientNotFound(ClientId),

    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Credit not found: {0}")]
    CreditNotFound(ProductId),

    #[error("Deposit not found: {0}")]
    DepositNotFound(ProductId),

    // === Registry errors ===
    #[error("Client with national id {0} already exists")]
    ClientAlreadyExists(String),

    #[error("Client {client_id} still owns {accounts} account(s)")]
    ClientHasAccounts { client_id: ClientId, accounts: usize },

    #[error("Account {account_id} does not belong to {client_id}")]
    NotAccountOwner {
        account_id: AccountId,
        client_id: ClientId,
    },

    // === Configuration ===
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type alias for `Bank` operations
pub type BankResult<T> = anyhow::Result<T>;
