//! # Minibank Core
//!
//! Core domain types cho Minibank: identifiers, interest mechanisms,
//! bank accounts, financial products (Credit, Deposit) và audit history.
//!
//! Crate này không biết gì về registry của Bank; các operation engines
//! nằm ở `minibank-business`.

pub mod account;
pub mod client;
pub mod credit;
pub mod deposit;
pub mod error;
pub mod history;
pub mod id;
pub mod interest;
pub mod product;

pub use account::{AccountKind, BankAccount};
pub use client::Client;
pub use credit::Credit;
pub use deposit::Deposit;
pub use error::{CoreError, CoreResult};
pub use history::{Ack, History, OperationKind};
pub use id::{AccountId, ClientId, IdAllocator, ProductId};
pub use interest::{
    FlatRate, InterestMechanism, InterestTier, RateSpec, SharedMechanism, TieredRate, ZeroRate,
};
pub use product::{FinancialProduct, Product, ProductCore, ProductKind, ProductVisitor};
