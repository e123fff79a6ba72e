//! # Product Module
//!
//! Hành vi chung của các financial products (Credit, Deposit): giữ số dư,
//! gắn với owner và funding account, tính lãi qua mechanism.
//!
//! - `increase_balance` là cổng duy nhất thay đổi principal, kiểm tra sign
//!   invariant của từng loại product.
//! - `accrue` là đường riêng cho lãi: luôn đẩy số dư ra xa 0 (credit âm hơn,
//!   deposit dương hơn), nên không xung đột với sign gate.
//! - `settle` đưa số dư về 0 (trạng thái SETTLED, terminal).

use crate::credit::Credit;
use crate::deposit::Deposit;
use crate::error::{CoreError, CoreResult};
use crate::id::{AccountId, ClientId, ProductId};
use crate::interest::SharedMechanism;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Loại product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    Credit,
    Deposit,
}

impl ProductKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductKind::Credit => "credit",
            ProductKind::Deposit => "deposit",
        }
    }
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Phần dữ liệu chung của mọi product.
///
/// Fields chỉ đọc được từ ngoài crate; số dư thay đổi qua `FinancialProduct`.
#[derive(Debug, Clone)]
pub struct ProductCore {
    pub(crate) id: ProductId,
    pub(crate) owner_id: ClientId,
    pub(crate) funding_account: AccountId,
    pub(crate) balance: Decimal,
    pub(crate) mechanism: SharedMechanism,
    pub(crate) opened_at: DateTime<Utc>,
}

impl ProductCore {
    pub(crate) fn new(
        id: ProductId,
        owner_id: ClientId,
        funding_account: AccountId,
        balance: Decimal,
        mechanism: SharedMechanism,
    ) -> Self {
        Self {
            id,
            owner_id,
            funding_account,
            balance,
            mechanism,
            opened_at: Utc::now(),
        }
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }
}

/// Visitor cho reporting: phân nhánh theo loại product mà không cần type tag.
pub trait ProductVisitor {
    fn visit_credit(&mut self, credit: &Credit);
    fn visit_deposit(&mut self, deposit: &Deposit);
}

/// Hợp đồng chung của Credit và Deposit.
pub trait FinancialProduct {
    fn core(&self) -> &ProductCore;

    fn core_mut(&mut self) -> &mut ProductCore;

    fn kind(&self) -> ProductKind;

    /// Sign invariant: số dư `balance` có hợp lệ cho loại product này không
    fn admits(&self, balance: Decimal) -> bool;

    /// Double dispatch cho reporting
    fn accept(&self, visitor: &mut dyn ProductVisitor);

    fn id(&self) -> ProductId {
        self.core().id
    }

    fn owner_id(&self) -> ClientId {
        self.core().owner_id
    }

    fn funding_account(&self) -> AccountId {
        self.core().funding_account
    }

    fn balance(&self) -> Decimal {
        self.core().balance
    }

    fn mechanism(&self) -> &SharedMechanism {
        &self.core().mechanism
    }

    fn opened_at(&self) -> DateTime<Utc> {
        self.core().opened_at
    }

    /// Lãi suất hiện tại: `mechanism.rate(balance)`
    fn interests(&self) -> Decimal {
        self.core().mechanism.rate(self.balance())
    }

    /// SETTLED khi số dư bằng 0
    fn is_settled(&self) -> bool {
        self.balance().is_zero()
    }

    /// Cộng `value` vào số dư nếu sign invariant vẫn đúng.
    ///
    /// Thất bại thì số dư giữ nguyên.
    fn increase_balance(&mut self, value: Decimal) -> CoreResult<()> {
        let next = self.balance().checked_add(value).ok_or(CoreError::Overflow {
            balance: self.balance(),
            change: value,
        })?;
        if !self.admits(next) {
            return Err(CoreError::SignViolation {
                product_id: self.id(),
                kind: self.kind(),
                balance: self.balance(),
                change: value,
            });
        }
        self.core_mut().balance = next;
        Ok(())
    }

    /// Ghi nhận lãi: đẩy số dư ra xa 0 một lượng `|interest|`.
    ///
    /// Trả về lượng đã ghi nhận; tràn số thì số dư giữ nguyên.
    fn accrue(&mut self, interest: Decimal) -> CoreResult<Decimal> {
        let amount = interest.abs();
        let balance = self.balance();
        let next = match self.kind() {
            ProductKind::Credit => balance.checked_sub(amount),
            ProductKind::Deposit => balance.checked_add(amount),
        }
        .ok_or(CoreError::Overflow {
            balance,
            change: amount,
        })?;
        self.core_mut().balance = next;
        Ok(amount)
    }

    /// Đưa số dư về 0, trả về số dư trước đó
    fn settle(&mut self) -> Decimal {
        std::mem::replace(&mut self.core_mut().balance, Decimal::ZERO)
    }

    /// Thay mechanism, trả về mechanism cũ
    fn replace_mechanism(&mut self, mechanism: SharedMechanism) -> SharedMechanism {
        std::mem::replace(&mut self.core_mut().mechanism, mechanism)
    }
}

/// View dạng tagged union trên một product đang tồn tại.
#[derive(Debug, Clone, Copy)]
pub enum Product<'a> {
    Credit(&'a Credit),
    Deposit(&'a Deposit),
}

impl<'a> Product<'a> {
    pub fn kind(&self) -> ProductKind {
        match self {
            Product::Credit(_) => ProductKind::Credit,
            Product::Deposit(_) => ProductKind::Deposit,
        }
    }

    pub fn as_financial(&self) -> &'a dyn FinancialProduct {
        match *self {
            Product::Credit(credit) => credit,
            Product::Deposit(deposit) => deposit,
        }
    }

    pub fn id(&self) -> ProductId {
        self.as_financial().id()
    }

    pub fn balance(&self) -> Decimal {
        self.as_financial().balance()
    }

    pub fn accept(&self, visitor: &mut dyn ProductVisitor) {
        match self {
            Product::Credit(credit) => visitor.visit_credit(credit),
            Product::Deposit(deposit) => visitor.visit_deposit(deposit),
        }
    }
}

impl<'a> From<&'a Credit> for Product<'a> {
    fn from(credit: &'a Credit) -> Self {
        Product::Credit(credit)
    }
}

impl<'a> From<&'a Deposit> for Product<'a> {
    fn from(deposit: &'a Deposit) -> Self {
        Product::Deposit(deposit)
    }
}
