//! # Account Module
//!
//! Định nghĩa BankAccount - tài khoản thanh toán (funding account) của client.
//! Credits và deposits luôn gắn với một BankAccount; mọi dòng tiền của
//! product đi qua account này.

use crate::error::{CoreError, CoreResult};
use crate::id::{AccountId, ClientId};
use crate::interest::SharedMechanism;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Loại tài khoản
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AccountKind {
    /// Tài khoản thường: số dư không được âm
    Normal,
    /// Tài khoản debit: được thấu chi tới `limit`
    Debit { limit: Decimal },
}

impl AccountKind {
    /// Tạo Debit kind, limit phải >= 0
    pub fn debit(limit: Decimal) -> CoreResult<Self> {
        if limit < Decimal::ZERO {
            return Err(CoreError::InvalidLimit(limit));
        }
        Ok(AccountKind::Debit { limit })
    }

    /// Số dư thấp nhất được phép
    pub fn floor(&self) -> Decimal {
        match self {
            AccountKind::Normal => Decimal::ZERO,
            AccountKind::Debit { limit } => -*limit,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Normal => "normal",
            AccountKind::Debit { .. } => "debit",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKind::Normal => write!(f, "normal"),
            AccountKind::Debit { limit } => write!(f, "debit (limit {})", limit),
        }
    }
}

/// Tài khoản ngân hàng (funding account).
///
/// Số dư chỉ thay đổi qua `increase_balance`, không bao giờ xuống dưới
/// `kind.floor()`.
#[derive(Debug, Clone)]
pub struct BankAccount {
    id: AccountId,
    owner_id: ClientId,
    balance: Decimal,
    kind: AccountKind,
    mechanism: SharedMechanism,
    created_at: DateTime<Utc>,
}

impl BankAccount {
    /// Tạo account mới với số dư 0
    pub fn new(id: AccountId, owner_id: ClientId, kind: AccountKind, mechanism: SharedMechanism) -> Self {
        Self {
            id,
            owner_id,
            balance: Decimal::ZERO,
            kind,
            mechanism,
            created_at: Utc::now(),
        }
    }

    /// Tạo account với số dư khởi tạo (dùng cho test/demo)
    pub fn with_balance(
        id: AccountId,
        owner_id: ClientId,
        balance: Decimal,
        mechanism: SharedMechanism,
    ) -> Self {
        let mut account = Self::new(id, owner_id, AccountKind::Normal, mechanism);
        account.balance = balance.max(Decimal::ZERO);
        account
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn owner_id(&self) -> ClientId {
        self.owner_id
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    pub fn mechanism(&self) -> &SharedMechanism {
        &self.mechanism
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Lãi suất hiện tại theo mechanism
    pub fn interests(&self) -> Decimal {
        self.mechanism.rate(self.balance)
    }

    /// Số tiền còn có thể rút (tính cả hạn mức thấu chi)
    pub fn available(&self) -> Decimal {
        self.balance - self.kind.floor()
    }

    /// Kiểm tra có đủ tiền để rút `amount`
    pub fn can_cover(&self, amount: Decimal) -> bool {
        amount <= self.available()
    }

    /// Cộng `value` (có thể âm) vào số dư.
    ///
    /// # Returns
    /// - `Ok(())` nếu số dư mới vẫn >= floor
    /// - `Err(InsufficientFunds)` nếu không, số dư giữ nguyên
    pub fn increase_balance(&mut self, value: Decimal) -> CoreResult<()> {
        let next = self.balance.checked_add(value).ok_or(CoreError::Overflow {
            balance: self.balance,
            change: value,
        })?;
        if next < self.kind.floor() {
            return Err(CoreError::InsufficientFunds {
                account_id: self.id,
                needed: -value,
                available: self.available(),
            });
        }
        self.balance = next;
        Ok(())
    }

    /// Thay mechanism
    pub fn replace_mechanism(&mut self, mechanism: SharedMechanism) -> SharedMechanism {
        std::mem::replace(&mut self.mechanism, mechanism)
    }

    /// Đổi loại tài khoản; thất bại nếu số dư hiện tại thấp hơn floor mới
    pub fn change_kind(&mut self, kind: AccountKind) -> CoreResult<AccountKind> {
        if let AccountKind::Debit { limit } = kind {
            if limit < Decimal::ZERO {
                return Err(CoreError::InvalidLimit(limit));
            }
        }
        if self.balance < kind.floor() {
            return Err(CoreError::BelowFloor {
                account_id: self.id,
                balance: self.balance,
                floor: kind.floor(),
            });
        }
        Ok(std::mem::replace(&mut self.kind, kind))
    }
}

impl fmt::Display for BankAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Account {} (owner: {}, {}, balance: {})",
            self.id, self.owner_id, self.kind, self.balance
        )
    }
}
