//! # History Module
//!
//! Ack (acknowledgment) và History - nhật ký append-only của mọi thao tác
//! làm thay đổi trạng thái. Mỗi thao tác thành công ghi đúng một Ack.

use crate::id::{AccountId, ClientId, ProductId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Loại thao tác được ghi vào history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    // === Client ===
    AddNewClient,
    DeleteClient,

    // === Account ===
    CreateAccount,
    /// Nạp tiền mặt vào account
    Payment,
    /// Rút tiền mặt khỏi account
    Withdraw,
    ChangeAccountType,

    // === Products ===
    CreateDeposit,
    CreateCredit,
    /// Ghi nhận lãi
    PayPercentage,
    /// Chuyển tiền giữa account và product (hoặc giữa hai accounts)
    Transfer,
    PayOffCredit,
    /// Tất toán deposit đúng hạn (có lãi)
    SolveDeposit,
    /// Tất toán deposit trước hạn (không lãi)
    BreakDeposit,
    ChangePercentage,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::AddNewClient => "ADD_NEW_CLIENT",
            OperationKind::DeleteClient => "DELETE_CLIENT",
            OperationKind::CreateAccount => "CREATE_ACCOUNT",
            OperationKind::Payment => "PAYMENT",
            OperationKind::Withdraw => "WITHDRAW",
            OperationKind::ChangeAccountType => "CHANGE_ACCOUNT_TYPE",
            OperationKind::CreateDeposit => "CREATE_DEPOSIT",
            OperationKind::CreateCredit => "CREATE_CREDIT",
            OperationKind::PayPercentage => "PAY_PERCENTAGE",
            OperationKind::Transfer => "TRANSFER",
            OperationKind::PayOffCredit => "PAY_OFF_CREDIT",
            OperationKind::SolveDeposit => "SOLVE_DEPOSIT",
            OperationKind::BreakDeposit => "BREAK_DEPOSIT",
            OperationKind::ChangePercentage => "CHANGE_PERCENTAGE",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Một bản ghi trong history.
///
/// `sequence` bằng 0 cho tới khi được `History::append` gán (bắt đầu từ 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    /// Số thứ tự trong history
    pub sequence: u64,
    /// Thời điểm ghi nhận
    pub timestamp: DateTime<Utc>,
    /// Loại thao tác
    pub kind: OperationKind,

    // === Actor ===
    /// Client thực hiện (chủ của account/product)
    pub actor: ClientId,

    // === Source ===
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductId>,

    /// Mô tả do caller cung cấp
    pub description: String,
}

impl Ack {
    pub fn new(kind: OperationKind, actor: ClientId, description: &str) -> Self {
        Self {
            sequence: 0,
            timestamp: Utc::now(),
            kind,
            actor,
            account: None,
            product: None,
            description: description.to_string(),
        }
    }

    // === Builder methods ===

    pub fn with_account(mut self, account: AccountId) -> Self {
        self.account = Some(account);
        self
    }

    pub fn with_product(mut self, product: ProductId) -> Self {
        self.product = Some(product);
        self
    }

    /// Serialize thành JSON string (cho JSONL)
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for Ack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} [{}] {} by {}",
            self.sequence,
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.kind,
            self.actor
        )?;
        if let Some(account) = self.account {
            write!(f, " on {}", account)?;
        }
        if let Some(product) = self.product {
            write!(f, " for {}", product)?;
        }
        if !self.description.is_empty() {
            write!(f, ": {}", self.description)?;
        }
        Ok(())
    }
}

/// Nhật ký append-only. Chỉ trả ra shared references nên Ack đã ghi không
/// thể bị sửa.
#[derive(Debug, Clone, Default)]
pub struct History {
    acks: Vec<Ack>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ghi Ack, gán sequence tiếp theo và trả về sequence đó
    pub fn append(&mut self, mut ack: Ack) -> u64 {
        let sequence = self.acks.len() as u64 + 1;
        ack.sequence = sequence;
        self.acks.push(ack);
        sequence
    }

    pub fn len(&self) -> usize {
        self.acks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.acks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ack> {
        self.acks.iter()
    }

    pub fn last(&self) -> Option<&Ack> {
        self.acks.last()
    }

    pub fn as_slice(&self) -> &[Ack] {
        &self.acks
    }

    // === Queries ===

    pub fn by_kind(&self, kind: OperationKind) -> Vec<&Ack> {
        self.acks.iter().filter(|ack| ack.kind == kind).collect()
    }

    pub fn by_actor(&self, actor: ClientId) -> Vec<&Ack> {
        self.acks.iter().filter(|ack| ack.actor == actor).collect()
    }

    pub fn by_product(&self, product: ProductId) -> Vec<&Ack> {
        self.acks
            .iter()
            .filter(|ack| ack.product == Some(product))
            .collect()
    }

    pub fn by_account(&self, account: AccountId) -> Vec<&Ack> {
        self.acks
            .iter()
            .filter(|ack| ack.account == Some(account))
            .collect()
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Ack;
    type IntoIter = std::slice::Iter<'a, Ack>;

    fn into_iter(self) -> Self::IntoIter {
        self.acks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> History {
        let mut history = History::new();
        history.append(Ack::new(OperationKind::AddNewClient, ClientId(1), "Jan Kowalski"));
        history.append(
            Ack::new(OperationKind::CreateAccount, ClientId(1), "main account")
                .with_account(AccountId(1)),
        );
        history.append(
            Ack::new(OperationKind::CreateCredit, ClientId(1), "car loan")
                .with_account(AccountId(1))
                .with_product(ProductId(1)),
        );
        history.append(
            Ack::new(OperationKind::CreateAccount, ClientId(2), "")
                .with_account(AccountId(2)),
        );
        history
    }

    #[test]
    fn test_append_assigns_sequence() {
        let mut history = History::new();
        assert!(history.is_empty());

        let first = history.append(Ack::new(OperationKind::AddNewClient, ClientId(1), ""));
        let second = history.append(Ack::new(OperationKind::DeleteClient, ClientId(1), ""));

        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(history.len(), 2);
        assert_eq!(history.last().map(|ack| ack.kind), Some(OperationKind::DeleteClient));
    }

    #[test]
    fn test_queries() {
        let history = sample();

        assert_eq!(history.by_kind(OperationKind::CreateAccount).len(), 2);
        assert_eq!(history.by_actor(ClientId(1)).len(), 3);
        assert_eq!(history.by_product(ProductId(1)).len(), 1);
        assert_eq!(history.by_account(AccountId(1)).len(), 2);
        assert!(history.by_product(ProductId(9)).is_empty());
    }

    #[test]
    fn test_iteration_keeps_order() {
        let history = sample();
        let sequences: Vec<u64> = history.iter().map(|ack| ack.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&OperationKind::PayOffCredit).unwrap(),
            "\"PAY_OFF_CREDIT\""
        );
        assert_eq!(OperationKind::BreakDeposit.to_string(), "BREAK_DEPOSIT");
    }

    #[test]
    fn test_ack_to_json() {
        let history = sample();
        let json = history.last().unwrap().to_json().unwrap();

        assert!(json.contains("CREATE_ACCOUNT"));
        assert!(json.contains("\"sequence\":4"));
        assert!(!json.contains("product"));

        let back: Ack = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, history.last().unwrap());
    }

    #[test]
    fn test_ack_display() {
        let ack = Ack::new(OperationKind::Transfer, ClientId(3), "installment")
            .with_account(AccountId(4))
            .with_product(ProductId(5));
        let text = ack.to_string();

        assert!(text.contains("TRANSFER by CLI_003 on ACC_004 for PRD_005: installment"));
    }
}
