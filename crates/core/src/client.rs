//! # Client Module
//!
//! Thông tin khách hàng của ngân hàng. Registry (thêm/xóa/tra cứu) nằm
//! trong Bank aggregate; ở đây chỉ là dữ liệu.

use crate::id::ClientId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Khách hàng.
///
/// Hai clients được coi là trùng nhau nếu có cùng `national_id` (PESEL).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub first_name: String,
    pub last_name: String,
    /// Số định danh cá nhân (PESEL)
    pub national_id: String,
    pub created_at: DateTime<Utc>,
}

impl Client {
    pub fn new(id: ClientId, first_name: &str, last_name: &str, national_id: &str) -> Self {
        Self {
            id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            national_id: national_id.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Họ tên đầy đủ
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Cùng một người (so sánh theo national id)
    pub fn same_person(&self, other: &Client) -> bool {
        self.national_id == other.national_id
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.first_name, self.last_name, self.id)
    }
}
