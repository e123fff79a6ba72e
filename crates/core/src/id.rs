//! # Id Module
//!
//! Identifiers cho clients, accounts và products, cùng với `IdAllocator`
//! cấp phát id tăng dần. Allocator thuộc về Bank aggregate và được truyền
//! vào các factory, nên tests có thể seed nó.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! ledger_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Giá trị số của id
            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "_{:03}"), self.0)
            }
        }
    };
}

ledger_id!(
    /// ID của client (CLI_001, CLI_002, ...)
    ClientId,
    "CLI"
);
ledger_id!(
    /// ID của bank account (ACC_001, ACC_002, ...)
    AccountId,
    "ACC"
);
ledger_id!(
    /// ID của credit hoặc deposit (PRD_001, ...). Credits và deposits dùng chung sequence.
    ProductId,
    "PRD"
);

/// Cấp phát id tăng dần (monotonic) cho từng loại entity.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next_client: u64,
    next_account: u64,
    next_product: u64,
}

impl IdAllocator {
    /// Tạo allocator bắt đầu từ 1
    pub fn new() -> Self {
        Self::seeded(1)
    }

    /// Tạo allocator với giá trị bắt đầu cho mọi sequence
    pub fn seeded(start: u64) -> Self {
        Self {
            next_client: start,
            next_account: start,
            next_product: start,
        }
    }

    pub fn next_client(&mut self) -> ClientId {
        let id = ClientId(self.next_client);
        self.next_client += 1;
        id
    }

    pub fn next_account(&mut self) -> AccountId {
        let id = AccountId(self.next_account);
        self.next_account += 1;
        id
    }

    pub fn next_product(&mut self) -> ProductId {
        let id = ProductId(self.next_product);
        self.next_product += 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
