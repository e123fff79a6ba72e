//! Bank configuration
//!
//! Interest defaults and overdraft limits are loaded from JSON rather than
//! hardcoded. Every field has a default, so partial files are valid.

use crate::error::BankError;
use minibank_core::{InterestTier, RateSpec};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the `Bank` aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankConfig {
    // === Interest defaults ===
    /// Mechanism for new bank accounts
    #[serde(default = "default_account_rate")]
    pub default_account_rate: RateSpec,

    /// Mechanism for new credits when the caller gives none
    #[serde(default = "default_credit_rate")]
    pub default_credit_rate: RateSpec,

    /// Mechanism for new deposits when the caller gives none
    #[serde(default = "default_deposit_rate")]
    pub default_deposit_rate: RateSpec,

    // === Accounts ===
    /// Overdraft limit for debit accounts opened without an explicit limit
    #[serde(default = "default_debit_limit")]
    pub default_debit_limit: Decimal,

    /// First value of every id sequence
    #[serde(default = "default_id_seed")]
    pub id_seed: u64,
}

// Default value functions for serde
fn default_account_rate() -> RateSpec {
    RateSpec::flat(Decimal::new(1, 2))
}

fn default_credit_rate() -> RateSpec {
    RateSpec::flat(Decimal::new(8, 2))
}

fn default_deposit_rate() -> RateSpec {
    RateSpec::Tiered {
        tiers: vec![
            InterestTier::new(Decimal::ZERO, Some(Decimal::new(1_000, 0)), Decimal::new(2, 2)),
            InterestTier::new(
                Decimal::new(1_000, 0),
                Some(Decimal::new(10_000, 0)),
                Decimal::new(3, 2),
            ),
            InterestTier::new(Decimal::new(10_000, 0), None, Decimal::new(35, 3)),
        ],
    }
}

fn default_debit_limit() -> Decimal {
    Decimal::new(500, 0)
}

fn default_id_seed() -> u64 {
    1
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            default_account_rate: default_account_rate(),
            default_credit_rate: default_credit_rate(),
            default_deposit_rate: default_deposit_rate(),
            default_debit_limit: default_debit_limit(),
            id_seed: default_id_seed(),
        }
    }
}

impl BankConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check that every rate spec builds and the debit limit is not negative
    pub fn validate(&self) -> Result<(), BankError> {
        if self.default_debit_limit < Decimal::ZERO {
            return Err(BankError::Config(format!(
                "default_debit_limit must not be negative: {}",
                self.default_debit_limit
            )));
        }
        if self.id_seed == 0 {
            return Err(BankError::Config("id_seed must be at least 1".to_string()));
        }

        let rates = [
            ("default_account_rate", &self.default_account_rate),
            ("default_credit_rate", &self.default_credit_rate),
            ("default_deposit_rate", &self.default_deposit_rate),
        ];
        for (name, spec) in rates {
            spec.build()
                .map_err(|e| BankError::Config(format!("{}: {}", name, e)))?;
        }
        Ok(())
    }
}
