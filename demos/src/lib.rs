//! # Minibank Demos
//!
//! Example scenarios driving the `Bank` aggregate end to end.
//!
//! ## Available Examples
//!
//! 1. **01_credit_lifecycle** - open a credit, accrue interest, repay in installments, pay off
//! 2. **02_deposit_maturity** - tiered deposit rates, maturity payout, early break, top-up
//!
//! ## Running Examples
//!
//! ```bash
//! cargo run -p minibank-demos --example 01_credit_lifecycle
//! RUST_LOG=minibank_business=debug cargo run -p minibank-demos --example 02_deposit_maturity
//! MINIBANK_CONFIG=bank.json cargo run -p minibank-demos --example 02_deposit_maturity
//! ```

use anyhow::Context;
use minibank_business::BankConfig;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable pointing at a JSON `BankConfig`
pub const CONFIG_ENV: &str = "MINIBANK_CONFIG";

/// Install the fmt subscriber; `RUST_LOG` overrides the default filter
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "minibank_business=info,minibank_demos=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Config from `MINIBANK_CONFIG` when set, defaults otherwise
pub fn load_config() -> anyhow::Result<BankConfig> {
    match std::env::var(CONFIG_ENV) {
        Ok(path) => {
            let config = BankConfig::from_file(Path::new(&path))
                .with_context(|| format!("Failed to load config from {}", path))?;
            tracing::info!(path = %path, "Loaded bank config");
            Ok(config)
        }
        Err(_) => Ok(BankConfig::default()),
    }
}
