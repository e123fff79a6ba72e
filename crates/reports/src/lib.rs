//! # Minibank Reports
//!
//! Report generation - balance and history reports, CSV/JSON/Markdown
//! exporters, and a JSONL dump of the audit history.
//!
//! ## Exporters
//!
//! - [`CsvExporter`] - CSV format with proper escaping
//! - [`JsonExporter`] - JSON format (pretty or compact)
//! - [`MarkdownExporter`] - Markdown tables
//!
//! ## Reports
//!
//! - [`BalanceReport`] - per-product balances, collected with a `ProductVisitor`
//! - [`HistoryReport`] - the audit trail, optionally filtered
//!
//! ## Example
//!
//! ```rust,ignore
//! use minibank_reports::{BalanceReport, MarkdownExporter, ReportExporter};
//!
//! let mut report = BalanceReport::new("Balances");
//! bank.accept_all(&mut report);
//! let md = MarkdownExporter::new().export(&report)?;
//! ```

pub mod balance;
pub mod error;
pub mod exporters;
pub mod history;
pub mod jsonl;

// Re-export main types
pub use balance::{BalanceReport, BalanceRow};
pub use error::{ReportError, ReportResult};
pub use exporters::{CsvExporter, JsonExporter, MarkdownExporter, ReportData, ReportExporter};
pub use history::HistoryReport;
pub use jsonl::{read_history_file, read_jsonl, write_history_file, write_jsonl};
