//! # Report Errors
//!
//! Error types cho reports crate, wrapping IO và serde_json errors.

use thiserror::Error;

/// Reporting / export errors
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Report IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Report serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed history line {line}: {source}")]
    MalformedLine {
        line: usize,
        source: serde_json::Error,
    },
}

/// Result type alias cho ReportError
pub type ReportResult<T> = Result<T, ReportError>;

impl ReportError {
    /// Kiểm tra có phải lỗi IO không
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
