//! Error types for the transfer pipeline

use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, TransferError>;

/// File-level and setup errors. These abort the whole operation; per-record
/// problems are collected in an [`ImportResult`](crate::reconcile::ImportResult) instead.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The file extension is not one of the accepted spreadsheet formats
    #[error("Unsupported file format: '{0}' (expected .xlsx or .xls)")]
    UnsupportedFormat(String),

    /// The upload exceeds the size limit
    #[error("File too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    /// Export or template requested without any column
    #[error("No columns to export")]
    NoColumns,

    /// Invalid settings value
    #[error("Invalid settings: {0}")]
    Settings(String),

    /// XLSX read/write error
    #[error("XLSX error: {0}")]
    Xlsx(#[from] lpk_sheets_xlsx::XlsxError),

    /// XLS read error
    #[cfg(feature = "xls")]
    #[error("XLS error: {0}")]
    Xls(#[from] lpk_sheets_xls::XlsError),

    /// Workbook model error
    #[error("Sheet error: {0}")]
    Sheets(#[from] lpk_sheets_core::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
