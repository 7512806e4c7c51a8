use thiserror::Error;

pub type XlsResult<T> = std::result::Result<T, XlsError>;

/// Failure while reading a legacy BIFF workbook
#[derive(Debug, Error)]
pub enum XlsError {
    /// Includes compound document errors, which `cfb` reports as i/o errors
    #[error("xls i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a usable xls workbook: {0}")]
    InvalidFormat(String),

    /// BIFF versions before BIFF8 (Excel 97)
    #[error("xls version not supported: {0}")]
    UnsupportedVersion(String),

    /// Record body shorter or different than its type requires
    #[error("cannot interpret xls record: {0}")]
    Parse(String),

    #[error(transparent)]
    Sheet(#[from] lpk_sheets_core::Error),
}
