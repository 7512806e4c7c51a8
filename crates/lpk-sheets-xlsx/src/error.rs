use thiserror::Error;

pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Failure while unpacking or producing an Office Open XML workbook
#[derive(Debug, Error)]
pub enum XlsxError {
    #[error("xlsx i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// Not a zip archive, or a damaged one
    #[error("xlsx container unreadable: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("malformed xml in xlsx part: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Structure that contradicts the package layout
    #[error("not a usable xlsx workbook: {0}")]
    InvalidFormat(String),

    /// Part named in the relationships but absent from the archive
    #[error("xlsx part '{0}' is missing")]
    MissingPart(String),

    /// Attribute or text that could not be interpreted
    #[error("cannot interpret xlsx content: {0}")]
    Parse(String),

    #[error(transparent)]
    Sheet(#[from] lpk_sheets_core::Error),
}
