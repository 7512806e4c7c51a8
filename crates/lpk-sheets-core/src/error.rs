//! Errors raised while building or addressing an in-memory workbook

use thiserror::Error;

/// Shorthand used across the sheets crates
pub type Result<T> = std::result::Result<T, Error>;

/// Grid and workbook structure errors
#[derive(Debug, Error)]
pub enum Error {
    /// A1 reference that could not be parsed
    #[error("bad cell reference '{reference}': {reason}")]
    InvalidAddress {
        reference: String,
        reason: &'static str,
    },

    /// Row past the last row a sheet can hold
    #[error("row {row} exceeds the sheet limit of {limit} rows")]
    RowOutOfBounds { row: u32, limit: u32 },

    /// Column past XFD, or a column count that does not fit
    #[error("column {col} exceeds the sheet limit of {limit} columns")]
    ColumnOutOfBounds { col: usize, limit: u16 },

    /// No worksheet at this position
    #[error("workbook has {count} sheet(s), no sheet at index {index}")]
    SheetOutOfBounds { index: usize, count: usize },

    /// Name rejected by spreadsheet applications
    #[error("sheet name '{name}' rejected: {reason}")]
    InvalidSheetName { name: String, reason: String },

    /// Names are compared case-insensitively
    #[error("a sheet named '{0}' already exists")]
    DuplicateSheetName(String),
}
