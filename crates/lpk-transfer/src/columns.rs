//! Column descriptors shared by export, template generation and import

use serde::{Deserialize, Serialize};

use crate::path::FieldPath;

/// Maps one record field to one spreadsheet column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportColumn {
    /// Where the value lives inside a record
    pub key: FieldPath,
    /// Column label written to (and matched in) the header row
    pub header: String,
}

impl ExportColumn {
    pub fn new(key: impl Into<FieldPath>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
        }
    }

    /// Whether a header cell from an uploaded sheet refers to this column.
    ///
    /// Compares trimmed and case-insensitively, against the label first and
    /// the dotted key second.
    pub fn matches_header(&self, cell: &str) -> bool {
        let cell = cell.trim().to_lowercase();
        if cell.is_empty() {
            return false;
        }
        cell == self.header.trim().to_lowercase() || cell == self.key.to_string().to_lowercase()
    }
}
