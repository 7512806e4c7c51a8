//! Pipeline settings

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TransferError};

/// Largest upload accepted by [`parse_import`](crate::import::parse_import): 10 MiB
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Knobs for export, template generation and import.
///
/// Every field has a default, so a settings file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferSettings {
    /// Uploads larger than this are refused before parsing
    pub max_upload_bytes: u64,
    /// Longest text a single exported cell may hold, marker included
    pub max_cell_chars: usize,
    /// Number of records shown by an import preview
    pub preview_rows: usize,
    /// Worksheet name used for exports and templates
    pub sheet_name: String,
    /// Column width (in characters) applied to every exported column
    pub column_width: f64,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            max_upload_bytes: MAX_UPLOAD_BYTES,
            max_cell_chars: lpk_sheets_core::MAX_CELL_CHARS,
            preview_rows: 5,
            sheet_name: "Data".to_string(),
            column_width: 20.0,
        }
    }
}

impl TransferSettings {
    /// Parse settings from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject values the writers cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.max_cell_chars == 0 || self.max_cell_chars > lpk_sheets_core::MAX_CELL_CHARS {
            return Err(TransferError::Settings(format!(
                "max_cell_chars must be between 1 and {}",
                lpk_sheets_core::MAX_CELL_CHARS
            )));
        }
        if !(self.column_width.is_finite() && self.column_width > 0.0 && self.column_width <= 255.0) {
            return Err(TransferError::Settings(
                "column_width must be between 0 and 255".into(),
            ));
        }
        if self.sheet_name.trim().is_empty() {
            return Err(TransferError::Settings("sheet_name cannot be empty".into()));
        }
        Ok(())
    }
}
