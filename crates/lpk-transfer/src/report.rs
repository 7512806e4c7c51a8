//! Warnings returned to the caller, and the seam through which it presents them.
//!
//! Nothing in the pipeline notifies anyone by itself. Operations hand back
//! their warnings inside their reports; whoever called them decides how the
//! operator gets to see them, through a [`Reporter`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::reconcile::ImportResult;

/// A text cell that carries the truncation marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruncatedCell {
    /// 1-based spreadsheet row
    pub row: u32,
    /// Header of the column the cell sits in
    pub header: String,
}

/// Non-fatal conditions met during export, template generation or import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransferWarning {
    /// Export called with no records; no file was produced
    EmptyDataset,
    /// The uploaded sheet has no data rows
    EmptyOrInvalidFile,
    /// Some exported text was cut to fit into its cell
    TruncatedOnExport { cells: usize },
    /// The uploaded sheet holds text that was cut on an earlier export
    TruncationDetected { cells: Vec<TruncatedCell> },
}

impl TransferWarning {
    /// Whether committing the data as-is would store incomplete values
    pub fn is_data_loss(&self) -> bool {
        matches!(self, TransferWarning::TruncationDetected { .. })
    }
}

impl fmt::Display for TransferWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferWarning::EmptyDataset => f.write_str("Tidak ada data untuk diekspor"),
            TransferWarning::EmptyOrInvalidFile => {
                f.write_str("File kosong atau format tidak valid")
            }
            TransferWarning::TruncatedOnExport { cells } => write!(
                f,
                "{cells} sel melebihi batas 32767 karakter dan telah dipotong"
            ),
            TransferWarning::TruncationDetected { cells } => {
                write!(f, "{} sel berisi data yang terpotong:", cells.len())?;
                for cell in cells {
                    write!(f, " baris {} ({});", cell.row, cell.header)?;
                }
                Ok(())
            }
        }
    }
}

/// Presents warnings and import outcomes to the operator
pub trait Reporter {
    fn warn(&mut self, warning: &TransferWarning);

    fn result(&mut self, result: &ImportResult);

    /// Forward every warning of a report
    fn warn_all(&mut self, warnings: &[TransferWarning]) {
        for warning in warnings {
            self.warn(warning);
        }
    }
}

/// Keeps everything it is given. Used by tests and by callers that render later.
#[derive(Debug, Default, Clone)]
pub struct CollectingReporter {
    pub warnings: Vec<TransferWarning>,
    pub results: Vec<ImportResult>,
}

impl Reporter for CollectingReporter {
    fn warn(&mut self, warning: &TransferWarning) {
        self.warnings.push(warning.clone());
    }

    fn result(&mut self, result: &ImportResult) {
        self.results.push(result.clone());
    }
}
