//! Spreadsheet export.
//!
//! Records are serialized to JSON once, then each column's path picks the
//! cell value out of them. Text that does not fit into a cell is cut and
//! tagged with the truncation marker.

use chrono::NaiveDate;
use lpk_sheets_core::{CellValue, Workbook, Worksheet};
use lpk_sheets_xlsx::XlsxWriter;
use serde::Serialize;
use serde_json::Value;

use crate::columns::ExportColumn;
use crate::error::{Result, TransferError};
use crate::marker::truncate_cell_text;
use crate::report::TransferWarning;
use crate::settings::TransferSettings;
use crate::sink::{sanitize_stem, DeliveredFile, FileSink};

/// Outcome of an export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    /// The delivered file, `None` when there was nothing to export
    pub file: Option<DeliveredFile>,
    /// Number of data rows written
    pub rows: usize,
    pub warnings: Vec<TransferWarning>,
}

/// Write `records` into `<stem>.xlsx` and hand it to `sink`.
///
/// An empty record list produces no file and an
/// [`EmptyDataset`](TransferWarning::EmptyDataset) warning.
pub fn export_to_excel<T: Serialize>(
    records: &[T],
    columns: &[ExportColumn],
    stem: &str,
    settings: &TransferSettings,
    sink: &mut dyn FileSink,
) -> Result<ExportReport> {
    if columns.is_empty() {
        return Err(TransferError::NoColumns);
    }
    if records.is_empty() {
        tracing::info!(stem, "nothing to export");
        return Ok(ExportReport {
            file: None,
            rows: 0,
            warnings: vec![TransferWarning::EmptyDataset],
        });
    }

    let mut sheet = header_sheet(columns, settings)?;
    let mut truncated = 0usize;

    for (index, record) in records.iter().enumerate() {
        let row = u32::try_from(index + 1).unwrap_or(u32::MAX);
        let value = serde_json::to_value(record)?;
        for (col, column) in columns.iter().enumerate() {
            let (cell, was_cut) = to_cell(column.key.get(&value), settings.max_cell_chars);
            if was_cut {
                truncated += 1;
                tracing::debug!(row = row + 1, header = %column.header, "cell text truncated");
            }
            if !cell.is_empty() {
                sheet.set_cell_value_at(row, col_index(col)?, cell)?;
            }
        }
    }

    let mut warnings = Vec::new();
    if truncated > 0 {
        tracing::warn!(cells = truncated, "text longer than a cell was truncated on export");
        warnings.push(TransferWarning::TruncatedOnExport { cells: truncated });
    }

    let file_name = format!("{}.xlsx", sanitize_stem(stem));
    let file = deliver(sheet, &file_name, sink)?;
    tracing::info!(file = %file.file_name, rows = records.len(), "export written");

    Ok(ExportReport {
        file: Some(file),
        rows: records.len(),
        warnings,
    })
}

/// `<stem>_<YYYY-MM-DD>`, for exports named after the day they were made
pub fn dated_stem(stem: &str, date: NaiveDate) -> String {
    format!("{}_{}", stem, date.format("%Y-%m-%d"))
}

/// A worksheet holding only the bold header row, with every column sized
pub(crate) fn header_sheet(columns: &[ExportColumn], settings: &TransferSettings) -> Result<Worksheet> {
    let mut sheet = Worksheet::new(settings.sheet_name.as_str());
    sheet.write_row(0, columns.iter().map(|c| c.header.as_str()))?;
    sheet.set_header_row(true);
    for col in 0..columns.len() {
        sheet.set_column_width(col_index(col)?, settings.column_width);
    }
    Ok(sheet)
}

/// Wrap the sheet in a workbook, encode it and hand it to the sink
pub(crate) fn deliver(sheet: Worksheet, file_name: &str, sink: &mut dyn FileSink) -> Result<DeliveredFile> {
    let mut workbook = Workbook::empty();
    workbook.add_existing_worksheet(sheet)?;
    let bytes = XlsxWriter::write_to_vec(&workbook)?;
    Ok(sink.deliver(file_name, &bytes)?)
}

fn col_index(col: usize) -> Result<u16> {
    u16::try_from(col).map_err(|_| {
        lpk_sheets_core::Error::ColumnOutOfBounds {
            col,
            limit: lpk_sheets_core::MAX_COLS,
        }
        .into()
    })
}

/// Map a JSON value to a cell. The flag tells whether text was cut.
fn to_cell(value: Option<&Value>, limit: usize) -> (CellValue, bool) {
    let text = match value {
        None | Some(Value::Null) => return (CellValue::Empty, false),
        Some(Value::Bool(b)) => return (CellValue::Boolean(*b), false),
        Some(Value::Number(n)) => {
            return match n.as_f64() {
                Some(f) => (CellValue::Number(f), false),
                None => text_cell(n.to_string(), limit),
            }
        }
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    text_cell(text, limit)
}

fn text_cell(text: String, limit: usize) -> (CellValue, bool) {
    match truncate_cell_text(&text, limit) {
        Some(cut) => (CellValue::string(cut), true),
        None => (CellValue::string(text), false),
    }
}
