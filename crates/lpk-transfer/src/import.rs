//! Spreadsheet import: upload checks and parsing into untyped records.
//!
//! Parsing never touches storage. It turns the first worksheet into a list
//! of [`ImportRecord`]s and reports what the operator should know before the
//! records are committed with [`import_records`](crate::reconcile::import_records).

use std::fmt;
use std::io::Cursor;
use std::path::Path;

use lpk_sheets_core::{CellValue, Workbook, Worksheet};
use lpk_sheets_xlsx::XlsxReader;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::columns::ExportColumn;
use crate::error::{Result, TransferError};
use crate::marker::has_truncation_marker;
use crate::path::FieldPath;
use crate::report::{TransferWarning, TruncatedCell};
use crate::settings::TransferSettings;

/// A file handed in by the operator
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a file from disk, refusing it by extension or size before loading it
    pub fn from_path<P: AsRef<Path>>(path: P, settings: &TransferSettings) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if SpreadsheetFormat::from_file_name(&name).is_none() {
            return Err(TransferError::UnsupportedFormat(name));
        }
        let size = std::fs::metadata(path)?.len();
        check_upload(&name, size, settings)?;
        Ok(Self::new(name, std::fs::read(path)?))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Accepted spreadsheet formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpreadsheetFormat {
    Xlsx,
    Xls,
}

impl SpreadsheetFormat {
    /// Detect the format from a file name's extension, case-insensitively
    pub fn from_file_name(name: &str) -> Option<Self> {
        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        match extension.as_deref() {
            Some("xlsx") => Some(SpreadsheetFormat::Xlsx),
            Some("xls") => Some(SpreadsheetFormat::Xls),
            _ => None,
        }
    }

    /// Decode a workbook of this format
    pub fn read(self, bytes: &[u8]) -> Result<Workbook> {
        match self {
            SpreadsheetFormat::Xlsx => Ok(XlsxReader::read(Cursor::new(bytes))?),
            #[cfg(feature = "xls")]
            SpreadsheetFormat::Xls => Ok(lpk_sheets_xls::XlsReader::read(Cursor::new(bytes))?),
            #[cfg(not(feature = "xls"))]
            SpreadsheetFormat::Xls => Err(TransferError::UnsupportedFormat(
                "xls (built without legacy format support)".into(),
            )),
        }
    }
}

impl fmt::Display for SpreadsheetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpreadsheetFormat::Xlsx => f.write_str("xlsx"),
            SpreadsheetFormat::Xls => f.write_str("xls"),
        }
    }
}

/// Check an upload's extension, then its size.
///
/// Both checks run before any byte is parsed.
pub fn check_upload(name: &str, size: u64, settings: &TransferSettings) -> Result<SpreadsheetFormat> {
    let format = SpreadsheetFormat::from_file_name(name)
        .ok_or_else(|| TransferError::UnsupportedFormat(name.to_string()))?;
    if size > settings.max_upload_bytes {
        return Err(TransferError::FileTooLarge {
            size,
            limit: settings.max_upload_bytes,
        });
    }
    Ok(format)
}

/// One data row of an uploaded sheet, keyed by column path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportRecord {
    /// 1-based spreadsheet row (the header is row 1)
    pub row: u32,
    /// Raw values, nested along the column paths
    pub values: Map<String, Value>,
    /// Whether date serials in this row use the 1904 date system
    #[serde(skip)]
    pub date_1904: bool,
}

impl ImportRecord {
    pub fn new(row: u32, values: Map<String, Value>) -> Self {
        Self {
            row,
            values,
            date_1904: false,
        }
    }

    /// Raw value at a column path
    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        path.get_in(&self.values)
    }
}

/// Result of parsing an upload
#[derive(Debug, Clone)]
pub struct ParsedImport {
    pub file_name: String,
    pub format: SpreadsheetFormat,
    /// Every non-empty data row, in sheet order
    pub records: Vec<ImportRecord>,
    pub warnings: Vec<TransferWarning>,
    /// Header cells that matched no column
    pub unmatched_headers: Vec<String>,
}

impl ParsedImport {
    /// The first `n` records
    pub fn preview(&self, n: usize) -> &[ImportRecord] {
        &self.records[..n.min(self.records.len())]
    }

    /// Whether some value was cut on an earlier export
    pub fn has_truncation(&self) -> bool {
        self.warnings.iter().any(TransferWarning::is_data_loss)
    }
}

/// Parse the first worksheet of an upload into records.
///
/// Fails on an unsupported extension or an oversized file. A sheet without
/// data rows is not an error; it comes back empty with an
/// [`EmptyOrInvalidFile`](TransferWarning::EmptyOrInvalidFile) warning.
pub fn parse_import(
    file: &UploadedFile,
    columns: &[ExportColumn],
    settings: &TransferSettings,
) -> Result<ParsedImport> {
    let format = check_upload(&file.name, file.size(), settings)?;
    let workbook = format.read(&file.bytes)?;
    let date_1904 = workbook.settings().date_1904;

    let mut parsed = ParsedImport {
        file_name: file.name.clone(),
        format,
        records: Vec::new(),
        warnings: Vec::new(),
        unmatched_headers: Vec::new(),
    };

    if let Some(sheet) = workbook.worksheet(0) {
        let mapping = match_headers(sheet, columns, &mut parsed.unmatched_headers);
        let mut truncated = Vec::new();
        parsed.records = read_rows(sheet, &mapping, date_1904, &mut truncated);
        if !truncated.is_empty() {
            tracing::warn!(file = %file.name, cells = truncated.len(), "truncation marker found in upload");
            parsed.warnings.push(TransferWarning::TruncationDetected { cells: truncated });
        }
    }

    if parsed.records.is_empty() {
        tracing::info!(file = %file.name, "upload holds no data rows");
        parsed.warnings.push(TransferWarning::EmptyOrInvalidFile);
    } else {
        tracing::info!(file = %file.name, %format, records = parsed.records.len(), "upload parsed");
    }
    if !parsed.unmatched_headers.is_empty() {
        tracing::debug!(headers = ?parsed.unmatched_headers, "ignored unknown headers");
    }
    Ok(parsed)
}

/// Sheet column index → matched column
type HeaderMap<'c> = Vec<(u16, &'c ExportColumn)>;

fn match_headers<'c>(
    sheet: &Worksheet,
    columns: &'c [ExportColumn],
    unmatched: &mut Vec<String>,
) -> HeaderMap<'c> {
    let mut mapping: HeaderMap<'c> = Vec::new();
    for (col, cell) in sheet.row_values(0).iter().enumerate() {
        let Ok(col) = u16::try_from(col) else { break };
        let header = cell.to_string();
        if header.trim().is_empty() {
            continue;
        }
        let taken = |c: &ExportColumn| mapping.iter().any(|(_, m)| m.key == c.key);
        match columns.iter().find(|c| c.matches_header(&header) && !taken(c)) {
            Some(column) => mapping.push((col, column)),
            None => unmatched.push(header.trim().to_string()),
        }
    }
    mapping
}

fn read_rows(
    sheet: &Worksheet,
    mapping: &HeaderMap<'_>,
    date_1904: bool,
    truncated: &mut Vec<TruncatedCell>,
) -> Vec<ImportRecord> {
    let Some(last_row) = sheet.last_row() else {
        return Vec::new();
    };

    let mut records = Vec::new();
    for row in 1..=last_row {
        let mut values = Map::new();
        for (col, column) in mapping {
            let Some(value) = cell_to_json(sheet.value_ref_at(row, *col)) else {
                continue;
            };
            if value.as_str().is_some_and(has_truncation_marker) {
                truncated.push(TruncatedCell {
                    row: row + 1,
                    header: column.header.clone(),
                });
            }
            column.key.set(&mut values, value);
        }
        if values.is_empty() {
            continue;
        }
        records.push(ImportRecord {
            row: row + 1,
            values,
            date_1904,
        });
    }
    records
}

/// Raw JSON for a cell. Empty and error cells carry no value.
fn cell_to_json(cell: Option<&CellValue>) -> Option<Value> {
    match cell? {
        CellValue::Empty | CellValue::Error(_) => None,
        CellValue::Boolean(b) => Some(Value::Bool(*b)),
        CellValue::Number(f) => serde_json::Number::from_f64(*f).map(Value::Number),
        CellValue::String(s) if s.as_str().trim().is_empty() => None,
        CellValue::String(s) => Some(Value::String(s.as_str().to_string())),
    }
}
