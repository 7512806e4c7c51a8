//! In-memory spreadsheet model shared by the LPK readers and writers.
//!
//! A [`Workbook`] owns named [`Worksheet`]s, each a sparse grid of
//! [`CellValue`]s. The `lpk-sheets-xlsx` and `lpk-sheets-xls` crates fill
//! and serialize this model; `lpk-transfer` maps it to and from records.
//!
//! ```rust
//! use lpk_sheets_core::{CellValue, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//! sheet.write_row(0, ["NIK", "Nama"]).unwrap();
//! sheet.set_cell_value("A2", CellValue::string("3201010101010001")).unwrap();
//! sheet.set_cell_value_at(1, 1, "Budi Santoso").unwrap();
//!
//! assert_eq!(sheet.last_row(), Some(1));
//! ```

pub mod cell;
pub mod date;
pub mod error;
pub mod workbook;
pub mod worksheet;

pub use cell::{column_index, column_name, CellAddress, CellError, CellRange, CellValue, SharedString};
pub use error::{Error, Result};
pub use workbook::{Workbook, WorkbookSettings};
pub use worksheet::Worksheet;

/// Rows per sheet in the xlsx grid
pub const MAX_ROWS: u32 = 1 << 20;

/// Columns per sheet, `A` through `XFD`
pub const MAX_COLS: u16 = 1 << 14;

/// Longest sheet tab name spreadsheet applications accept
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Characters one cell can hold
pub const MAX_CELL_CHARS: usize = 32_767;
