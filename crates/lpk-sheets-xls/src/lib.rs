//! # lpk-sheets-xls
//!
//! XLS (BIFF8) reader for the LPK spreadsheet toolkit.
//!
//! This crate handles the legacy Excel binary format (.xls) for imports.
//! Cell values, sheet names, column widths and the date system are read;
//! formatting records are skipped. There is no writer: exports are always XLSX.

pub mod biff;
pub mod error;
pub mod reader;

pub use error::{XlsError, XlsResult};
pub use reader::XlsReader;
