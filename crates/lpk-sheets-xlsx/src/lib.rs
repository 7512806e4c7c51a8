//! # lpk-sheets-xlsx
//!
//! XLSX (Office Open XML) reader and writer for the LPK spreadsheet toolkit.
//!
//! Only cell data, sheet names, column widths and a bold header row are
//! handled; that is everything the import/export pipeline exchanges.

pub mod error;
pub mod reader;
pub mod writer;

mod escape;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;
