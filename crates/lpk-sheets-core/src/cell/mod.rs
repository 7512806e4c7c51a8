//! What a cell holds, where it sits, and the sparse grid behind [`crate::Worksheet`]

mod address;
mod storage;
mod value;

pub use address::{column_index, column_name, CellAddress, CellRange};
pub use storage::CellStorage;
pub use value::{CellError, CellValue, SharedString};
