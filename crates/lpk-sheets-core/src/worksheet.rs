//! Worksheet type

use crate::cell::{CellAddress, CellRange, CellStorage, CellValue};
use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};

/// A single worksheet (tab) in a workbook
#[derive(Debug, Clone)]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Cell storage
    cells: CellStorage,
    /// Whether the first row is a header row (rendered bold by writers)
    header_row: bool,
}

impl Worksheet {
    /// Create a new empty worksheet
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: CellStorage::new(),
            header_row: false,
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name (validation happens at the workbook level)
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    /// Whether row 0 is marked as a header row
    pub fn has_header_row(&self) -> bool {
        self.header_row
    }

    /// Mark or unmark row 0 as a header row
    pub fn set_header_row(&mut self, header_row: bool) {
        self.header_row = header_row;
    }

    // ==================== Cell values ====================

    /// Get a cell value by A1 address
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.get_value_at(addr.row, addr.col))
    }

    /// Get a cell value by 0-based indices
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.cells.get(row, col).cloned().unwrap_or_default()
    }

    /// Borrow a cell value by 0-based indices
    pub fn value_ref_at(&self, row: u32, col: u16) -> Option<&CellValue> {
        self.cells.get(row, col)
    }

    /// Set a cell value by A1 address
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value by 0-based indices
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        Self::check_bounds(row, col)?;
        self.cells.set(row, col, value.into());
        Ok(())
    }

    /// Clear a cell
    pub fn clear_cell_at(&mut self, row: u32, col: u16) {
        self.cells.remove(row, col);
    }

    /// Write a whole row starting at column A
    pub fn write_row<I, V>(&mut self, row: u32, values: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        for (col, value) in values.into_iter().enumerate() {
            let col = u16::try_from(col).map_err(|_| Error::ColumnOutOfBounds {
                col,
                limit: MAX_COLS,
            })?;
            self.set_cell_value_at(row, col, value)?;
        }
        Ok(())
    }

    /// Dense values of one row, from column A up to the last used column of the sheet
    pub fn row_values(&self, row: u32) -> Vec<CellValue> {
        let width = match self.used_range() {
            Some(range) => range.end.col as usize + 1,
            None => return Vec::new(),
        };
        let mut values = vec![CellValue::Empty; width];
        for (col, value) in self.cells.row(row) {
            values[col as usize] = value.clone();
        }
        values
    }

    /// Smallest range covering every non-empty cell
    pub fn used_range(&self) -> Option<CellRange> {
        self.cells.bounds()
    }

    /// Last row index holding data
    pub fn last_row(&self) -> Option<u32> {
        self.used_range().map(|r| r.end.row)
    }

    /// Iterate over all non-empty cells in row-major order
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u16, &CellValue)> {
        self.cells.iter()
    }

    /// Number of non-empty cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Check if the sheet holds no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    // ==================== Columns ====================

    /// Column width in characters (8.43 when not customised)
    pub fn column_width(&self, col: u16) -> f64 {
        self.cells.column_width(col).unwrap_or(8.43)
    }

    /// Set a column width in characters
    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.cells.set_column_width(col, width);
    }

    /// All custom column widths
    pub fn custom_column_widths(&self) -> &std::collections::BTreeMap<u16, f64> {
        self.cells.column_widths()
    }

    fn check_bounds(row: u32, col: u16) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds {
                row,
                limit: MAX_ROWS,
            });
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds {
                col: usize::from(col),
                limit: MAX_COLS,
            });
        }
        Ok(())
    }
}
