//! Cell storage implementation
//!
//! Sparse storage for spreadsheet cells. Only non-empty cells are stored,
//! using a row-based BTreeMap structure so iteration is always row-major,
//! which is the order both file writers need.

use std::collections::BTreeMap;

use super::{CellAddress, CellRange, CellValue};

/// Sparse row-based storage for worksheet cells
///
/// Structure: `BTreeMap<row_index, BTreeMap<col_index, CellValue>>`
#[derive(Debug, Default, Clone)]
pub struct CellStorage {
    /// Row index → column map
    rows: BTreeMap<u32, BTreeMap<u16, CellValue>>,

    /// Custom column widths, in characters
    column_widths: BTreeMap<u16, f64>,
}

impl CellStorage {
    /// Create a new empty cell storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cell value
    pub fn get(&self, row: u32, col: u16) -> Option<&CellValue> {
        self.rows.get(&row).and_then(|r| r.get(&col))
    }

    /// Set a cell value. Storing [`CellValue::Empty`] removes the cell.
    pub fn set(&mut self, row: u32, col: u16, value: CellValue) {
        if value.is_empty() {
            self.remove(row, col);
            return;
        }
        self.rows.entry(row).or_default().insert(col, value);
    }

    /// Remove a cell, returning its previous value
    pub fn remove(&mut self, row: u32, col: u16) -> Option<CellValue> {
        let row_map = self.rows.get_mut(&row)?;
        let removed = row_map.remove(&col);
        if row_map.is_empty() {
            self.rows.remove(&row);
        }
        removed
    }

    /// Iterate over all stored cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (u32, u16, &CellValue)> {
        self.rows
            .iter()
            .flat_map(|(&row, cols)| cols.iter().map(move |(&col, v)| (row, col, v)))
    }

    /// Iterate over the stored cells of one row
    pub fn row(&self, row: u32) -> impl Iterator<Item = (u16, &CellValue)> {
        self.rows
            .get(&row)
            .into_iter()
            .flat_map(|cols| cols.iter().map(|(&col, v)| (col, v)))
    }

    /// Indices of rows holding at least one cell
    pub fn row_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.rows.keys().copied()
    }

    /// Smallest range covering every stored cell
    pub fn bounds(&self) -> Option<CellRange> {
        let first_row = *self.rows.keys().next()?;
        let last_row = *self.rows.keys().next_back()?;

        let mut min_col = u16::MAX;
        let mut max_col = 0u16;
        for cols in self.rows.values() {
            if let (Some(&lo), Some(&hi)) = (cols.keys().next(), cols.keys().next_back()) {
                min_col = min_col.min(lo);
                max_col = max_col.max(hi);
            }
        }

        Some(CellRange::new(
            CellAddress::new(first_row, min_col),
            CellAddress::new(last_row, max_col),
        ))
    }

    /// Number of stored cells
    pub fn len(&self) -> usize {
        self.rows.values().map(|r| r.len()).sum()
    }

    /// Check if no cells are stored
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Custom column width, if one was set
    pub fn column_width(&self, col: u16) -> Option<f64> {
        self.column_widths.get(&col).copied()
    }

    /// Set a custom column width
    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.column_widths.insert(col, width);
    }

    /// All custom column widths
    pub fn column_widths(&self) -> &BTreeMap<u16, f64> {
        &self.column_widths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_empty_removes_cell() {
        let mut storage = CellStorage::new();
        storage.set(2, 1, CellValue::from(5.0));
        assert_eq!(storage.len(), 1);
        storage.set(2, 1, CellValue::Empty);
        assert!(storage.is_empty());
        assert!(storage.bounds().is_none());
    }

    #[test]
    fn test_bounds_and_order() {
        let mut storage = CellStorage::new();
        storage.set(3, 4, CellValue::from("d"));
        storage.set(1, 2, CellValue::from("b"));
        storage.set(1, 0, CellValue::from("a"));

        let cells: Vec<_> = storage.iter().map(|(r, c, _)| (r, c)).collect();
        assert_eq!(cells, vec![(1, 0), (1, 2), (3, 4)]);
        assert_eq!(storage.bounds().unwrap().to_string(), "A2:E4");
    }
}
