//! A1 references

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};

/// Zero-based position of a cell, shown as `B7` style text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    pub row: u32,
    pub col: u16,
}

impl CellAddress {
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse an `r` attribute or user-supplied reference.
    ///
    /// Letters are case-insensitive and `$` anchors are skipped.
    ///
    /// ```
    /// use lpk_sheets_core::CellAddress;
    ///
    /// assert_eq!(CellAddress::parse("C2").unwrap(), CellAddress::new(1, 2));
    /// assert_eq!(CellAddress::parse("$ab$12").unwrap(), CellAddress::new(11, 27));
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let bad = |reason| Error::InvalidAddress {
            reference: s.to_string(),
            reason,
        };
        let cleaned: String = s.trim().chars().filter(|&c| c != '$').collect();
        let split = cleaned
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(cleaned.len());
        let (letters, digits) = cleaned.split_at(split);

        if letters.is_empty() {
            return Err(bad("missing column letters"));
        }
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad("missing or malformed row number"));
        }

        let col = column_index(letters).ok_or_else(|| bad("column past XFD"))?;
        let row = match digits.parse::<u32>() {
            Ok(n @ 1..=MAX_ROWS) => n - 1,
            Ok(0) => return Err(bad("rows start at 1")),
            _ => return Err(bad("row past the last sheet row")),
        };
        Ok(Self { row, col })
    }

    pub fn to_a1_string(&self) -> String {
        format!("{}{}", column_name(self.col), self.row + 1)
    }
}

/// Bijective base-26 letters for a zero-based column: 0 is `A`, 26 is `AA`
pub fn column_name(col: u16) -> String {
    let mut letters = Vec::with_capacity(3);
    let mut rest = u32::from(col) + 1;
    while rest > 0 {
        let digit = (rest - 1) % 26;
        letters.push(b'A' + digit as u8);
        rest = (rest - 1) / 26;
    }
    letters.iter().rev().map(|&b| char::from(b)).collect()
}

/// Zero-based column for letters such as `xfd`; `None` past the last column
pub fn column_index(letters: &str) -> Option<u16> {
    if letters.is_empty() {
        return None;
    }
    let mut n: u32 = 0;
    for b in letters.bytes() {
        if !b.is_ascii_alphabetic() {
            return None;
        }
        n = n * 26 + u32::from(b.to_ascii_uppercase() - b'A') + 1;
        if n > u32::from(MAX_COLS) {
            return None;
        }
    }
    u16::try_from(n - 1).ok()
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_name(self.col), self.row + 1)
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Rectangle of cells, kept with `start` at the top-left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub start: CellAddress,
    pub end: CellAddress,
}

impl CellRange {
    pub fn new(a: CellAddress, b: CellAddress) -> Self {
        Self {
            start: CellAddress::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellAddress::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }
}

/// `A1:F20`, or just `A1` when the range is one cell
impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        for (col, letters) in [(0u16, "A"), (25, "Z"), (26, "AA"), (701, "ZZ"), (702, "AAA"), (16383, "XFD")] {
            assert_eq!(column_name(col), letters);
            assert_eq!(column_index(letters), Some(col));
        }
        assert_eq!(column_index("XFE"), None);
        assert_eq!(column_index("A1"), None);
    }

    #[test]
    fn test_parse_rejects_malformed_references() {
        for bad in ["", "12", "A0", "A", "XFE1", "A1B", "A-1", "A1048577"] {
            assert!(CellAddress::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_parse_and_display() {
        let addr: CellAddress = "c$7".parse().unwrap();
        assert_eq!(addr, CellAddress::new(6, 2));
        assert_eq!(addr.to_string(), "C7");
        assert_eq!(CellAddress::new(1_048_575, 16_383).to_a1_string(), "XFD1048576");
    }

    #[test]
    fn test_range_display() {
        let r = CellRange::new(CellAddress::new(4, 3), CellAddress::new(0, 0));
        assert_eq!(r.to_string(), "A1:D5");
        let single = CellRange::new(CellAddress::new(0, 0), CellAddress::new(0, 0));
        assert_eq!(single.to_string(), "A1");
    }
}
