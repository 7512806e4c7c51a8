//! Ordered collection of worksheets

use crate::error::{Error, Result};
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

/// Characters spreadsheet applications refuse in tab names
const FORBIDDEN_NAME_CHARS: &[char] = &['\\', '/', '?', '*', '[', ']', ':'];

/// Workbook-level flags read from or written to the file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkbookSettings {
    /// Serial dates count from 1904-01-01 instead of 1900-01-01
    pub date_1904: bool,
}

/// A spreadsheet document: worksheets in tab order plus [`WorkbookSettings`]
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    worksheets: Vec<Worksheet>,
    settings: WorkbookSettings,
}

impl Workbook {
    /// A workbook with a single blank `Sheet1`, as a spreadsheet application starts
    pub fn new() -> Self {
        let mut workbook = Self::empty();
        workbook.worksheets.push(Worksheet::new("Sheet1"));
        workbook
    }

    /// A workbook with no sheets; readers and exporters start here
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.worksheets.is_empty()
    }

    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.worksheets.get_mut(index)
    }

    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.position(name).map(|i| &self.worksheets[i])
    }

    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    /// Append a blank sheet named after the first free `SheetN`
    pub fn add_worksheet(&mut self) -> Result<usize> {
        let name = (self.worksheets.len() + 1..)
            .map(|n| format!("Sheet{n}"))
            .find(|candidate| self.position(candidate).is_none())
            .unwrap_or_default();
        self.add_worksheet_with_name(&name)
    }

    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<usize> {
        self.add_existing_worksheet(Worksheet::new(name))
    }

    /// Append a filled sheet, checking its name against the rules and the other tabs
    pub fn add_existing_worksheet(&mut self, worksheet: Worksheet) -> Result<usize> {
        self.check_name(worksheet.name())?;
        self.worksheets.push(worksheet);
        Ok(self.worksheets.len() - 1)
    }

    /// Look up a sheet by index, failing with the sheet count when it is missing
    pub fn sheet_at(&self, index: usize) -> Result<&Worksheet> {
        self.worksheets.get(index).ok_or(Error::SheetOutOfBounds {
            index,
            count: self.worksheets.len(),
        })
    }

    pub fn settings(&self) -> &WorkbookSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut WorkbookSettings {
        &mut self.settings
    }

    /// Tab names match case-insensitively, as in spreadsheet applications
    fn position(&self, name: &str) -> Option<usize> {
        self.worksheets
            .iter()
            .position(|ws| ws.name().to_lowercase() == name.to_lowercase())
    }

    fn check_name(&self, name: &str) -> Result<()> {
        let reject = |reason: String| {
            Err(Error::InvalidSheetName {
                name: name.to_string(),
                reason,
            })
        };
        if name.trim().is_empty() {
            return reject("name is blank".into());
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return reject(format!("longer than {MAX_SHEET_NAME_LEN} characters"));
        }
        if let Some(c) = name.chars().find(|c| FORBIDDEN_NAME_CHARS.contains(c)) {
            return reject(format!("'{c}' is not allowed"));
        }
        if name.starts_with('\'') || name.ends_with('\'') {
            return reject("may not start or end with an apostrophe".into());
        }
        if self.position(name).is_some() {
            return Err(Error::DuplicateSheetName(name.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_workbook_starts_with_sheet1() {
        let wb = Workbook::new();
        assert_eq!(wb.sheet_count(), 1);
        assert_eq!(wb.sheet_at(0).unwrap().name(), "Sheet1");
        assert!(matches!(
            wb.sheet_at(2),
            Err(Error::SheetOutOfBounds { index: 2, count: 1 })
        ));
    }

    #[test]
    fn test_generated_names_skip_taken() {
        let mut wb = Workbook::new();
        wb.add_worksheet_with_name("sheet2").unwrap();
        let idx = wb.add_worksheet().unwrap();
        assert_eq!(wb.worksheet(idx).unwrap().name(), "Sheet3");
        assert!(wb.worksheet_by_name("SHEET2").is_some());
    }

    #[test]
    fn test_tab_names_are_checked() {
        let mut wb = Workbook::empty();
        for bad in ["", "  ", "Data/2024", "'Siswa'", "Data Siswa Angkatan 2024 Gelombang Dua"] {
            assert!(
                matches!(wb.add_worksheet_with_name(bad), Err(Error::InvalidSheetName { .. })),
                "{bad:?} should be rejected"
            );
        }
        wb.add_worksheet_with_name("Data").unwrap();
        assert!(matches!(
            wb.add_worksheet_with_name("DATA"),
            Err(Error::DuplicateSheetName(_))
        ));
        assert!(wb.settings() == &WorkbookSettings::default());
    }
}
