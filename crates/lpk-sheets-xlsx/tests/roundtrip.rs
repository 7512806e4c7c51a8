//! End-to-end tests for XLSX roundtrip (create -> save -> read -> verify)

use lpk_sheets_core::{CellError, CellValue, Workbook};
use lpk_sheets_xlsx::{XlsxReader, XlsxWriter};
use pretty_assertions::assert_eq;
use std::io::Cursor;

fn roundtrip(wb: &Workbook) -> Workbook {
    let mut buf = Vec::new();
    XlsxWriter::write(wb, Cursor::new(&mut buf)).unwrap();
    XlsxReader::read(Cursor::new(&buf)).unwrap()
}

#[test]
fn test_roundtrip_numbers_and_booleans() {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A1", 42.0).unwrap();
    sheet.set_cell_value("B1", -100.5).unwrap();
    sheet.set_cell_value("C1", 1e10).unwrap();
    sheet.set_cell_value("A2", true).unwrap();
    sheet.set_cell_value("B2", false).unwrap();
    sheet.set_cell_value("C2", CellError::Div0).unwrap();

    let wb2 = roundtrip(&wb);
    let sheet2 = wb2.worksheet(0).unwrap();
    assert_eq!(sheet2.get_value("A1").unwrap().as_number(), Some(42.0));
    assert_eq!(sheet2.get_value("B1").unwrap().as_number(), Some(-100.5));
    assert_eq!(sheet2.get_value("C1").unwrap().as_number(), Some(1e10));
    assert_eq!(sheet2.get_value("A2").unwrap(), CellValue::Boolean(true));
    assert_eq!(sheet2.get_value("B2").unwrap(), CellValue::Boolean(false));
    assert_eq!(sheet2.get_value("C2").unwrap(), CellValue::Error(CellError::Div0));
}

#[test]
fn test_roundtrip_strings() {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A1", "Budi Santoso").unwrap();
    sheet.set_cell_value("B1", "PT \"Maju\" <Jaya> & Co").unwrap();
    sheet.set_cell_value("A2", "Jl. Merdeka\nNo. 5").unwrap();
    sheet.set_cell_value("B2", "  spasi di depan").unwrap();
    sheet.set_cell_value("C2", "東京都 _x0041_").unwrap();

    let wb2 = roundtrip(&wb);
    let sheet = wb.worksheet(0).unwrap();
    let sheet2 = wb2.worksheet(0).unwrap();
    for addr in ["A1", "B1", "A2", "B2", "C2"] {
        assert_eq!(
            sheet2.get_value(addr).unwrap(),
            sheet.get_value(addr).unwrap(),
            "cell {}",
            addr
        );
    }
}

#[test]
fn test_roundtrip_long_text_is_kept_whole() {
    let text = "a".repeat(lpk_sheets_core::MAX_CELL_CHARS);
    let mut wb = Workbook::new();
    wb.worksheet_mut(0)
        .unwrap()
        .set_cell_value("A1", text.as_str())
        .unwrap();

    let wb2 = roundtrip(&wb);
    let value = wb2.worksheet(0).unwrap().get_value("A1").unwrap();
    assert_eq!(value.as_string().map(|s| s.chars().count()), Some(text.len()));
}

#[test]
fn test_roundtrip_sheet_names_and_order() {
    let mut wb = Workbook::empty();
    wb.add_worksheet_with_name("Data").unwrap();
    wb.add_worksheet_with_name("R&D <2024>").unwrap();
    wb.worksheet_mut(1)
        .unwrap()
        .set_cell_value("B2", "x")
        .unwrap();

    let wb2 = roundtrip(&wb);
    let names: Vec<&str> = wb2.worksheets().map(|ws| ws.name()).collect();
    assert_eq!(names, vec!["Data", "R&D <2024>"]);
    assert_eq!(
        wb2.worksheet_by_name("R&D <2024>")
            .unwrap()
            .get_value("B2")
            .unwrap()
            .as_string(),
        Some("x")
    );
}

#[test]
fn test_roundtrip_widths_and_date_system() {
    let mut wb = Workbook::new();
    wb.settings_mut().date_1904 = true;
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.set_header_row(true);
    sheet.write_row(0, ["NIK", "Nama", "Tanggal Lahir"]).unwrap();
    for col in 0..3 {
        sheet.set_column_width(col, 20.0);
    }

    let wb2 = roundtrip(&wb);
    let sheet = wb.worksheet(0).unwrap();
    assert!(wb2.settings().date_1904);
    let sheet2 = wb2.worksheet(0).unwrap();
    assert_eq!(sheet2.column_width(2), 20.0);
    assert_eq!(sheet2.row_values(0), sheet.row_values(0));
}

#[test]
fn test_write_file_and_read_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("siswa.xlsx");

    let mut wb = Workbook::new();
    wb.worksheet_mut(0)
        .unwrap()
        .set_cell_value("A1", "NIK")
        .unwrap();
    XlsxWriter::write_file(&wb, &path).unwrap();

    let wb2 = XlsxReader::read_file(&path).unwrap();
    assert_eq!(
        wb2.worksheet(0).unwrap().get_value("A1").unwrap().as_string(),
        Some("NIK")
    );
}
