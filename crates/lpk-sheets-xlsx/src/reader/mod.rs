//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::escape::decode_excel_escapes;
use lpk_sheets_core::{CellAddress, CellError, CellValue, Workbook, Worksheet};

/// XLSX file reader
pub struct XlsxReader;

/// Cell being assembled while its children are streamed
#[derive(Default)]
struct PendingCell {
    address: Option<CellAddress>,
    cell_type: Option<String>,
    text: String,
    has_value: bool,
}

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let file = File::open(path)?;
        Self::read(file)
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let (sheet_info, date_1904) = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut workbook = Workbook::empty();
        workbook.settings_mut().date_1904 = date_1904;

        for (name, r_id) in &sheet_info {
            let Some(path) = sheet_paths.get(r_id) else {
                log::warn!("sheet '{}' has no worksheet relationship ({}), skipped", name, r_id);
                continue;
            };
            let mut worksheet = Worksheet::new(name.as_str());
            Self::read_worksheet(&mut archive, path, &mut worksheet, &shared_strings)?;
            workbook.add_existing_worksheet(worksheet)?;
        }

        // Ensure at least one sheet exists
        if workbook.is_empty() {
            workbook.add_worksheet()?;
        }

        Ok(workbook)
    }

    /// Read the shared strings table. Rich-text runs are concatenated.
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut current = String::new();
        let mut in_si = false;
        let mut in_t = false;
        // Phonetic guides (<rPh>) repeat the text in kana; they are not cell content
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Event::Empty(e) if e.name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Event::End(e) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current));
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Event::Text(e) if in_t => {
                    current.push_str(&e.unescape()?);
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Read workbook.xml: sheet names with their rIds, and the date system
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<(Vec<(String, String)>, bool)> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();
        let mut date_1904 = false;

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) => match e.name().as_ref() {
                    b"sheet" => {
                        let name = attr_value(&e, b"name");
                        let r_id = attr_value(&e, b"r:id");
                        if let (Some(name), Some(r_id)) = (name, r_id) {
                            sheets.push((name, r_id));
                        }
                    }
                    b"workbookPr" => {
                        date_1904 = matches!(
                            attr_value(&e, b"date1904").as_deref(),
                            Some("1") | Some("true")
                        );
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok((sheets, date_1904))
    }

    /// Read workbook.xml.rels to get worksheet part paths keyed by rId
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) if e.name().as_ref() == b"Relationship" => {
                    let id = attr_value(&e, b"Id");
                    let target = attr_value(&e, b"Target");
                    let rel_type = attr_value(&e, b"Type");

                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Target is relative to the xl/ folder unless absolute
                            let full_path = match target.strip_prefix('/') {
                                Some(abs) => abs.to_string(),
                                None => format!("xl/{}", target),
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read the cells of one worksheet part
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        worksheet: &mut Worksheet,
        shared_strings: &[String],
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut cell: Option<PendingCell> = None;
        let mut in_value = false;
        let mut in_inline_text = false;

        // Some producers omit the r attribute; positions then follow document order
        let mut current_row: u32 = 0;
        let mut next_col: u16 = 0;

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"row" => {
                        Self::enter_row(&e, &mut current_row, &mut next_col)?;
                    }
                    b"c" => {
                        cell = Some(Self::start_cell(&e, current_row, &mut next_col)?);
                    }
                    b"v" if cell.is_some() => in_value = true,
                    b"t" if cell.is_some() => in_inline_text = true,
                    b"col" => {
                        Self::read_col_width(&e, worksheet);
                    }
                    _ => {}
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"row" => {
                        Self::enter_row(&e, &mut current_row, &mut next_col)?;
                        current_row += 1;
                    }
                    b"c" => {
                        // Style-only cell, no content
                        Self::start_cell(&e, current_row, &mut next_col)?;
                    }
                    b"col" => {
                        Self::read_col_width(&e, worksheet);
                    }
                    _ => {}
                },
                Event::Text(e) if in_value || in_inline_text => {
                    if let Some(pending) = cell.as_mut() {
                        pending.text.push_str(&e.unescape()?);
                        pending.has_value = true;
                    }
                }
                Event::End(e) => match e.name().as_ref() {
                    b"v" => in_value = false,
                    b"t" => in_inline_text = false,
                    b"c" => {
                        if let Some(pending) = cell.take() {
                            Self::process_cell(worksheet, pending, shared_strings)?;
                        }
                    }
                    b"row" => current_row += 1,
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    fn enter_row(e: &BytesStart, current_row: &mut u32, next_col: &mut u16) -> XlsxResult<()> {
        if let Some(r) = attr_value(e, b"r") {
            let n: u32 = r
                .parse()
                .map_err(|_| XlsxError::Parse(format!("Invalid row number '{}'", r)))?;
            if n == 0 {
                return Err(XlsxError::Parse("Row number 0 is not valid".into()));
            }
            *current_row = n - 1;
        }
        *next_col = 0;
        Ok(())
    }

    fn start_cell(e: &BytesStart, current_row: u32, next_col: &mut u16) -> XlsxResult<PendingCell> {
        let address = match attr_value(e, b"r") {
            Some(r) => CellAddress::parse(&r).map_err(|err| XlsxError::Parse(err.to_string()))?,
            None => CellAddress::new(current_row, *next_col),
        };
        *next_col = address.col.saturating_add(1);

        Ok(PendingCell {
            address: Some(address),
            cell_type: attr_value(e, b"t"),
            ..PendingCell::default()
        })
    }

    fn read_col_width(e: &BytesStart, worksheet: &mut Worksheet) {
        let min = attr_value(e, b"min").and_then(|v| v.parse::<u16>().ok());
        let max = attr_value(e, b"max").and_then(|v| v.parse::<u16>().ok());
        let width = attr_value(e, b"width").and_then(|v| v.parse::<f64>().ok());
        if let (Some(min), Some(max), Some(width)) = (min, max, width) {
            // <col> indices are 1-based; cap huge spans ("min=1 max=16384")
            for col in min.max(1)..=max.min(min.saturating_add(255)) {
                worksheet.set_column_width(col - 1, width);
            }
        }
    }

    /// Convert a finished cell into a value and store it
    fn process_cell(
        worksheet: &mut Worksheet,
        cell: PendingCell,
        shared_strings: &[String],
    ) -> XlsxResult<()> {
        let Some(addr) = cell.address else {
            return Ok(());
        };
        if !cell.has_value {
            return Ok(());
        }
        let raw = cell.text.as_str();

        let value = match cell.cell_type.as_deref() {
            // Shared string
            Some("s") => {
                let idx: usize = raw.trim().parse().map_err(|_| {
                    XlsxError::Parse(format!("Invalid shared string index: {}", raw))
                })?;
                let s = shared_strings.get(idx).ok_or_else(|| {
                    XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                })?;
                CellValue::string(s.as_str())
            }

            // Boolean
            Some("b") => CellValue::Boolean(raw == "1" || raw.eq_ignore_ascii_case("true")),

            // Error
            Some("e") => CellError::parse(raw)
                .map(CellValue::Error)
                .unwrap_or_else(|| CellValue::string(raw)),

            // Inline string or formula string result
            Some("inlineStr") | Some("str") => CellValue::string(decode_excel_escapes(raw)),

            // Number (default type or explicit "n"); ISO dates ("d") are kept as text
            None | Some("n") => match raw.trim().parse::<f64>() {
                Ok(n) => CellValue::Number(n),
                Err(_) => CellValue::string(raw),
            },

            // Unknown type - treat as string
            Some(_) => CellValue::string(raw),
        };

        worksheet.set_cell_value_at(addr.row, addr.col, value)?;
        Ok(())
    }
}

/// Unescaped value of an attribute, if present
fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn build_xlsx(sheet_xml: &str, shared_strings: Option<&str>) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = zip::write::SimpleFileOptions::default();

            zip.start_file("[Content_Types].xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#).unwrap();

            zip.start_file("xl/workbook.xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Siswa" sheetId="1" r:id="rId1"/></sheets></workbook>"#).unwrap();

            zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#).unwrap();

            if let Some(sst) = shared_strings {
                zip.start_file("xl/sharedStrings.xml", options).unwrap();
                zip.write_all(sst.as_bytes()).unwrap();
            }

            zip.start_file("xl/worksheets/sheet1.xml", options).unwrap();
            zip.write_all(sheet_xml.as_bytes()).unwrap();

            zip.finish().unwrap();
        }
        buf
    }

    #[test]
    fn test_read_empty_sheet() {
        let bytes = build_xlsx(
            r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData/></worksheet>"#,
            None,
        );
        let workbook = XlsxReader::read(Cursor::new(bytes)).unwrap();
        assert_eq!(workbook.sheet_count(), 1);
        assert_eq!(workbook.worksheet(0).unwrap().name(), "Siswa");
        assert!(workbook.worksheet(0).unwrap().is_empty());
    }

    #[test]
    fn test_read_cell_types() {
        let sst = r#"<?xml version="1.0"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="2" uniqueCount="2"><si><t>NIK</t></si><si><r><t>Budi </t></r><r><t>Santoso</t></r><rPh><t>ブディ</t></rPh></si></sst>"#;
        let sheet = r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
            <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="inlineStr"><is><t>Aktif</t></is></c></row>
            <row r="2"><c r="A2" t="s"><v>1</v></c><c r="B2" t="b"><v>1</v></c><c r="C2"><v>45292</v></c><c r="D2" t="e"><v>#N/A</v></c><c r="E2" s="3"/></row>
        </sheetData></worksheet>"#;
        let workbook = XlsxReader::read(Cursor::new(build_xlsx(sheet, Some(sst)))).unwrap();
        let ws = workbook.worksheet(0).unwrap();

        assert_eq!(ws.get_value("A1").unwrap().as_string(), Some("NIK"));
        assert_eq!(ws.get_value("B1").unwrap().as_string(), Some("Aktif"));
        assert_eq!(ws.get_value("A2").unwrap().as_string(), Some("Budi Santoso"));
        assert_eq!(ws.get_value("B2").unwrap(), CellValue::Boolean(true));
        assert_eq!(ws.get_value("C2").unwrap().as_number(), Some(45292.0));
        assert_eq!(ws.get_value("D2").unwrap(), CellValue::Error(CellError::Na));
        assert!(ws.get_value("E2").unwrap().is_empty());
    }

    #[test]
    fn test_cells_without_reference_follow_document_order() {
        let sheet = r#"<worksheet><sheetData><row r="3"><c t="inlineStr"><is><t>a</t></is></c><c><v>2</v></c></row></sheetData></worksheet>"#;
        let workbook = XlsxReader::read(Cursor::new(build_xlsx(sheet, None))).unwrap();
        let ws = workbook.worksheet(0).unwrap();
        assert_eq!(ws.get_value("A3").unwrap().as_string(), Some("a"));
        assert_eq!(ws.get_value("B3").unwrap().as_number(), Some(2.0));
    }

    #[test]
    fn test_rejects_non_xlsx_zip() {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            zip.start_file("hello.txt", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"hi").unwrap();
            zip.finish().unwrap();
        }
        assert!(matches!(
            XlsxReader::read(Cursor::new(buf)),
            Err(XlsxError::InvalidFormat(_))
        ));
    }
}
