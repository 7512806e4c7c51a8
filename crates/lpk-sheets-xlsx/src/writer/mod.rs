//! Minimal SpreadsheetML package writer.
//!
//! Every sheet is written with inline strings, so the package needs no shared
//! string table. The style sheet is fixed: format 0 is plain and format 1 is
//! bold, used for the header row.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{Cursor, Seek, Write};
use std::path::Path;

use lpk_sheets_core::{column_name, CellValue, Workbook, Worksheet};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::{XlsxError, XlsxResult};
use crate::escape::{encode_excel_escapes, escape_xml};

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_PKG_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_DOC_RELS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CT_PREFIX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml";

const BOLD_XF: u8 = 1;

const STYLES: &str = concat!(
    r#"<fonts count="2">"#,
    r#"<font><sz val="11"/><name val="Calibri"/><family val="2"/></font>"#,
    r#"<font><b/><sz val="11"/><name val="Calibri"/><family val="2"/></font>"#,
    r#"</fonts>"#,
    r#"<fills count="2"><fill><patternFill patternType="none"/></fill>"#,
    r#"<fill><patternFill patternType="gray125"/></fill></fills>"#,
    r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
    r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
    r#"<cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>"#,
    r#"<xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/></cellXfs>"#,
    r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
);

/// Writes a [`Workbook`] as an `.xlsx` package
pub struct XlsxWriter;

impl XlsxWriter {
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> XlsxResult<()> {
        Self::write(workbook, File::create(path)?)
    }

    /// Serialize into memory, for delivery through a download or upload channel
    pub fn write_to_vec(workbook: &Workbook) -> XlsxResult<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        Self::write(workbook, &mut buf)?;
        Ok(buf.into_inner())
    }

    pub fn write<W: Write + Seek>(workbook: &Workbook, writer: W) -> XlsxResult<()> {
        if workbook.is_empty() {
            return Err(XlsxError::InvalidFormat("workbook has no sheets to write".into()));
        }
        let sheets: Vec<&Worksheet> = workbook.worksheets().collect();

        let mut package = Package::new(writer);
        package.part("[Content_Types].xml", &content_types(sheets.len()))?;
        package.part("_rels/.rels", &root_rels())?;
        package.part("xl/workbook.xml", &workbook_xml(workbook, &sheets))?;
        package.part("xl/_rels/workbook.xml.rels", &workbook_rels(sheets.len()))?;
        package.part(
            "xl/styles.xml",
            &format!(r#"{XML_DECL}<styleSheet xmlns="{NS_MAIN}">{STYLES}</styleSheet>"#),
        )?;
        for (n, sheet) in sheets.iter().enumerate() {
            package.part(&format!("xl/worksheets/sheet{}.xml", n + 1), &sheet_xml(sheet))?;
        }
        package.finish()?;

        log::debug!("wrote xlsx package with {} sheet(s)", sheets.len());
        Ok(())
    }
}

struct Package<W: Write + Seek> {
    zip: ZipWriter<W>,
}

impl<W: Write + Seek> Package<W> {
    fn new(writer: W) -> Self {
        Self {
            zip: ZipWriter::new(writer),
        }
    }

    fn part(&mut self, name: &str, xml: &str) -> XlsxResult<()> {
        self.zip.start_file(name, SimpleFileOptions::default())?;
        self.zip.write_all(xml.as_bytes())?;
        Ok(())
    }

    fn finish(self) -> XlsxResult<()> {
        self.zip.finish()?;
        Ok(())
    }
}

fn content_types(sheet_count: usize) -> String {
    let mut xml = format!(
        r#"{XML_DECL}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#
    );
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    let _ = write!(
        xml,
        r#"<Override PartName="/xl/workbook.xml" ContentType="{CT_PREFIX}.sheet.main+xml"/>"#
    );
    let _ = write!(
        xml,
        r#"<Override PartName="/xl/styles.xml" ContentType="{CT_PREFIX}.styles+xml"/>"#
    );
    for n in 1..=sheet_count {
        let _ = write!(
            xml,
            r#"<Override PartName="/xl/worksheets/sheet{n}.xml" ContentType="{CT_PREFIX}.worksheet+xml"/>"#
        );
    }
    xml.push_str("</Types>");
    xml
}

fn root_rels() -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="{NS_PKG_RELS}"><Relationship Id="rId1" Type="{NS_DOC_RELS}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
    )
}

fn workbook_xml(workbook: &Workbook, sheets: &[&Worksheet]) -> String {
    let mut xml = format!(r#"{XML_DECL}<workbook xmlns="{NS_MAIN}" xmlns:r="{NS_DOC_RELS}">"#);
    if workbook.settings().date_1904 {
        xml.push_str(r#"<workbookPr date1904="1"/>"#);
    }
    xml.push_str("<sheets>");
    for (i, sheet) in sheets.iter().enumerate() {
        let id = i + 1;
        let _ = write!(
            xml,
            r#"<sheet name="{}" sheetId="{id}" r:id="rId{id}"/>"#,
            escape_xml(sheet.name())
        );
    }
    xml.push_str("</sheets></workbook>");
    xml
}

/// Sheets take `rId1..=rIdN`, the style sheet comes last
fn workbook_rels(sheet_count: usize) -> String {
    let mut xml = format!(r#"{XML_DECL}<Relationships xmlns="{NS_PKG_RELS}">"#);
    for n in 1..=sheet_count {
        let _ = write!(
            xml,
            r#"<Relationship Id="rId{n}" Type="{NS_DOC_RELS}/worksheet" Target="worksheets/sheet{n}.xml"/>"#
        );
    }
    let _ = write!(
        xml,
        r#"<Relationship Id="rId{}" Type="{NS_DOC_RELS}/styles" Target="styles.xml"/></Relationships>"#,
        sheet_count + 1
    );
    xml
}

fn sheet_xml(sheet: &Worksheet) -> String {
    let mut xml = format!(r#"{XML_DECL}<worksheet xmlns="{NS_MAIN}">"#);
    if let Some(range) = sheet.used_range() {
        let _ = write!(xml, r#"<dimension ref="{range}"/>"#);
    }

    let widths = sheet.custom_column_widths();
    if !widths.is_empty() {
        xml.push_str("<cols>");
        for (col, width) in widths {
            let n = col + 1;
            let _ = write!(xml, r#"<col min="{n}" max="{n}" width="{width}" customWidth="1"/>"#);
        }
        xml.push_str("</cols>");
    }

    xml.push_str("<sheetData>");
    let mut open_row = None;
    for (row, col, value) in sheet.iter_cells() {
        if open_row != Some(row) {
            if open_row.is_some() {
                xml.push_str("</row>");
            }
            let _ = write!(xml, r#"<row r="{}">"#, row + 1);
            open_row = Some(row);
        }
        let bold = row == 0 && sheet.has_header_row();
        push_cell(&mut xml, &format!("{}{}", column_name(col), row + 1), bold, value);
    }
    if open_row.is_some() {
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn push_cell(xml: &mut String, reference: &str, bold: bool, value: &CellValue) {
    let (kind, body) = match value {
        CellValue::Empty => return,
        CellValue::Number(n) if n.is_finite() => (None, format!("<v>{n}</v>")),
        // NaN and infinities have no SpreadsheetML form
        CellValue::Number(_) => (Some("e"), "<v>#NUM!</v>".to_string()),
        CellValue::Boolean(b) => (Some("b"), format!("<v>{}</v>", u8::from(*b))),
        CellValue::Error(e) => (Some("e"), format!("<v>{}</v>", escape_xml(e.as_str()))),
        CellValue::String(s) => (
            Some("inlineStr"),
            format!(
                r#"<is><t xml:space="preserve">{}</t></is>"#,
                escape_xml(&encode_excel_escapes(s.as_str()))
            ),
        ),
    };

    let _ = write!(xml, r#"<c r="{reference}""#);
    if bold {
        let _ = write!(xml, r#" s="{BOLD_XF}""#);
    }
    if let Some(kind) = kind {
        let _ = write!(xml, r#" t="{kind}""#);
    }
    let _ = write!(xml, ">{body}</c>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut s = String::new();
        file.read_to_string(&mut s).unwrap();
        s
    }

    #[test]
    fn test_header_row_is_bold() {
        let mut wb = Workbook::empty();
        wb.add_worksheet_with_name("Data").unwrap();
        let ws = wb.worksheet_mut(0).unwrap();
        ws.set_header_row(true);
        ws.write_row(0, ["NIK", "Nama"]).unwrap();
        ws.write_row(1, ["3201", "Sari"]).unwrap();

        let bytes = XlsxWriter::write_to_vec(&wb).unwrap();
        let sheet = part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains(r#"<c r="A1" s="1" t="inlineStr">"#));
        assert!(sheet.contains(r#"<c r="A2" t="inlineStr">"#));
        assert!(sheet.contains(r#"<dimension ref="A1:B2"/>"#));
        assert!(part(&bytes, "xl/styles.xml").contains("<b/>"));
    }

    #[test]
    fn test_column_widths_written() {
        let mut wb = Workbook::new();
        let ws = wb.worksheet_mut(0).unwrap();
        ws.set_cell_value("A1", 1.0).unwrap();
        ws.set_column_width(0, 20.0);
        let sheet = part(&XlsxWriter::write_to_vec(&wb).unwrap(), "xl/worksheets/sheet1.xml");
        assert!(sheet.contains(r#"<col min="1" max="1" width="20" customWidth="1"/>"#));
        assert!(sheet.contains(r#"<c r="A1"><v>1</v></c>"#));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut wb = Workbook::new();
        wb.worksheet_mut(0)
            .unwrap()
            .set_cell_value("A1", "PT <Maju> & Co\u{1}")
            .unwrap();
        let sheet = part(&XlsxWriter::write_to_vec(&wb).unwrap(), "xl/worksheets/sheet1.xml");
        assert!(sheet.contains("PT &lt;Maju&gt; &amp; Co_x0001_"));
    }

    #[test]
    fn test_relationships_cover_every_sheet() {
        let mut wb = Workbook::new();
        wb.add_worksheet_with_name("Kumiai").unwrap();
        let bytes = XlsxWriter::write_to_vec(&wb).unwrap();
        let rels = part(&bytes, "xl/_rels/workbook.xml.rels");
        assert!(rels.contains(r#"Id="rId2""#) && rels.contains("worksheets/sheet2.xml"));
        assert!(rels.contains(r#"Id="rId3""#) && rels.contains("styles.xml"));
        assert!(part(&bytes, "[Content_Types].xml").contains("/xl/worksheets/sheet2.xml"));
    }

    #[test]
    fn test_empty_workbook_rejected() {
        assert!(XlsxWriter::write_to_vec(&Workbook::empty()).is_err());
    }
}
