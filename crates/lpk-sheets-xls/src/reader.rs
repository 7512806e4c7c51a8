//! XLS (BIFF8) reader.
//!
//! Opens the Compound File Binary (OLE2) container, reads the `Workbook`
//! stream, and fills a [`Workbook`] with the cell values of every worksheet.

use std::io::{Read, Seek};
use std::path::Path;

use lpk_sheets_core::{CellError, CellValue, Workbook, Worksheet};

use crate::biff::parser::{read_f64, read_rk, read_u16, read_u32};
use crate::biff::records;
use crate::biff::strings::{parse_sst, read_short_string, read_unicode_string};
use crate::biff::{self, BiffRecord};
use crate::error::{XlsError, XlsResult};

/// XLS file reader
pub struct XlsReader;

/// Sheet entry from a BOUNDSHEET record
#[derive(Debug)]
struct SheetInfo {
    /// 0 = worksheet, 2 = chart, 6 = VBA module
    sheet_type: u8,
    name: String,
}

/// Everything the globals substream contributes
#[derive(Debug, Default)]
struct Globals {
    sst: Vec<String>,
    sheets: Vec<SheetInfo>,
    date_1904: bool,
    /// Index of the globals EOF record
    end: usize,
}

impl XlsReader {
    /// Read an XLS file from a filesystem path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsResult<Workbook> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::read(file)
    }

    /// Read an XLS file from any `Read + Seek` source
    pub fn read<R: Read + Seek>(reader: R) -> XlsResult<Workbook> {
        let mut cfb = cfb::CompoundFile::open(reader)
            .map_err(|e| XlsError::InvalidFormat(format!("not an OLE2 compound file: {e}")))?;

        // BIFF5 files name the stream "Book"; the version check below rejects them
        let stream_path = if cfb.exists("/Workbook") {
            "/Workbook"
        } else if cfb.exists("/Book") {
            "/Book"
        } else {
            return Err(XlsError::InvalidFormat(
                "no Workbook or Book stream found in CFB".into(),
            ));
        };

        let mut stream_data = Vec::new();
        cfb.open_stream(stream_path)?.read_to_end(&mut stream_data)?;

        let all_records = biff::read_all_records(&mut stream_data.as_slice())?;
        let globals = Self::read_globals(&all_records)?;

        let mut workbook = Workbook::empty();
        workbook.settings_mut().date_1904 = globals.date_1904;

        // Substreams follow the globals in BOUNDSHEET order
        let groups = Self::split_sheet_records(&all_records[globals.end + 1..]);

        for (info, group) in globals.sheets.iter().zip(groups.iter()) {
            if info.sheet_type != records::SHEET_TYPE_WORKSHEET {
                log::debug!("skipping non-worksheet sheet '{}' (type {})", info.name, info.sheet_type);
                continue;
            }
            let mut ws = Worksheet::new(info.name.as_str());
            Self::parse_sheet_records(group, &mut ws, &globals.sst)?;
            workbook.add_existing_worksheet(ws)?;
        }

        if globals.sheets.len() > groups.len() {
            log::warn!(
                "{} sheet(s) declared but only {} substream(s) found",
                globals.sheets.len(),
                groups.len()
            );
        }

        if workbook.is_empty() {
            workbook.add_worksheet()?;
        }

        Ok(workbook)
    }

    fn read_globals(all_records: &[BiffRecord]) -> XlsResult<Globals> {
        let first = all_records
            .first()
            .filter(|rec| rec.record_type == records::BOF)
            .ok_or_else(|| XlsError::InvalidFormat("stream does not start with BOF".into()))?;

        let (version, dt) = biff::parse_bof(&first.data)?;
        if dt != records::BOF_WORKBOOK_GLOBALS {
            return Err(XlsError::InvalidFormat(
                "first substream is not the workbook globals".into(),
            ));
        }
        if version != records::BIFF8_VERSION {
            return Err(XlsError::UnsupportedVersion(format!(
                "expected BIFF8 (0x0600), got 0x{version:04X}"
            )));
        }

        let mut globals = Globals::default();
        for (idx, rec) in all_records.iter().enumerate().skip(1) {
            match rec.record_type {
                records::EOF => {
                    globals.end = idx;
                    return Ok(globals);
                }
                records::SST => {
                    globals.sst = parse_sst(&rec.data, &rec.continue_offsets)?;
                }
                records::BOUNDSHEET => {
                    globals.sheets.push(Self::parse_boundsheet(&rec.data)?);
                }
                records::DATEMODE if rec.data.len() >= 2 => {
                    globals.date_1904 = u16::from_le_bytes([rec.data[0], rec.data[1]]) == 1;
                }
                _ => {}
            }
        }

        Err(XlsError::InvalidFormat(
            "workbook globals are not terminated by EOF".into(),
        ))
    }

    /// BOUNDSHEET: stream offset(4) + visibility(1) + type(1) + short string name
    fn parse_boundsheet(data: &[u8]) -> XlsResult<SheetInfo> {
        let mut offset = 4;
        let _visibility = data.get(offset).copied().unwrap_or(0);
        offset += 1;
        let sheet_type = data.get(offset).copied().unwrap_or(0);
        offset += 1;
        let name = read_short_string(data, &mut offset)?;

        Ok(SheetInfo { sheet_type, name })
    }

    /// Split records into per-sheet groups (each top-level BOF..EOF pair is one sheet)
    fn split_sheet_records(records: &[BiffRecord]) -> Vec<Vec<&BiffRecord>> {
        let mut groups: Vec<Vec<&BiffRecord>> = Vec::new();
        let mut current: Vec<&BiffRecord> = Vec::new();
        let mut depth = 0usize;

        for rec in records {
            match rec.record_type {
                records::BOF => {
                    if depth == 0 {
                        current = Vec::new();
                    }
                    depth += 1;
                }
                records::EOF => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        groups.push(std::mem::take(&mut current));
                    }
                }
                _ if depth > 0 => current.push(rec),
                _ => {}
            }
        }

        groups
    }

    fn parse_sheet_records(
        records: &[&BiffRecord],
        ws: &mut Worksheet,
        sst: &[String],
    ) -> XlsResult<()> {
        // A FORMULA with a string result is followed by a STRING record
        let mut pending_string: Option<(u32, u16)> = None;

        for rec in records {
            let data = rec.data.as_slice();
            match rec.record_type {
                records::LABELSST => {
                    let (row, col, mut off) = Self::cell_header(data)?;
                    let idx = read_u32(data, &mut off)? as usize;
                    match sst.get(idx) {
                        Some(s) => ws.set_cell_value_at(row, col, s.as_str())?,
                        None => log::warn!("LABELSST index {} out of range ({} strings)", idx, sst.len()),
                    }
                }
                records::LABEL => {
                    let (row, col, mut off) = Self::cell_header(data)?;
                    let text = read_unicode_string(data, &mut off)?;
                    ws.set_cell_value_at(row, col, text)?;
                }
                records::NUMBER => {
                    let (row, col, mut off) = Self::cell_header(data)?;
                    ws.set_cell_value_at(row, col, read_f64(data, &mut off)?)?;
                }
                records::RK => {
                    let (row, col, mut off) = Self::cell_header(data)?;
                    ws.set_cell_value_at(row, col, read_rk(data, &mut off)?)?;
                }
                records::MULRK => Self::parse_mulrk(data, ws)?,
                records::BOOLERR => {
                    let (row, col, off) = Self::cell_header(data)?;
                    let val = data.get(off).copied().unwrap_or(0);
                    let is_error = data.get(off + 1).copied().unwrap_or(0) != 0;
                    let value = if is_error {
                        CellValue::Error(CellError::from_code(val))
                    } else {
                        CellValue::Boolean(val != 0)
                    };
                    ws.set_cell_value_at(row, col, value)?;
                }
                records::FORMULA => {
                    pending_string = Self::parse_formula(data, ws)?;
                    continue;
                }
                records::STRING => {
                    if let Some((row, col)) = pending_string.take() {
                        let mut off = 0;
                        let text = read_unicode_string(data, &mut off)?;
                        ws.set_cell_value_at(row, col, text)?;
                    }
                }
                records::COLINFO => Self::parse_colinfo(data, ws)?,
                // Shared and array formula definitions sit between FORMULA and STRING
                records::SHRFMLA | records::ARRAY => continue,
                _ => {}
            }
            pending_string = None;
        }

        Ok(())
    }

    /// row(2) + col(2) + xf(2); returns the offset of the record's payload
    fn cell_header(data: &[u8]) -> XlsResult<(u32, u16, usize)> {
        let mut off = 0;
        let row = read_u16(data, &mut off)? as u32;
        let col = read_u16(data, &mut off)?;
        let _xf = read_u16(data, &mut off)?;
        Ok((row, col, off))
    }

    /// MULRK: row(2) + first_col(2) + [xf(2) + rk(4)]* + last_col(2)
    fn parse_mulrk(data: &[u8], ws: &mut Worksheet) -> XlsResult<()> {
        if data.len() < 6 {
            return Err(XlsError::Parse("MULRK record too short".into()));
        }
        let mut off = 0;
        let row = read_u16(data, &mut off)? as u32;
        let first_col = read_u16(data, &mut off)?;
        let last_col = u16::from_le_bytes([data[data.len() - 2], data[data.len() - 1]]);
        let end = data.len() - 2;

        let mut col = first_col;
        while off + 6 <= end && col <= last_col {
            let _xf = read_u16(data, &mut off)?;
            ws.set_cell_value_at(row, col, read_rk(data, &mut off)?)?;
            col += 1;
        }
        Ok(())
    }

    /// FORMULA: row(2) + col(2) + xf(2) + result(8) + options(2) + reserved(4) + parsed expression
    ///
    /// Only the cached result is kept. Returns the cell position when the
    /// result is a string, whose text arrives in the following STRING record.
    fn parse_formula(data: &[u8], ws: &mut Worksheet) -> XlsResult<Option<(u32, u16)>> {
        let (row, col, off) = Self::cell_header(data)?;
        let result = data
            .get(off..off + 8)
            .ok_or_else(|| XlsError::Parse("FORMULA record too short".into()))?;

        // Bytes 6..8 == 0xFFFF mark a non-numeric result whose kind is in byte 0
        if result[6] != 0xFF || result[7] != 0xFF {
            let mut pos = off;
            ws.set_cell_value_at(row, col, read_f64(data, &mut pos)?)?;
            return Ok(None);
        }

        match result[0] {
            0x00 => return Ok(Some((row, col))),
            0x01 => ws.set_cell_value_at(row, col, CellValue::Boolean(result[2] != 0))?,
            0x02 => ws.set_cell_value_at(row, col, CellError::from_code(result[2]))?,
            // 0x03 is an empty string result
            _ => ws.clear_cell_at(row, col),
        }
        Ok(None)
    }

    /// COLINFO: first_col(2) + last_col(2) + width(2, 1/256 of a character) + xf(2) + options(2)
    fn parse_colinfo(data: &[u8], ws: &mut Worksheet) -> XlsResult<()> {
        let mut off = 0;
        let first = read_u16(data, &mut off)?;
        let last = read_u16(data, &mut off)?;
        let width = read_u16(data, &mut off)? as f64 / 256.0;
        // Cap huge spans such as "all remaining columns"
        for col in first..=last.min(first.saturating_add(255)) {
            ws.set_column_width(col, width);
        }
        Ok(())
    }
}
