//! BIFF8 Unicode string decoding.
//!
//! Layout: char_count, a flags byte, optional rich-run count (flag 0x08),
//! optional extended-data size (flag 0x04), the characters, then the runs
//! and extended data. Flag 0x01 selects UTF-16LE, otherwise each character
//! is one Latin-1 byte.
//!
//! Inside the SST a string's characters may cross into the next CONTINUE
//! record. The continuation then starts with a fresh flags byte, so the
//! encoding can change halfway through a string.

use super::parser::{read_u16, read_u32, read_u8};
use crate::error::{XlsError, XlsResult};

const FLAG_WIDE: u8 = 0x01;
const FLAG_EXT: u8 = 0x04;
const FLAG_RICH: u8 = 0x08;

/// Read a string with a 1-byte length prefix (BOUNDSHEET)
pub fn read_short_string(data: &[u8], offset: &mut usize) -> XlsResult<String> {
    let char_count = read_u8(data, offset)? as usize;
    let flags = read_u8(data, offset)?;
    let mut units = Vec::with_capacity(char_count);
    read_units(data, offset, char_count, flags & FLAG_WIDE != 0, &mut units)?;
    decode_units(&units)
}

/// Read a string with a 2-byte length prefix that does not cross record joins
/// (LABEL, STRING)
pub fn read_unicode_string(data: &[u8], offset: &mut usize) -> XlsResult<String> {
    read_string_across(data, offset, &[])
}

/// Read a string whose characters may continue past the given join offsets
fn read_string_across(data: &[u8], offset: &mut usize, joins: &[usize]) -> XlsResult<String> {
    let char_count = read_u16(data, offset)? as usize;
    let flags = read_u8(data, offset)?;

    let run_count = if flags & FLAG_RICH != 0 {
        read_u16(data, offset)? as usize
    } else {
        0
    };
    let ext_size = if flags & FLAG_EXT != 0 {
        read_u32(data, offset)? as usize
    } else {
        0
    };

    let mut units = Vec::with_capacity(char_count);
    let mut wide = flags & FLAG_WIDE != 0;
    let mut remaining = char_count;

    loop {
        let limit = joins
            .iter()
            .copied()
            .find(|j| *j >= *offset)
            .unwrap_or(data.len());
        let available = limit.saturating_sub(*offset);
        let fits = if wide { available / 2 } else { available };
        let here = remaining.min(fits);

        read_units(data, offset, here, wide, &mut units)?;
        remaining -= here;

        if remaining == 0 {
            break;
        }
        if *offset != limit || limit == data.len() {
            return Err(XlsError::Parse(format!(
                "string data too short: {} character(s) missing at offset {}",
                remaining, *offset
            )));
        }
        // Characters resume in the next CONTINUE body behind a new flags byte
        wide = read_u8(data, offset)? & FLAG_WIDE != 0;
    }

    // Formatting runs (4 bytes each) and phonetic data are not cell text
    *offset = offset
        .saturating_add(run_count * 4)
        .saturating_add(ext_size)
        .min(data.len());

    decode_units(&units)
}

fn read_units(
    data: &[u8],
    offset: &mut usize,
    count: usize,
    wide: bool,
    units: &mut Vec<u16>,
) -> XlsResult<()> {
    let byte_len = if wide { count * 2 } else { count };
    let end = *offset + byte_len;
    if end > data.len() {
        return Err(XlsError::Parse(format!(
            "string data too short: need {} bytes at offset {}, have {}",
            byte_len,
            *offset,
            data.len().saturating_sub(*offset)
        )));
    }
    let bytes = &data[*offset..end];
    if wide {
        units.extend(
            bytes
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]])),
        );
    } else {
        units.extend(bytes.iter().map(|&b| b as u16));
    }
    *offset = end;
    Ok(())
}

fn decode_units(units: &[u16]) -> XlsResult<String> {
    String::from_utf16(units).map_err(|e| XlsError::Parse(format!("invalid UTF-16 string: {e}")))
}

/// Parse the Shared String Table.
///
/// `data` is the SST body with its CONTINUE bodies appended and `joins` the
/// offsets where each CONTINUE body starts. A malformed tail is logged and
/// the strings read so far are kept.
pub fn parse_sst(data: &[u8], joins: &[usize]) -> XlsResult<Vec<String>> {
    let mut offset = 0;

    let _total_refs = read_u32(data, &mut offset)?;
    let unique_count = read_u32(data, &mut offset)? as usize;

    // The count comes from the file; don't trust it for preallocation
    let mut strings = Vec::with_capacity(unique_count.min(data.len() / 3));

    for i in 0..unique_count {
        match read_string_across(data, &mut offset, joins) {
            Ok(s) => strings.push(s),
            Err(e) => {
                log::warn!("SST parse error at string {i}/{unique_count}: {e}");
                break;
            }
        }
    }

    Ok(strings)
}
