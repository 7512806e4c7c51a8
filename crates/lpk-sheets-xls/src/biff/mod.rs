//! BIFF8 record stream.
//!
//! A BIFF8 stream is a sequence of records, each with a 4-byte header
//! (2 bytes record type + 2 bytes body length) followed by the body.
//! CONTINUE records extend the body of the preceding record beyond the
//! 8224-byte per-record limit. They are merged here, but the position of
//! each join is kept because strings crossing a join carry an extra flags byte.

pub mod parser;
pub mod records;
pub mod strings;

use crate::error::{XlsError, XlsResult};
use std::io::Read;

/// A single BIFF8 record with its CONTINUE bodies merged
#[derive(Debug, Clone)]
pub struct BiffRecord {
    /// Record type ID (e.g. `records::SST`)
    pub record_type: u16,
    /// Record body, CONTINUE bodies appended
    pub data: Vec<u8>,
    /// Offsets into `data` where each CONTINUE body starts
    pub continue_offsets: Vec<usize>,
}

impl BiffRecord {
    fn new(record_type: u16, data: Vec<u8>) -> Self {
        Self {
            record_type,
            data,
            continue_offsets: Vec::new(),
        }
    }
}

/// Read all records from a byte stream, merging CONTINUE records into their parent
pub fn read_all_records<R: Read>(stream: &mut R) -> XlsResult<Vec<BiffRecord>> {
    let mut records: Vec<BiffRecord> = Vec::new();
    let mut header = [0u8; 4];

    loop {
        match stream.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(XlsError::Io(e)),
        }

        let record_type = u16::from_le_bytes([header[0], header[1]]);
        let body_len = u16::from_le_bytes([header[2], header[3]]) as usize;

        let mut body = vec![0u8; body_len];
        stream.read_exact(&mut body)?;

        if record_type == records::CONTINUE {
            match records.last_mut() {
                Some(prev) => {
                    prev.continue_offsets.push(prev.data.len());
                    prev.data.extend_from_slice(&body);
                }
                None => log::warn!("orphaned CONTINUE record at stream start, dropped"),
            }
        } else {
            records.push(BiffRecord::new(record_type, body));
        }
    }

    Ok(records)
}

/// Extract `(version, substream_type)` from a BOF record body
pub fn parse_bof(data: &[u8]) -> XlsResult<(u16, u16)> {
    if data.len() < 4 {
        return Err(XlsError::InvalidFormat("BOF record too short".into()));
    }
    let version = u16::from_le_bytes([data[0], data[1]]);
    let dt = u16::from_le_bytes([data[2], data[3]]);
    Ok((version, dt))
}
