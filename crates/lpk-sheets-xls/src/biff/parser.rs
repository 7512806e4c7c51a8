//! Little-endian readers over record bodies.

use crate::error::{XlsError, XlsResult};

fn take<'a>(data: &'a [u8], offset: &mut usize, n: usize) -> XlsResult<&'a [u8]> {
    let end = offset.checked_add(n).filter(|end| *end <= data.len());
    match end {
        Some(end) => {
            let bytes = &data[*offset..end];
            *offset = end;
            Ok(bytes)
        }
        None => Err(XlsError::Parse(format!(
            "unexpected end of data at offset {}, need {} byte(s)",
            *offset, n
        ))),
    }
}

#[inline]
pub fn read_u8(data: &[u8], offset: &mut usize) -> XlsResult<u8> {
    Ok(take(data, offset, 1)?[0])
}

#[inline]
pub fn read_u16(data: &[u8], offset: &mut usize) -> XlsResult<u16> {
    let b = take(data, offset, 2)?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

#[inline]
pub fn read_u32(data: &[u8], offset: &mut usize) -> XlsResult<u32> {
    let b = take(data, offset, 4)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

#[inline]
pub fn read_f64(data: &[u8], offset: &mut usize) -> XlsResult<f64> {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(take(data, offset, 8)?);
    Ok(f64::from_le_bytes(bytes))
}

/// Decode an RK-encoded number.
///
/// Bit 0 means "divide by 100". Bit 1 selects a signed 30-bit integer in
/// bits 2..31; otherwise bits 2..31 are the upper 30 bits of an IEEE double
/// whose lower 34 bits are zero.
#[inline]
pub fn decode_rk(rk: u32) -> f64 {
    let div100 = (rk & 0x01) != 0;
    let is_integer = (rk & 0x02) != 0;

    let value = if is_integer {
        ((rk as i32) >> 2) as f64
    } else {
        f64::from_bits(((rk & 0xFFFF_FFFC) as u64) << 32)
    };

    if div100 {
        value / 100.0
    } else {
        value
    }
}

#[inline]
pub fn read_rk(data: &[u8], offset: &mut usize) -> XlsResult<f64> {
    read_u32(data, offset).map(decode_rk)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rk_integers() {
        assert_eq!(decode_rk((42u32 << 2) | 0x02), 42.0);
        assert_eq!(decode_rk(((-5i32 << 2) as u32) | 0x02), -5.0);
        assert_eq!(decode_rk(0xFFFF_FE72), -100.0);
        // 1500000 / 100 as a scaled integer
        assert_eq!(decode_rk((1_500_000u32 << 2) | 0x03), 15_000.0);
    }

    #[test]
    fn test_decode_rk_float() {
        let upper = ((45292.0_f64.to_bits() >> 32) as u32) & 0xFFFF_FFFC;
        assert_eq!(decode_rk(upper), 45292.0);
    }

    #[test]
    fn test_reads_advance_offset() {
        let mut data = vec![0x34, 0x12];
        data.extend_from_slice(&2.5f64.to_le_bytes());
        let mut off = 0;
        assert_eq!(read_u16(&data, &mut off).unwrap(), 0x1234);
        assert_eq!(read_f64(&data, &mut off).unwrap(), 2.5);
        assert_eq!(off, 10);
        assert!(read_u8(&data, &mut off).is_err());
    }
}
