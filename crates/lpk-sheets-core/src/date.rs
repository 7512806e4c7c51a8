//! Spreadsheet serial dates
//!
//! Both file formats store dates as plain numbers: days since a base date.
//! In the 1900 system serial 1 is 1900-01-01 and serial 60 is the
//! non-existent 1900-02-29 that Excel keeps for Lotus compatibility, so
//! serials from 61 onwards are offset by one day. The 1904 system counts
//! from 1904-01-01 (serial 0) with no such gap.

use chrono::NaiveDate;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    // Constant, always-valid calendar dates
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

/// Convert a serial number to a calendar date. The time-of-day fraction is dropped.
///
/// Returns `None` for serials before the epoch, for the phantom 1900-02-29
/// and for values outside chrono's range.
pub fn serial_to_date(serial: f64, date_1904: bool) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let days = serial.trunc() as i64;

    if date_1904 {
        if days < 0 {
            return None;
        }
        return ymd(1904, 1, 1).checked_add_signed(chrono::Duration::try_days(days)?);
    }

    match days {
        i64::MIN..=0 => None,
        1..=59 => ymd(1899, 12, 31).checked_add_signed(chrono::Duration::try_days(days)?),
        60 => None,
        _ => ymd(1899, 12, 30).checked_add_signed(chrono::Duration::try_days(days)?),
    }
}

/// Convert a calendar date to its serial number
pub fn date_to_serial(date: NaiveDate, date_1904: bool) -> f64 {
    if date_1904 {
        return (date - ymd(1904, 1, 1)).num_days() as f64;
    }
    if date >= ymd(1900, 3, 1) {
        (date - ymd(1899, 12, 30)).num_days() as f64
    } else {
        (date - ymd(1899, 12, 31)).num_days() as f64
    }
}
