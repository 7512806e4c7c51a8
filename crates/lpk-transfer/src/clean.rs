//! Per-field cleaning of raw cell values.
//!
//! Every rule returns `Ok(None)` for an absent or blank value, `Ok(Some(_))`
//! for a usable one, and a [`CoercionError`] when the value is present but
//! cannot be read as the wanted type. Whether an error rejects the row is
//! decided by the caller.

use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use thiserror::Error;

use crate::marker::strip_truncation_marker;

/// Tokens read as `true` by [`clean_boolean`], compared case-insensitively
pub const AFFIRMATIVE_TOKENS: [&str; 3] = ["ya", "true", "1"];

/// Date layouts accepted by [`clean_date`], tried in order
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// A present value that does not fit the field's type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoercionError {
    #[error("'{0}' bukan angka")]
    NotANumber(String),

    #[error("'{0}' bukan tanggal yang valid")]
    InvalidDate(String),
}

/// Trim, drop the truncation marker, and turn blank text into `None`.
///
/// Numbers are rendered without a trailing `.0` when integral, so an ID typed
/// into a numeric cell comes back as its digits.
pub fn clean_text(raw: Option<&Value>) -> Result<Option<String>, CoercionError> {
    let text = match raw {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) => strip_truncation_marker(s).trim().to_string(),
        // serde_json prints floats as "165.0"; std prints the shortest form, "165"
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) if n.is_f64() => f.to_string(),
            _ => n.to_string(),
        },
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    };
    Ok(if text.is_empty() { None } else { Some(text) })
}

/// Read a number. Text is trimmed and `,` thousands separators are removed.
///
/// A comma anywhere else, such as the decimal comma in `52,5`, makes the
/// text not a number.
pub fn clean_number(raw: Option<&Value>) -> Result<Option<f64>, CoercionError> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| CoercionError::NotANumber(n.to_string())),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            let parsed = strip_thousands(trimmed).and_then(|digits| digits.parse::<f64>().ok());
            match parsed {
                Some(f) if f.is_finite() => Ok(Some(f)),
                _ => Err(CoercionError::NotANumber(trimmed.to_string())),
            }
        }
        Some(other) => Err(CoercionError::NotANumber(other.to_string())),
    }
}

/// Remove `,` group separators from `1,500,000.25` style text. `None` when
/// commas are present but do not form groups of three after a 1-3 digit lead.
fn strip_thousands(text: &str) -> Option<String> {
    if !text.contains(',') {
        return Some(text.to_string());
    }
    let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
    let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if fraction.contains(',') {
        return None;
    }

    let mut groups = integer.split(',');
    let lead = groups.next().unwrap_or_default();
    let digits_only = |g: &str| g.bytes().all(|b| b.is_ascii_digit());
    if !(1..=3).contains(&lead.len()) || !digits_only(lead) {
        return None;
    }
    if !groups.all(|g| g.len() == 3 && digits_only(g)) {
        return None;
    }
    Some(text.replace(',', ""))
}

/// Read a yes/no value.
///
/// Text matching [`AFFIRMATIVE_TOKENS`] is `true`, any other non-blank text
/// is `false`. Never fails.
pub fn clean_boolean(raw: Option<&Value>) -> Result<Option<bool>, CoercionError> {
    Ok(match raw {
        None | Some(Value::Null) => None,
        Some(Value::Bool(b)) => Some(*b),
        Some(Value::Number(n)) => Some(n.as_f64() == Some(1.0)),
        Some(Value::String(s)) => {
            let token = s.trim().to_lowercase();
            if token.is_empty() {
                None
            } else {
                Some(AFFIRMATIVE_TOKENS.contains(&token.as_str()))
            }
        }
        Some(_) => Some(false),
    })
}

/// Read a calendar date in the 1900 date system. See [`clean_date_with`].
pub fn clean_date(raw: Option<&Value>) -> Result<Option<NaiveDate>, CoercionError> {
    clean_date_with(raw, false)
}

/// Read a calendar date.
///
/// Accepts `YYYY-MM-DD`, `DD/MM/YYYY`, `DD-MM-YYYY`, RFC 3339 timestamps
/// (the date part is kept) and spreadsheet serial numbers, either as numbers
/// or as numeric text.
pub fn clean_date_with(
    raw: Option<&Value>,
    date_1904: bool,
) -> Result<Option<NaiveDate>, CoercionError> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .and_then(|serial| lpk_sheets_core::date::serial_to_date(serial, date_1904))
            .map(Some)
            .ok_or_else(|| CoercionError::InvalidDate(n.to_string())),
        Some(Value::String(s)) => {
            let text = s.trim();
            if text.is_empty() {
                return Ok(None);
            }
            parse_date_text(text, date_1904)
                .map(Some)
                .ok_or_else(|| CoercionError::InvalidDate(text.to_string()))
        }
        Some(other) => Err(CoercionError::InvalidDate(other.to_string())),
    }
}

fn parse_date_text(text: &str, date_1904: bool) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            text.parse::<f64>()
                .ok()
                .and_then(|serial| lpk_sheets_core::date::serial_to_date(serial, date_1904))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text(Some(&json!("  Budi  "))), Ok(Some("Budi".into())));
        assert_eq!(clean_text(Some(&json!("   "))), Ok(None));
        assert_eq!(clean_text(Some(&json!("Jl. Merdeka...[cut]"))), Ok(Some("Jl. Merdeka".into())));
        assert_eq!(clean_text(Some(&json!(3201010101010001u64))), Ok(Some("3201010101010001".into())));
        assert_eq!(clean_text(Some(&json!(1.5))), Ok(Some("1.5".into())));
        assert_eq!(clean_text(Some(&json!(812345.0))), Ok(Some("812345".into())));
        assert_eq!(clean_text(None), Ok(None));
        assert_eq!(clean_text(Some(&Value::Null)), Ok(None));
    }

    #[test]
    fn test_clean_number() {
        assert_eq!(clean_number(Some(&json!(165))), Ok(Some(165.0)));
        assert_eq!(clean_number(Some(&json!(" 1,500,000 "))), Ok(Some(1_500_000.0)));
        assert_eq!(clean_number(Some(&json!("52.5"))), Ok(Some(52.5)));
        assert_eq!(clean_number(Some(&json!("-12,345.5"))), Ok(Some(-12_345.5)));
        assert_eq!(
            clean_number(Some(&json!("52,5"))),
            Err(CoercionError::NotANumber("52,5".into()))
        );
        for misplaced in ["1,60", "1,5000", ",500", "1,500.2,5", "12,34,567"] {
            assert!(clean_number(Some(&json!(misplaced))).is_err(), "{misplaced}");
        }
        assert_eq!(clean_number(Some(&json!(""))), Ok(None));
        assert_eq!(
            clean_number(Some(&json!("seratus"))),
            Err(CoercionError::NotANumber("seratus".into()))
        );
        assert!(clean_number(Some(&json!("NaN"))).is_err());
        assert!(clean_number(Some(&json!(true))).is_err());
    }

    #[test]
    fn test_clean_boolean() {
        for yes in ["ya", "YA", " Ya ", "true", "TRUE", "1"] {
            assert_eq!(clean_boolean(Some(&json!(yes))), Ok(Some(true)), "{yes}");
        }
        for no in ["tidak", "no", "0", "false", "yes"] {
            assert_eq!(clean_boolean(Some(&json!(no))), Ok(Some(false)), "{no}");
        }
        assert_eq!(clean_boolean(Some(&json!(""))), Ok(None));
        assert_eq!(clean_boolean(None), Ok(None));
        assert_eq!(clean_boolean(Some(&json!(1))), Ok(Some(true)));
        assert_eq!(clean_boolean(Some(&json!(0))), Ok(Some(false)));
        assert_eq!(clean_boolean(Some(&json!(false))), Ok(Some(false)));
    }

    #[test]
    fn test_clean_date_formats() {
        let expected = Ok(Some(ymd(2001, 8, 17)));
        assert_eq!(clean_date(Some(&json!("2001-08-17"))), expected);
        assert_eq!(clean_date(Some(&json!("17/08/2001"))), expected);
        assert_eq!(clean_date(Some(&json!("17-08-2001"))), expected);
        assert_eq!(clean_date(Some(&json!("2001-08-17T09:30:00+07:00"))), expected);
        assert_eq!(clean_date(Some(&json!(37120))), expected);
        assert_eq!(clean_date(Some(&json!("37120"))), expected);
    }

    #[test]
    fn test_clean_date_invalid() {
        assert_eq!(
            clean_date(Some(&json!("31/02/2001"))),
            Err(CoercionError::InvalidDate("31/02/2001".into()))
        );
        assert!(clean_date(Some(&json!("kemarin"))).is_err());
        assert!(clean_date(Some(&json!(-3))).is_err());
        assert_eq!(clean_date(Some(&json!(" "))), Ok(None));
    }

    #[test]
    fn test_clean_date_1904_serial() {
        assert_eq!(clean_date_with(Some(&json!(35658)), true), Ok(Some(ymd(2001, 8, 17))));
    }
}
