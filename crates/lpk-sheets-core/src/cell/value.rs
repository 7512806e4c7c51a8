use std::fmt;
use std::sync::Arc;

/// Content of one grid cell as read from or written to a spreadsheet.
///
/// Dates have no variant of their own: they travel as serial numbers and are
/// converted with [`crate::date`] once the column is known to hold a date.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Boolean(bool),
    /// Every number, date serials included
    Number(f64),
    String(SharedString),
    /// Formula error left in the file, such as `#N/A`
    Error(CellError),
}

impl CellValue {
    pub fn string<S: Into<String>>(s: S) -> Self {
        Self::String(SharedString::new(s.into()))
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::Empty
    }

    /// Numeric reading of the cell; booleans count as 0 and 1
    pub fn as_number(&self) -> Option<f64> {
        match *self {
            Self::Number(n) => Some(n),
            Self::Boolean(b) => Some(f64::from(u8::from(b))),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        if let Self::String(text) = self {
            Some(text.as_str())
        } else {
            None
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Boolean(true) => f.write_str("TRUE"),
            Self::Boolean(false) => f.write_str("FALSE"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(text) => f.write_str(text.as_str()),
            Self::Error(err) => f.write_str(err.as_str()),
        }
    }
}

macro_rules! cell_value_from {
    ($($ty:ty => |$v:ident| $body:expr),* $(,)?) => {
        $(impl From<$ty> for CellValue {
            fn from($v: $ty) -> Self {
                $body
            }
        })*
    };
}

cell_value_from! {
    bool => |b| CellValue::Boolean(b),
    f64 => |n| CellValue::Number(n),
    i32 => |n| CellValue::Number(f64::from(n)),
    i64 => |n| CellValue::Number(n as f64),
    &str => |s| CellValue::string(s),
    String => |s| CellValue::string(s),
    CellError => |e| CellValue::Error(e),
}

/// Error literal stored in a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellError {
    Null,
    Div0,
    Value,
    Ref,
    Name,
    Num,
    Na,
}

/// Literal and BIFF error code of every error value
const ERROR_TABLE: [(CellError, &str, u8); 7] = [
    (CellError::Null, "#NULL!", 0x00),
    (CellError::Div0, "#DIV/0!", 0x07),
    (CellError::Value, "#VALUE!", 0x0F),
    (CellError::Ref, "#REF!", 0x17),
    (CellError::Name, "#NAME?", 0x1D),
    (CellError::Num, "#NUM!", 0x24),
    (CellError::Na, "#N/A", 0x2A),
];

impl CellError {
    pub fn as_str(self) -> &'static str {
        ERROR_TABLE
            .iter()
            .find(|(err, _, _)| *err == self)
            .map_or("#VALUE!", |&(_, literal, _)| literal)
    }

    /// Case-insensitive lookup of an error literal such as `#n/a`
    pub fn parse(s: &str) -> Option<Self> {
        ERROR_TABLE
            .iter()
            .find(|(_, literal, _)| literal.eq_ignore_ascii_case(s.trim()))
            .map(|(err, _, _)| *err)
    }

    /// Error for a BIFF error byte; unknown bytes read as `#VALUE!`
    pub fn from_code(code: u8) -> Self {
        ERROR_TABLE
            .iter()
            .find(|(_, _, c)| *c == code)
            .map_or(CellError::Value, |(err, _, _)| *err)
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable text shared between cells.
///
/// Imported sheets repeat the same few labels (gender, city, status) down a
/// column, so readers hand out clones of one allocation.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SharedString(Arc<str>);

impl SharedString {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(Arc::from(s.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SharedString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SharedString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SharedString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
