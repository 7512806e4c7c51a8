//! BIFF8 record type constants used by the reader.

// Stream structure
pub const BOF: u16 = 0x0809;
pub const EOF: u16 = 0x000A;
pub const CONTINUE: u16 = 0x003C;

// Workbook globals
pub const BOUNDSHEET: u16 = 0x0085; // Sheet name, type, visibility, stream offset
pub const SST: u16 = 0x00FC; // Shared String Table
pub const DATEMODE: u16 = 0x0022; // 1900 vs 1904 date system

// Cell records
pub const LABELSST: u16 = 0x00FD; // Cell containing SST string index
pub const LABEL: u16 = 0x0204; // Cell with inline string
pub const NUMBER: u16 = 0x0203; // Cell with IEEE 754 double
pub const RK: u16 = 0x027E; // Cell with compressed number
pub const MULRK: u16 = 0x00BD; // Multiple RK values in one row
pub const BOOLERR: u16 = 0x0205; // Boolean or error cell
pub const FORMULA: u16 = 0x0006; // Formula cell with cached result
pub const STRING: u16 = 0x0207; // Cached string result for the preceding FORMULA
pub const SHRFMLA: u16 = 0x04BC; // Shared formula definition
pub const ARRAY: u16 = 0x0221; // Array formula definition

// Sheet structure
pub const COLINFO: u16 = 0x007D; // Column width

// BOF substream types
pub const BOF_WORKBOOK_GLOBALS: u16 = 0x0005;

/// Sheet type byte of a BOUNDSHEET for an ordinary worksheet
pub const SHEET_TYPE_WORKSHEET: u8 = 0x00;

/// BIFF version we support
pub const BIFF8_VERSION: u16 = 0x0600;
