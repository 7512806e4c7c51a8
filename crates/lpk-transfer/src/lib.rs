//! # lpk-transfer
//!
//! Spreadsheet import/export pipeline and document tracking for an LPK
//! (a vocational institute placing interns with Japanese companies).
//!
//! ## Features
//!
//! - Export any serializable records to XLSX through column descriptors
//! - Generate header-only import templates
//! - Parse `.xlsx` and `.xls` uploads into untyped rows
//! - Clean, validate and store rows as students, companies, cooperatives or
//!   job positions, skipping duplicates
//! - Flag text that was cut to fit into a cell, in both directions
//! - Classify document-tracking stages for staff and student views
//!
//! ## Example
//!
//! ```rust
//! use lpk_transfer::prelude::*;
//!
//! let columns = EntityKind::Siswa.schema().columns();
//! let records = vec![serde_json::json!({"nik": "3201", "nama": "Ayu"})];
//!
//! let mut sink = MemorySink::new();
//! let report = export_to_excel(&records, &columns, "siswa", &TransferSettings::default(), &mut sink)
//!     .unwrap();
//! assert_eq!(report.rows, 1);
//!
//! let upload = UploadedFile::new("siswa.xlsx", sink.take().remove(0).1);
//! let parsed = parse_import(&upload, &columns, &TransferSettings::default()).unwrap();
//!
//! let mut repo = MemoryRepository::new();
//! let result = import_siswa(&parsed.records, &mut repo);
//! assert_eq!(result.success, 1);
//! ```

pub mod clean;
pub mod columns;
pub mod entities;
pub mod error;
pub mod export;
pub mod import;
pub mod marker;
pub mod path;
pub mod prelude;
pub mod reconcile;
pub mod report;
pub mod repository;
pub mod settings;
pub mod sink;
pub mod template;
pub mod tracking;

pub use columns::ExportColumn;
pub use entities::{EntityKind, EntityRecord, EntitySchema, FieldKind, FieldSpec};
pub use error::{Result, TransferError};
pub use export::{dated_stem, export_to_excel, ExportReport};
pub use import::{check_upload, parse_import, ImportRecord, ParsedImport, SpreadsheetFormat, UploadedFile};
pub use marker::{TRUNCATION_MARKER, MARKER_CHARS};
pub use path::FieldPath;
pub use reconcile::{
    import_kumiai, import_lowongan, import_perusahaan, import_records, import_siswa, ImportResult,
    RecordError,
};
pub use report::{CollectingReporter, Reporter, TransferWarning, TruncatedCell};
pub use repository::{JsonFileRepository, MemoryRepository, PersistenceError, Repository};
pub use settings::{TransferSettings, MAX_UPLOAD_BYTES};
pub use sink::{DeliveredFile, DirectorySink, FileSink, MemorySink};
pub use template::generate_template;
pub use tracking::{
    classify, staff_row, student_timeline, summarize, DocumentStage, DocumentTrackingRecord,
    StaffTrackingRow, StatusBucket, TimelineStep, TrackingSummary,
};
