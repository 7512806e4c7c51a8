//! Prelude module - common imports for lpk-transfer users
//!
//! ```rust
//! use lpk_transfer::prelude::*;
//! ```

pub use crate::{
    // Export and templates
    export_to_excel,
    generate_template,
    DirectorySink,
    ExportColumn,
    FileSink,
    MemorySink,

    // Import
    import_records,
    import_siswa,
    import_perusahaan,
    import_kumiai,
    import_lowongan,
    parse_import,
    ImportRecord,
    ImportResult,
    ParsedImport,
    UploadedFile,

    // Entities and storage
    EntityKind,
    EntityRecord,
    JsonFileRepository,
    MemoryRepository,
    Repository,

    // Reporting
    Reporter,
    TransferWarning,

    // Tracking
    classify,
    DocumentStage,
    DocumentTrackingRecord,
    StatusBucket,

    // Settings and errors
    Result,
    TransferError,
    TransferSettings,
};
