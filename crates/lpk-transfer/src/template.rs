//! Import templates: a workbook holding only the header row

use crate::columns::ExportColumn;
use crate::error::{Result, TransferError};
use crate::export::{deliver, header_sheet};
use crate::settings::TransferSettings;
use crate::sink::{sanitize_stem, DeliveredFile, FileSink};

/// Write `template_<stem>.xlsx` with one bold header cell per column
pub fn generate_template(
    columns: &[ExportColumn],
    stem: &str,
    settings: &TransferSettings,
    sink: &mut dyn FileSink,
) -> Result<DeliveredFile> {
    if columns.is_empty() {
        return Err(TransferError::NoColumns);
    }
    let sheet = header_sheet(columns, settings)?;
    let file_name = format!("template_{}.xlsx", sanitize_stem(stem));
    let file = deliver(sheet, &file_name, sink)?;
    tracing::info!(file = %file.file_name, columns = columns.len(), "template written");
    Ok(file)
}
