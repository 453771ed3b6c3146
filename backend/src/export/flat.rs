//! Flat CSV output.

use csv::{Terminator, WriterBuilder};

use super::ReportTable;
use crate::error::{ExportError, ExportResult};

pub const FILE_NAME: &str = "converted.csv";
pub const CONTENT_TYPE: &str = "text/csv";

/// Write the table as CSV with a header row and `\n` line endings.
pub fn write_csv(table: &ReportTable) -> ExportResult<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(table.columns())?;
    for row in &table.rows {
        writer.write_record(row.cells.iter().map(|c| c.to_field()))?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}
