//! ZIP bundle holding both the flat and the styled report.

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{flat, styled, ReportTable};
use crate::error::ExportResult;

pub const FILE_NAME: &str = "converted_files.zip";
pub const CONTENT_TYPE: &str = "application/zip";

/// Zip `converted.csv` and `converted.xlsx` (deflate).
pub fn write_bundle(table: &ReportTable) -> ExportResult<Vec<u8>> {
    let csv = flat::write_csv(table)?;
    let xlsx = styled::write_xlsx(table)?;

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    zip.start_file(flat::FILE_NAME, options)?;
    zip.write_all(&csv)?;
    zip.start_file(styled::FILE_NAME, options)?;
    zip.write_all(&xlsx)?;

    Ok(zip.finish()?.into_inner())
}
