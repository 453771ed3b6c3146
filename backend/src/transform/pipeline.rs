//! High-level conversion pipeline.
//!
//! Combines every step in one synchronous pass over a fully loaded export:
//! reading, record derivation, run grouping, row assembly and table building.
//! Rendering a format is a separate call on the result, so one conversion can
//! feed several outputs.
//!
//! # Example
//!
//! ```rust,ignore
//! use visitsheet::{convert_file, OutputFormat};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let result = convert_file(Path::new("attendance.csv"))?;
//!     let artifact = result.render(OutputFormat::Xlsx)?;
//!     std::fs::write(artifact.file_name, &artifact.bytes)?;
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use std::path::Path;

use super::assembly::assemble;
use super::grouper::{group_runs, total_visits};
use super::records::{derive_records, raw_rows};
use crate::api::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::error::{ExportResult, PipelineResult};
use crate::export::{render, Artifact, OutputFormat, ReportTable};
use crate::models::{AttendanceRecord, OutputRow};
use crate::parser::{parse_bytes_auto, parse_csv_file_auto, ParseResult};

/// Result of one conversion
#[derive(Debug, Clone, Serialize)]
pub struct ConversionResult {
    /// Final rows, data and synthetic
    pub rows: Vec<OutputRow>,

    /// The shared table every format is rendered from
    pub table: ReportTable,

    /// Records that survived the drop rules
    pub record_count: usize,

    /// Number of subject runs
    pub subject_count: usize,

    /// Sum of course runs over all subjects
    pub section_count: usize,

    /// Sum of visits over all records
    pub total_visits: i64,

    /// CSV parsing metadata
    pub csv_info: CsvInfo,
}

impl ConversionResult {
    /// Render one output artifact.
    pub fn render(&self, format: OutputFormat) -> ExportResult<Artifact> {
        render(&self.table, format)
    }
}

/// CSV file information
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

impl From<&ParseResult> for CsvInfo {
    fn from(parse_result: &ParseResult) -> Self {
        Self {
            encoding: parse_result.encoding.clone(),
            delimiter: parse_result.delimiter,
            headers: parse_result.headers.clone(),
            row_count: parse_result.records.len(),
        }
    }
}

/// Convert an attendance export file.
pub fn convert_file(path: &Path) -> PipelineResult<ConversionResult> {
    let parse_result = parse_csv_file_auto(path)?;
    convert_parsed(parse_result)
}

/// Convert attendance export bytes.
///
/// Same as `convert_file` but accepts raw bytes instead of a file path.
pub fn convert_bytes(bytes: &[u8]) -> PipelineResult<ConversionResult> {
    let parse_result = parse_bytes_auto(bytes)?;
    convert_parsed(parse_result)
}

/// Derive the attendance records of a file without grouping them.
pub fn inspect_file(path: &Path) -> PipelineResult<Vec<AttendanceRecord>> {
    let parse_result = parse_csv_file_auto(path)?;
    let rows = raw_rows(&parse_result)?;
    Ok(derive_records(rows)?)
}

/// Convert already-parsed CSV data.
pub fn convert_parsed(parse_result: ParseResult) -> PipelineResult<ConversionResult> {
    // Step 1: CSV info
    log_info("📖 Reading attendance export...");
    log_success(format!("Detected encoding: {}", parse_result.encoding));
    log_success(format!(
        "Detected separator: '{}'",
        format_delimiter(parse_result.delimiter)
    ));
    log_success(format!("Read {} rows", parse_result.records.len()));
    let csv_info = CsvInfo::from(&parse_result);

    // Step 2: Derive records
    log_info("🔎 Deriving attendance records...");
    let raw = raw_rows(&parse_result)?;
    let raw_count = raw.len();
    let records = derive_records(raw)?;
    log_success(format!("{} attendance records", records.len()));
    if records.len() < raw_count {
        log_info(format!(
            "{} non-attendance rows dropped",
            raw_count - records.len()
        ));
    }
    if records.is_empty() {
        log_warning("No attendance records; report holds the total row only");
    }

    // Step 3: Group into runs
    log_info("📦 Grouping by subject and course...");
    let subjects = group_runs(&records)?;
    let section_count: usize = subjects.iter().map(|s| s.course_count()).sum();
    let total_visits = total_visits(&subjects)?;
    log_success(format!(
        "{} subjects, {} sections, {} visits",
        subjects.len(),
        section_count,
        total_visits
    ));
    for subject in &subjects {
        log_info_indent(
            format!(
                "{}: {} sections, {} visits",
                subject.subject,
                subject.course_count(),
                subject.visits
            ),
            1,
        );
    }

    // Step 4: Assemble rows and build the shared table
    let record_count = records.len();
    let rows = assemble(records, &subjects)?;
    let table = ReportTable::from_rows(&rows);
    log_success(format!("Report has {} rows", table.rows.len()));

    Ok(ConversionResult {
        rows,
        table,
        record_count,
        subject_count: subjects.len(),
        section_count,
        total_visits,
        csv_info,
    })
}

/// Format delimiter for display
fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "TAB",
        '|' => "|",
        _ => "?",
    }
}
