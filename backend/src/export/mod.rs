//! Report serialization.
//!
//! Both outputs are rendered from one in-memory [`ReportTable`]:
//!
//! - [`flat`] - delimited text (`converted.csv`)
//! - [`styled`] - color-coded spreadsheet (`converted.xlsx`)
//! - [`bundle`] - both files in one ZIP (`converted_files.zip`)

pub mod bundle;
pub mod flat;
pub mod styled;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ExportResult;
use crate::models::OutputRow;

/// Number of report columns.
pub const COLUMN_COUNT: usize = 9;

/// Final column order.
pub const COLUMNS: [&str; COLUMN_COUNT] = [
    "Course",
    "Last Name",
    "First Name",
    "Student ID",
    "Visits",
    "Major",
    "Email",
    "Sum Visits",
    "Total Visits",
];

const SUM_VISITS_COL: usize = 7;

// =============================================================================
// Shared table
// =============================================================================

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Text(String),
    Number(i64),
}

impl Cell {
    fn opt(value: Option<i64>) -> Self {
        value.map_or(Cell::Empty, Cell::Number)
    }

    /// Text written to the flat output.
    pub fn to_field(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
        }
    }
}

/// One rendered row. `course` is set for data rows only and drives coloring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub course: Option<String>,
    pub cells: [Cell; COLUMN_COUNT],
}

impl TableRow {
    /// A row with text in `Course` and every other cell empty.
    fn labelled(label: String) -> Self {
        let mut cells: [Cell; COLUMN_COUNT] = std::array::from_fn(|_| Cell::Empty);
        cells[0] = Cell::Text(label);
        TableRow { course: None, cells }
    }
}

impl From<&OutputRow> for TableRow {
    fn from(row: &OutputRow) -> Self {
        match row {
            OutputRow::Data {
                record,
                sum_visits,
                total_visits,
            } => TableRow {
                course: Some(record.course.clone()),
                cells: [
                    Cell::Text(record.course.clone()),
                    Cell::Text(record.last_name.clone()),
                    Cell::Text(record.first_name.clone()),
                    Cell::Text(record.student_id.clone()),
                    Cell::Number(record.visits),
                    Cell::Text(record.major.clone()),
                    Cell::Text(record.email.clone()),
                    Cell::opt(*sum_visits),
                    Cell::opt(*total_visits),
                ],
            },
            OutputRow::SectionCount { count } => TableRow::labelled(format!("{} sections", count)),
            OutputRow::GrandTotal {
                total_sections,
                total_visits,
            } => {
                let mut row = TableRow::labelled(format!("Total: {} sections", total_sections));
                row.cells[SUM_VISITS_COL] = Cell::Number(*total_visits);
                row
            }
        }
    }
}

/// The final table, shared by every writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportTable {
    pub rows: Vec<TableRow>,
}

impl ReportTable {
    pub fn from_rows(rows: &[OutputRow]) -> Self {
        Self {
            rows: rows.iter().map(TableRow::from).collect(),
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }
}

// =============================================================================
// Output formats
// =============================================================================

/// Which artifact to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Flat CSV only.
    Csv,
    /// Styled spreadsheet only.
    Xlsx,
    /// Both, zipped.
    #[default]
    Zip,
}

impl OutputFormat {
    /// Lenient selector for the HTTP boundary: unknown or missing → bundle.
    pub fn from_query(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }

    pub fn file_name(self) -> &'static str {
        match self {
            OutputFormat::Csv => flat::FILE_NAME,
            OutputFormat::Xlsx => styled::FILE_NAME,
            OutputFormat::Zip => bundle::FILE_NAME,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Csv => flat::CONTENT_TYPE,
            OutputFormat::Xlsx => styled::CONTENT_TYPE,
            OutputFormat::Zip => bundle::CONTENT_TYPE,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" | "flat" | "flat-only" => Ok(OutputFormat::Csv),
            "xlsx" | "styled" | "styled-only" => Ok(OutputFormat::Xlsx),
            "zip" | "bundle" => Ok(OutputFormat::Zip),
            other => Err(format!(
                "unknown format '{}' (expected csv, xlsx or zip)",
                other
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Zip => "zip",
        };
        f.write_str(name)
    }
}

/// A rendered output file.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Render the table in the requested format.
pub fn render(table: &ReportTable, format: OutputFormat) -> ExportResult<Artifact> {
    let bytes = match format {
        OutputFormat::Csv => flat::write_csv(table)?,
        OutputFormat::Xlsx => styled::write_xlsx(table)?,
        OutputFormat::Zip => bundle::write_bundle(table)?,
    };

    Ok(Artifact {
        file_name: format.file_name(),
        content_type: format.content_type(),
        bytes,
    })
}
