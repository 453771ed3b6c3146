//! Domain models for the visitsheet conversion pipeline.
//!
//! - [`RawRow`] - One source line of the attendance export
//! - [`AttendanceRecord`] - A derived, typed record
//! - [`OutputRow`] - A row of the final report (data or synthetic)

use serde::{Deserialize, Serialize};

// =============================================================================
// Export column contract
// =============================================================================

/// Timestamp column, discarded.
pub const COL_DATE_STARTED: &str = "Date, Time Started";
/// Duration column, discarded.
pub const COL_VISIT_HOURS: &str = "Visit Time Hours";
/// `"Last, First: VisitCount"`.
pub const COL_STUDENT: &str = "Student";
pub const COL_STUDENT_ID: &str = "Student ID";
/// Sparse `"SUBJECT COURSE SECTION"`, forward-filled.
pub const COL_SECTION: &str = "Subject/Course/Section";
pub const COL_MAJOR: &str = "Major";
pub const COL_EMAIL: &str = "Email";

/// Every column the upstream export must provide, in any order.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    COL_DATE_STARTED,
    COL_VISIT_HOURS,
    COL_STUDENT,
    COL_STUDENT_ID,
    COL_SECTION,
    COL_MAJOR,
    COL_EMAIL,
];

// =============================================================================
// Raw rows
// =============================================================================

/// One line of the source table, restricted to the columns the pipeline reads.
///
/// Blank cells are `None` for the fields whose blankness carries meaning
/// (drop rules and forward-fill); passthrough fields keep an empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRow {
    /// 1-based line number in the source file.
    pub line: usize,
    pub student: Option<String>,
    pub student_id: Option<String>,
    pub section: Option<String>,
    pub major: String,
    pub email: String,
}

// =============================================================================
// Derived records
// =============================================================================

/// A typed attendance record, the unit grouping operates on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub last_name: String,
    pub first_name: String,
    /// Read from the following row's `Student` cell.
    pub visits: i64,
    pub student_id: String,
    pub subject: String,
    pub course: String,
    pub section: String,
    pub major: String,
    pub email: String,
}

// =============================================================================
// Report rows
// =============================================================================

/// A row of the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutputRow {
    /// A real record with its run aggregates.
    #[serde(rename_all = "camelCase")]
    Data {
        record: AttendanceRecord,
        /// Set on the last record of a course run.
        sum_visits: Option<i64>,
        /// Set on the last record of a subject run.
        total_visits: Option<i64>,
    },

    /// Inserted after each subject run: how many course runs it held.
    SectionCount { count: usize },

    /// Appended once after every other row.
    #[serde(rename_all = "camelCase")]
    GrandTotal {
        total_sections: usize,
        total_visits: i64,
    },
}

impl OutputRow {
    /// The record behind a data row.
    pub fn record(&self) -> Option<&AttendanceRecord> {
        match self {
            OutputRow::Data { record, .. } => Some(record),
            _ => None,
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self, OutputRow::Data { .. })
    }
}
