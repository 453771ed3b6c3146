//! Raw rows to typed attendance records.
//!
//! # The visit-count shift
//!
//! The upstream export prints each student's visit count on the *following*
//! line's `Student` cell (`"Last, First: N"`). Record *i* therefore takes its
//! count from row *i+1*, in this exact order:
//!
//! ```text
//! 1. drop rows with a blank Student
//! 2. pair every row with the next row's ": N" segment
//! 3. drop rows with a blank Student ID
//! ```
//!
//! Reordering the steps changes the pairing whenever blank rows are adjacent.
//! The row with no successor has no count and is dropped.

use crate::error::{TransformError, TransformResult};
use crate::models::{
    AttendanceRecord, RawRow, COL_EMAIL, COL_MAJOR, COL_SECTION, COL_STUDENT, COL_STUDENT_ID,
    REQUIRED_COLUMNS,
};
use crate::parser::ParseResult;

/// Extract the rows the pipeline reads from a parsed table.
///
/// Fails on the first required column that is absent. `Date, Time Started`
/// and `Visit Time Hours` are checked here and never read again.
pub fn raw_rows(table: &ParseResult) -> TransformResult<Vec<RawRow>> {
    for column in REQUIRED_COLUMNS {
        if table.column_index(column).is_none() {
            return Err(TransformError::MissingColumn(column.to_string()));
        }
    }

    let index = |name: &str| {
        table
            .column_index(name)
            .ok_or_else(|| TransformError::MissingColumn(name.to_string()))
    };
    let student = index(COL_STUDENT)?;
    let student_id = index(COL_STUDENT_ID)?;
    let section = index(COL_SECTION)?;
    let major = index(COL_MAJOR)?;
    let email = index(COL_EMAIL)?;

    let rows = table
        .records
        .iter()
        .zip(&table.lines)
        .map(|(record, &line)| {
            let cell = |i: usize| record.get(i).unwrap_or("");
            RawRow {
                line,
                student: non_blank(cell(student)),
                student_id: non_blank(cell(student_id)),
                section: non_blank(cell(section)),
                major: cell(major).to_string(),
                email: cell(email).to_string(),
            }
        })
        .collect();

    Ok(rows)
}

/// Derive attendance records from raw rows, in input order.
pub fn derive_records(rows: Vec<RawRow>) -> TransformResult<Vec<AttendanceRecord>> {
    // 1. Rows without a student are not attendance rows
    let named: Vec<RawRow> = rows.into_iter().filter(|r| r.student.is_some()).collect();

    // 2. Pair each row with its successor's count, before the ID drop
    let counts: Vec<ShiftedCount> = (0..named.len())
        .map(|i| match named.get(i + 1) {
            Some(next) => ShiftedCount::Read {
                line: next.line,
                value: visit_segment(next.student.as_deref()),
            },
            None => ShiftedCount::NoSuccessor,
        })
        .collect();

    // 3. Rows without an ID are not attendance rows either
    let kept: Vec<(RawRow, ShiftedCount)> = named
        .into_iter()
        .zip(counts)
        .filter(|(row, _)| row.student_id.is_some())
        .collect();

    let mut records = Vec::with_capacity(kept.len());
    let mut last_section: Option<String> = None;

    for (row, count) in kept {
        // Forward-fill runs over surviving rows only
        if row.section.is_some() {
            last_section = row.section.clone();
        }

        let visits = match count {
            ShiftedCount::NoSuccessor => continue,
            ShiftedCount::Read { line, value } => parse_visits(line, value.as_deref())?,
        };

        let filled = last_section
            .as_deref()
            .ok_or_else(|| TransformError::MalformedSection {
                line: row.line,
                value: String::new(),
            })?;
        let (subject, course, section) = split_section(row.line, filled)?;

        let student = row.student.as_deref().unwrap_or("");
        let (last_name, first_name) = split_name(student);

        records.push(AttendanceRecord {
            last_name,
            first_name,
            visits,
            student_id: normalize_student_id(row.student_id.as_deref().unwrap_or("")),
            subject,
            course,
            section,
            major: row.major,
            email: row.email,
        });
    }

    Ok(records)
}

/// Outcome of reading the next row's visit segment.
#[derive(Debug, Clone, PartialEq)]
enum ShiftedCount {
    /// Last named row; nothing follows it.
    NoSuccessor,
    /// Successor at `line`; `value` is `None` when its cell has no `": "` part.
    Read { line: usize, value: Option<String> },
}

fn non_blank(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Second `": "` segment of a `Student` cell.
fn visit_segment(student: Option<&str>) -> Option<String> {
    student?.split(": ").nth(1).map(str::to_string)
}

fn parse_visits(line: usize, raw: Option<&str>) -> TransformResult<i64> {
    let raw = raw.unwrap_or("");
    raw.trim()
        .parse::<i64>()
        .map_err(|_| TransformError::InvalidVisitCount {
            line,
            value: raw.to_string(),
        })
}

/// `"Last, First"` → `(last, first)`; first is empty without a `", "`.
pub fn split_name(student: &str) -> (String, String) {
    let mut parts = student.split(", ");
    let last = parts.next().unwrap_or("").to_string();
    let first = parts.next().unwrap_or("").to_string();
    (last, first)
}

/// Split `"SUBJECT COURSE SECTION"` on single spaces into exactly three tokens.
///
/// Tokens may be empty: `"MATH 101 "` has a blank section.
pub fn split_section(line: usize, value: &str) -> TransformResult<(String, String, String)> {
    let tokens: Vec<&str> = value.split(' ').collect();
    match tokens.as_slice() {
        [subject, course, section] => {
            Ok((subject.to_string(), course.to_string(), section.to_string()))
        }
        _ => Err(TransformError::MalformedSection {
            line,
            value: value.to_string(),
        }),
    }
}

/// Remove every literal `".0"` then prefix `"0"`.
///
/// Text replacement, not numeric rounding: `"12345.0"` → `"012345"`.
pub fn normalize_student_id(raw: &str) -> String {
    format!("0{}", raw.trim().replace(".0", ""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    fn row(line: usize, student: &str, id: &str, section: &str) -> RawRow {
        RawRow {
            line,
            student: non_blank(student),
            student_id: non_blank(id),
            section: non_blank(section),
            major: "Undeclared".into(),
            email: format!("s{}@example.edu", line),
        }
    }

    #[test]
    fn test_visits_come_from_next_row() {
        let rows = vec![
            row(2, "Doe, Jane: 9", "1001", "MATH 101 A"),
            row(3, "Roe, Rick: 4", "1002", ""),
            row(4, "Poe, Pat: 7", "1003", ""),
        ];

        let records = derive_records(rows).unwrap();

        // Last row has no successor and is dropped
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].last_name, "Doe");
        assert_eq!(records[0].visits, 4);
        assert_eq!(records[1].last_name, "Roe");
        assert_eq!(records[1].visits, 7);
    }

    #[test]
    fn test_blank_student_dropped_before_shift() {
        let rows = vec![
            row(2, "Doe, Jane: 1", "1001", "MATH 101 A"),
            row(3, "", "", ""),
            row(4, "Roe, Rick: 5", "1002", ""),
            row(5, "Total: 0", "", ""),
        ];

        let records = derive_records(rows).unwrap();

        // The blank row is gone before pairing, so Doe reads Roe's count
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].visits, 5);
        assert_eq!(records[1].visits, 0);
    }

    #[test]
    fn test_blank_id_dropped_after_shift() {
        let rows = vec![
            row(2, "Doe, Jane: 1", "1001", "MATH 101 A"),
            row(3, "Summary: 6", "", ""),
            row(4, "Roe, Rick: 2", "1002", ""),
            row(5, "Footer: 3", "", ""),
        ];

        let records = derive_records(rows).unwrap();

        // The ID-less row still supplied Doe's count before being dropped
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].visits, 6);
        assert_eq!(records[1].visits, 3);
    }

    #[test]
    fn test_forward_fill_sections() {
        let rows = vec![
            row(2, "A, One: 0", "1", "CS 101 A"),
            row(3, "B, Two: 1", "2", ""),
            row(4, "C, Three: 2", "3", ""),
            row(5, "End: 3", "", ""),
        ];

        let records = derive_records(rows).unwrap();

        assert_eq!(records.len(), 3);
        for r in &records {
            assert_eq!(r.subject, "CS");
            assert_eq!(r.course, "101");
            assert_eq!(r.section, "A");
        }
    }

    #[test]
    fn test_missing_segment_is_invalid_visit_count() {
        let rows = vec![
            row(2, "Doe, Jane: 1", "1001", "MATH 101 A"),
            row(3, "Roe, Rick", "1002", ""),
        ];

        // Reported at the line the count is read from
        let err = derive_records(rows).unwrap_err();
        assert!(matches!(err, TransformError::InvalidVisitCount { line: 3, .. }));
    }

    #[test]
    fn test_non_numeric_visit_count() {
        let rows = vec![
            row(2, "Doe, Jane: 1", "1001", "MATH 101 A"),
            row(3, "Roe, Rick: many", "1002", ""),
            row(4, "End: 1", "", ""),
        ];

        let err = derive_records(rows).unwrap_err();
        match err {
            TransformError::InvalidVisitCount { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "many");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_section() {
        let rows = vec![
            row(2, "Doe, Jane: 1", "1001", "MATH 101"),
            row(3, "End: 2", "", ""),
        ];

        let err = derive_records(rows).unwrap_err();
        assert!(matches!(err, TransformError::MalformedSection { line: 2, .. }));
    }

    #[test]
    fn test_nothing_to_fill_from_is_malformed() {
        let rows = vec![row(2, "Doe, Jane: 1", "1001", ""), row(3, "End: 2", "", "")];

        let err = derive_records(rows).unwrap_err();
        assert!(matches!(
            err,
            TransformError::MalformedSection { line: 2, ref value } if value.is_empty()
        ));
    }

    #[test]
    fn test_split_name_keeps_count_suffix() {
        assert_eq!(
            split_name("Doe, Jane: 3"),
            ("Doe".to_string(), "Jane: 3".to_string())
        );
        assert_eq!(split_name("Mononym"), ("Mononym".to_string(), String::new()));
    }

    #[test]
    fn test_split_section_requires_single_spaces() {
        assert!(split_section(1, "CS 101 A").is_ok());
        assert!(split_section(1, "CS  101 A").is_err());
        assert!(split_section(1, "CS 101 A extra").is_err());
        assert!(split_section(1, "CS 101").is_err());
    }

    #[test]
    fn test_split_section_allows_empty_tokens() {
        assert_eq!(
            split_section(1, "MATH 101 ").unwrap(),
            ("MATH".to_string(), "101".to_string(), String::new())
        );

        let rows = vec![
            row(2, "Doe, Jane: 1", "1001", "MATH 101 "),
            row(3, "End: 2", "", ""),
        ];
        let records = derive_records(rows).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].course, "101");
        assert_eq!(records[0].section, "");
        assert_eq!(records[0].visits, 2);
    }

    #[test]
    fn test_normalize_student_id() {
        assert_eq!(normalize_student_id("12345.0"), "012345");
        assert_eq!(normalize_student_id("12345"), "012345");
        assert_eq!(normalize_student_id("A77"), "0A77");
    }

    #[test]
    fn test_raw_rows_reports_missing_column() {
        let table = parse_str(
            "Student,Student ID,Subject/Course/Section,Major,Email,Visit Time Hours\nx,1,A B C,m,e,1",
            ',',
            "utf-8".into(),
        )
        .unwrap();

        let err = raw_rows(&table).unwrap_err();
        match err {
            TransformError::MissingColumn(col) => assert_eq!(col, "Date, Time Started"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_raw_rows_any_column_order() {
        let table = parse_str(
            "Email,Major,\"Date, Time Started\",Subject/Course/Section,Visit Time Hours,Student ID,Student\n\
             e@x.edu,Art,\"1/1/2024, 9:00\",ART 100 B,1.5,42.0,\"Doe, Jane: 2\"",
            ',',
            "utf-8".into(),
        )
        .unwrap();

        let rows = raw_rows(&table).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[0].student.as_deref(), Some("Doe, Jane: 2"));
        assert_eq!(rows[0].student_id.as_deref(), Some("42.0"));
        assert_eq!(rows[0].section.as_deref(), Some("ART 100 B"));
        assert_eq!(rows[0].major, "Art");
        assert_eq!(rows[0].email, "e@x.edu");
    }
}
