//! Assemble the final report rows.
//!
//! Aggregates are attached to records, then separator rows are planned as
//! `(after_index, row)` pairs and merged with the records in a single pass.

use super::grouper::{total_visits, SubjectRun};
use crate::error::TransformResult;
use crate::models::{AttendanceRecord, OutputRow};

/// A synthetic row to emit right after the record at `after`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub after: usize,
    pub row: OutputRow,
}

/// One `SectionCount` after the last record of every subject run.
pub fn insertion_plan(subjects: &[SubjectRun]) -> Vec<Insertion> {
    subjects
        .iter()
        .map(|s| Insertion {
            after: s.last(),
            row: OutputRow::SectionCount {
                count: s.course_count(),
            },
        })
        .collect()
}

/// Build the output sequence: data rows, section separators, grand total.
pub fn assemble(
    records: Vec<AttendanceRecord>,
    subjects: &[SubjectRun],
) -> TransformResult<Vec<OutputRow>> {
    let mut sums: Vec<Option<i64>> = vec![None; records.len()];
    let mut totals: Vec<Option<i64>> = vec![None; records.len()];

    for subject in subjects {
        for course in &subject.courses {
            sums[course.last()] = Some(course.visits);
        }
        totals[subject.last()] = Some(subject.visits);
    }

    let total_sections: usize = subjects.iter().map(SubjectRun::course_count).sum();
    let total_visits = total_visits(subjects)?;

    let plan = insertion_plan(subjects);
    let mut pending = plan.into_iter().peekable();
    let mut rows = Vec::with_capacity(records.len() + subjects.len() + 1);

    for (i, record) in records.into_iter().enumerate() {
        rows.push(OutputRow::Data {
            record,
            sum_visits: sums[i],
            total_visits: totals[i],
        });
        while let Some(insertion) = pending.next_if(|ins| ins.after == i) {
            rows.push(insertion.row);
        }
    }

    rows.push(OutputRow::GrandTotal {
        total_sections,
        total_visits,
    });

    Ok(rows)
}
