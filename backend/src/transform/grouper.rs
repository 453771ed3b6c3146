//! Group attendance records into subject and course runs.
//!
//! Groups are *runs*: maximal stretches of adjacent records sharing a key,
//! discovered in one left-to-right scan. The export is already sorted by
//! section, so a key that reappears later starts a new, independent run.
//!
//! # Architecture
//!
//! ```text
//! records                         runs
//! ┌──────────────────────┐       ┌────────────────────────────────┐
//! │ MATH 101  visits 2   │       │ MATH [0..5) visits 9           │
//! │ MATH 101  visits 1   │       │   ├─ 101 [0..3) visits 4       │
//! │ MATH 101  visits 1   │  →    │   └─ 205 [3..5) visits 5       │
//! │ MATH 205  visits 3   │       ├────────────────────────────────┤
//! │ MATH 205  visits 2   │       │ PHYS [5..6) visits 1           │
//! │ PHYS 110  visits 1   │       │   └─ 110 [5..6) visits 1       │
//! └──────────────────────┘       └────────────────────────────────┘
//! ```

use serde::Serialize;

use crate::error::{TransformError, TransformResult};
use crate::models::AttendanceRecord;

/// A maximal run of equal `course` inside one subject run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseRun {
    pub course: String,
    /// First record index (inclusive).
    pub start: usize,
    /// One past the last record index.
    pub end: usize,
    /// Sum of visits over the run.
    pub visits: i64,
}

impl CourseRun {
    /// Index of the run's last record.
    pub fn last(&self) -> usize {
        self.end - 1
    }
}

/// A maximal run of equal `subject`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectRun {
    pub subject: String,
    pub start: usize,
    pub end: usize,
    pub visits: i64,
    pub courses: Vec<CourseRun>,
}

impl SubjectRun {
    /// Index of the run's last record.
    pub fn last(&self) -> usize {
        self.end - 1
    }

    /// Number of course runs, printed in the section separator.
    pub fn course_count(&self) -> usize {
        self.courses.len()
    }
}

/// Scan records into nested subject/course runs.
///
/// Fails when a run's visit sum does not fit in an `i64`.
pub fn group_runs(records: &[AttendanceRecord]) -> TransformResult<Vec<SubjectRun>> {
    let mut subjects: Vec<SubjectRun> = Vec::new();

    for (i, record) in records.iter().enumerate() {
        let continues_subject = subjects
            .last()
            .is_some_and(|s| s.subject == record.subject);

        if !continues_subject {
            subjects.push(SubjectRun {
                subject: record.subject.clone(),
                start: i,
                end: i,
                visits: 0,
                courses: Vec::new(),
            });
        }

        // Safe: pushed above when empty
        let Some(subject) = subjects.last_mut() else {
            continue;
        };

        let continues_course = subject
            .courses
            .last()
            .is_some_and(|c| c.course == record.course);

        if !continues_course {
            subject.courses.push(CourseRun {
                course: record.course.clone(),
                start: i,
                end: i,
                visits: 0,
            });
        }

        if let Some(course) = subject.courses.last_mut() {
            course.end = i + 1;
            course.visits = add_visits(course.visits, record.visits, || {
                format!("{} {}", record.subject, record.course)
            })?;
        }
        subject.end = i + 1;
        subject.visits = add_visits(subject.visits, record.visits, || record.subject.clone())?;
    }

    Ok(subjects)
}

/// Sum of visits over every subject run.
pub fn total_visits(subjects: &[SubjectRun]) -> TransformResult<i64> {
    subjects.iter().try_fold(0i64, |acc, s| {
        add_visits(acc, s.visits, || "grand total".to_string())
    })
}

fn add_visits(acc: i64, visits: i64, scope: impl FnOnce() -> String) -> TransformResult<i64> {
    acc.checked_add(visits)
        .ok_or_else(|| TransformError::VisitOverflow { scope: scope() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(subject: &str, course: &str, visits: i64) -> AttendanceRecord {
        AttendanceRecord {
            last_name: "Doe".into(),
            first_name: "Jane".into(),
            visits,
            student_id: "01".into(),
            subject: subject.into(),
            course: course.into(),
            section: "A".into(),
            major: String::new(),
            email: String::new(),
        }
    }

    #[test]
    fn test_nested_runs() {
        let records = vec![
            rec("MATH", "101", 2),
            rec("MATH", "101", 1),
            rec("MATH", "101", 1),
            rec("MATH", "205", 3),
            rec("MATH", "205", 2),
            rec("PHYS", "110", 1),
        ];

        let runs = group_runs(&records).unwrap();

        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].subject, "MATH");
        assert_eq!((runs[0].start, runs[0].end), (0, 5));
        assert_eq!(runs[0].visits, 9);
        assert_eq!(runs[0].course_count(), 2);
        assert_eq!(runs[0].courses[0].visits, 4);
        assert_eq!(runs[0].courses[0].last(), 2);
        assert_eq!(runs[0].courses[1].visits, 5);
        assert_eq!(runs[0].last(), 4);

        assert_eq!(runs[1].subject, "PHYS");
        assert_eq!(runs[1].course_count(), 1);
        assert_eq!(runs[1].last(), 5);
    }

    #[test]
    fn test_non_adjacent_keys_form_separate_runs() {
        let records = vec![
            rec("MATH", "101", 1),
            rec("PHYS", "110", 2),
            rec("MATH", "101", 4),
        ];

        let runs = group_runs(&records).unwrap();

        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].visits, 1);
        assert_eq!(runs[2].subject, "MATH");
        assert_eq!(runs[2].visits, 4);
        assert_eq!(runs[2].start, 2);
    }

    #[test]
    fn test_course_repeated_after_break_counts_twice() {
        let records = vec![
            rec("CS", "101", 1),
            rec("CS", "202", 1),
            rec("CS", "101", 1),
        ];

        let runs = group_runs(&records).unwrap();

        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].course_count(), 3);
    }

    #[test]
    fn test_same_course_across_subjects_splits() {
        let records = vec![rec("MATH", "101", 1), rec("CS", "101", 1)];

        let runs = group_runs(&records).unwrap();

        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].course_count(), 1);
        assert_eq!(runs[1].courses[0].start, 1);
    }

    #[test]
    fn test_empty_input() {
        let runs = group_runs(&[]).unwrap();
        assert!(runs.is_empty());
        assert_eq!(total_visits(&runs).unwrap(), 0);
    }

    #[test]
    fn test_run_sum_overflow_is_an_error() {
        let records = vec![rec("MATH", "101", i64::MAX), rec("MATH", "101", 1)];

        match group_runs(&records).unwrap_err() {
            TransformError::VisitOverflow { scope } => assert_eq!(scope, "MATH 101"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_grand_total_overflow_is_an_error() {
        let records = vec![rec("MATH", "101", i64::MAX), rec("PHYS", "110", i64::MAX)];
        let runs = group_runs(&records).unwrap();

        assert!(matches!(
            total_visits(&runs),
            Err(TransformError::VisitOverflow { .. })
        ));
    }
}
