//! Transformation module.
//!
//! This module turns the attendance export into report rows:
//! - Records: raw rows to typed records (visit shift, forward-fill)
//! - Grouper: subject and course runs with visit sums
//! - Assembly: data rows plus separator and total rows
//! - Pipeline: one-shot orchestration

pub mod assembly;
pub mod grouper;
pub mod pipeline;
pub mod records;

pub use assembly::{assemble, insertion_plan, Insertion};
pub use grouper::{group_runs, total_visits, CourseRun, SubjectRun};
pub use pipeline::*;
pub use records::{derive_records, raw_rows};
