//! # Visitsheet - tutoring attendance reports
//!
//! Visitsheet turns the attendance export of a tutoring center into a
//! report grouped by subject and course, written as a flat CSV and as a
//! color-coded XLSX workbook.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Export CSV │────▶│   Parser    │────▶│  Transform  │────▶│   Export    │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (runs+sums) │     │ csv/xlsx/zip│
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use visitsheet::{convert_file, OutputFormat};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let result = convert_file("attendance.csv".as_ref())?;
//!     let artifact = result.render(OutputFormat::Csv)?;
//!     println!("{} report rows", result.table.rows.len());
//!     std::fs::write(artifact.file_name, artifact.bytes)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Raw rows, attendance records and report rows
//! - [`parser`] - CSV parsing with auto-detection
//! - [`transform`] - Record derivation, grouping, assembly and pipeline
//! - [`export`] - Report table and its CSV, XLSX and ZIP renderings
//! - [`config`] - Environment configuration
//! - [`api`] - HTTP API server and client

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Output
pub mod export;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ClientError, ConfigError, CsvError, ExportError, PipelineError, PipelineResult, ServerError,
    TransformError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{AttendanceRecord, OutputRow, RawRow};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes_auto, parse_csv_file_auto,
    ParseResult,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    convert_bytes, convert_file, convert_parsed, inspect_file, ConversionResult, CsvInfo,
};

// =============================================================================
// Re-exports - Export
// =============================================================================

pub use export::{render, Artifact, OutputFormat, ReportTable};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{ClientConfig, ServerConfig};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}
