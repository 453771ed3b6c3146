//! Error types for the visitsheet conversion pipeline.
//!
//! - [`CsvError`] - Reading and decoding the attendance export
//! - [`TransformError`] - Schema and field derivation failures
//! - [`ExportError`] - Writing the flat, styled and bundled outputs
//! - [`PipelineError`] - Top-level conversion errors
//! - [`ServerError`] - HTTP boundary errors
//! - [`ClientError`] - Remote conversion client errors
//! - [`ConfigError`] - Environment configuration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use axum::http::StatusCode;
use thiserror::Error;

// =============================================================================
// CSV Reading Errors
// =============================================================================

/// Errors while reading the raw export.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode bytes.
    #[error("Failed to decode content: {0}")]
    EncodingError(String),

    /// Invalid CSV format.
    #[error("Invalid CSV format: {0}")]
    ParseError(String),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors while deriving attendance records from raw rows.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A column required by the export contract is absent.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// `Subject/Course/Section` does not split into exactly three tokens.
    #[error("Line {line}: malformed Subject/Course/Section '{value}' (expected 'SUBJECT COURSE SECTION')")]
    MalformedSection { line: usize, value: String },

    /// The shifted visit count is not an integer.
    #[error("Line {line}: invalid visit count '{value}'")]
    InvalidVisitCount { line: usize, value: String },

    /// A visit sum does not fit in an `i64`.
    #[error("Visit total overflows in {scope}")]
    VisitOverflow { scope: String },
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while serializing the report table.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Flat CSV writer failure.
    #[error("CSV writer error: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet writer failure.
    #[error("XLSX writer error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Bundle archive failure.
    #[error("ZIP writer error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// IO error.
    #[error("Export IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level conversion errors.
///
/// This is the error type returned by [`crate::transform::pipeline::convert_bytes`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV reading error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Record derivation error.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Serialization error.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

impl PipelineError {
    /// Short machine-readable kind, used in error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Csv(_) => "csv",
            PipelineError::Transform(TransformError::MissingColumn(_)) => "schema",
            PipelineError::Transform(TransformError::MalformedSection { .. }) => "malformed_section",
            PipelineError::Transform(TransformError::InvalidVisitCount { .. }) => "invalid_visit_count",
            PipelineError::Transform(TransformError::VisitOverflow { .. }) => "visit_overflow",
            PipelineError::Export(_) => "export",
        }
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP boundary errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("{0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ServerError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Pipeline(PipelineError::Csv(_)) => StatusCode::BAD_REQUEST,
            ServerError::Pipeline(PipelineError::Transform(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Pipeline(PipelineError::Export(_)) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short machine-readable kind, used in error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerError::Pipeline(e) => e.kind(),
            ServerError::BadRequest(_) => "bad_request",
            ServerError::Internal(_) => "internal",
        }
    }
}

// =============================================================================
// Client Errors
// =============================================================================

/// Errors from the remote conversion client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not valid base64.
    #[error("Invalid base64 response: {0}")]
    Decode(#[from] base64::DecodeError),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for record derivation.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
