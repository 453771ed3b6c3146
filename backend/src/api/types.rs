//! REST API types.
//!
//! The `/convert` endpoint takes the export base64-encoded inside JSON and
//! answers with the base64-encoded artifact. Failures use [`error_response`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ServerError;
use crate::transform::pipeline::ConversionResult;

/// Message returned when a request carries no CSV payload.
pub const MISSING_PAYLOAD: &str =
    "CSV data not found. Send CSV as base64-encoded string in \"csv_data\" field.";

/// Query string of `/convert` and `/api/upload`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormatQuery {
    /// `csv`, `xlsx` or `zip` (aliases accepted); defaults to `zip`.
    pub format: Option<String>,
}

/// JSON body of `/convert`.
///
/// Accepts `{"csv_data": "..."}`, `{"csv_file": "..."}` or a bare JSON
/// string, each holding the base64-encoded export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConvertRequest {
    Raw(String),
    Fields {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        csv_data: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        csv_file: Option<String>,
    },
}

impl ConvertRequest {
    /// Build the request a client sends.
    pub fn from_bytes(csv: &[u8]) -> Self {
        ConvertRequest::Fields {
            csv_data: Some(STANDARD.encode(csv)),
            csv_file: None,
        }
    }

    /// The base64 payload, `csv_data` taking precedence.
    pub fn payload(&self) -> Option<&str> {
        match self {
            ConvertRequest::Raw(s) => Some(s.as_str()),
            ConvertRequest::Fields { csv_data, csv_file } => {
                csv_data.as_deref().or(csv_file.as_deref())
            }
        }
    }

    /// Decode the CSV bytes carried by the request.
    pub fn decode(&self) -> Result<Vec<u8>, ServerError> {
        let payload = self
            .payload()
            .ok_or_else(|| ServerError::BadRequest(MISSING_PAYLOAD.to_string()))?;
        STANDARD
            .decode(payload.trim())
            .map_err(|e| ServerError::BadRequest(format!("Invalid base64 CSV data: {}", e)))
    }
}

/// Summary of a conversion, logged once per request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConversionSummary {
    pub rows_read: usize,
    pub records: usize,
    pub subjects: usize,
    pub sections: usize,
    pub total_visits: i64,
}

impl From<&ConversionResult> for ConversionSummary {
    fn from(result: &ConversionResult) -> Self {
        Self {
            rows_read: result.csv_info.row_count,
            records: result.record_count,
            subjects: result.subject_count,
            sections: result.section_count,
            total_visits: result.total_visits,
        }
    }
}

/// Create an error response body
pub fn error_response(error: &ServerError) -> Value {
    json!({
        "requestId": Uuid::new_v4().to_string(),
        "status": "error",
        "kind": error.kind(),
        "error": error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shapes() {
        let data: ConvertRequest = serde_json::from_str(r#"{"csv_data":"YQ=="}"#).unwrap();
        assert_eq!(data.payload(), Some("YQ=="));

        let file: ConvertRequest = serde_json::from_str(r#"{"csv_file":"Yg=="}"#).unwrap();
        assert_eq!(file.payload(), Some("Yg=="));

        let raw: ConvertRequest = serde_json::from_str(r#""Yw==""#).unwrap();
        assert_eq!(raw.payload(), Some("Yw=="));

        let empty: ConvertRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.payload(), None);
    }

    #[test]
    fn test_decode_round_trip_and_errors() {
        let request = ConvertRequest::from_bytes(b"Student\nx");
        assert_eq!(request.decode().unwrap(), b"Student\nx");

        let missing: ConvertRequest = serde_json::from_str("{}").unwrap();
        let err = missing.decode().unwrap_err();
        assert!(err.to_string().contains("csv_data"));

        let garbage = ConvertRequest::Raw("not base64!".into());
        assert!(matches!(garbage.decode(), Err(ServerError::BadRequest(_))));
    }

    #[test]
    fn test_client_request_body() {
        let body = serde_json::to_value(ConvertRequest::from_bytes(b"a,b")).unwrap();
        assert_eq!(body, json!({ "csv_data": "YSxi" }));

        let back: ConvertRequest = serde_json::from_value(body).unwrap();
        assert_eq!(back.decode().unwrap(), b"a,b");
    }

    #[test]
    fn test_error_body() {
        let body = error_response(&ServerError::BadRequest("nope".into()));
        assert_eq!(body["status"], "error");
        assert_eq!(body["kind"], "bad_request");
        assert_eq!(body["error"], "nope");
        assert!(body["requestId"].as_str().is_some());
    }
}
