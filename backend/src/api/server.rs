//! HTTP Server for the visitsheet API.
//!
//! Thin glue around the conversion pipeline: every conversion request runs
//! the pipeline exactly once on its own input and renders one artifact.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                                  |
//! |--------|-------------------|----------------------------------------------|
//! | GET    | `/health`         | Health check                                 |
//! | POST   | `/convert`        | Base64 JSON in, base64 artifact out          |
//! | POST   | `/api/upload`     | Multipart CSV upload, raw artifact out       |
//! | GET    | `/api/logs`       | SSE stream for real-time logs                |

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Query},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::{Any, CorsLayer};

use super::logs::{log_error, log_info, log_success, LOG_BROADCASTER};
use super::types::{error_response, ConversionSummary, ConvertRequest, FormatQuery, MISSING_PAYLOAD};
use crate::config::ServerConfig;
use crate::error::{PipelineError, ServerError, ServerResult};
use crate::export::{Artifact, OutputFormat};
use crate::transform::pipeline::convert_bytes;

type Rejection = (StatusCode, Json<Value>);

/// Build the application router
pub fn router(config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/convert", post(convert))
        .route("/api/upload", post(upload_csv))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(cors)
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.socket_addr();
    let app = router(&config);

    eprintln!("🚀 visitsheet server running on http://{}", addr);
    eprintln!("   POST /convert    - Base64 CSV in, base64 report out");
    eprintln!("   POST /api/upload - Multipart CSV upload");
    eprintln!("   GET  /api/logs   - SSE log stream");
    eprintln!("   GET  /health     - Health check");
    eprintln!();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "visitsheet",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "convert": "POST /convert?format=csv|xlsx|zip",
            "upload": "POST /api/upload?format=csv|xlsx|zip",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Base64 conversion endpoint
async fn convert(Query(query): Query<FormatQuery>, body: Bytes) -> Result<Response, Rejection> {
    let format = OutputFormat::from_query(query.format.as_deref());

    let request: ConvertRequest = if body.iter().all(u8::is_ascii_whitespace) {
        return Err(reject(ServerError::BadRequest(MISSING_PAYLOAD.to_string())));
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            reject(ServerError::BadRequest(format!("Invalid JSON body: {}", e)))
        })?
    };

    let csv = request.decode().map_err(reject)?;
    let artifact = run_conversion("base64 request", &csv, format).map_err(reject)?;
    let encoded = STANDARD.encode(&artifact.bytes);

    Ok(attachment(&artifact, encoded))
}

/// Multipart upload endpoint
async fn upload_csv(
    Query(query): Query<FormatQuery>,
    mut multipart: Multipart,
) -> Result<Response, Rejection> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut format_field: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        reject(ServerError::BadRequest(format!("Multipart error: {}", e)))
    })? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                file_name = field.file_name().map(|s| s.to_string());
                file_data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| reject(ServerError::BadRequest(format!("Read error: {}", e))))?
                        .to_vec(),
                );
            }
            "format" => {
                format_field = Some(field.text().await.map_err(|e| {
                    reject(ServerError::BadRequest(format!("Read error: {}", e)))
                })?);
            }
            _ => {}
        }
    }

    let bytes = file_data.ok_or_else(|| reject(ServerError::BadRequest("No file provided".into())))?;
    let format = OutputFormat::from_query(query.format.as_deref().or(format_field.as_deref()));

    let label = file_name.unwrap_or_else(|| "upload".to_string());
    let artifact = run_conversion(&label, &bytes, format).map_err(reject)?;

    Ok(attachment(&artifact, artifact.bytes.clone()))
}

/// Run the pipeline once and render the requested artifact.
fn run_conversion(label: &str, csv: &[u8], format: OutputFormat) -> ServerResult<Artifact> {
    log_info(format!("📄 New conversion: {} ({} bytes, format {})", label, csv.len(), format));

    let result = convert_bytes(csv)?;
    let artifact = result.render(format).map_err(PipelineError::from)?;

    let summary = ConversionSummary::from(&result);
    log_success(format!(
        "{} → {} records, {} sections, {} visits ({} bytes)",
        artifact.file_name,
        summary.records,
        summary.sections,
        summary.total_visits,
        artifact.bytes.len()
    ));

    Ok(artifact)
}

fn attachment(artifact: &Artifact, body: impl IntoResponse) -> Response {
    (
        [
            (header::CONTENT_TYPE, artifact.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", artifact.file_name),
            ),
        ],
        body,
    )
        .into_response()
}

fn reject(err: ServerError) -> Rejection {
    log_error(format!("Conversion failed: {}", err));
    (err.status(), Json(error_response(&err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::FromRequest;

    const EXPORT: &str = "\"Date, Time Started\",Student,Student ID,Subject/Course/Section,Major,Email,Visit Time Hours\n\
\"1/8/2024, 9:00\",\"Adams, Ann: 9\",1001.0,MATH 101 A,Biology,aa@x.edu,1.0\n\
\"1/8/2024, 9:30\",\"Baker, Bo: 2\",1002.0,,Chemistry,bb@x.edu,0.5\n\
\"1/9/2024, 9:00\",\"Fox, Flo: 3\",1006.0,PHYS 110 A,History,ff@x.edu,2.0\n\
,\"Total: 1\",,,,,\n";

    fn json_body(csv: &str) -> Bytes {
        let request = json!({ "csv_data": STANDARD.encode(csv) });
        Bytes::from(serde_json::to_vec(&request).unwrap())
    }

    fn query(format: Option<&str>) -> Query<FormatQuery> {
        Query(FormatQuery {
            format: format.map(str::to_string),
        })
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[tokio::test]
    async fn test_convert_csv() {
        let response = convert(query(Some("csv")), json_body(EXPORT)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"converted.csv\""
        );

        let decoded = STANDARD.decode(body_bytes(response).await).unwrap();
        let text = String::from_utf8(decoded).unwrap();
        assert!(text.starts_with("Course,Last Name,First Name"));
        assert!(text.contains("101,Baker,Bo: 2,01002,3,Chemistry,bb@x.edu,5,5"));
        assert!(text.trim_end().ends_with("Total: 2 sections,,,,,,,6,"));
    }

    #[tokio::test]
    async fn test_convert_defaults_to_bundle() {
        let response = convert(query(None), json_body(EXPORT)).await.unwrap();

        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");
        let decoded = STANDARD.decode(body_bytes(response).await).unwrap();
        assert_eq!(&decoded[..2], b"PK");
    }

    #[tokio::test]
    async fn test_convert_styled_only() {
        let response = convert(query(Some("styled-only")), json_body(EXPORT))
            .await
            .unwrap();

        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
    }

    #[tokio::test]
    async fn test_missing_payload_is_bad_request() {
        let (status, Json(body)) = convert(query(None), Bytes::from_static(b"{}"))
            .await
            .unwrap_err();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert!(body["error"].as_str().unwrap().contains("csv_data"));

        let (status, _) = convert(query(None), Bytes::new()).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_json_is_bad_request() {
        let (status, Json(body)) = convert(query(None), Bytes::from_static(b"{csv"))
            .await
            .unwrap_err();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "bad_request");
    }

    #[tokio::test]
    async fn test_schema_error_is_unprocessable() {
        let csv = "Student,Student ID\n\"Doe, Jane: 1\",1\n";
        let (status, Json(body)) = convert(query(Some("csv")), json_body(csv))
            .await
            .unwrap_err();

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "schema");
        assert!(body["error"].as_str().unwrap().contains("Date, Time Started"));
    }

    #[tokio::test]
    async fn test_visit_overflow_is_unprocessable() {
        let csv = format!(
            "\"Date, Time Started\",Student,Student ID,Subject/Course/Section,Major,Email,Visit Time Hours\n\
\"1/8/2024, 9:00\",\"Adams, Ann: 1\",1001.0,MATH 101 A,Biology,aa@x.edu,1.0\n\
\"1/8/2024, 9:30\",\"Baker, Bo: {max}\",1002.0,,Chemistry,bb@x.edu,0.5\n\
\"1/8/2024, 10:00\",\"Cole, Cy: {max}\",1003.0,,Art,cc@x.edu,0.5\n",
            max = i64::MAX
        );
        let (status, Json(body)) = convert(query(Some("csv")), json_body(&csv))
            .await
            .unwrap_err();

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "visit_overflow");
    }

    #[tokio::test]
    async fn test_upload_reads_format_field() {
        let boundary = "visitsheet-boundary";
        let body = format!(
            "--{b}\r\n\
Content-Disposition: form-data; name=\"format\"\r\n\r\n\
csv\r\n\
--{b}\r\n\
Content-Disposition: form-data; name=\"file\"; filename=\"export.csv\"\r\n\
Content-Type: text/csv\r\n\r\n\
{csv}\r\n\
--{b}--\r\n",
            b = boundary,
            csv = EXPORT
        );
        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(axum::body::Body::from(body))
            .unwrap();
        let multipart = Multipart::from_request(request, &()).await.unwrap();

        let response = upload_csv(query(None), multipart).await.unwrap();

        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
        let text = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(text.starts_with("Course,Last Name"));
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "visitsheet");
    }
}
