//! Client for a remote visitsheet service.
//!
//! Sends an export to `/convert` and decodes the base64 artifact it returns.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;

use super::types::ConvertRequest;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::export::OutputFormat;

/// Remote conversion client
pub struct ConvertClient {
    client: Client,
    base_url: String,
}

impl ConvertClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(base_url, Client::new())
    }

    /// Use a preconfigured reqwest client (proxy, timeouts, TLS).
    pub fn with_http_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.api_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Convert an export remotely and return the artifact bytes.
    pub async fn convert(&self, csv: &[u8], format: OutputFormat) -> Result<Vec<u8>, ClientError> {
        let url = format!("{}/convert", self.base_url);
        let format_param = format.to_string();

        let response = self
            .client
            .post(&url)
            .query(&[("format", format_param.as_str())])
            .json(&ConvertRequest::from_bytes(csv))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(STANDARD.decode(body.trim())?)
    }
}
