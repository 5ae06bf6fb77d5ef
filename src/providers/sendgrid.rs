//! SendGrid v3 HTTP transport.
//!
//! # Example
//!
//! ```rust,ignore
//! use mailbatch::providers::SendGridTransport;
//!
//! let transport = SendGridTransport::new("SG.xxxxx").compress(true);
//! ```

use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use reqwest::Client;
use serde::Deserialize;
use std::io::Write;

use crate::error::MailError;
use crate::request::{Method, Request};
use crate::transport::{ApiResponse, Transport};

/// Default API host; request paths carry the `/v3` prefix.
pub const SENDGRID_API_URL: &str = "https://api.sendgrid.com";

/// SendGrid API transport.
pub struct SendGridTransport {
    api_key: String,
    client: Client,
    base_url: String,
    compress: bool,
}

impl SendGridTransport {
    /// Create a new SendGrid transport with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(api_key, Client::new())
    }

    /// Create with a custom reqwest client.
    pub fn with_client(api_key: impl Into<String>, client: Client) -> Self {
        Self {
            api_key: api_key.into(),
            client,
            base_url: SENDGRID_API_URL.to_string(),
            compress: false,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Enable gzip compression for requests.
    pub fn compress(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    fn compress_body(&self, body: &[u8]) -> Result<Vec<u8>, MailError> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(body).map_err(|e| {
            MailError::provider("sendgrid", format!("Failed to compress body: {}", e))
        })?;
        encoder.finish().map_err(|e| {
            MailError::provider("sendgrid", format!("Failed to finish compression: {}", e))
        })
    }
}

fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for SendGridTransport {
    async fn submit(&self, request: Request) -> Result<ApiResponse, MailError> {
        let url = format!("{}{}", self.base_url, request.path);
        let json_body = serde_json::to_vec(&request.body)?;

        let mut req = self
            .client
            .request(http_method(request.method), &url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("User-Agent", format!("mailbatch/{}", crate::VERSION));

        let body = if self.compress {
            req = req.header("Content-Encoding", "gzip");
            self.compress_body(&json_body)?
        } else {
            json_body
        };

        let response = req.body(body).send().await?;

        let status = response.status();

        // 202 Accepted, usually with an empty body
        if status.is_success() {
            let message_id = response
                .headers()
                .get("X-Message-Id")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

            let text = response.text().await?;
            let result = ApiResponse::new(status.as_u16(), message_id);
            Ok(match serde_json::from_str(&text) {
                Ok(body) if !text.trim().is_empty() => result.with_body(body),
                _ => result,
            })
        } else {
            let error: SendGridError = response.json().await.unwrap_or(SendGridError {
                errors: vec![SendGridErrorDetail {
                    message: "Unknown error".to_string(),
                    field: None,
                }],
            });

            let error_msg = error
                .errors
                .iter()
                .map(|e| match &e.field {
                    Some(field) => format!("{} ({})", e.message, field),
                    None => e.message.clone(),
                })
                .collect::<Vec<_>>()
                .join("; ");

            Err(MailError::provider_with_status(
                "sendgrid",
                error_msg,
                status.as_u16(),
            ))
        }
    }

    fn provider_name(&self) -> &'static str {
        "sendgrid"
    }
}

#[derive(Debug, Deserialize)]
struct SendGridError {
    errors: Vec<SendGridErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct SendGridErrorDetail {
    message: String,
    field: Option<String>,
}
