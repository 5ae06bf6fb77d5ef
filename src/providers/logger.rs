//! Logger transport that only logs requests.
//!
//! Useful for staging environments or when you want to see what would be sent
//! without calling the API.

use async_trait::async_trait;

use crate::error::MailError;
use crate::request::Request;
use crate::transport::{ApiResponse, Transport};

/// Logger transport that emits tracing events for requests.
pub struct LoggerTransport {
    /// If true, log the full JSON body. If false, just a recipient summary.
    log_full: bool,
}

impl LoggerTransport {
    /// Create a logger transport with brief output (just recipients).
    pub fn new() -> Self {
        Self { log_full: false }
    }

    /// Create a logger transport that also logs the request body.
    pub fn full() -> Self {
        Self { log_full: true }
    }

    /// Set whether to log the full request body.
    pub fn log_full(mut self, full: bool) -> Self {
        self.log_full = full;
        self
    }
}

impl Default for LoggerTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Recipient emails found in a `mail/send` body.
fn recipient_emails(request: &Request) -> Vec<&str> {
    request.body["personalizations"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|p| p["to"].as_array())
        .flatten()
        .filter_map(|to| to["email"].as_str())
        .collect()
}

#[async_trait]
impl Transport for LoggerTransport {
    async fn submit(&self, request: Request) -> Result<ApiResponse, MailError> {
        let message_id = uuid::Uuid::new_v4().to_string();

        tracing::info!(
            message_id = %message_id,
            method = %request.method,
            path = %request.path,
            to = ?recipient_emails(&request),
            subject = request.body["subject"].as_str().unwrap_or_default(),
            "Request logged"
        );

        if self.log_full {
            tracing::debug!(body = %request.body, "Request body");
        }

        Ok(ApiResponse::new(202, message_id))
    }

    fn provider_name(&self) -> &'static str {
        "logger"
    }
}
