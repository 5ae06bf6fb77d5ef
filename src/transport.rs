//! Transport trait and API response type.
//!
//! # Why `async_trait`?
//!
//! The dispatcher holds its transport as `Arc<dyn Transport>` so the HTTP
//! client, the logger and test doubles are interchangeable at runtime. Native
//! async trait methods are not object-safe, so the futures are boxed. Sending
//! mail is network-bound; the allocation per call does not show up.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MailError;
use crate::request::Request;

/// Result of an accepted request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// HTTP status reported by the API (202 for accepted mail).
    pub status: u16,
    /// Message ID assigned by the provider, or a generated one.
    pub message_id: String,
    /// Optional provider-specific response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl ApiResponse {
    /// Create a response with just a status and message ID.
    pub fn new(status: u16, message_id: impl Into<String>) -> Self {
        Self {
            status,
            message_id: message_id.into(),
            body: None,
        }
    }

    /// Attach provider response data.
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// The send capability of a delivery API.
///
/// Implementations own authentication and the HTTP wire encoding; this crate
/// only shapes the [`Request`].
///
/// ```ignore
/// struct Recorder;
///
/// #[async_trait]
/// impl Transport for Recorder {
///     async fn submit(&self, request: Request) -> Result<ApiResponse, MailError> {
///         println!("{} {}", request.method, request.path);
///         Ok(ApiResponse::new(202, "local"))
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// A blank request carrying transport defaults.
    fn empty_request(&self) -> Request {
        Request::default()
    }

    /// Submit one request.
    async fn submit(&self, request: Request) -> Result<ApiResponse, MailError>;

    /// Get the provider name (for logging/debugging).
    fn provider_name(&self) -> &'static str {
        "unknown"
    }
}
