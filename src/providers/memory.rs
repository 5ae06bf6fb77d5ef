//! In-memory transport for development and testing.
//!
//! Captures every submitted [`Request`] instead of calling the API.
//!
//! ```rust,ignore
//! use mailbatch::providers::MemoryTransport;
//! use mailbatch::{Dispatcher, RawMessage};
//!
//! let transport = MemoryTransport::new();
//! let dispatcher = Dispatcher::with_transport(transport.clone());
//!
//! dispatcher.send(RawMessage::new().from("a@x.com").to("b@y.com").text("hi")).await?;
//!
//! assert_eq!(transport.request_count(), 1);
//! assert!(transport.sent_to("b@y.com"));
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::error::MailError;
use crate::request::Request;
use crate::transport::{ApiResponse, Transport};

/// A captured request with metadata.
#[derive(Debug, Clone)]
pub struct StoredRequest {
    /// Message ID returned to the caller.
    pub id: String,
    pub request: Request,
    /// When the request was captured.
    pub sent_at: DateTime<Utc>,
}

impl StoredRequest {
    /// Recipient emails of every personalization, in order.
    pub fn recipients(&self) -> Vec<String> {
        self.request.body["personalizations"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|p| p["to"].as_array())
            .flatten()
            .filter_map(|to| to["email"].as_str().map(str::to_string))
            .collect()
    }
}

#[derive(Debug, Default)]
struct State {
    requests: Vec<StoredRequest>,
    /// If set, every submit fails with this message.
    fail_with: Option<String>,
    /// Requests addressed to any of these emails fail.
    fail_for: Vec<String>,
}

/// Transport that stores requests in memory.
///
/// Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    state: Arc<RwLock<State>>,
}

impl MemoryTransport {
    /// Create a new transport with empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Failure Simulation (for testing)
    // =========================================================================

    /// Make every submission fail with an error message.
    pub fn set_failure(&self, message: impl Into<String>) {
        self.state.write().fail_with = Some(message.into());
    }

    /// Make submissions addressed to `email` fail.
    pub fn fail_for(&self, email: impl Into<String>) {
        self.state.write().fail_for.push(email.into());
    }

    /// Clear all failure settings.
    pub fn clear_failure(&self) {
        let mut state = self.state.write();
        state.fail_with = None;
        state.fail_for.clear();
    }

    // =========================================================================
    // Request Access (for testing assertions)
    // =========================================================================

    /// All captured requests, in submission order.
    pub fn requests(&self) -> Vec<StoredRequest> {
        self.state.read().requests.clone()
    }

    /// The most recently captured request.
    pub fn last_request(&self) -> Option<StoredRequest> {
        self.state.read().requests.last().cloned()
    }

    pub fn request_count(&self) -> usize {
        self.state.read().requests.len()
    }

    /// Check if a request was sent to a specific address.
    pub fn sent_to(&self, email: &str) -> bool {
        self.state.read().requests.iter().any(|stored| {
            stored
                .recipients()
                .iter()
                .any(|r| r.eq_ignore_ascii_case(email))
        })
    }

    /// Remove and return all captured requests.
    pub fn flush(&self) -> Vec<StoredRequest> {
        std::mem::take(&mut self.state.write().requests)
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn submit(&self, request: Request) -> Result<ApiResponse, MailError> {
        let mut state = self.state.write();

        if let Some(ref message) = state.fail_with {
            return Err(MailError::provider("memory", message.clone()));
        }

        let stored = StoredRequest {
            id: uuid::Uuid::new_v4().to_string(),
            request,
            sent_at: Utc::now(),
        };

        let recipients = stored.recipients();
        if let Some(blocked) = state
            .fail_for
            .iter()
            .find(|f| recipients.iter().any(|r| r.eq_ignore_ascii_case(f)))
        {
            return Err(MailError::provider_with_status(
                "memory",
                format!("Rejected recipient {}", blocked),
                400,
            ));
        }

        let id = stored.id.clone();
        state.requests.push(stored);
        Ok(ApiResponse::new(202, id))
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
