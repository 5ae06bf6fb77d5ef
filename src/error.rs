//! Error types for mailbatch.

use thiserror::Error;

/// Errors that can occur while building or dispatching messages.
#[derive(Debug, Clone, Error)]
pub enum MailError {
    /// No API key (or transport) available when the first send happens.
    #[error("Dispatcher not configured: missing API key")]
    NotConfigured,

    /// Configuration error (invalid option, disabled feature, etc.)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An identity could not be resolved to an email address.
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    /// The `from` identity is absent or malformed.
    #[error("Invalid or no sender specified: {0}")]
    InvalidSender(String),

    /// A `to` identity is malformed.
    #[error("Invalid recipient at position {index}: {reason}")]
    InvalidRecipient {
        /// Position of the recipient in the `to` list (0 for a scalar `to`).
        index: usize,
        reason: String,
    },

    /// The `replyTo` identity is malformed.
    #[error("Invalid reply-to: {0}")]
    InvalidReplyTo(String),

    /// No `to` was given at all.
    #[error("Invalid or no recipient specified")]
    MissingRecipient,

    /// The delivery API rejected a request.
    #[error("Provider error ({provider}): {message}")]
    ProviderError {
        provider: &'static str,
        message: String,
        /// Optional HTTP status code
        status: Option<u16>,
    },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(String),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MailError {
    /// Create a provider-specific error.
    pub fn provider(provider: &'static str, message: impl Into<String>) -> Self {
        Self::ProviderError {
            provider,
            message: message.into(),
            status: None,
        }
    }

    /// Create a provider error with HTTP status.
    pub fn provider_with_status(
        provider: &'static str,
        message: impl Into<String>,
        status: u16,
    ) -> Self {
        Self::ProviderError {
            provider,
            message: message.into(),
            status: Some(status),
        }
    }

    /// True for errors raised while normalizing input, before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidIdentity(_)
                | Self::InvalidSender(_)
                | Self::InvalidRecipient { .. }
                | Self::InvalidReplyTo(_)
                | Self::MissingRecipient
        )
    }

    /// True for errors reported by the delivery API or the network layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::ProviderError { .. } | Self::HttpError(_))
    }

    /// Reason text of an identity error, used when re-labelling it per field.
    pub(crate) fn reason(&self) -> String {
        match self {
            Self::InvalidIdentity(reason) => reason.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(feature = "sendgrid")]
impl From<reqwest::Error> for MailError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for MailError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}
