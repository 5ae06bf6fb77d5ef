//! # mailbatch
//!
//! Turn loosely typed email-send requests into SendGrid v3 `mail/send`
//! payloads and dispatch them in batches.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mailbatch::{Dispatcher, RawMessage};
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.configure("SG.xxxxx");
//!
//! let message = RawMessage::new()
//!     .from("My App <noreply@example.com>")
//!     .to("user@example.com")
//!     .subject("Welcome!")
//!     .text("Hello");
//!
//! dispatcher.send(message).await?;
//! ```
//!
//! ## Batches and substitutions
//!
//! Several recipients get one personalization each. A list of substitution
//! mappings is paired with them by position:
//!
//! ```rust,ignore
//! let message = RawMessage::new()
//!     .from("noreply@example.com")
//!     .to_all(["Ann <ann@example.com>", "bob@example.com"])
//!     .template_id("d-welcome")
//!     .substitutions(vec![
//!         HashMap::from([("-name-".into(), "Ann".into())]),
//!         HashMap::from([("-name-".into(), "Bob".into())]),
//!     ]);
//!
//! // Responses come back in input order.
//! let responses = dispatcher.send(vec![message, other]).await?;
//! ```
//!
//! Raw messages also deserialize from JSON, with `from`, `to` and `replyTo`
//! given as `"Name <email>"` strings, `{name, email}` objects or arrays.
//!
//! ## Environment Variables
//!
//! Read by [`Dispatcher::from_env`] / [`Options::from_env`]:
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `SENDGRID_API_KEY` | SendGrid API key |
//! | `SENDGRID_BASE_URL` | API host override |
//! | `SENDGRID_COMPRESS` | Gzip request bodies (`true`/`1`) |
//!
//! ## Feature Flags
//!
//! - `sendgrid` (default) - HTTP transport via reqwest
//! - `metrics` - Prometheus-style metrics (counters/histograms)
//!
//! ## Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `mailbatch_requests_total` | Counter | provider, status | Requests submitted |
//! | `mailbatch_send_duration_seconds` | Histogram | provider | Batch duration |
//! | `mailbatch_batch_size` | Histogram | provider | Messages per batch |

/// The version of the mailbatch crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod config;
mod dispatcher;
mod error;
mod identity;
mod message;
mod request;
mod transport;

pub mod providers;

// Re-exports
pub use config::Options;
pub use dispatcher::{Batch, Dispatcher};
pub use error::MailError;
pub use identity::{resolve, Identity, IdentityInput};
pub use message::{
    build, build_multi_recipient, build_single_recipient, Content, Message, MessageInput,
    MimeType, Personalization, RawMessage, Recipients, SubstitutionMap, Substitutions,
};
pub use request::{Method, Request, MAIL_SEND_PATH};
pub use transport::{ApiResponse, Transport};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::ApiResponse;
    pub use crate::Dispatcher;
    pub use crate::Identity;
    pub use crate::MailError;
    pub use crate::Message;
    pub use crate::Options;
    pub use crate::RawMessage;
    pub use crate::Transport;
}
