//! Transport implementations.
//!
//! Each provider implements the [`Transport`](crate::Transport) trait.
//!
//! ## Available Providers
//!
//! | Provider | Feature Flag | Description |
//! |----------|-------------|-------------|
//! | [`SendGridTransport`] | `sendgrid` | SendGrid v3 HTTP API |
//! | [`MemoryTransport`] | (none) | In-memory capture for dev/testing |
//! | [`LoggerTransport`] | (none) | Logs requests without sending |

#[cfg(feature = "sendgrid")]
mod sendgrid;
#[cfg(feature = "sendgrid")]
pub use sendgrid::{SendGridTransport, SENDGRID_API_URL};

mod memory;
pub use memory::{MemoryTransport, StoredRequest};

mod logger;
pub use logger::LoggerTransport;
