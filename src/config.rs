//! Dispatcher configuration.
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `SENDGRID_API_KEY` | API key used by the HTTP transport |
//! | `SENDGRID_BASE_URL` | API host override (default: `https://api.sendgrid.com`) |
//! | `SENDGRID_COMPRESS` | `true`/`1` to gzip request bodies |

use serde::Deserialize;
use std::env;

/// Options accepted by [`Dispatcher::configure`](crate::Dispatcher::configure).
///
/// A bare string converts into options holding just the API key:
///
/// ```
/// use mailbatch::Options;
///
/// let options: Options = "SG.xxxxx".into();
/// assert_eq!(options.credential(), Some("SG.xxxxx"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    #[serde(alias = "api_key")]
    pub api_key: Option<String>,
    #[serde(alias = "base_url")]
    pub base_url: Option<String>,
    pub compress: Option<bool>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read options from environment variables. Unset variables stay `None`.
    pub fn from_env() -> Self {
        Self {
            api_key: env::var("SENDGRID_API_KEY").ok(),
            base_url: env::var("SENDGRID_BASE_URL").ok(),
            compress: env::var("SENDGRID_COMPRESS")
                .ok()
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes")),
        }
    }

    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the API host.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Enable gzip request bodies.
    pub fn compress(mut self, enabled: bool) -> Self {
        self.compress = Some(enabled);
        self
    }

    /// The API key, if present and non-blank.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Overlay `other` on top of `self`; fields `other` leaves unset are kept.
    pub fn merge(&mut self, other: Options) {
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if other.compress.is_some() {
            self.compress = other.compress;
        }
    }
}

impl From<&str> for Options {
    fn from(api_key: &str) -> Self {
        Self::new().api_key(api_key)
    }
}

impl From<String> for Options {
    fn from(api_key: String) -> Self {
        Self::new().api_key(api_key)
    }
}
