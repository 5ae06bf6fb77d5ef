//! Email identity (`name` + `email`) and the resolver that produces it from
//! loosely typed input.
//!
//! Resolution deliberately stops at trimming and angle-bracket detection:
//! no RFC 5322 validation happens here. Malformed addresses are passed through
//! and left for the delivery API to reject.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MailError;

/// A named or anonymous email address.
///
/// # Examples
///
/// ```
/// use mailbatch::Identity;
///
/// let id: Identity = "Alice <alice@example.com>".parse().unwrap();
/// assert_eq!(id.email, "alice@example.com");
/// assert_eq!(id.name.as_deref(), Some("Alice"));
///
/// let id: Identity = "bob@example.com".parse().unwrap();
/// assert_eq!(id.name, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Email address, never empty.
    pub email: String,
    /// Optional display name, never `Some("")`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Identity {
    /// Build an identity from its parts.
    ///
    /// Both parts are trimmed; an empty name becomes `None` and an empty email
    /// is rejected.
    pub fn from_parts(name: Option<&str>, email: &str) -> Result<Self, MailError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(MailError::InvalidIdentity("email address is empty".into()));
        }
        let name = name.map(str::trim).filter(|n| !n.is_empty());

        Ok(Self {
            email: email.to_string(),
            name: name.map(str::to_string),
        })
    }

    /// Parse `"Display Name <address@host>"` or a bare `"address@host"`.
    pub fn parse(input: &str) -> Result<Self, MailError> {
        let input = input.trim();

        match input.find('<') {
            Some(open) => {
                let rest = &input[open + 1..];
                // An unterminated bracket still yields everything after it.
                let email = match rest.find('>') {
                    Some(close) => &rest[..close],
                    None => rest,
                };
                let name = unquote(input[..open].trim());
                Self::from_parts(Some(name), email).map_err(|_| {
                    MailError::InvalidIdentity(format!("no address inside brackets in '{}'", input))
                })
            }
            None => Self::from_parts(None, input).map_err(|_| {
                MailError::InvalidIdentity("identity string is empty".into())
            }),
        }
    }

    /// Format as "Name <email>" or just "email" if no name.
    pub fn formatted(&self) -> String {
        match &self.name {
            Some(name) => format!("{} <{}>", name, self.email),
            None => self.email.clone(),
        }
    }
}

/// Strip one pair of surrounding double quotes from a display name.
fn unquote(name: &str) -> &str {
    name.strip_prefix('"')
        .and_then(|n| n.strip_suffix('"'))
        .unwrap_or(name)
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formatted())
    }
}

impl FromStr for Identity {
    type Err = MailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Caller-supplied identity before resolution.
///
/// Deserializes from a JSON string (`"Name <a@b.com>"`) or an object
/// (`{"name": .., "email": ..}`). Any other JSON value is kept as
/// [`IdentityInput::Other`] and rejected at resolution time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IdentityInput {
    /// Already-resolved identity, passed through unchanged.
    #[serde(skip_deserializing)]
    Resolved(Identity),
    /// `"Name <email>"` or `"email"`.
    Text(String),
    /// `{name?, email}` object; either field may be missing.
    Parts {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        email: Option<String>,
    },
    /// Neither a string nor an object.
    Other(serde_json::Value),
}

impl IdentityInput {
    /// Resolve into an [`Identity`], failing with [`MailError::InvalidIdentity`].
    pub fn resolve(&self) -> Result<Identity, MailError> {
        match self {
            Self::Resolved(identity) => Identity::from_parts(identity.name.as_deref(), &identity.email),
            Self::Text(text) => Identity::parse(text),
            Self::Parts { name, email } => match email {
                Some(email) => Identity::from_parts(name.as_deref(), email),
                None => Err(MailError::InvalidIdentity("object has no email field".into())),
            },
            Self::Other(serde_json::Value::Null) => {
                Err(MailError::InvalidIdentity("identity is null".into()))
            }
            Self::Other(value) => Err(MailError::InvalidIdentity(format!(
                "expected a string or an object, got {}",
                value
            ))),
        }
    }
}

/// Resolve an optional identity; absence is an error like any other.
pub fn resolve(input: Option<&IdentityInput>) -> Result<Identity, MailError> {
    match input {
        Some(input) => input.resolve(),
        None => Err(MailError::InvalidIdentity("no identity given".into())),
    }
}

impl From<Identity> for IdentityInput {
    fn from(identity: Identity) -> Self {
        Self::Resolved(identity)
    }
}

impl From<&str> for IdentityInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for IdentityInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&String> for IdentityInput {
    fn from(text: &String) -> Self {
        Self::Text(text.clone())
    }
}

// From tuple (name, email)
impl<N: AsRef<str>, E: AsRef<str>> From<(N, E)> for IdentityInput {
    fn from((name, email): (N, E)) -> Self {
        Self::Parts {
            name: Some(name.as_ref().to_string()),
            email: Some(email.as_ref().to_string()),
        }
    }
}
