//! Transport-level request produced for each message.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::MailError;
use crate::message::Message;

/// API path for sending mail.
pub const MAIL_SEND_PATH: &str = "/v3/mail/send";

/// HTTP method of a [`Request`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request handed to a [`Transport`](crate::Transport).
///
/// The body is plain JSON: every nested structure of the message is already
/// serialized, so transports never see typed values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub body: Value,
}

impl Request {
    /// Fill `base` (usually from [`Transport::empty_request`](crate::Transport::empty_request))
    /// with a `POST /v3/mail/send` carrying `message`.
    pub fn mail_send(mut base: Request, message: &Message) -> Result<Self, MailError> {
        base.method = Method::Post;
        base.path = MAIL_SEND_PATH.to_string();
        base.body = serde_json::to_value(message)?;
        Ok(base)
    }
}
