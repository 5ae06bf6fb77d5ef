//! Raw send requests and the structured [`Message`] built from them.
//!
//! A [`RawMessage`] is what callers hand in: loose identities, one or many
//! recipients, optional substitution data. [`build`] turns it into a
//! [`Message`] with one [`Personalization`] per recipient.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::MailError;
use crate::identity::{resolve, Identity, IdentityInput};

/// Placeholder key to replacement value, applied by the delivery API.
pub type SubstitutionMap = HashMap<String, String>;

/// The `to` field of a raw request: a single identity or a list of them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    /// A list of identities; order is kept and duplicates are allowed.
    Many(Vec<IdentityInput>),
    /// A single identity.
    One(IdentityInput),
}

impl Recipients {
    /// Number of recipient entries, before resolution.
    pub fn len(&self) -> usize {
        match self {
            Self::Many(list) => list.len(),
            Self::One(_) => 1,
        }
    }

    /// True when the list form holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn resolve_all(&self) -> Result<Vec<Identity>, MailError> {
        let inputs: Vec<&IdentityInput> = match self {
            Self::Many(list) => list.iter().collect(),
            Self::One(input) => vec![input],
        };

        inputs
            .into_iter()
            .enumerate()
            .map(|(index, input)| {
                input.resolve().map_err(|e| MailError::InvalidRecipient {
                    index,
                    reason: e.reason(),
                })
            })
            .collect()
    }
}

/// Substitution data of a raw request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Substitutions {
    /// One entry per recipient, paired by position. Missing or `null`
    /// entries leave that recipient without substitutions.
    PerRecipient(Vec<Option<SubstitutionMap>>),
    /// One mapping for the message.
    Shared(SubstitutionMap),
}

impl From<SubstitutionMap> for Substitutions {
    fn from(map: SubstitutionMap) -> Self {
        Self::Shared(map)
    }
}

impl From<Vec<SubstitutionMap>> for Substitutions {
    fn from(maps: Vec<SubstitutionMap>) -> Self {
        Self::PerRecipient(maps.into_iter().map(Some).collect())
    }
}

/// A loosely typed send request.
///
/// Build it in code:
///
/// ```
/// use mailbatch::RawMessage;
///
/// let raw = RawMessage::new()
///     .from("App <noreply@example.com>")
///     .to("user@example.com")
///     .subject("Welcome!")
///     .text("Hello");
/// ```
///
/// or deserialize it from JSON, where `from`, `to` and `replyTo` accept
/// strings, `{name, email}` objects and (for `to`) arrays of either.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    /// Sender identity (required).
    pub from: Option<IdentityInput>,
    /// Recipient identity or identities (required).
    pub to: Option<Recipients>,
    /// Subject line; absent becomes `""`.
    pub subject: Option<String>,
    /// Plain text body.
    pub text: Option<String>,
    /// HTML body.
    pub html: Option<String>,
    /// Delivery API template identifier.
    #[serde(alias = "template_id")]
    pub template_id: Option<String>,
    /// Reply-to identity.
    #[serde(alias = "reply_to")]
    pub reply_to: Option<IdentityInput>,
    /// Substitution data, shared or per recipient.
    pub substitutions: Option<Substitutions>,
}

impl RawMessage {
    /// Create an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sender.
    pub fn from(mut self, identity: impl Into<IdentityInput>) -> Self {
        self.from = Some(identity.into());
        self
    }

    /// Add a recipient.
    ///
    /// The first call sets a single recipient; later calls turn `to` into a list.
    pub fn to(mut self, identity: impl Into<IdentityInput>) -> Self {
        let identity = identity.into();
        self.to = Some(match self.to.take() {
            None => Recipients::One(identity),
            Some(Recipients::One(first)) => Recipients::Many(vec![first, identity]),
            Some(Recipients::Many(mut list)) => {
                list.push(identity);
                Recipients::Many(list)
            }
        });
        self
    }

    /// Replace all recipients with a list.
    pub fn to_all<I, T>(mut self, identities: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<IdentityInput>,
    {
        self.to = Some(Recipients::Many(
            identities.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Set the subject line.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the plain text body.
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.text = Some(body.into());
        self
    }

    /// Set the HTML body.
    pub fn html(mut self, body: impl Into<String>) -> Self {
        self.html = Some(body.into());
        self
    }

    /// Set the template identifier.
    pub fn template_id(mut self, id: impl Into<String>) -> Self {
        self.template_id = Some(id.into());
        self
    }

    /// Set the reply-to identity.
    pub fn reply_to(mut self, identity: impl Into<IdentityInput>) -> Self {
        self.reply_to = Some(identity.into());
        self
    }

    /// Set substitutions: a [`SubstitutionMap`] for the whole message or a
    /// `Vec<SubstitutionMap>` paired with recipients by position.
    pub fn substitutions(mut self, substitutions: impl Into<Substitutions>) -> Self {
        self.substitutions = Some(substitutions.into());
        self
    }

    /// Build the structured message.
    pub fn build(&self) -> Result<Message, MailError> {
        build_raw(self)
    }
}

/// Body MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MimeType {
    #[serde(rename = "text/plain")]
    TextPlain,
    #[serde(rename = "text/html")]
    TextHtml,
}

/// One body part of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    #[serde(rename = "type")]
    pub mime_type: MimeType,
    #[serde(rename = "value")]
    pub body: String,
}

/// A group of recipients sharing one substitution mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Personalization {
    #[serde(rename = "to")]
    pub recipients: Vec<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substitutions: Option<SubstitutionMap>,
}

/// A fully structured message.
///
/// Serializes to the v3 `mail/send` body:
/// `personalizations`, `from`, `subject`, `template_id`, `reply_to`, `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub personalizations: Vec<Personalization>,
    #[serde(rename = "from")]
    pub sender: Identity,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Identity>,
    #[serde(rename = "content", default, skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<Content>,
}

impl Message {
    /// All recipients across personalizations, in order.
    pub fn recipients(&self) -> impl Iterator<Item = &Identity> {
        self.personalizations.iter().flat_map(|p| p.recipients.iter())
    }

    /// A message needs a body or a template for the API to accept it.
    pub fn is_deliverable(&self) -> bool {
        !self.personalizations.is_empty()
            && (!self.contents.is_empty() || self.template_id.is_some())
    }
}

/// Input to the builder: raw caller data or a message built beforehand.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageInput {
    Raw(RawMessage),
    Built(Message),
}

impl From<RawMessage> for MessageInput {
    fn from(raw: RawMessage) -> Self {
        Self::Raw(raw)
    }
}

impl From<Message> for MessageInput {
    fn from(message: Message) -> Self {
        Self::Built(message)
    }
}

/// Build a [`Message`]; pre-built messages pass through unchanged.
pub fn build(input: MessageInput) -> Result<Message, MailError> {
    match input {
        MessageInput::Built(message) => Ok(message),
        MessageInput::Raw(raw) => build_raw(&raw),
    }
}

fn build_raw(raw: &RawMessage) -> Result<Message, MailError> {
    let sender = resolve(raw.from.as_ref()).map_err(|e| MailError::InvalidSender(e.reason()))?;

    let to = match &raw.to {
        Some(to) if !to.is_empty() => to,
        _ => return Err(MailError::MissingRecipient),
    };
    let mut recipients = to.resolve_all()?;

    let personalizations = if recipients.len() == 1 {
        let substitutions = match &raw.substitutions {
            Some(Substitutions::Shared(map)) => Some(map.clone()),
            Some(Substitutions::PerRecipient(list)) => list.first().cloned().flatten(),
            None => None,
        };
        // len() == 1 was checked above
        let recipient = recipients.remove(0);
        vec![build_single_recipient(recipient, substitutions)]
    } else {
        let substitutions = match &raw.substitutions {
            Some(Substitutions::PerRecipient(list)) => list.clone(),
            Some(Substitutions::Shared(map)) => vec![Some(map.clone()); recipients.len()],
            None => Vec::new(),
        };
        build_multi_recipient(recipients, substitutions)
    };

    let reply_to = raw
        .reply_to
        .as_ref()
        .map(|r| r.resolve().map_err(|e| MailError::InvalidReplyTo(e.reason())))
        .transpose()?;

    let mut contents = Vec::new();
    if let Some(ref text) = raw.text {
        contents.push(Content {
            mime_type: MimeType::TextPlain,
            body: text.clone(),
        });
    }
    if let Some(ref html) = raw.html {
        contents.push(Content {
            mime_type: MimeType::TextHtml,
            body: html.clone(),
        });
    }

    Ok(Message {
        personalizations,
        sender,
        subject: raw.subject.clone().unwrap_or_default(),
        template_id: raw.template_id.clone(),
        reply_to,
        contents,
    })
}

/// Single-recipient path: the substitution mapping is used as given.
///
/// A per-recipient list is collapsed to its first entry before this is called.
pub fn build_single_recipient(
    recipient: Identity,
    substitutions: Option<SubstitutionMap>,
) -> Personalization {
    Personalization {
        recipients: vec![recipient],
        substitutions,
    }
}

/// Multi-recipient path: one personalization per recipient, each paired with
/// the substitution entry at the same index (or none past the end).
pub fn build_multi_recipient(
    recipients: Vec<Identity>,
    substitutions: Vec<Option<SubstitutionMap>>,
) -> Vec<Personalization> {
    let mut substitutions = substitutions.into_iter();
    recipients
        .into_iter()
        .map(|recipient| Personalization {
            recipients: vec![recipient],
            substitutions: substitutions.next().flatten(),
        })
        .collect()
}
