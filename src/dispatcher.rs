//! Batch dispatcher: build every message, then submit them concurrently.
//!
//! Validation is eager. Every message in a batch is built and turned into a
//! [`Request`] before the first submission starts, so a malformed entry
//! aborts the whole batch without any network traffic.
//!
//! Submissions run as independent tokio tasks. The combined result fails with
//! the first error reported; the other tasks keep running to completion but
//! their outcome is discarded. Responses are returned in input order.

use futures::future::try_join_all;
use std::sync::{Arc, OnceLock};
use tracing::Instrument;

#[cfg(feature = "metrics")]
use std::time::Instant;

use crate::config::Options;
use crate::error::MailError;
use crate::message::{build, Message, MessageInput, RawMessage};
use crate::request::Request;
use crate::transport::{ApiResponse, Transport};

/// One or more messages submitted by a single [`Dispatcher::send`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch(Vec<MessageInput>);

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message.
    pub fn push(mut self, input: impl Into<MessageInput>) -> Self {
        self.0.push(input.into());
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<RawMessage> for Batch {
    fn from(raw: RawMessage) -> Self {
        Self(vec![raw.into()])
    }
}

impl From<Message> for Batch {
    fn from(message: Message) -> Self {
        Self(vec![message.into()])
    }
}

impl From<MessageInput> for Batch {
    fn from(input: MessageInput) -> Self {
        Self(vec![input])
    }
}

impl<T: Into<MessageInput>> From<Vec<T>> for Batch {
    fn from(inputs: Vec<T>) -> Self {
        inputs.into_iter().collect()
    }
}

impl<T: Into<MessageInput>> FromIterator<T> for Batch {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for Batch {
    type Item = MessageInput;
    type IntoIter = std::vec::IntoIter<MessageInput>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Builds messages and submits them through a [`Transport`].
///
/// Either inject a transport:
///
/// ```rust,ignore
/// use mailbatch::{Dispatcher, providers::MemoryTransport};
///
/// let dispatcher = Dispatcher::with_transport(MemoryTransport::new());
/// ```
///
/// or configure an API key and let the SendGrid transport be created on the
/// first [`send`](Dispatcher::send):
///
/// ```rust,ignore
/// let mut dispatcher = Dispatcher::new();
/// dispatcher.configure("SG.xxxxx");
/// dispatcher.send(vec![welcome, receipt]).await?;
/// ```
#[derive(Default)]
pub struct Dispatcher {
    options: Options,
    injected: Option<Arc<dyn Transport>>,
    lazy: OnceLock<Arc<dyn Transport>>,
}

impl Dispatcher {
    /// Create an unconfigured dispatcher. `send` fails with
    /// [`MailError::NotConfigured`] until an API key is configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dispatcher configured from `SENDGRID_*` environment variables.
    pub fn from_env() -> Self {
        let mut dispatcher = Self::new();
        dispatcher.configure(Options::from_env());
        dispatcher
    }

    /// Create a dispatcher that submits through `transport`.
    pub fn with_transport<T: Transport + 'static>(transport: T) -> Self {
        Self::with_transport_arc(Arc::new(transport))
    }

    /// Create a dispatcher with an Arc'd transport.
    pub fn with_transport_arc(transport: Arc<dyn Transport>) -> Self {
        Self {
            injected: Some(transport),
            ..Self::default()
        }
    }

    /// Merge options (or a bare API key) into the configuration.
    ///
    /// A transport created lazily from earlier options is dropped and rebuilt
    /// on the next send. An injected transport is unaffected.
    pub fn configure(&mut self, options: impl Into<Options>) -> &mut Self {
        self.options.merge(options.into());
        if self.lazy.take().is_some() {
            tracing::debug!("Configuration changed, transport will be rebuilt");
        }
        self
    }

    /// Current options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// True if a transport is injected or an API key is configured.
    pub fn is_configured(&self) -> bool {
        self.injected.is_some() || self.options.credential().is_some()
    }

    /// Get the transport, creating it from the options on first use.
    pub fn transport(&self) -> Result<Arc<dyn Transport>, MailError> {
        if let Some(ref transport) = self.injected {
            return Ok(Arc::clone(transport));
        }
        if let Some(transport) = self.lazy.get() {
            return Ok(Arc::clone(transport));
        }

        let transport = transport_from_options(&self.options)?;
        tracing::debug!(provider = transport.provider_name(), "Transport initialized");
        // A racing first use may have won; either way one transport is kept.
        Ok(Arc::clone(self.lazy.get_or_init(|| transport)))
    }

    /// Build every message of `input` into a request without sending anything.
    pub fn prepare(&self, input: impl Into<Batch>) -> Result<Vec<Request>, MailError> {
        let transport = self.transport()?;
        build_requests(transport.as_ref(), input.into())
    }

    /// Send one message or a batch.
    ///
    /// Returns one response per message, in input order, or the first error:
    /// a validation error before anything is sent, or the first transport
    /// failure reported.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, since each submission is
    /// spawned as its own task.
    pub async fn send(&self, input: impl Into<Batch>) -> Result<Vec<ApiResponse>, MailError> {
        let transport = self.transport()?;
        let batch = input.into();
        let count = batch.len();
        let provider = transport.provider_name();

        let span = tracing::info_span!("mailbatch.send", provider = provider, count = count);

        async move {
            let requests = build_requests(transport.as_ref(), batch)?;

            #[cfg(feature = "metrics")]
            let start = Instant::now();

            let result = submit_all(&transport, requests).await;

            #[cfg(feature = "metrics")]
            {
                let duration = start.elapsed().as_secs_f64();
                let status = if result.is_ok() { "success" } else { "error" };
                metrics::counter!("mailbatch_requests_total", "provider" => provider, "status" => status)
                    .increment(count as u64);
                metrics::histogram!("mailbatch_send_duration_seconds", "provider" => provider)
                    .record(duration);
                metrics::histogram!("mailbatch_batch_size", "provider" => provider)
                    .record(count as f64);
            }

            match &result {
                Ok(_) => tracing::info!("Batch delivered"),
                Err(e) => tracing::error!(error = %e, "Batch delivery failed"),
            }

            result
        }
        .instrument(span)
        .await
    }
}

/// Build and serialize every message; the first invalid one aborts.
fn build_requests(transport: &dyn Transport, batch: Batch) -> Result<Vec<Request>, MailError> {
    batch
        .into_iter()
        .enumerate()
        .map(|(index, input)| {
            let message = build(input).inspect_err(|e| {
                tracing::error!(index, error = %e, "Message failed validation");
            })?;

            if !message.is_deliverable() {
                tracing::warn!(index, "Message has neither content nor template_id");
            }
            tracing::debug!(
                index,
                personalizations = message.personalizations.len(),
                subject = %message.subject,
                "Message built"
            );

            Request::mail_send(transport.empty_request(), &message)
        })
        .collect()
}

async fn submit_all(
    transport: &Arc<dyn Transport>,
    requests: Vec<Request>,
) -> Result<Vec<ApiResponse>, MailError> {
    let handles: Vec<_> = requests
        .into_iter()
        .map(|request| {
            let transport = Arc::clone(transport);
            tokio::spawn(async move { transport.submit(request).await })
        })
        .collect();

    try_join_all(handles.into_iter().map(|handle| async move {
        match handle.await {
            Ok(result) => result,
            Err(e) => Err(MailError::Internal(format!("submission task failed: {}", e))),
        }
    }))
    .await
}

/// Create the HTTP transport from options.
#[cfg(feature = "sendgrid")]
fn transport_from_options(options: &Options) -> Result<Arc<dyn Transport>, MailError> {
    let key = options.credential().ok_or(MailError::NotConfigured)?;

    let mut transport = crate::providers::SendGridTransport::new(key);
    if let Some(ref url) = options.base_url {
        transport = transport.base_url(url);
    }
    if let Some(compress) = options.compress {
        transport = transport.compress(compress);
    }
    Ok(Arc::new(transport))
}

#[cfg(not(feature = "sendgrid"))]
fn transport_from_options(options: &Options) -> Result<Arc<dyn Transport>, MailError> {
    if options.credential().is_none() {
        return Err(MailError::NotConfigured);
    }
    Err(MailError::Configuration(
        "API key configured but 'sendgrid' feature is not enabled. \
        Add `features = [\"sendgrid\"]` to Cargo.toml or inject a transport"
            .into(),
    ))
}
