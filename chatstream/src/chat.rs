//! Chat requests, generation options, and the provider seam.
//!
//! [`ChatProvider`] is the boundary between producers of decoded stream
//! events (the network-backed [`ChatClient`](crate::client::ChatClient) or
//! the offline [`MockResponder`](crate::mock::MockResponder)) and the
//! delivery driver [`ChatProviderExt::stream_to`], which owns ordering and
//! cancellation. The driver never holds state across calls; each call owns
//! its session exclusively.

use crate::attachment::Attachment;
use crate::error::{Error, Result};
use crate::streaming::StreamEvent;
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

/// A single chat exchange to be streamed. Immutable once submitted.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// The user's prompt text.
    pub prompt: String,
    /// Ordered image attachments.
    pub attachments: Vec<Attachment>,
}

impl ChatRequest {
    /// Create a request with no attachments.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            attachments: Vec::new(),
        }
    }

    /// Set the attachments, replacing any existing ones.
    #[must_use]
    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    /// Append one attachment.
    #[must_use]
    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Whether any attachments are present.
    #[must_use]
    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }
}

/// Model selection by attachment presence.
///
/// Which model serves a request is a policy, not a structural property:
/// requests with image attachments go to the vision-capable model,
/// text-only requests to the cheaper text model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPolicy {
    /// Model for text-only requests.
    pub text_model: String,
    /// Model for requests carrying image attachments.
    pub vision_model: String,
}

impl Default for ModelPolicy {
    fn default() -> Self {
        Self {
            text_model: "gpt-3.5-turbo".to_string(),
            vision_model: "gpt-4-vision-preview".to_string(),
        }
    }
}

impl ModelPolicy {
    /// Create a policy with distinct text and vision models.
    #[must_use]
    pub fn new(text_model: impl Into<String>, vision_model: impl Into<String>) -> Self {
        Self {
            text_model: text_model.into(),
            vision_model: vision_model.into(),
        }
    }

    /// Use one model for every request.
    #[must_use]
    pub fn single(model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            text_model: model.clone(),
            vision_model: model,
        }
    }

    /// Pick the model id for a request.
    #[must_use]
    pub fn select(&self, has_attachments: bool) -> &str {
        if has_attachments {
            &self.vision_model
        } else {
            &self.text_model
        }
    }
}

/// Options for a streamed chat call.
#[derive(Debug, Clone)]
pub struct ChatOptions {
    /// System instruction prepended to every exchange.
    pub system_prompt: String,
    /// Response length cap, forwarded as `max_tokens`.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Model selection policy.
    pub model: ModelPolicy,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            system_prompt: "You are a helpful assistant.".to_string(),
            max_tokens: 1000,
            temperature: None,
            model: ModelPolicy::default(),
        }
    }
}

impl ChatOptions {
    /// Create default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the system instruction.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Set the response length cap.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the model selection policy.
    #[must_use]
    pub fn with_model(mut self, model: ModelPolicy) -> Self {
        self.model = model;
        self
    }
}

/// Stream of decoded events for one in-flight call.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Summary of a completed stream call.
///
/// The accumulated text belongs to the caller via the fragment sink; this
/// is only the success indicator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamOutcome {
    /// Number of fragments delivered to the sink.
    pub fragments: usize,
    /// Whether the `[DONE]` sentinel was observed. Stream completion
    /// without the sentinel is still a success.
    pub saw_done: bool,
}

/// A source of streamed chat completions.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Open a streaming exchange for the given request.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Config`] when the provider is not configured,
    /// or [`Error::Transport`] when the request cannot be issued or the
    /// endpoint answers with a non-success status.
    async fn stream_chat(&self, request: &ChatRequest, options: &ChatOptions)
    -> Result<EventStream>;
}

/// Delivery driver on top of any [`ChatProvider`].
#[async_trait]
pub trait ChatProviderExt: ChatProvider {
    /// Stream a request, delivering each text fragment to `on_fragment`.
    ///
    /// Fragments are handed to the sink synchronously, in byte-stream
    /// order; one event is fully delivered before the next is polled.
    /// Cancelling `cancel` tears down the in-flight exchange, stops all
    /// further deliveries, and fails the call with [`Error::Cancelled`].
    ///
    /// # Errors
    ///
    /// Propagates provider errors; fails with [`Error::Cancelled`] on
    /// caller abort.
    async fn stream_to<F>(
        &self,
        request: &ChatRequest,
        options: &ChatOptions,
        cancel: CancellationToken,
        mut on_fragment: F,
    ) -> Result<StreamOutcome>
    where
        F: FnMut(&str) + Send,
    {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let mut stream = tokio::select! {
            () = cancel.cancelled() => return Err(Error::Cancelled),
            opened = self.stream_chat(request, options) => opened?,
        };

        let mut outcome = StreamOutcome::default();
        loop {
            let next = tokio::select! {
                () = cancel.cancelled() => return Err(Error::Cancelled),
                item = stream.next() => item,
            };
            match next {
                Some(Ok(StreamEvent::Delta(fragment))) => {
                    on_fragment(&fragment);
                    outcome.fragments += 1;
                }
                Some(Ok(StreamEvent::Done)) => outcome.saw_done = true,
                Some(Err(err)) => return Err(err),
                None => break,
            }
        }
        Ok(outcome)
    }

    /// Stream a request and collect the fragments into one string.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`ChatProviderExt::stream_to`].
    async fn collect_text(
        &self,
        request: &ChatRequest,
        options: &ChatOptions,
        cancel: CancellationToken,
    ) -> Result<String> {
        let mut text = String::new();
        self.stream_to(request, options, cancel, |fragment| {
            text.push_str(fragment);
        })
        .await?;
        Ok(text)
    }
}

impl<P: ChatProvider + ?Sized> ChatProviderExt for P {}
