//! chatstream - a streaming chat-completions client
//!
//! This crate issues chat requests (text plus optional image attachments)
//! against a hosted chat-completions API and delivers the incrementally
//! streamed response text to a caller-supplied sink, fragment by fragment,
//! with explicit handling for cancellation, transport failures, and
//! malformed stream events.

pub mod attachment;
pub mod chat;
pub mod client;
pub mod completion;
pub mod error;
pub mod message;
pub mod mock;
pub mod prelude;
pub mod streaming;

pub use attachment::{Attachment, EncodedAttachment, ImageFormat};
pub use chat::{
    ChatOptions, ChatProvider, ChatProviderExt, ChatRequest, EventStream, ModelPolicy,
    StreamOutcome,
};
pub use client::{ChatClient, ChatClientBuilder};
pub use error::{Error, Result, TransportError, TransportErrorKind};
pub use mock::MockResponder;
pub use streaming::{SseStream, StreamEvent};
