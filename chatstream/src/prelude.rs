//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```rust,ignore
//! use chatstream::prelude::*;
//! ```

pub use crate::attachment::{Attachment, ImageFormat};
pub use crate::chat::{
    ChatOptions, ChatProvider, ChatProviderExt, ChatRequest, ModelPolicy, StreamOutcome,
};
pub use crate::client::ChatClient;
pub use crate::error::{Error, Result, TransportError};
pub use crate::mock::MockResponder;
pub use crate::streaming::StreamEvent;

pub use tokio_util::sync::CancellationToken;
