//! Offline simulated responder for testing.
//!
//! Streams predefined replies through the same [`ChatProvider`] seam as
//! the network-backed client, so callers can be exercised without an API
//! credential or network access.

use crate::chat::{ChatOptions, ChatProvider, ChatRequest, EventStream};
use crate::error::Result;
use crate::streaming::StreamEvent;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fragment size (in characters) for simulated streaming.
const DEFAULT_FRAGMENT_CHARS: usize = 4;

/// A simulated chat responder with canned replies.
///
/// Replies are returned in sequence, cycling; each reply is delivered as a
/// series of small text fragments followed by the end-of-stream sentinel,
/// mimicking a real streamed response.
///
/// # Example
///
/// ```rust,ignore
/// use chatstream::prelude::*;
///
/// let responder = MockResponder::new(vec!["Hello!".to_string()]);
/// let text = responder
///     .collect_text(&ChatRequest::new("hi"), &ChatOptions::default(), CancellationToken::new())
///     .await?;
/// assert_eq!(text, "Hello!");
/// ```
#[derive(Debug)]
pub struct MockResponder {
    responses: Vec<String>,
    fragment_chars: usize,
    response_index: AtomicUsize,
}

impl MockResponder {
    /// Create a responder with predefined replies.
    #[must_use]
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses,
            fragment_chars: DEFAULT_FRAGMENT_CHARS,
            response_index: AtomicUsize::new(0),
        }
    }

    /// Set the number of characters per simulated fragment.
    #[must_use]
    pub fn with_fragment_chars(mut self, fragment_chars: usize) -> Self {
        self.fragment_chars = fragment_chars.max(1);
        self
    }

    /// Split a reply into fragment-sized pieces on character boundaries.
    fn fragments_of(&self, reply: &str) -> Vec<String> {
        let chars: Vec<char> = reply.chars().collect();
        chars
            .chunks(self.fragment_chars)
            .map(|chunk| chunk.iter().collect())
            .collect()
    }
}

#[async_trait]
impl ChatProvider for MockResponder {
    async fn stream_chat(
        &self,
        _request: &ChatRequest,
        _options: &ChatOptions,
    ) -> Result<EventStream> {
        let index = self.response_index.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .responses
            .get(index % self.responses.len().max(1))
            .cloned()
            .unwrap_or_default();

        let events: Vec<Result<StreamEvent>> = self
            .fragments_of(&reply)
            .into_iter()
            .map(|fragment| Ok(StreamEvent::Delta(fragment)))
            .chain(std::iter::once(Ok(StreamEvent::Done)))
            .collect();

        Ok(Box::pin(futures::stream::iter(events)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::chat::ChatProviderExt;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn cycles_responses() {
        let responder =
            MockResponder::new(vec!["first".to_string(), "second".to_string()]);
        let request = ChatRequest::new("hi");
        let options = ChatOptions::default();

        for expected in ["first", "second", "first"] {
            let text = responder
                .collect_text(&request, &options, CancellationToken::new())
                .await
                .unwrap();
            assert_eq!(text, expected);
        }
    }

    #[tokio::test]
    async fn delivers_grouped_fragments_then_done() {
        let responder =
            MockResponder::new(vec!["abcdef".to_string()]).with_fragment_chars(2);

        let mut fragments = Vec::new();
        let outcome = responder
            .stream_to(
                &ChatRequest::new("hi"),
                &ChatOptions::default(),
                CancellationToken::new(),
                |fragment| fragments.push(fragment.to_string()),
            )
            .await
            .unwrap();

        assert_eq!(fragments, vec!["ab", "cd", "ef"]);
        assert_eq!(outcome.fragments, 3);
        assert!(outcome.saw_done);
    }

    #[tokio::test]
    async fn empty_responder_streams_nothing() {
        let responder = MockResponder::new(Vec::new());
        let text = responder
            .collect_text(
                &ChatRequest::new("hi"),
                &ChatOptions::default(),
                CancellationToken::new(),
            )
            .await
            .unwrap();
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn multibyte_replies_split_on_char_boundaries() {
        let responder =
            MockResponder::new(vec!["caf\u{e9} \u{2615}".to_string()]).with_fragment_chars(3);
        let text = responder
            .collect_text(
                &ChatRequest::new("hi"),
                &ChatOptions::default(),
                CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(text, "caf\u{e9} \u{2615}");
    }
}
