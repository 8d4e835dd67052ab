//! Incremental parsing of streamed chat-completion responses.
//!
//! The response body arrives as server-sent events: one `data: <json>` line
//! per event, blank lines as separators, and a literal `data: [DONE]`
//! sentinel marking the end of the event stream. Network chunks split
//! events at arbitrary byte boundaries, so [`SseStream`] keeps a carry-over
//! buffer and only interprets complete (newline-terminated) lines; the
//! trailing partial line is retained for the next chunk. The buffer holds
//! bytes rather than text so a chunk boundary inside a multi-byte UTF-8
//! sequence cannot corrupt a line.

use crate::error::{Result, TransportError};
use bytes::{Bytes, BytesMut};
use futures::Stream;
use serde::Deserialize;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::warn;

/// One decoded event from the response stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// An incremental, non-empty text fragment.
    Delta(String),
    /// The `[DONE]` sentinel. Nothing after it is interpreted.
    Done,
}

impl StreamEvent {
    /// The fragment text if this is a delta event.
    #[must_use]
    pub fn as_delta(&self) -> Option<&str> {
        match self {
            Self::Delta(text) => Some(text),
            Self::Done => None,
        }
    }
}

/// Streaming parser over the raw response byte stream.
///
/// Yields [`StreamEvent`]s in byte-stream order. Malformed events are
/// logged and skipped; they never terminate the stream. The stream ends
/// when the sentinel is seen or the underlying body is exhausted,
/// whichever comes first.
pub struct SseStream<S> {
    inner: S,
    buffer: BytesMut,
    done: bool,
    eof: bool,
}

impl<S> SseStream<S>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin,
{
    /// Wrap a response byte stream.
    #[must_use]
    pub fn new(stream: S) -> Self {
        Self {
            inner: stream,
            buffer: BytesMut::new(),
            done: false,
            eof: false,
        }
    }

    /// Parse a single complete line into a stream event.
    ///
    /// Returns `None` for blank lines, comments, non-event lines, and
    /// events that decode to nothing deliverable.
    fn parse_line(line: &[u8]) -> Option<StreamEvent> {
        let Ok(text) = std::str::from_utf8(line) else {
            warn!("skipping non-UTF-8 line in response stream");
            return None;
        };
        let text = text.trim();

        // Blank separator lines and SSE comments
        if text.is_empty() || text.starts_with(':') {
            return None;
        }

        let data = text.strip_prefix("data: ")?;
        if data.trim() == "[DONE]" {
            return Some(StreamEvent::Done);
        }

        match serde_json::from_str::<StreamChunk>(data) {
            Ok(chunk) => chunk
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.delta.content)
                .filter(|content| !content.is_empty())
                .map(StreamEvent::Delta),
            Err(err) => {
                warn!(error = %err, "skipping malformed stream event");
                None
            }
        }
    }
}

impl<S> Stream for SseStream<S>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin,
{
    type Item = Result<StreamEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            // Past the sentinel nothing else is interpreted
            if this.done {
                return Poll::Ready(None);
            }

            // Interpret complete lines from the carry-over buffer first
            if let Some(pos) = this.buffer.iter().position(|&b| b == b'\n') {
                let line = this.buffer.split_to(pos + 1);
                match Self::parse_line(&line[..line.len() - 1]) {
                    Some(StreamEvent::Done) => {
                        this.done = true;
                        return Poll::Ready(Some(Ok(StreamEvent::Done)));
                    }
                    Some(event) => return Poll::Ready(Some(Ok(event))),
                    None => continue,
                }
            }

            if this.eof {
                return Poll::Ready(None);
            }

            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    this.buffer.extend_from_slice(&bytes);
                }
                Poll::Ready(Some(Err(err))) => {
                    return Poll::Ready(Some(Err(TransportError::from(err).into())));
                }
                Poll::Ready(None) => {
                    this.eof = true;
                    // Terminate any final unterminated line so it is parsed
                    if !this.buffer.is_empty() && this.buffer.last() != Some(&b'\n') {
                        this.buffer.extend_from_slice(b"\n");
                    }
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Wire format of one streamed completion chunk.
#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
    #[allow(dead_code)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}
