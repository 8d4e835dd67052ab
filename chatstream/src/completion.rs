//! Network-backed chat-completions provider.
//!
//! One call maps to one HTTP POST with a streamed response body: encode
//! attachments, build the outbound payload, validate the response status,
//! and hand the byte stream to the SSE parser.

use crate::attachment::{EncodedAttachment, encode_all};
use crate::chat::{ChatOptions, ChatProvider, ChatRequest, EventStream};
use crate::client::ChatClient;
use crate::error::{Result, TransportError};
use crate::message::{ChatMessage, MessageContent};
use crate::streaming::SseStream;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument};

impl ChatClient {
    /// Build the conversation for one exchange: a system turn followed by
    /// one user turn. With attachments the user content is an ordered
    /// block list, text first; otherwise it stays plain text.
    fn build_messages(
        request: &ChatRequest,
        options: &ChatOptions,
        encoded: &[EncodedAttachment],
    ) -> Vec<ChatMessage> {
        let user = if encoded.is_empty() {
            ChatMessage::user(request.prompt.clone())
        } else {
            ChatMessage::user_with_images(
                request.prompt.clone(),
                encoded.iter().map(EncodedAttachment::as_str),
            )
        };
        vec![ChatMessage::system(options.system_prompt.clone()), user]
    }

    /// Convert one content block to the wire format.
    fn convert_content(content: &MessageContent) -> Value {
        match content {
            MessageContent::Text { text } => json!({
                "type": "text",
                "text": text
            }),
            MessageContent::ImageUrl { image_url } => json!({
                "type": "image_url",
                "image_url": { "url": image_url.url }
            }),
        }
    }

    /// Convert messages to the wire format.
    ///
    /// Text-only content serializes as a plain string; any image block
    /// forces the array form.
    fn convert_messages(messages: &[ChatMessage]) -> Vec<Value> {
        messages
            .iter()
            .map(|msg| {
                let mut obj = json!({ "role": msg.role.as_str() });
                if msg.has_images() {
                    let blocks: Vec<Value> =
                        msg.content.iter().map(Self::convert_content).collect();
                    obj["content"] = json!(blocks);
                } else {
                    obj["content"] = json!(msg.text_content());
                }
                obj
            })
            .collect()
    }

    /// Build the request body for the streaming API call.
    fn build_request_body(
        request: &ChatRequest,
        options: &ChatOptions,
        encoded: &[EncodedAttachment],
    ) -> Value {
        let messages = Self::build_messages(request, options, encoded);
        let mut body = json!({
            "model": options.model.select(!encoded.is_empty()),
            "messages": Self::convert_messages(&messages),
            "max_tokens": options.max_tokens,
            "stream": true,
        });
        if let Some(temperature) = options.temperature {
            body["temperature"] = json!(temperature);
        }
        body
    }
}

/// Best-effort error message from a failed response body.
///
/// Prefers the structured `{"error":{"message":...}}` shape; falls back to
/// the raw body, or `None` when the body is empty.
fn error_message_from_body(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorResponse>(body)
        .ok()
        .map(|parsed| parsed.error.message)
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
}

#[async_trait]
impl ChatProvider for ChatClient {
    #[instrument(skip(self, request, options), fields(attachments = request.attachments.len()))]
    async fn stream_chat(
        &self,
        request: &ChatRequest,
        options: &ChatOptions,
    ) -> Result<EventStream> {
        // Credential problems surface before any network traffic
        let headers = self.auth_headers()?;

        // All attachments encode concurrently; any failure fails the call
        // before a request is sent
        let encoded = encode_all(&request.attachments).await?;
        let body = ChatClient::build_request_body(request, options, &encoded);

        debug!(
            model = options.model.select(request.has_attachments()),
            "sending streaming chat request"
        );

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let fallback = status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string();
            let body = response.text().await.unwrap_or_default();
            let message = error_message_from_body(&body).unwrap_or(fallback);
            return Err(TransportError::http_status(status.as_u16(), message).into());
        }

        Ok(Box::pin(SseStream::new(response.bytes_stream())))
    }
}

/// Error response envelope of the chat-completions API.
#[derive(Debug, Deserialize)]
#[non_exhaustive]
pub struct ApiErrorResponse {
    /// Detailed error information.
    pub error: ApiError,
}

/// Error details of the chat-completions API.
#[derive(Debug, Deserialize)]
#[non_exhaustive]
pub struct ApiError {
    /// Human-readable error message.
    pub message: String,
    /// Error type identifier.
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    /// Error code.
    pub code: Option<String>,
}
