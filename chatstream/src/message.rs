//! Chat message types following the chat-completions API conventions.

use serde::{Deserialize, Serialize};

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System message providing instructions.
    System,
    /// User message.
    User,
    /// Assistant (model) message.
    Assistant,
}

impl MessageRole {
    /// Get the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One content block of a message: text or an image reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
    /// Image content addressed by URL (http(s) or `data:` URI).
    #[serde(rename = "image_url")]
    ImageUrl {
        /// The image URL details.
        image_url: ImageUrlDetail,
    },
}

/// Image URL structure for vision-capable models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrlDetail {
    /// The URL of the image (can be an http(s) URL or a data URI).
    pub url: String,
}

impl MessageContent {
    /// Create a new text content block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create a new image URL content block.
    #[must_use]
    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrlDetail { url: url.into() },
        }
    }

    /// Get the text if this is a text block.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::ImageUrl { .. } => None,
        }
    }

    /// Check if this is an image block.
    #[must_use]
    pub const fn is_image(&self) -> bool {
        matches!(self, Self::ImageUrl { .. })
    }
}

/// A chat message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: MessageRole,
    /// Ordered content blocks of the message.
    pub content: Vec<MessageContent>,
}

impl ChatMessage {
    /// Create a new system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: vec![MessageContent::text(content)],
        }
    }

    /// Create a new user message with plain text content.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: vec![MessageContent::text(content)],
        }
    }

    /// Create a new user message with text followed by image blocks.
    ///
    /// The text block always comes first; images keep the given order.
    #[must_use]
    pub fn user_with_images<I, S>(text: impl Into<String>, image_urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut content = vec![MessageContent::text(text)];
        content.extend(image_urls.into_iter().map(MessageContent::image_url));
        Self {
            role: MessageRole::User,
            content,
        }
    }

    /// Create a new assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: vec![MessageContent::text(content)],
        }
    }

    /// Get the joined text content of the message.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .filter_map(MessageContent::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check if any content block is an image.
    #[must_use]
    pub fn has_images(&self) -> bool {
        self.content.iter().any(MessageContent::is_image)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn role_as_str() {
        assert_eq!(MessageRole::System.as_str(), "system");
        assert_eq!(MessageRole::User.as_str(), "user");
        assert_eq!(MessageRole::Assistant.as_str(), "assistant");
    }

    #[test]
    fn system_message() {
        let msg = ChatMessage::system("You are a helpful assistant.");
        assert_eq!(msg.role, MessageRole::System);
        assert_eq!(msg.text_content(), "You are a helpful assistant.");
        assert!(!msg.has_images());
    }

    #[test]
    fn user_with_images_orders_text_first() {
        let msg = ChatMessage::user_with_images("look", ["data:image/png;base64,AA=="]);
        assert_eq!(msg.content.len(), 2);
        assert_eq!(msg.content[0].as_text(), Some("look"));
        assert!(msg.content[1].is_image());
        assert!(msg.has_images());
    }

    #[test]
    fn image_block_wire_shape() {
        let block = MessageContent::image_url("data:image/png;base64,AA==");
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "image_url");
        assert_eq!(json["image_url"]["url"], "data:image/png;base64,AA==");
    }

    #[test]
    fn text_block_wire_shape() {
        let block = MessageContent::text("hi");
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["text"], "hi");
    }

    #[test]
    fn text_content_skips_images() {
        let msg = ChatMessage::user_with_images("caption", ["data:image/png;base64,AA=="]);
        assert_eq!(msg.text_content(), "caption");
    }
}
