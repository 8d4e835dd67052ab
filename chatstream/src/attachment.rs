//! Image attachments and their data-URI encoding.
//!
//! An [`Attachment`] is an opaque image payload supplied by the caller,
//! either as raw bytes or as a file path that is read lazily at encoding
//! time. Encoding produces a self-describing `data:` URI suitable for the
//! image blocks of a vision-capable chat request.

use crate::error::{Error, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use futures::future::try_join_all;
use std::path::{Path, PathBuf};

/// Supported image formats for attachments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum ImageFormat {
    /// PNG format (default).
    #[default]
    Png,
    /// JPEG format.
    Jpeg,
    /// GIF format.
    Gif,
    /// WebP format.
    Webp,
}

impl ImageFormat {
    /// Get the MIME type for this format.
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }

    /// Detect format from a file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Detect format from magic bytes (file signature).
    #[must_use]
    pub fn from_magic_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }
        match bytes {
            [0x89, 0x50, 0x4E, 0x47, ..] => Some(Self::Png),
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [0x47, 0x49, 0x46, 0x38, ..] => Some(Self::Gif),
            [0x52, 0x49, 0x46, 0x46, ..] if bytes.len() >= 12 && &bytes[8..12] == b"WEBP" => {
                Some(Self::Webp)
            }
            _ => None,
        }
    }
}

/// An attachment encoded as a self-describing data URI.
///
/// Produced once per attachment; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAttachment(String);

impl EncodedAttachment {
    /// The data URI as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the encoded attachment, returning the data URI.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

/// Internal representation of attachment data.
#[derive(Debug, Clone)]
enum AttachmentSource {
    /// Raw bytes supplied by the caller.
    Bytes(Vec<u8>),
    /// File path, read when the attachment is encoded.
    Path(PathBuf),
}

/// An opaque image attachment to a chat request.
#[derive(Debug, Clone)]
pub struct Attachment {
    source: AttachmentSource,
    format: ImageFormat,
}

impl Attachment {
    /// Create an attachment from raw bytes.
    ///
    /// The format is auto-detected from the file signature if `None` is
    /// provided.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>, format: impl Into<Option<ImageFormat>>) -> Self {
        let format = format
            .into()
            .or_else(|| ImageFormat::from_magic_bytes(&bytes))
            .unwrap_or_default();
        Self {
            source: AttachmentSource::Bytes(bytes),
            format,
        }
    }

    /// Create an attachment from a file path (lazy, no file read).
    ///
    /// The format is auto-detected from the extension if possible, and
    /// falls back to the file signature once the file is read.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ImageFormat::from_extension)
            .unwrap_or_default();
        Self {
            source: AttachmentSource::Path(path.to_path_buf()),
            format,
        }
    }

    /// Get the image format.
    #[must_use]
    pub const fn format(&self) -> ImageFormat {
        self.format
    }

    /// Encode the attachment as a `data:<mime>;base64,<payload>` URI.
    ///
    /// Path sources are read from disk here.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a path source cannot be read.
    pub async fn encode(&self) -> Result<EncodedAttachment> {
        let (bytes, format) = match &self.source {
            AttachmentSource::Bytes(data) => (data.clone(), self.format),
            AttachmentSource::Path(path) => {
                let data = tokio::fs::read(path).await.map_err(|e| {
                    Error::config(format!("cannot read attachment {}: {e}", path.display()))
                })?;
                let format = ImageFormat::from_magic_bytes(&data).unwrap_or(self.format);
                (data, format)
            }
        };
        Ok(EncodedAttachment(format!(
            "data:{};base64,{}",
            format.mime_type(),
            BASE64.encode(bytes)
        )))
    }
}

/// Encode all attachments concurrently, preserving input order.
///
/// Fails with the first encoding error; no partial result is returned.
///
/// # Errors
///
/// Returns the error of the first attachment that fails to encode.
pub async fn encode_all(attachments: &[Attachment]) -> Result<Vec<EncodedAttachment>> {
    try_join_all(attachments.iter().map(Attachment::encode)).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0];

    #[test]
    fn detects_format_from_magic_bytes() {
        assert_eq!(ImageFormat::from_magic_bytes(PNG_MAGIC), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_magic_bytes(JPEG_MAGIC), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF89a"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::from_magic_bytes(b"RIFF\x00\x00\x00\x00WEBP"), Some(ImageFormat::Webp));
        assert_eq!(ImageFormat::from_magic_bytes(b"nope"), None);
        assert_eq!(ImageFormat::from_magic_bytes(b""), None);
    }

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(ImageFormat::from_extension("PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("bmp"), None);
    }

    #[tokio::test]
    async fn encodes_bytes_as_data_uri() {
        let attachment = Attachment::from_bytes(PNG_MAGIC.to_vec(), None);
        assert_eq!(attachment.format(), ImageFormat::Png);

        let encoded = attachment.encode().await.unwrap();
        assert!(encoded.as_str().starts_with("data:image/png;base64,"));

        let payload = encoded.as_str().split(',').nth(1).unwrap();
        assert_eq!(BASE64.decode(payload).unwrap(), PNG_MAGIC);
    }

    #[tokio::test]
    async fn explicit_format_wins_over_sniffing() {
        let attachment = Attachment::from_bytes(PNG_MAGIC.to_vec(), ImageFormat::Jpeg);
        let encoded = attachment.encode().await.unwrap();
        assert!(encoded.as_str().starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn encode_all_preserves_order() {
        let attachments = vec![
            Attachment::from_bytes(PNG_MAGIC.to_vec(), None),
            Attachment::from_bytes(JPEG_MAGIC.to_vec(), None),
        ];
        let encoded = encode_all(&attachments).await.unwrap();
        assert_eq!(encoded.len(), 2);
        assert!(encoded[0].as_str().starts_with("data:image/png;"));
        assert!(encoded[1].as_str().starts_with("data:image/jpeg;"));
    }

    #[tokio::test]
    async fn encode_all_fails_on_unreadable_path() {
        let attachments = vec![
            Attachment::from_bytes(PNG_MAGIC.to_vec(), None),
            Attachment::from_path("/nonexistent/image.png"),
        ];
        let err = encode_all(&attachments).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn encodes_path_source() {
        let path = std::env::temp_dir().join(format!("chatstream-attach-{}.png", std::process::id()));
        tokio::fs::write(&path, PNG_MAGIC).await.unwrap();

        let encoded = Attachment::from_path(&path).encode().await.unwrap();
        assert!(encoded.as_str().starts_with("data:image/png;base64,"));

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
