//! Content type resolution strategies.

use serde_json::Value;

use crate::{
    headers::{CONTENT_TYPE, HeaderMap},
    mime_type::MimeType,
};

/// Strategy extracting the content type of a message from its headers.
///
/// Returning `None` means the content type could not be resolved; whether
/// that is acceptable is decided by the converter's strict-match setting.
pub trait ContentTypeResolver: Send + Sync {
    /// Content type of a message with `headers`, if it can be determined.
    fn resolve(&self, headers: Option<&HeaderMap>) -> Option<MimeType>;
}

impl<F> ContentTypeResolver for F
where
    F: Fn(Option<&HeaderMap>) -> Option<MimeType> + Send + Sync,
{
    fn resolve(&self, headers: Option<&HeaderMap>) -> Option<MimeType> {
        self(headers)
    }
}

/// Resolver reading the [`CONTENT_TYPE`] header.
///
/// A string value is parsed as a MIME type. When the header is missing, the
/// optional default MIME type is returned instead.
///
/// Values that are not strings or do not parse are logged and treated as
/// unresolved, not as errors. A converter with strict content type matching
/// therefore rejects such messages, while a lenient one accepts them as if
/// they carried no content type at all. Use strict matching when a malformed
/// header must not reach a codec.
#[derive(Debug, Clone, Default)]
pub struct DefaultContentTypeResolver {
    default_mime_type: Option<MimeType>,
}

impl DefaultContentTypeResolver {
    /// Create a resolver without a default MIME type.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fall back to `mime_type` when a message carries no content type.
    pub fn with_default_mime_type(mut self, mime_type: MimeType) -> Self {
        self.default_mime_type = Some(mime_type);
        self
    }

    /// MIME type returned for messages without a content type.
    pub fn default_mime_type(&self) -> Option<&MimeType> {
        self.default_mime_type.as_ref()
    }
}

impl ContentTypeResolver for DefaultContentTypeResolver {
    fn resolve(&self, headers: Option<&HeaderMap>) -> Option<MimeType> {
        let Some(value) = headers.and_then(|h| h.get(CONTENT_TYPE)) else {
            return self.default_mime_type.clone();
        };

        match value {
            Value::String(raw) => match raw.parse() {
                Ok(mime_type) => Some(mime_type),
                Err(error) => {
                    tracing::warn!(%error, content_type = %raw, "Unparseable content type header");
                    None
                }
            },
            Value::Null => self.default_mime_type.clone(),
            other => {
                tracing::warn!(value = ?other, "Content type header is not a string");
                None
            }
        }
    }
}
