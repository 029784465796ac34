use std::any::{Any, TypeId};

use crate::{
    Message, Payload,
    converter::{Converter, PayloadCodec, SerializedForm, TargetType},
    headers::{HeaderMap, content_type},
    mime_type::MimeType,
};

/// Codec for `String` payloads.
///
/// Decodes `String` payloads as-is and `Vec<u8>` payloads as UTF-8. Encodes
/// into `Vec<u8>` or `String` depending on the requested [`SerializedForm`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCodec;

impl PayloadCodec for StringCodec {
    fn mime_types(&self) -> Vec<MimeType> {
        vec![MimeType::text_plain_utf_8()]
    }

    fn supports(&self, type_id: TypeId) -> bool {
        type_id == TypeId::of::<String>()
    }

    fn decode(
        &self,
        message: &Message,
        _target: TargetType,
    ) -> Result<Option<Payload>, tower::BoxError> {
        if let Some(text) = message.payload_as::<String>() {
            return Ok(Some(Box::new(text.clone())));
        }
        let Some(bytes) = message.payload_as::<Vec<u8>>() else {
            return Ok(None);
        };

        if let Some(charset) = content_type(&message.headers)
            .as_ref()
            .and_then(|mime| mime.param("charset"))
        {
            if !is_utf_8(charset) {
                return Err(format!("unsupported charset: {charset}").into());
            }
        }

        let text = String::from_utf8(bytes.clone())?;
        Ok(Some(Box::new(text)))
    }

    fn encode(
        &self,
        payload: &dyn Any,
        _headers: Option<&HeaderMap>,
        form: SerializedForm,
    ) -> Result<Payload, tower::BoxError> {
        let text = payload
            .downcast_ref::<String>()
            .ok_or("payload is not a String")?;

        let encoded: Payload = match form {
            SerializedForm::Binary => Box::new(text.as_bytes().to_vec()),
            SerializedForm::Text => Box::new(text.clone()),
        };
        Ok(encoded)
    }
}

fn is_utf_8(charset: &str) -> bool {
    charset.eq_ignore_ascii_case("utf-8") || charset.eq_ignore_ascii_case("utf8")
}

impl Converter<StringCodec> {
    /// Converter for `String` payloads advertising `text/plain; charset=utf-8`.
    pub fn string() -> Self {
        Converter::new(StringCodec)
    }
}
