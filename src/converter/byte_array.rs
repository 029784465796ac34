use std::any::{Any, TypeId};

use crate::{
    Message, Payload,
    converter::{Converter, PayloadCodec, SerializedForm, TargetType},
    headers::HeaderMap,
    mime_type::MimeType,
};

/// Codec passing `Vec<u8>` payloads through.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteArrayCodec;

impl PayloadCodec for ByteArrayCodec {
    fn mime_types(&self) -> Vec<MimeType> {
        vec![MimeType::application_octet_stream()]
    }

    fn supports(&self, type_id: TypeId) -> bool {
        type_id == TypeId::of::<Vec<u8>>()
    }

    fn decode(
        &self,
        message: &Message,
        _target: TargetType,
    ) -> Result<Option<Payload>, tower::BoxError> {
        Ok(message
            .payload_as::<Vec<u8>>()
            .map(|bytes| Box::new(bytes.clone()) as Payload))
    }

    fn encode(
        &self,
        payload: &dyn Any,
        _headers: Option<&HeaderMap>,
        _form: SerializedForm,
    ) -> Result<Payload, tower::BoxError> {
        let bytes = payload
            .downcast_ref::<Vec<u8>>()
            .ok_or("payload is not a byte vector")?;
        Ok(Box::new(bytes.clone()))
    }
}

impl Converter<ByteArrayCodec> {
    /// Converter for `Vec<u8>` payloads advertising `application/octet-stream`.
    pub fn byte_array() -> Self {
        Converter::new(ByteArrayCodec)
    }
}
