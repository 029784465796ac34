//! Message converters and the content negotiation shared by all of them.
//!
//! A converter is split in two:
//!
//! - a [`PayloadCodec`], implementing the format specific part: which payload
//!   types it handles and how to encode/decode them;
//! - [`Converter`], which owns the negotiation settings and gates every call to
//!   the codec behind the type and content type checks.
//!
//! Callers use the object safe [`MessageConverter`] trait. `Ok(None)` means
//! "this converter does not apply" and is not an error, which lets callers try
//! several converters in turn (see [`CompositeMessageConverter`]).

mod byte_array;
mod composite;
mod string;

use std::{
    any::{Any, TypeId},
    fmt,
    str::FromStr,
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use tracing_error::SpanTrace;

use crate::{
    Envelope, Message, Payload,
    headers::{CONTENT_TYPE, HeaderAccessor, HeaderMap, Headers},
    mime_type::MimeType,
    resolver::{ContentTypeResolver, DefaultContentTypeResolver},
};

pub use byte_array::ByteArrayCodec;
pub use composite::CompositeMessageConverter;
pub use string::StringCodec;

/// Runtime description of a conversion target.
#[derive(Debug, Clone, Copy)]
pub struct TargetType {
    id: TypeId,
    name: &'static str,
}

impl TargetType {
    /// Describe the type `T`.
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// `TypeId` of the described type.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Type name, for diagnostics only.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this describes `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TargetType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TargetType {}

/// Preferred form of an encoded payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum SerializedForm {
    /// `Vec<u8>` payloads.
    #[default]
    Binary,
    /// `String` payloads.
    Text,
}

impl SerializedForm {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SerializedForm::Binary => "binary",
            SerializedForm::Text => "text",
        }
    }
}

impl FromStr for SerializedForm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" | "bytes" => Ok(SerializedForm::Binary),
            "text" | "string" => Ok(SerializedForm::Text),
            _ => Err(ConfigError::invalid_serialized_form(s)),
        }
    }
}

impl TryFrom<String> for SerializedForm {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SerializedForm> for &'static str {
    fn from(value: SerializedForm) -> Self {
        value.as_str()
    }
}

impl fmt::Display for SerializedForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format specific half of a converter.
///
/// `supports` is consulted with the target type when decoding and with the
/// runtime type of the payload when encoding. `decode` and `encode` are only
/// called once both the type and the content type checks have passed.
pub trait PayloadCodec: Send + Sync {
    /// MIME types advertised when the codec is used with [`Converter::new`].
    fn mime_types(&self) -> Vec<MimeType> {
        Vec::new()
    }

    /// Whether values of the given type are handled by this codec.
    fn supports(&self, type_id: TypeId) -> bool;

    /// Convert the message payload into a value of the target type.
    ///
    /// `Ok(None)` is returned when the payload yields nothing meaningful.
    fn decode(&self, message: &Message, target: TargetType)
    -> Result<Option<Payload>, tower::BoxError>;

    /// Convert a value into its serialized form.
    fn encode(
        &self,
        payload: &dyn Any,
        headers: Option<&HeaderMap>,
        form: SerializedForm,
    ) -> Result<Payload, tower::BoxError>;

    /// Content type assigned to an encoded payload when the headers have none.
    fn default_content_type(&self, _payload: &dyn Any, supported: &[MimeType]) -> Option<MimeType> {
        supported.first().cloned()
    }
}

/// Converts between messages and payload values.
pub trait MessageConverter: Send + Sync {
    /// Convert the payload of `message` into `target`.
    ///
    /// Returns `Ok(None)` if this converter cannot perform the conversion.
    fn from_message(
        &self,
        message: &Message,
        target: TargetType,
    ) -> Result<Option<Payload>, ConversionError>;

    /// Create a message from `payload`, filling in a content type header when
    /// the supplied headers have none.
    ///
    /// Returns `Ok(None)` if this converter cannot perform the conversion.
    fn to_message(
        &self,
        payload: &dyn Any,
        headers: Option<Headers<'_>>,
    ) -> Result<Option<Message>, ConversionError>;
}

/// Typed helpers over [`MessageConverter`].
pub trait MessageConverterExt: MessageConverter {
    /// Convert the payload of `message` into a `T`.
    fn from_message_as<T: Any>(&self, message: &Message) -> Result<Option<T>, ConversionError> {
        let Some(payload) = self.from_message(message, TargetType::of::<T>())? else {
            return Ok(None);
        };
        match payload.downcast::<T>() {
            Ok(value) => Ok(Some(*value)),
            Err(_) => Err(ConversionError::decode(
                format!("decoded payload is not a {}", std::any::type_name::<T>()).into(),
            )),
        }
    }
}

impl<C: MessageConverter + ?Sized> MessageConverterExt for C {}

/// Content negotiating converter around a [`PayloadCodec`].
///
/// Settings are changed through `&mut self` (or the `with_*` builders) before
/// the converter is shared; shared converters are read-only.
pub struct Converter<C> {
    codec: C,
    supported_mime_types: Vec<MimeType>,
    content_type_resolver: Option<Arc<dyn ContentTypeResolver>>,
    strict_content_type_match: bool,
    serialized_form: SerializedForm,
}

impl<C: PayloadCodec> Converter<C> {
    /// Create a converter advertising the codec's own MIME types.
    pub fn new(codec: C) -> Self {
        let supported = codec.mime_types();
        Self::with_supported_mime_types(codec, supported)
    }
}

impl<C> Converter<C> {
    /// Create a converter advertising `supported` MIME types.
    ///
    /// The first entry is the default content type of produced messages.
    pub fn with_supported_mime_types(
        codec: C,
        supported: impl IntoIterator<Item = MimeType>,
    ) -> Self {
        Self {
            codec,
            supported_mime_types: supported.into_iter().collect(),
            content_type_resolver: Some(Arc::new(DefaultContentTypeResolver::new())),
            strict_content_type_match: false,
            serialized_form: SerializedForm::default(),
        }
    }

    /// Codec performing the actual encoding and decoding.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Supported MIME types, in order of preference.
    pub fn supported_mime_types(&self) -> &[MimeType] {
        &self.supported_mime_types
    }

    /// Resolver used to find the content type of messages, if any.
    pub fn content_type_resolver(&self) -> Option<&Arc<dyn ContentTypeResolver>> {
        self.content_type_resolver.as_ref()
    }

    /// Replace the resolver used to find the content type of messages.
    ///
    /// Clearing the resolver while strict matching is enabled is rejected.
    pub fn set_content_type_resolver(
        &mut self,
        resolver: Option<Arc<dyn ContentTypeResolver>>,
    ) -> Result<(), ConfigError> {
        if resolver.is_none() && self.strict_content_type_match {
            return Err(ConfigError::strict_without_resolver());
        }
        self.content_type_resolver = resolver;
        Ok(())
    }

    /// Use `resolver` to find the content type of messages.
    pub fn with_content_type_resolver(mut self, resolver: impl ContentTypeResolver + 'static) -> Self {
        self.content_type_resolver = Some(Arc::new(resolver));
        self
    }

    /// Whether messages without a resolvable content type are rejected.
    pub fn is_strict_content_type_match(&self) -> bool {
        self.strict_content_type_match
    }

    /// Only convert messages whose content type resolves to a supported type.
    ///
    /// Enabling requires a non-empty list of supported MIME types and a
    /// configured resolver.
    pub fn set_strict_content_type_match(&mut self, strict: bool) -> Result<(), ConfigError> {
        if strict {
            if self.supported_mime_types.is_empty() {
                return Err(ConfigError::strict_without_mime_types());
            }
            if self.content_type_resolver.is_none() {
                return Err(ConfigError::strict_without_resolver());
            }
        }
        self.strict_content_type_match = strict;
        Ok(())
    }

    /// Builder form of [`Converter::set_strict_content_type_match`].
    pub fn with_strict_content_type_match(mut self, strict: bool) -> Result<Self, ConfigError> {
        self.set_strict_content_type_match(strict)?;
        Ok(self)
    }

    /// Preferred form of encoded payloads.
    pub fn serialized_form(&self) -> SerializedForm {
        self.serialized_form
    }

    /// Set the preferred form of encoded payloads.
    pub fn set_serialized_form(&mut self, form: SerializedForm) {
        self.serialized_form = form;
    }

    /// Builder form of [`Converter::set_serialized_form`].
    pub fn with_serialized_form(mut self, form: SerializedForm) -> Self {
        self.serialized_form = form;
        self
    }

    /// Whether the content type found in `headers` is acceptable.
    pub fn supports_mime_type(&self, headers: Option<&HeaderMap>) -> bool {
        if self.supported_mime_types.is_empty() {
            return true;
        }
        let Some(mime_type) = self.resolve_mime_type(headers) else {
            return !self.strict_content_type_match;
        };
        self.supported_mime_types
            .iter()
            .any(|supported| supported.matches(&mime_type))
    }

    fn resolve_mime_type(&self, headers: Option<&HeaderMap>) -> Option<MimeType> {
        self.content_type_resolver
            .as_ref()
            .and_then(|resolver| resolver.resolve(headers))
    }
}

impl<C: PayloadCodec> Converter<C> {
    /// Whether the payload of `message` can be decoded into `target`.
    pub fn can_convert_from(&self, message: &Message, target: TargetType) -> bool {
        self.codec.supports(target.id()) && self.supports_mime_type(Some(&*message.headers))
    }

    /// Whether `payload` can be encoded into a message with `headers`.
    pub fn can_convert_to(&self, payload: &dyn Any, headers: Option<&HeaderMap>) -> bool {
        self.codec.supports(payload.type_id()) && self.supports_mime_type(headers)
    }

    /// Content type given to an encoded payload.
    pub fn default_content_type(&self, payload: &dyn Any) -> Option<MimeType> {
        self.codec
            .default_content_type(payload, &self.supported_mime_types)
    }
}

impl<C: PayloadCodec> MessageConverter for Converter<C> {
    #[tracing::instrument(skip_all, fields(target_type = target.name()))]
    fn from_message(
        &self,
        message: &Message,
        target: TargetType,
    ) -> Result<Option<Payload>, ConversionError> {
        if !self.can_convert_from(message, target) {
            tracing::debug!("Converter does not apply to message");
            return Ok(None);
        }
        self.codec
            .decode(message, target)
            .map_err(ConversionError::decode)
    }

    #[tracing::instrument(skip_all)]
    fn to_message(
        &self,
        payload: &dyn Any,
        headers: Option<Headers<'_>>,
    ) -> Result<Option<Message>, ConversionError> {
        let entries = headers.as_ref().map(Headers::entries);
        if !self.can_convert_to(payload, entries) {
            tracing::debug!("Converter does not apply to payload");
            return Ok(None);
        }

        let encoded = self
            .codec
            .encode(payload, entries, self.serialized_form)
            .map_err(ConversionError::encode)?;
        let mime_type = self.default_content_type(&*encoded);

        let headers = match headers {
            Some(Headers::Mutable(accessor)) => {
                set_content_type_if_absent(accessor, mime_type.as_ref());
                accessor.message_headers()
            }
            Some(Headers::Frozen(frozen)) => {
                let mut accessor = HeaderAccessor::from_headers(frozen);
                set_content_type_if_absent(&mut accessor, mime_type.as_ref());
                accessor.message_headers()
            }
            None => {
                let mut accessor = HeaderAccessor::new();
                set_content_type_if_absent(&mut accessor, mime_type.as_ref());
                accessor.message_headers()
            }
        };

        Ok(Some(Envelope {
            headers,
            message: encoded,
        }))
    }
}

fn set_content_type_if_absent(accessor: &mut HeaderAccessor, mime_type: Option<&MimeType>) {
    if let Some(mime_type) = mime_type {
        accessor.set_header_if_absent(CONTENT_TYPE, mime_type.to_string());
    }
}

/// Error returned when a converter is misconfigured.
///
/// Wraps the failure kind and captures a tracing span backtrace.
#[derive(Debug)]
pub struct ConfigError {
    context: SpanTrace,
    kind: ConfigErrorKind,
}

/// Configuration error kinds.
#[derive(Debug)]
pub enum ConfigErrorKind {
    /// Strict matching needs at least one supported MIME type.
    StrictWithoutMimeTypes,
    /// Strict matching needs a content type resolver.
    StrictWithoutResolver,
    /// Serialized form other than `binary` or `text`.
    InvalidSerializedForm(String),
    /// A configured MIME type does not parse.
    InvalidMimeType(String, mime::FromStrError),
}

impl ConfigError {
    pub(crate) fn strict_without_mime_types() -> Self {
        Self::new(ConfigErrorKind::StrictWithoutMimeTypes)
    }

    pub(crate) fn strict_without_resolver() -> Self {
        Self::new(ConfigErrorKind::StrictWithoutResolver)
    }

    pub(crate) fn invalid_serialized_form(value: &str) -> Self {
        Self::new(ConfigErrorKind::InvalidSerializedForm(value.to_owned()))
    }

    pub(crate) fn invalid_mime_type(value: &str, err: mime::FromStrError) -> Self {
        Self::new(ConfigErrorKind::InvalidMimeType(value.to_owned(), err))
    }

    fn new(kind: ConfigErrorKind) -> Self {
        Self {
            context: SpanTrace::capture(),
            kind,
        }
    }

    /// What went wrong.
    pub fn kind(&self) -> &ConfigErrorKind {
        &self.kind
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ConfigErrorKind::StrictWithoutMimeTypes => {
                writeln!(f, "Strict match requires a non-empty list of supported MIME types")
            }
            ConfigErrorKind::StrictWithoutResolver => {
                writeln!(f, "Strict match requires a content type resolver")
            }
            ConfigErrorKind::InvalidSerializedForm(value) => {
                writeln!(f, "Serialized form must be binary or text: {value}")
            }
            ConfigErrorKind::InvalidMimeType(value, err) => {
                writeln!(f, "Invalid MIME type {value:?}: {err}")
            }
        }?;
        fmt::Display::fmt(&self.context, f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ConfigErrorKind::InvalidMimeType(_, err) => Some(err),
            _ => None,
        }
    }
}

/// Error returned when a codec fails or no converter applies.
#[derive(Debug)]
pub struct ConversionError {
    context: SpanTrace,
    kind: ConversionErrorKind,
}

/// Conversion error kinds.
#[derive(Debug)]
pub enum ConversionErrorKind {
    /// The codec failed to decode a payload.
    Decode(tower::BoxError),
    /// The codec failed to encode a payload.
    Encode(tower::BoxError),
    /// No converter accepted the payload.
    NotConvertible,
}

impl ConversionError {
    /// Create an error for a payload the codec failed to decode.
    pub fn decode(err: tower::BoxError) -> Self {
        Self::new(ConversionErrorKind::Decode(err))
    }

    /// Create an error for a payload the codec failed to encode.
    pub fn encode(err: tower::BoxError) -> Self {
        Self::new(ConversionErrorKind::Encode(err))
    }

    /// Create an error for a payload no converter accepted.
    pub fn not_convertible() -> Self {
        Self::new(ConversionErrorKind::NotConvertible)
    }

    fn new(kind: ConversionErrorKind) -> Self {
        Self {
            context: SpanTrace::capture(),
            kind,
        }
    }

    /// What went wrong.
    pub fn kind(&self) -> &ConversionErrorKind {
        &self.kind
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ConversionErrorKind::Decode(err) => writeln!(f, "Decode error: {err}"),
            ConversionErrorKind::Encode(err) => writeln!(f, "Encode error: {err}"),
            ConversionErrorKind::NotConvertible => writeln!(f, "No converter accepted the payload"),
        }?;
        fmt::Display::fmt(&self.context, f)
    }
}

impl std::error::Error for ConversionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ConversionErrorKind::Decode(err) => Some(err.as_ref()),
            ConversionErrorKind::Encode(err) => Some(err.as_ref()),
            ConversionErrorKind::NotConvertible => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MessageHeaders;
    use serde_json::Value;

    /// Codec passing `u32` payloads through untouched.
    struct CounterCodec;

    impl PayloadCodec for CounterCodec {
        fn supports(&self, type_id: TypeId) -> bool {
            type_id == TypeId::of::<u32>()
        }

        fn decode(
            &self,
            message: &Message,
            _target: TargetType,
        ) -> Result<Option<Payload>, tower::BoxError> {
            Ok(message.payload_as::<u32>().map(|n| Box::new(*n) as Payload))
        }

        fn encode(
            &self,
            payload: &dyn Any,
            _headers: Option<&HeaderMap>,
            _form: SerializedForm,
        ) -> Result<Payload, tower::BoxError> {
            let n = payload.downcast_ref::<u32>().ok_or("not a u32")?;
            if *n == 0 {
                return Err("zero is not a counter".into());
            }
            Ok(Box::new(*n))
        }
    }

    fn converter(supported: &[&str]) -> Converter<CounterCodec> {
        Converter::with_supported_mime_types(
            CounterCodec,
            supported.iter().map(|m| m.parse().unwrap()),
        )
    }

    fn with_content_type(value: &str) -> MessageHeaders {
        [(CONTENT_TYPE, value)].into_iter().collect()
    }

    fn content_type_of(message: &Message) -> Option<&str> {
        message.headers.get(CONTENT_TYPE).and_then(Value::as_str)
    }

    #[test]
    fn empty_supported_list_accepts_any_headers() {
        let mut converter = converter(&[]);
        converter.set_content_type_resolver(None).unwrap();

        assert!(converter.supports_mime_type(None));
        assert!(converter.supports_mime_type(Some(&with_content_type("text/html"))));
        assert!(converter.supports_mime_type(Some(&with_content_type("garbage"))));
    }

    #[test]
    fn unresolved_content_type_is_accepted_when_lenient() {
        let converter = converter(&["application/json"]);

        assert!(converter.supports_mime_type(None));
        assert!(converter.supports_mime_type(Some(&MessageHeaders::default())));
    }

    #[test]
    fn unresolved_content_type_is_rejected_when_strict() {
        let converter = converter(&["application/json"])
            .with_strict_content_type_match(true)
            .unwrap();

        assert!(!converter.supports_mime_type(None));
        assert!(!converter.supports_mime_type(Some(&MessageHeaders::default())));
        assert!(converter.supports_mime_type(Some(&with_content_type("application/json"))));
    }

    #[test]
    fn missing_resolver_means_unresolved() {
        let mut converter = converter(&["application/json"]);
        converter.set_content_type_resolver(None).unwrap();

        assert!(converter.supports_mime_type(Some(&with_content_type("text/html"))));
    }

    #[test]
    fn resolved_content_type_must_match_type_and_subtype() {
        let converter = converter(&["application/json", "text/plain"]);

        assert!(converter.supports_mime_type(Some(&with_content_type("application/json"))));
        assert!(converter.supports_mime_type(Some(&with_content_type(
            "text/plain;charset=iso-8859-1"
        ))));
        assert!(!converter.supports_mime_type(Some(&with_content_type("image/png"))));
        assert!(!converter.supports_mime_type(Some(&with_content_type("application/xml"))));
        assert!(!converter.supports_mime_type(Some(&with_content_type("*/*"))));
    }

    #[test]
    fn custom_resolver_is_used() {
        let converter = converter(&["application/json"])
            .with_content_type_resolver(|_: Option<&HeaderMap>| Some(MimeType::text_plain()));

        assert!(!converter.supports_mime_type(Some(&with_content_type("application/json"))));
    }

    #[test]
    fn strict_match_requires_supported_mime_types() {
        let err = converter(&[])
            .with_strict_content_type_match(true)
            .err()
            .unwrap();

        assert!(matches!(err.kind(), ConfigErrorKind::StrictWithoutMimeTypes));
    }

    #[test]
    fn strict_match_requires_resolver() {
        let mut converter = converter(&["application/json"]);
        converter.set_content_type_resolver(None).unwrap();

        let err = converter.set_strict_content_type_match(true).unwrap_err();
        assert!(matches!(err.kind(), ConfigErrorKind::StrictWithoutResolver));
        assert!(!converter.is_strict_content_type_match());
    }

    #[test]
    fn resolver_cannot_be_cleared_while_strict() {
        let mut converter = converter(&["application/json"])
            .with_strict_content_type_match(true)
            .unwrap();

        let err = converter.set_content_type_resolver(None).unwrap_err();
        assert!(matches!(err.kind(), ConfigErrorKind::StrictWithoutResolver));
        assert!(converter.content_type_resolver().is_some());

        converter.set_strict_content_type_match(false).unwrap();
        converter.set_content_type_resolver(None).unwrap();
    }

    #[test]
    fn disabling_strict_match_is_always_allowed() {
        let mut converter = converter(&[]);
        converter.set_strict_content_type_match(false).unwrap();
        assert!(!converter.is_strict_content_type_match());
    }

    #[test]
    fn to_message_sets_default_content_type() {
        let converter = converter(&["application/json", "text/plain"]);

        let message = converter.to_message(&7u32, None).unwrap().unwrap();

        assert_eq!(message.payload_as::<u32>(), Some(&7));
        assert_eq!(content_type_of(&message), Some("application/json"));
    }

    #[test]
    fn to_message_without_supported_types_sets_no_content_type() {
        let converter = converter(&[]);

        let message = converter.to_message(&7u32, None).unwrap().unwrap();
        assert!(message.headers.get(CONTENT_TYPE).is_none());

        let headers: MessageHeaders = [("priority", 1)].into_iter().collect();
        let message = converter
            .to_message(&7u32, Some(Headers::from(&headers)))
            .unwrap()
            .unwrap();
        assert!(message.headers.get(CONTENT_TYPE).is_none());
        assert_eq!(message.headers.get("priority"), Some(&Value::from(1)));
    }

    #[test]
    fn to_message_never_overwrites_content_type() {
        let converter = converter(&["application/json"]);
        let headers = with_content_type("X");

        let message = converter
            .to_message(&7u32, Some(Headers::from(&headers)))
            .unwrap()
            .unwrap();

        assert_eq!(content_type_of(&message), Some("X"));
    }

    #[test]
    fn to_message_copies_frozen_headers() {
        let converter = converter(&["application/json"]);
        let headers: MessageHeaders = [("priority", 1)].into_iter().collect();

        let message = converter
            .to_message(&7u32, Some(Headers::from(&headers)))
            .unwrap()
            .unwrap();

        assert!(!message.headers.ptr_eq(&headers));
        assert!(headers.get(CONTENT_TYPE).is_none());
        assert_eq!(message.headers.get("priority"), Some(&Value::from(1)));
        assert_eq!(content_type_of(&message), Some("application/json"));
    }

    #[test]
    fn to_message_writes_into_mutable_headers() {
        let converter = converter(&["application/json"]);
        let mut accessor = HeaderAccessor::new();
        accessor.set_header("priority", 1);

        let message = converter
            .to_message(&7u32, Some(Headers::from(&mut accessor)))
            .unwrap()
            .unwrap();

        assert_eq!(
            accessor.get(CONTENT_TYPE),
            Some(&Value::from("application/json"))
        );
        assert!(message.headers.ptr_eq(&accessor.message_headers()));
    }

    #[test]
    fn to_message_keeps_content_type_of_mutable_headers() {
        let converter = converter(&["application/json"]);
        let mut accessor = HeaderAccessor::new();
        accessor.set_header(CONTENT_TYPE, "application/json;charset=utf-16");

        let message = converter
            .to_message(&7u32, Some(Headers::from(&mut accessor)))
            .unwrap()
            .unwrap();

        assert_eq!(
            content_type_of(&message),
            Some("application/json;charset=utf-16")
        );
    }

    #[test]
    fn to_message_declines_unsupported_payload() {
        let converter = converter(&["application/json"]);

        assert!(converter.to_message(&"text", None).unwrap().is_none());
        assert!(converter.to_message(&7u64, None).unwrap().is_none());
    }

    #[test]
    fn to_message_declines_unsupported_content_type() {
        let converter = converter(&["application/json"]);
        let headers = with_content_type("text/html");
        let mut accessor = HeaderAccessor::from_headers(&headers);

        assert!(
            converter
                .to_message(&7u32, Some(Headers::from(&headers)))
                .unwrap()
                .is_none()
        );
        let before = accessor.message_headers();
        assert!(
            converter
                .to_message(&7u32, Some(Headers::from(&mut accessor)))
                .unwrap()
                .is_none()
        );
        assert!(before.ptr_eq(&accessor.message_headers()));
    }

    #[test]
    fn declared_content_type_is_filled_in_and_others_are_declined() {
        let converter =
            Converter::with_supported_mime_types(StringCodec, [MimeType::application_json()]);
        let empty = MessageHeaders::default();

        let message = converter
            .to_message(&"{}".to_owned(), Some(Headers::from(&empty)))
            .unwrap()
            .unwrap();
        assert_eq!(content_type_of(&message), Some("application/json"));

        let text = with_content_type("text/plain");
        assert!(
            converter
                .to_message(&"{}".to_owned(), Some(Headers::from(&text)))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn unparseable_content_type_is_only_rejected_when_strict() {
        let mut converter = converter(&["application/json"]);
        let garbage = with_content_type("garbage");
        let number: MessageHeaders = [(CONTENT_TYPE, 12)].into_iter().collect();

        assert!(converter.supports_mime_type(Some(&garbage)));
        assert!(converter.supports_mime_type(Some(&number)));

        converter.set_strict_content_type_match(true).unwrap();
        assert!(!converter.supports_mime_type(Some(&garbage)));
        assert!(!converter.supports_mime_type(Some(&number)));
    }

    #[test]
    fn encode_failures_propagate() {
        let converter = converter(&["application/json"]);

        let err = converter.to_message(&0u32, None).unwrap_err();
        assert!(matches!(err.kind(), ConversionErrorKind::Encode(_)));
        assert!(err.to_string().contains("zero is not a counter"));
    }

    #[test]
    fn from_message_declines_unsupported_target() {
        let converter = converter(&["application/json"]);
        let message = Message::new(7u32, with_content_type("application/json"));

        assert!(
            converter
                .from_message(&message, TargetType::of::<String>())
                .unwrap()
                .is_none()
        );
        assert_eq!(converter.from_message_as::<u32>(&message).unwrap(), Some(7));
    }

    #[test]
    fn from_message_declines_unsupported_content_type() {
        let converter = converter(&["application/json"]);
        let message = Message::new(7u32, with_content_type("text/html"));

        assert!(converter.from_message_as::<u32>(&message).unwrap().is_none());
    }

    #[test]
    fn from_message_without_supported_types_depends_only_on_target() {
        let converter = converter(&[]);
        let message = Message::new(7u32, with_content_type("image/png"));

        assert_eq!(converter.from_message_as::<u32>(&message).unwrap(), Some(7));
        assert!(converter.from_message_as::<i64>(&message).unwrap().is_none());
    }

    #[test]
    fn decode_may_yield_nothing() {
        let converter = converter(&[]);
        let message = Message::new("not a number".to_owned(), MessageHeaders::default());

        assert!(converter.from_message_as::<u32>(&message).unwrap().is_none());
    }

    #[test]
    fn serialized_form_parsing() {
        assert_eq!("binary".parse::<SerializedForm>().unwrap(), SerializedForm::Binary);
        assert_eq!(" Text ".parse::<SerializedForm>().unwrap(), SerializedForm::Text);

        let err = "object".parse::<SerializedForm>().unwrap_err();
        assert!(matches!(err.kind(), ConfigErrorKind::InvalidSerializedForm(v) if v == "object"));
    }

    #[test]
    fn serialized_form_defaults_to_binary() {
        let converter = converter(&[]);
        assert_eq!(converter.serialized_form(), SerializedForm::Binary);
        assert_eq!(
            converter.with_serialized_form(SerializedForm::Text).serialized_form(),
            SerializedForm::Text
        );
    }
}
