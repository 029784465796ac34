#![doc = include_str!("../README.md")]

pub mod converter;
pub mod envelope;
pub mod headers;
#[cfg(feature = "layer")]
pub mod layer;
pub mod mime_type;
pub mod resolver;
mod settings;

#[doc(inline)]
pub use envelope::{Envelope, Message, Payload};

#[doc(inline)]
pub use converter::{
    ByteArrayCodec, CompositeMessageConverter, ConfigError, ConfigErrorKind, ConversionError,
    ConversionErrorKind, Converter, MessageConverter, MessageConverterExt, PayloadCodec,
    SerializedForm, StringCodec, TargetType,
};

#[doc(inline)]
pub use headers::{CONTENT_TYPE, HeaderAccessor, HeaderMap, Headers, MessageHeaders};

#[doc(inline)]
pub use mime_type::MimeType;

#[doc(inline)]
pub use resolver::{ContentTypeResolver, DefaultContentTypeResolver};

#[doc(inline)]
pub use settings::ConverterSettings;

#[cfg(feature = "layer")]
#[doc(inline)]
pub use layer::{ConversionLayer, ConversionService};
