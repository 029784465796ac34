//! Declarative converter configuration.
//!
//! [`ConverterSettings`] can be deserialized from any serde format and applied
//! with [`Converter::from_settings`]. Validation happens while applying, before
//! the converter is used.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    converter::{ConfigError, Converter, PayloadCodec, SerializedForm},
    mime_type::MimeType,
    resolver::DefaultContentTypeResolver,
};

/// Settings of a [`Converter`].
///
/// ```rust
/// use mailroom_convert::{Converter, ConverterSettings, StringCodec};
///
/// let settings: ConverterSettings = serde_json::from_str(
///     r#"{ "supported_mime_types": ["text/plain"], "strict_content_type_match": true }"#,
/// )
/// .unwrap();
/// let converter = Converter::from_settings(StringCodec, settings).unwrap();
/// assert!(converter.is_strict_content_type_match());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConverterSettings {
    /// Supported MIME types; the codec's own types when absent.
    pub supported_mime_types: Option<Vec<MimeType>>,
    /// Reject messages whose content type cannot be resolved.
    pub strict_content_type_match: bool,
    /// Preferred encoded payload form.
    pub serialized_form: SerializedForm,
    /// Content type assumed for messages without a content type header.
    pub default_content_type: Option<MimeType>,
}

impl ConverterSettings {
    /// Settings advertising the given MIME types, parsed eagerly.
    pub fn with_mime_types<'a>(
        mime_types: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, ConfigError> {
        let supported = mime_types
            .into_iter()
            .map(|raw| {
                raw.parse::<MimeType>()
                    .map_err(|err| ConfigError::invalid_mime_type(raw, err))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            supported_mime_types: Some(supported),
            ..Self::default()
        })
    }
}

impl<C: PayloadCodec> Converter<C> {
    /// Build a converter from declarative settings.
    #[tracing::instrument(skip_all)]
    pub fn from_settings(codec: C, settings: ConverterSettings) -> Result<Self, ConfigError> {
        let mut converter = match settings.supported_mime_types {
            Some(supported) => Converter::with_supported_mime_types(codec, supported),
            None => Converter::new(codec),
        };

        if let Some(default_mime_type) = settings.default_content_type {
            let resolver = DefaultContentTypeResolver::new().with_default_mime_type(default_mime_type);
            converter.set_content_type_resolver(Some(Arc::new(resolver)))?;
        }
        converter.set_strict_content_type_match(settings.strict_content_type_match)?;
        converter.set_serialized_form(settings.serialized_form);

        tracing::debug!(
            supported = ?converter.supported_mime_types(),
            strict = converter.is_strict_content_type_match(),
            form = %converter.serialized_form(),
            "Converter configured",
        );
        Ok(converter)
    }
}
