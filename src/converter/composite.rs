use std::any::Any;

use crate::{
    Message, Payload,
    converter::{ConversionError, MessageConverter, TargetType},
    headers::Headers,
};

/// Converter delegating to a list of converters.
///
/// Converters are tried in order and the first one producing a value wins.
/// Errors are returned as soon as a converter reports one.
#[derive(Default)]
pub struct CompositeMessageConverter {
    converters: Vec<Box<dyn MessageConverter>>,
}

impl CompositeMessageConverter {
    /// Create a composite trying `converters` in order.
    pub fn new(converters: Vec<Box<dyn MessageConverter>>) -> Self {
        Self { converters }
    }

    /// Append a converter, tried after the existing ones.
    pub fn with(mut self, converter: impl MessageConverter + 'static) -> Self {
        self.converters.push(Box::new(converter));
        self
    }

    /// Delegates, in the order they are tried.
    pub fn converters(&self) -> &[Box<dyn MessageConverter>] {
        &self.converters
    }
}

impl MessageConverter for CompositeMessageConverter {
    #[tracing::instrument(skip_all, fields(target_type = target.name()))]
    fn from_message(
        &self,
        message: &Message,
        target: TargetType,
    ) -> Result<Option<Payload>, ConversionError> {
        for converter in &self.converters {
            if let Some(value) = converter.from_message(message, target)? {
                return Ok(Some(value));
            }
        }
        tracing::debug!("No converter accepted the message");
        Ok(None)
    }

    #[tracing::instrument(skip_all)]
    fn to_message(
        &self,
        payload: &dyn Any,
        mut headers: Option<Headers<'_>>,
    ) -> Result<Option<Message>, ConversionError> {
        for converter in &self.converters {
            if let Some(message) =
                converter.to_message(payload, headers.as_mut().map(Headers::reborrow))?
            {
                return Ok(Some(message));
            }
        }
        tracing::debug!("No converter accepted the payload");
        Ok(None)
    }
}
