use std::any::Any;

use crate::headers::MessageHeaders;

/// Headers paired with a payload.
///
/// Before conversion a pipeline stage usually holds a typed payload, such as
/// `Envelope<MessageHeaders, Order>`. A converter turns it into a [`Message`],
/// whose headers are frozen and whose payload is only known at runtime.
///
/// A `(headers, payload)` tuple converts into an envelope with `into()`.
///
/// ## Example
///
/// ```rust
/// use mailroom_convert::{Envelope, MessageHeaders};
///
/// let envelope: Envelope<_, _> = (MessageHeaders::default(), "hello".to_owned()).into();
/// assert_eq!(envelope.message, "hello");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<H, M> {
    /// Message metadata.
    pub headers: H,
    /// Message payload.
    pub message: M,
}

impl<H, M> From<(H, M)> for Envelope<H, M> {
    fn from(value: (H, M)) -> Self {
        Envelope {
            headers: value.0,
            message: value.1,
        }
    }
}

/// Opaque payload carried by a [`Message`].
pub type Payload = Box<dyn Any + Send + Sync>;

/// A converted message: frozen headers plus an opaque payload.
pub type Message = Envelope<MessageHeaders, Payload>;

impl Envelope<MessageHeaders, Payload> {
    /// Build a message from any payload value.
    pub fn new<T: Any + Send + Sync>(payload: T, headers: MessageHeaders) -> Self {
        Envelope {
            headers,
            message: Box::new(payload),
        }
    }

    /// Borrow the payload as `T`, if that is its runtime type.
    pub fn payload_as<T: Any>(&self) -> Option<&T> {
        self.message.downcast_ref::<T>()
    }
}
