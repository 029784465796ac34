//! Tower middleware converting outgoing envelopes into [`Message`]s.

use std::{
    any::Any,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use futures_util::{TryFutureExt, future};
use tower::{Layer, Service};

use crate::{
    Envelope, Message, MessageHeaders,
    converter::{ConversionError, MessageConverter},
    headers::Headers,
};

/// Tower `Service` wrapper that converts payloads through a [`MessageConverter`].
///
/// Each `Envelope<MessageHeaders, M>` is turned into a [`Message`] carrying
/// the encoded payload and a content type header before it is passed to the
/// inner service. A payload no converter accepts fails the call with a
/// [`ConversionError`].
pub struct ConversionService<T, C: ?Sized> {
    inner: T,
    converter: Arc<C>,
}

impl<T: Clone, C: ?Sized> Clone for ConversionService<T, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            converter: Arc::clone(&self.converter),
        }
    }
}

impl<T, C, M> Service<Envelope<MessageHeaders, M>> for ConversionService<T, C>
where
    M: Any + Send + 'static,
    C: MessageConverter + ?Sized + 'static,
    T: Service<Message> + Send + 'static,
    T::Response: Send + 'static,
    T::Error: Into<tower::BoxError>,
    T::Future: Send + 'static,
{
    type Response = T::Response;
    type Error = tower::BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, req: Envelope<MessageHeaders, M>) -> Self::Future {
        let converted = self
            .converter
            .to_message(&req.message, Some(Headers::Frozen(&req.headers)))
            .and_then(|message| message.ok_or_else(ConversionError::not_convertible));

        let message = match converted {
            Ok(message) => message,
            Err(err) => {
                let err = tower::BoxError::from(err);
                return Box::pin(future::ready(Err::<T::Response, _>(err)));
            }
        };

        Box::pin(self.inner.call(message).map_err(Into::<tower::BoxError>::into))
    }
}

/// Tower `Layer` that applies [`ConversionService`] to a service stack.
pub struct ConversionLayer<C: ?Sized> {
    converter: Arc<C>,
}

impl<C> ConversionLayer<C> {
    /// Create a layer owning `converter`.
    pub fn new(converter: C) -> Self {
        Self {
            converter: Arc::new(converter),
        }
    }
}

impl<C: ?Sized> ConversionLayer<C> {
    /// Share an existing converter with the layer.
    pub fn from_shared(converter: Arc<C>) -> Self {
        Self { converter }
    }
}

impl<S, C: ?Sized> Layer<S> for ConversionLayer<C> {
    type Service = ConversionService<S, C>;

    fn layer(&self, service: S) -> Self::Service {
        ConversionService {
            inner: service,
            converter: Arc::clone(&self.converter),
        }
    }
}
