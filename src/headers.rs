//! Message headers.
//!
//! Two header representations exist and the difference is visible in the
//! type system:
//!
//! - [`MessageHeaders`]: the frozen header set attached to a [`Message`].
//!   Cloning is cheap and never copies entries.
//! - [`HeaderAccessor`]: a mutable header set under construction. Converters
//!   handed a `&mut HeaderAccessor` fill in missing headers in place instead of
//!   copying.
//!
//! [`Headers`] is the argument type converters accept, covering both cases.
//!
//! [`Message`]: crate::Message

use std::{collections::BTreeMap, ops::Deref, sync::Arc};

use serde_json::Value;

use crate::mime_type::MimeType;

/// Header key holding the content type of a message.
pub const CONTENT_TYPE: &str = "contentType";

/// Underlying header storage, ordered by key.
pub type HeaderMap = BTreeMap<String, Value>;

/// Frozen header set of a message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageHeaders(Arc<HeaderMap>);

impl MessageHeaders {
    /// Freeze `headers`.
    pub fn new(headers: HeaderMap) -> Self {
        Self(Arc::new(headers))
    }

    /// Value of the `contentType` header when it holds a parseable MIME type.
    pub fn content_type(&self) -> Option<MimeType> {
        content_type(&self.0)
    }

    /// Whether both values share the same underlying header set.
    pub fn ptr_eq(&self, other: &MessageHeaders) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for MessageHeaders {
    type Target = HeaderMap;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<HeaderMap> for MessageHeaders {
    fn from(value: HeaderMap) -> Self {
        Self::new(value)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for MessageHeaders {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Mutable header set.
///
/// The accessor shares storage with every [`MessageHeaders`] it hands out via
/// [`HeaderAccessor::message_headers`]; a later mutation copies the entries
/// first, so messages already built keep their headers.
#[derive(Debug, Clone, Default)]
pub struct HeaderAccessor {
    headers: MessageHeaders,
}

impl HeaderAccessor {
    /// Create an accessor without headers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a copy of existing headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            headers: MessageHeaders::new(headers.clone()),
        }
    }

    /// Set a header, replacing any previous value.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.entries_mut().insert(name.into(), value.into());
    }

    /// Set a header only if no value is present yet.
    ///
    /// Returns `true` when the value was inserted.
    pub fn set_header_if_absent(&mut self, name: impl Into<String>, value: impl Into<Value>) -> bool {
        let name = name.into();
        if self.headers.contains_key(&name) {
            return false;
        }
        self.entries_mut().insert(name, value.into());
        true
    }

    /// Remove a header, returning its previous value.
    pub fn remove_header(&mut self, name: &str) -> Option<Value> {
        if !self.headers.contains_key(name) {
            return None;
        }
        self.entries_mut().remove(name)
    }

    /// Copy every entry of `headers`, overwriting existing keys.
    pub fn copy_headers(&mut self, headers: &HeaderMap) {
        if headers.is_empty() {
            return;
        }
        let entries = self.entries_mut();
        for (name, value) in headers {
            entries.insert(name.clone(), value.clone());
        }
    }

    /// Set the `contentType` header.
    pub fn set_content_type(&mut self, mime_type: &MimeType) {
        self.set_header(CONTENT_TYPE, mime_type.to_string());
    }

    /// Frozen view of the current headers, sharing storage with the accessor.
    pub fn message_headers(&self) -> MessageHeaders {
        self.headers.clone()
    }

    fn entries_mut(&mut self) -> &mut HeaderMap {
        Arc::make_mut(&mut self.headers.0)
    }
}

impl Deref for HeaderAccessor {
    type Target = HeaderMap;

    fn deref(&self) -> &Self::Target {
        &self.headers
    }
}

/// Headers supplied to a conversion.
///
/// A converter may write into `Mutable` headers in place, while `Frozen`
/// headers are copied before anything is added.
#[derive(Debug)]
pub enum Headers<'a> {
    Frozen(&'a MessageHeaders),
    Mutable(&'a mut HeaderAccessor),
}

impl Headers<'_> {
    /// Shorten the borrow, so the same headers can be offered to several
    /// converters in turn.
    pub fn reborrow(&mut self) -> Headers<'_> {
        match self {
            Headers::Frozen(headers) => Headers::Frozen(*headers),
            Headers::Mutable(accessor) => Headers::Mutable(&mut **accessor),
        }
    }

    /// Read-only view of the entries.
    pub fn entries(&self) -> &HeaderMap {
        match self {
            Headers::Frozen(headers) => headers,
            Headers::Mutable(accessor) => accessor,
        }
    }
}

impl<'a> From<&'a MessageHeaders> for Headers<'a> {
    fn from(value: &'a MessageHeaders) -> Self {
        Headers::Frozen(value)
    }
}

impl<'a> From<&'a mut HeaderAccessor> for Headers<'a> {
    fn from(value: &'a mut HeaderAccessor) -> Self {
        Headers::Mutable(value)
    }
}

pub(crate) fn content_type(headers: &HeaderMap) -> Option<MimeType> {
    headers
        .get(CONTENT_TYPE)
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse().ok())
}
