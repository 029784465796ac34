//! MIME type descriptor used for content negotiation.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A content type descriptor such as `application/json`.
///
/// `MimeType` wraps a parsed [`mime::Mime`]. Type and subtype are normalized to
/// lowercase by the parser; parameters (e.g. `charset`) are kept but play no
/// part in [`MimeType::matches`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MimeType(mime::Mime);

impl MimeType {
    /// `application/json`
    pub fn application_json() -> Self {
        Self(mime::APPLICATION_JSON)
    }

    /// `application/octet-stream`
    pub fn application_octet_stream() -> Self {
        Self(mime::APPLICATION_OCTET_STREAM)
    }

    /// `text/plain`
    pub fn text_plain() -> Self {
        Self(mime::TEXT_PLAIN)
    }

    /// `text/plain; charset=utf-8`
    pub fn text_plain_utf_8() -> Self {
        Self(mime::TEXT_PLAIN_UTF_8)
    }

    /// Top-level type, e.g. `application`.
    pub fn type_(&self) -> &str {
        self.0.type_().as_str()
    }

    /// Subtype, e.g. `json`.
    pub fn subtype(&self) -> &str {
        self.0.subtype().as_str()
    }

    /// Value of a parameter such as `charset`, if present.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.0
            .params()
            .find(|(key, _)| key.as_str().eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether `other` has exactly the same type and subtype.
    ///
    /// Parameters and wildcards are not considered: `*/*` only matches `*/*`.
    pub fn matches(&self, other: &MimeType) -> bool {
        self.type_() == other.type_() && self.subtype() == other.subtype()
    }

    /// Access the underlying [`mime::Mime`].
    pub fn as_mime(&self) -> &mime::Mime {
        &self.0
    }
}

impl From<mime::Mime> for MimeType {
    fn from(value: mime::Mime) -> Self {
        Self(value)
    }
}

impl FromStr for MimeType {
    type Err = mime::FromStrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Serialize for MimeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MimeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
