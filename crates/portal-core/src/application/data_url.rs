//! `data:` URL codec for embedded file payloads.
//!
//! Attachments are stored inline as `data:<mime>;base64,<payload>` so that a
//! stored record is self-contained and can be offered back as a download
//! without any side storage.

use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};
use serde::{Deserialize, Serialize};

use crate::error::{PortalError, Result};

/// MIME type used when nothing better is known about a file.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64";

/// A validated, base64-encoded `data:` URL.
///
/// The textual form is kept verbatim so that a record survives a
/// persist/reload cycle byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DataUrl(String);

impl DataUrl {
    /// Encodes raw bytes with the given MIME type.
    ///
    /// An empty MIME type falls back to [`DEFAULT_MIME_TYPE`].
    pub fn encode(mime_type: &str, bytes: &[u8]) -> Self {
        let mime_type = if mime_type.trim().is_empty() {
            DEFAULT_MIME_TYPE
        } else {
            mime_type
        };
        Self(format!(
            "{SCHEME}{mime_type}{BASE64_MARKER},{}",
            BASE64_STANDARD.encode(bytes)
        ))
    }

    /// Parses and validates a textual `data:` URL.
    ///
    /// Only base64 payloads are accepted, and the payload must decode.
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let (header, payload) = split(&value)?;
        header_mime(header)?;
        BASE64_STANDARD.decode(payload)?;
        Ok(Self(value))
    }

    /// Returns the media type declared in the URL header.
    pub fn mime_type(&self) -> &str {
        // Validated on construction.
        split(&self.0)
            .ok()
            .and_then(|(header, _)| header_mime(header).ok())
            .unwrap_or(DEFAULT_MIME_TYPE)
    }

    /// Decodes the payload back to raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        let (_, payload) = split(&self.0)?;
        Ok(BASE64_STANDARD.decode(payload)?)
    }

    /// Returns the URL text, usable directly as a link target.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn split(value: &str) -> Result<(&str, &str)> {
    let rest = value
        .strip_prefix(SCHEME)
        .ok_or_else(|| PortalError::InvalidDataUrl("missing 'data:' scheme".to_string()))?;
    rest.split_once(',')
        .ok_or_else(|| PortalError::InvalidDataUrl("missing ',' separator".to_string()))
}

fn header_mime(header: &str) -> Result<&str> {
    let mime = header.strip_suffix(BASE64_MARKER).ok_or_else(|| {
        PortalError::InvalidDataUrl("only base64 payloads are supported".to_string())
    })?;
    if mime.is_empty() {
        Ok(DEFAULT_MIME_TYPE)
    } else {
        Ok(mime)
    }
}

impl TryFrom<String> for DataUrl {
    type Error = PortalError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<DataUrl> for String {
    fn from(url: DataUrl) -> Self {
        url.0
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
