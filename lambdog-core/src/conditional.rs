//! ETag generation and conditional request handling.
//!
//! The ETag of a response is the MD5 digest of its body, base64 encoded and
//! quoted. Identical bodies always produce identical tags, so a client that
//! replays the tag in `If-None-Match` gets a `304 Not Modified`.
//!
//! # Examples
//!
//! ```
//! use lambdog_core::conditional::{ETag, if_none_match_matches};
//!
//! let etag = ETag::from_bytes(b"hello");
//! assert_eq!(etag.to_header_value(), "\"XUFAKrxLKna5cZ2REBfFkg==\"");
//! assert!(if_none_match_matches(Some("\"XUFAKrxLKna5cZ2REBfFkg==\""), &etag));
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use md5::{Digest, Md5};
use std::fmt;

/// Represents an HTTP ETag (Entity Tag).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ETag {
    /// The tag value (without quotes)
    pub value: String,
}

impl ETag {
    /// Create a strong ETag from an already computed value.
    pub fn strong(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Fingerprint a body: base64 of its MD5 digest.
    pub fn from_bytes(data: &[u8]) -> Self {
        let digest = Md5::digest(data);
        Self::strong(BASE64_STANDARD.encode(digest))
    }

    /// Get the header value representation.
    pub fn to_header_value(&self) -> String {
        format!("\"{}\"", self.value)
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_header_value())
    }
}

/// Whether the client's `If-None-Match` value names this exact tag.
///
/// Comparison is plain string equality against the quoted tag.
pub fn if_none_match_matches(if_none_match: Option<&str>, etag: &ETag) -> bool {
    if_none_match.is_some_and(|value| value == etag.to_header_value())
}

/// `Cache-Control` value for a max age in seconds.
pub fn cache_control(max_age: u32) -> String {
    format!("max-age={}", max_age)
}
