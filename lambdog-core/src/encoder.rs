// Response encoding and cache negotiation

use crate::conditional::{cache_control, if_none_match_matches, ETag};
use crate::logging::trace;
use crate::{Error, Headers, Response, Result};
use serde_json::Value;
use std::sync::Arc;

/// What a content encoder makes of a handler result.
///
/// `body: None` means there is nothing to send (and nothing to fingerprint).
/// `headers` are the handler-declared headers: they override the
/// content-type but never `cache-control` or `etag`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Encoded {
    pub body: Option<String>,
    pub status_code: Option<u16>,
    pub headers: Headers,
    pub is_base64_encoded: Option<bool>,
}

impl Encoded {
    pub fn body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Turns a handler result (`None` for "no content") into an [`Encoded`] body.
pub type ContentEncoder = Arc<dyn Fn(Option<&Value>) -> Result<Encoded> + Send + Sync>;

/// JSON text encoder.
pub fn json_encoder() -> ContentEncoder {
    Arc::new(|result: Option<&Value>| match result {
        None => Ok(Encoded::default()),
        Some(value) => serde_json::to_string(value)
            .map(Encoded::body)
            .map_err(|e| Error::Encode(e.to_string())),
    })
}

/// Text encoder: strings pass through, other values render as JSON text.
pub fn text_encoder() -> ContentEncoder {
    Arc::new(|result: Option<&Value>| {
        Ok(match result {
            None => Encoded::default(),
            Some(Value::String(text)) => Encoded::body(text.clone()),
            Some(other) => Encoded::body(other.to_string()),
        })
    })
}

/// Per-request inputs to cache negotiation.
#[derive(Debug, Clone, Copy)]
pub struct Negotiation<'a> {
    /// Request method, any case.
    pub method: &'a str,
    /// The inbound `if-none-match` header.
    pub if_none_match: Option<&'a str>,
    /// Configured content type for bodies.
    pub content_type: &'a str,
    /// `cache-control: max-age` seconds, if enabled.
    pub max_age: Option<u32>,
    /// Marketing headers present on every response.
    pub base_headers: &'a Headers,
}

/// Assemble the wire response for an encoded result.
///
/// Header precedence: base < content-type < encoder headers <
/// cache-control/etag. POST responses never carry cache-control or etag.
pub fn negotiate(encoded: Encoded, negotiation: &Negotiation<'_>) -> Response {
    let mut headers = negotiation.base_headers.clone();
    let declared = encoded
        .headers
        .into_iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value));

    let Some(body) = encoded.body else {
        headers.extend(declared);
        return Response {
            status_code: encoded.status_code.unwrap_or(204),
            body: String::new(),
            headers,
            is_base64_encoded: encoded.is_base64_encoded.unwrap_or(false),
        };
    };

    let etag = ETag::from_bytes(body.as_bytes());
    if if_none_match_matches(negotiation.if_none_match, &etag) {
        trace!(etag = %etag, "If-None-Match matched");
        return Response::new(304).with_headers(headers);
    }

    headers.insert(
        "content-type".to_string(),
        negotiation.content_type.to_string(),
    );
    headers.extend(declared);

    if !negotiation.method.eq_ignore_ascii_case("post") {
        if let Some(max_age) = negotiation.max_age {
            headers.insert("cache-control".to_string(), cache_control(max_age));
        }
        headers.insert("etag".to_string(), etag.to_header_value());
    }

    Response {
        status_code: encoded.status_code.unwrap_or(200),
        body,
        headers,
        is_base64_encoded: encoded.is_base64_encoded.unwrap_or(false),
    }
}
