//! Request body decoding.
//!
//! The decoding strategy is chosen from the content-type essence (media
//! type without parameters):
//!
//! | Content-Type                        | Strategy                         |
//! |-------------------------------------|----------------------------------|
//! | `application/json`                  | JSON; object fields become props |
//! | `application/x-www-form-urlencoded` | form pairs, later duplicates win |
//! | anything else / absent              | passthrough, no props            |
//!
//! The raw text is never modified. Whatever was decoded is also exposed as a
//! single [`Value`] so handlers can read non-object JSON or the raw text.

use crate::{Error, Event, Props, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde_json::Value;

/// Body decoding strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    Form,
    Passthrough,
}

impl BodyFormat {
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let essence = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase());

        match essence.as_deref() {
            Some("application/json") => BodyFormat::Json,
            Some("application/x-www-form-urlencoded") => BodyFormat::Form,
            _ => BodyFormat::Passthrough,
        }
    }
}

/// Result of decoding a request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedBody {
    /// Fields contributed to the merged props.
    pub props: Props,
    /// The decoded body as a whole (`Null` when there is no body).
    pub value: Value,
}

/// Decode `body` according to `content_type`.
pub fn decode_body(content_type: Option<&str>, body: Option<&str>) -> Result<DecodedBody> {
    let Some(body) = body.filter(|b| !b.is_empty()) else {
        return Ok(DecodedBody::default());
    };

    match BodyFormat::from_content_type(content_type) {
        BodyFormat::Json => {
            let value: Value = serde_json::from_str(body)
                .map_err(|e| Error::Decode(format!("Invalid JSON body: {}", e)))?;
            let props = match &value {
                Value::Object(map) => map.clone(),
                _ => Props::new(),
            };
            Ok(DecodedBody { props, value })
        }
        BodyFormat::Form => {
            let props = parse_form_map(body)?;
            Ok(DecodedBody {
                value: Value::Object(props.clone()),
                props,
            })
        }
        BodyFormat::Passthrough => Ok(DecodedBody {
            props: Props::new(),
            value: Value::String(body.to_string()),
        }),
    }
}

/// Parse URL-encoded form data into props, keeping the last duplicate.
pub fn parse_form_map(body: &str) -> Result<Props> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(body)
        .map_err(|e| Error::Decode(format!("Failed to parse form data: {}", e)))?;

    Ok(pairs
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect())
}

/// The event body as text, decoding base64 payloads first.
pub fn event_body(event: &Event) -> Result<Option<String>> {
    match &event.body {
        Some(body) if event.is_base64_encoded => {
            let bytes = BASE64_STANDARD
                .decode(body.trim())
                .map_err(|e| Error::Decode(format!("Invalid base64 body: {}", e)))?;
            String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| Error::Decode(format!("Body is not UTF-8: {}", e)))
        }
        other => Ok(other.clone()),
    }
}
