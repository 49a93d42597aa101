//! Lambda request conversion.

use crate::{LambdaError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use lambda_http::{Body, Request};
use lambdog_core::{Event, Headers};
use std::collections::HashMap;

/// Header carrying the invocation request id when the client sent none.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Convert a `lambda_http` request into an invocation [`Event`].
///
/// Header names are lower-cased, repeated query keys keep the last value,
/// and binary bodies are passed on base64 encoded.
pub fn event_from_request(request: Request) -> Result<Event> {
    let (parts, body) = request.into_parts();

    let mut headers = Headers::new();
    for (name, value) in parts.headers.iter() {
        let value = value
            .to_str()
            .map_err(|e| LambdaError::Request(format!("header `{}`: {}", name, e)))?;
        headers.insert(name.as_str().to_ascii_lowercase(), value.to_string());
    }

    if !headers.contains_key(REQUEST_ID_HEADER) {
        if let Some(context) = parts.extensions.get::<lambda_runtime::Context>() {
            headers.insert(REQUEST_ID_HEADER.to_string(), context.request_id.clone());
        }
    }

    let query_string_parameters = match parts.uri.query() {
        Some(query) if !query.is_empty() => {
            let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
                .map_err(|e| LambdaError::Request(format!("query string: {}", e)))?;
            Some(pairs.into_iter().collect::<HashMap<_, _>>())
        }
        _ => None,
    };

    let (body, is_base64_encoded) = match body {
        Body::Empty => (None, false),
        Body::Text(text) => (Some(text), false),
        Body::Binary(bytes) => (Some(BASE64_STANDARD.encode(bytes)), true),
    };

    Ok(Event {
        http_method: parts.method.as_str().to_string(),
        path: parts.uri.path().to_string(),
        headers,
        query_string_parameters,
        body,
        is_base64_encoded,
    })
}
