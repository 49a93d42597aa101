//! Lambda response conversion.

use crate::{LambdaError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use lambda_http::Body;
use lambdog_core::Response;

/// Convert an invocation [`Response`] into a `lambda_http` response.
///
/// Base64 bodies are decoded into binary payloads; the runtime encodes them
/// again on the wire. A status outside `100..=999` cannot be represented
/// and is an error.
pub fn into_lambda_response(response: Response) -> Result<lambda_http::Response<Body>> {
    let mut builder = lambda_http::Response::builder().status(response.status_code);

    for (name, value) in &response.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let body = if response.is_base64_encoded {
        let bytes = BASE64_STANDARD
            .decode(response.body.as_bytes())
            .map_err(|e| LambdaError::Response(format!("invalid base64 body: {}", e)))?;
        Body::Binary(bytes)
    } else if response.body.is_empty() {
        Body::Empty
    } else {
        Body::Text(response.body)
    };

    builder
        .body(body)
        .map_err(|e| LambdaError::Response(e.to_string()))
}

/// A plain 500 used when a response cannot be converted.
pub fn internal_error() -> lambda_http::Response<Body> {
    let mut response = lambda_http::Response::new(Body::Text("Internal Server Error".to_string()));
    *response.status_mut() = lambda_http::http::StatusCode::INTERNAL_SERVER_ERROR;
    response
}
