// Invocation event and response types

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Header map. Names are stored lower-cased.
pub type Headers = HashMap<String, String>;

/// Inbound request descriptor handed over by the hosting platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub http_method: String,
    #[serde(default)]
    pub path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: Headers,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_base64_encoded: bool,
}

impl Event {
    pub fn new(http_method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            http_method: http_method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Add a header; the name is lower-cased.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Add a query string parameter.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_string_parameters
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .or_else(|| {
                self.headers
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value)
            })
            .map(String::as_str)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Copy of this event with every header name lower-cased.
    pub fn normalized(&self) -> Self {
        let mut event = self.clone();
        event.headers = self
            .headers
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
            .collect();
        event
    }
}

/// Wire response returned to the hosting platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl Response {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            ..Self::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// A response where every field is optional.
///
/// Used for thrown literal responses, error callbacks and middleware
/// rejections: whichever fields are present override a default response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_base64_encoded: Option<bool>,
}

impl PartialResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn base64(mut self, encoded: bool) -> Self {
        self.is_base64_encoded = Some(encoded);
        self
    }

    /// Overlay this partial response on top of `base`.
    ///
    /// Status, body and base64 flag replace the base value when present.
    /// Headers merge key by key, lower-cased, with these headers winning.
    pub fn apply_to(self, mut base: Response) -> Response {
        if let Some(status_code) = self.status_code {
            base.status_code = status_code;
        }
        if let Some(body) = self.body {
            base.body = body;
        }
        if let Some(headers) = self.headers {
            base.headers.extend(
                headers
                    .into_iter()
                    .map(|(name, value)| (name.to_ascii_lowercase(), value)),
            );
        }
        if let Some(encoded) = self.is_base64_encoded {
            base.is_base64_encoded = encoded;
        }
        base
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_deserializes_gateway_shape() {
        let json = r#"{
            "httpMethod": "GET",
            "path": "/orders/1",
            "headers": null,
            "queryStringParameters": {"q": "x"},
            "body": null
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.http_method, "GET");
        assert!(event.headers.is_empty());
        assert_eq!(
            event.query_string_parameters.unwrap().get("q"),
            Some(&"x".to_string())
        );
        assert!(!event.is_base64_encoded);
    }

    #[test]
    fn test_event_header_lookup_is_case_insensitive() {
        let mut event = Event::new("GET", "/");
        event
            .headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        assert_eq!(event.content_type(), Some("application/json"));
        assert_eq!(
            event.normalized().headers.get("content-type"),
            Some(&"application/json".to_string())
        );
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let response = Response::new(200).with_body("ok");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["isBase64Encoded"], false);
        assert_eq!(value["body"], "ok");
    }

    #[test]
    fn test_partial_overrides_only_present_fields() {
        let base = Response::new(400)
            .with_header("lambdog", "1")
            .with_header("content-type", "text/plain");
        let merged = PartialResponse::new()
            .status(1000)
            .body("foo")
            .header("content-type", "text/html")
            .apply_to(base);

        assert_eq!(merged.status_code, 1000);
        assert_eq!(merged.body, "foo");
        assert_eq!(merged.header("lambdog"), Some("1"));
        assert_eq!(merged.header("content-type"), Some("text/html"));
        assert!(!merged.is_base64_encoded);
    }

    #[test]
    fn test_empty_partial_keeps_base() {
        let base = Response::new(400).with_body("");
        assert_eq!(PartialResponse::new().apply_to(base.clone()), base);
    }
}
