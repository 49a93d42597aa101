//! Lambda runtime for lambdog handlers.

use lambda_http::{Body, Error, Request, Response, run, service_fn};
use lambdog_core::Lambdog;
use tracing::{debug, info, warn};

use crate::{event_from_request, into_lambda_response, response::internal_error};

/// Lambda runtime configuration.
#[derive(Debug, Clone)]
pub struct LambdaConfig {
    /// Enable request logging.
    pub log_requests: bool,
    /// Enable response logging.
    pub log_responses: bool,
}

impl Default for LambdaConfig {
    fn default() -> Self {
        Self {
            log_requests: true,
            log_responses: false,
        }
    }
}

impl LambdaConfig {
    /// Enable request logging.
    pub fn log_requests(mut self, enabled: bool) -> Self {
        self.log_requests = enabled;
        self
    }

    /// Enable response logging.
    pub fn log_responses(mut self, enabled: bool) -> Self {
        self.log_responses = enabled;
        self
    }
}

/// Serves a [`Lambdog`] wrapper on the Lambda runtime, translating API
/// Gateway, ALB and function URL requests to invocation events.
#[derive(Debug, Clone)]
pub struct LambdaRuntime {
    app: Lambdog,
    config: LambdaConfig,
}

impl LambdaRuntime {
    /// Create a new Lambda runtime.
    pub fn new(app: Lambdog) -> Self {
        Self {
            app,
            config: LambdaConfig::default(),
        }
    }

    /// Set the runtime configuration.
    pub fn with_config(mut self, config: LambdaConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the Lambda runtime.
    ///
    /// This function never returns under normal operation.
    pub async fn run(self) -> Result<(), Error> {
        info!("Starting lambdog Lambda runtime");

        run(service_fn(move |request: Request| {
            let runtime = self.clone();
            async move { runtime.handle(request).await }
        }))
        .await
    }

    /// Handle one Lambda request.
    ///
    /// Only an unreadable request is an error; everything the wrapper
    /// produces is answered, with a plain 500 for unrepresentable responses.
    pub async fn handle(&self, request: Request) -> Result<Response<Body>, Error> {
        let event = event_from_request(request)?;

        if self.config.log_requests {
            debug!(
                method = %event.http_method,
                path = %event.path,
                request_id = ?event.header(crate::REQUEST_ID_HEADER),
                "Handling Lambda request"
            );
        }

        let response = self.app.call(event).await;

        if self.config.log_responses {
            debug!(status = response.status_code, "Lambda response");
        }

        Ok(into_lambda_response(response).unwrap_or_else(|e| {
            warn!(error = %e, "Response conversion failed");
            internal_error()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambdog_core::{LambdogConfig, sync_handler, with_json_handler};
    use serde_json::json;

    fn runtime() -> LambdaRuntime {
        let app = with_json_handler(
            sync_handler(|props, args| {
                Ok(Some(json!({
                    "props": props,
                    "requestId": args.event.header("x-request-id"),
                })))
            }),
            LambdogConfig::new().path_to_props(":id"),
        );
        LambdaRuntime::new(app).with_config(LambdaConfig::default().log_responses(true))
    }

    #[tokio::test]
    async fn test_handle_round_trip() {
        let request = lambda_http::http::Request::builder()
            .method("GET")
            .uri("/.netlify/functions/fn/7?name=donavon")
            .header("x-request-id", "abc")
            .body(Body::Empty)
            .unwrap();

        let response = runtime().handle(request).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["content-type"], "application/json");
        assert!(response.headers().contains_key("etag"));
        match response.body() {
            Body::Text(text) => {
                let body: serde_json::Value = serde_json::from_str(text).unwrap();
                assert_eq!(body["props"], json!({"id": "7", "name": "donavon"}));
                assert_eq!(body["requestId"], "abc");
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unrepresentable_status_becomes_500() {
        let app = with_json_handler(
            sync_handler(|_, _| Err(lambdog_core::Failure::status(1000, "foo"))),
            LambdogConfig::default(),
        );
        let request = lambda_http::http::Request::builder()
            .uri("/")
            .body(Body::Empty)
            .unwrap();

        let response = LambdaRuntime::new(app).handle(request).await.unwrap();
        assert_eq!(response.status(), 500);
    }

    #[test]
    fn test_config_builder() {
        let config = LambdaConfig::default()
            .log_requests(false)
            .log_responses(true);
        assert!(!config.log_requests);
        assert!(config.log_responses);
    }
}
