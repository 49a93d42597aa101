// Handler invocation wrapper
//
// One invocation runs decode, prefix strip, route, middleware, merge, invoke
// and encode in order. Any stage may fail with a `Failure`; the failure is
// turned into a response at a single point, so `call` always answers.

use crate::body_parser::{decode_body, event_body};
use crate::config::{default_error_callback, ErrorCallback, LambdogConfig};
use crate::encoder::{json_encoder, negotiate, text_encoder, ContentEncoder, Negotiation};
use crate::logging::{debug, info, warn};
use crate::middleware::{run_middleware, MiddlewareChain, MiddlewareRequest};
use crate::props::{merge_props, path_to_props, query_props};
use crate::routing::{split_path, Params, Route, Router};
use crate::{BoxedHandler, Error, Event, Failure, HandlerArgs, PartialResponse, Response};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// Body of the response sent when no route matches.
pub const NOT_FOUND_BODY: &str = "Method Not Allowed or Not Found";

/// Body of the response sent when the path prefix cannot be stripped.
pub const PREFIX_STRIP_BODY: &str = "Internal Server Error: unable to strip path prefix";

/// What a wrapper dispatches to.
#[derive(Debug, Clone)]
pub enum Target {
    /// Direct mode: one handler, params from `path_to_props`.
    Handler(BoxedHandler),
    /// Routing mode: params from the matched route.
    Routes(Router),
}

impl From<BoxedHandler> for Target {
    fn from(handler: BoxedHandler) -> Self {
        Target::Handler(handler)
    }
}

impl From<Router> for Target {
    fn from(router: Router) -> Self {
        Target::Routes(router)
    }
}

impl From<Vec<Route>> for Target {
    fn from(routes: Vec<Route>) -> Self {
        Target::Routes(Router::new(routes))
    }
}

/// Wrap a handler or route tree, encoding results as JSON.
pub fn with_json_handler(target: impl Into<Target>, config: LambdogConfig) -> Lambdog {
    Lambdog::new(target.into(), config, json_encoder(), "application/json")
}

/// Wrap a handler or route tree, encoding results as plain text.
pub fn with_handler(target: impl Into<Target>, config: LambdogConfig) -> Lambdog {
    Lambdog::new(target.into(), config, text_encoder(), "text/plain")
}

/// A wrapped handler ready to serve invocations.
///
/// Cloning is cheap; clones share the route tree and configuration.
#[derive(Clone)]
pub struct Lambdog {
    inner: Arc<Inner>,
}

struct Inner {
    target: Target,
    config: LambdogConfig,
    encoder: ContentEncoder,
    content_type: String,
    error_callback: ErrorCallback,
}

/// Handler, params and route middleware resolved for one invocation.
struct Resolved {
    handler: BoxedHandler,
    params: Params,
    middleware: Option<MiddlewareChain>,
}

impl Lambdog {
    fn new(
        target: Target,
        config: LambdogConfig,
        default_encoder: ContentEncoder,
        default_content_type: &str,
    ) -> Self {
        let encoder = config.content_encoder.clone().unwrap_or(default_encoder);
        let content_type = config
            .content_type
            .clone()
            .unwrap_or_else(|| default_content_type.to_string());
        let error_callback = config
            .error_callback
            .clone()
            .unwrap_or_else(|| default_error_callback(config.production));

        Self {
            inner: Arc::new(Inner {
                target,
                config,
                encoder,
                content_type,
                error_callback,
            }),
        }
    }

    pub fn config(&self) -> &LambdogConfig {
        &self.inner.config
    }

    /// Content type used for encoded bodies.
    pub fn content_type(&self) -> &str {
        &self.inner.content_type
    }

    /// Serve one invocation. Never fails: every failure becomes a response.
    pub async fn call(&self, event: Event) -> Response {
        let span = tracing::info_span!(
            "invocation",
            method = %event.http_method,
            path = %event.path,
        );

        async move {
            let started = Instant::now();
            let response = match self.process(event).await {
                Ok(response) => response,
                Err(failure) => self.failure_response(failure),
            };
            info!(
                status = response.status_code,
                duration_us = started.elapsed().as_micros() as u64,
                "Invocation complete"
            );
            response
        }
        .instrument(span)
        .await
    }

    async fn process(&self, event: Event) -> Result<Response, Failure> {
        let inner = &*self.inner;
        let event = event.normalized();
        let method = event.http_method.to_ascii_lowercase();

        let body = event_body(&event)?;
        let decoded = decode_body(event.content_type(), body.as_deref())?;

        let path = inner.config.path_prefix.strip(&event.path).map_err(|e| {
            warn!(error = %e, "Path prefix strip failed");
            Failure::status(500, PREFIX_STRIP_BODY)
        })?;
        let segments = split_path(&path);

        let resolved = self.resolve(&method, &segments, &path)?;

        let mut request = MiddlewareRequest::new(method.clone(), event.headers.clone());
        let mut chains = vec![&inner.config.middleware];
        if let Some(route_middleware) = &resolved.middleware {
            chains.push(route_middleware);
        }
        run_middleware(&chains, &mut request).await?;

        let query = query_props(event.query_string_parameters.as_ref());
        let props = merge_props(decoded.props, &query, &resolved.params);
        let if_none_match = event.header("if-none-match").map(str::to_string);

        let args = HandlerArgs {
            event,
            params: resolved.params,
            query,
            body: decoded.value,
            request,
        };
        let result = resolved.handler.call(props, args).await?;

        let encoded = (inner.encoder)(result.as_ref())?;
        Ok(negotiate(
            encoded,
            &Negotiation {
                method: &method,
                if_none_match: if_none_match.as_deref(),
                content_type: &inner.content_type,
                max_age: inner.config.max_age,
                base_headers: &inner.config.marketing_headers,
            },
        ))
    }

    fn resolve(&self, method: &str, segments: &[&str], path: &str) -> Result<Resolved, Failure> {
        match &self.inner.target {
            Target::Handler(handler) => Ok(Resolved {
                handler: handler.clone(),
                params: self
                    .inner
                    .config
                    .path_to_props
                    .as_deref()
                    .map(|template| path_to_props(template, segments))
                    .unwrap_or_default(),
                middleware: None,
            }),
            Target::Routes(router) => match router.find(method, segments) {
                Some(found) => {
                    debug!(route = %found.route.segment(), params = ?found.params, "Route resolved");
                    Ok(Resolved {
                        handler: found.handler.clone(),
                        params: found.params,
                        middleware: Some(found.route.route_middleware().clone())
                            .filter(|chain| !chain.is_empty()),
                    })
                }
                None => {
                    debug!(method, path, "No route matched");
                    Err(Error::RouteNotFound {
                        method: method.to_string(),
                        path: path.to_string(),
                    }
                    .into())
                }
            },
        }
    }

    /// The response every failure starts from.
    fn default_error_response(&self) -> Response {
        Response::new(400)
            .with_headers(self.inner.config.marketing_headers.clone())
            .with_header("content-type", "text/plain")
    }

    fn failure_response(&self, failure: Failure) -> Response {
        let base = self.default_error_response();
        let partial: PartialResponse = match failure {
            Failure::Error(Error::RouteNotFound { method, path }) => {
                debug!(method, path, "Route not found");
                PartialResponse::new().status(405).body(NOT_FOUND_BODY)
            }
            Failure::Error(error) => {
                warn!(error = %error, "Invocation failed");
                (self.inner.error_callback)(&error)
            }
            Failure::Literal(partial) => {
                debug!(status = ?partial.status_code, "Literal failure response");
                partial
            }
        };
        partial.apply_to(base)
    }
}

impl std::fmt::Debug for Lambdog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lambdog")
            .field("target", &self.inner.target)
            .field("content_type", &self.inner.content_type)
            .field("config", &self.inner.config)
            .finish()
    }
}
