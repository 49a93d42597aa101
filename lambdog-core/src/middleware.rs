// Sequential middleware runner

use crate::logging::{debug, trace};
use crate::{Failure, Headers, PartialResponse};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

/// The request view middleware can inspect and annotate.
///
/// `locals` is handed to the handler through
/// [`HandlerArgs::request`](crate::HandlerArgs).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MiddlewareRequest {
    pub method: String,
    pub headers: Headers,
    pub locals: Map<String, Value>,
}

impl MiddlewareRequest {
    pub fn new(method: impl Into<String>, headers: Headers) -> Self {
        Self {
            method: method.into(),
            headers,
            locals: Map::new(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// What the runner should do after a middleware returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    /// Run the next middleware.
    Continue,
    /// Skip the remaining middleware and go straight to the handler.
    Route,
}

/// Middleware runs before the handler and may annotate the request or abort
/// the invocation with a [`Failure`].
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn handle(&self, req: &mut MiddlewareRequest) -> Result<Next, Failure>;
}

#[async_trait]
impl<F> Middleware for F
where
    F: Fn(&mut MiddlewareRequest) -> Result<Next, Failure> + Send + Sync,
{
    async fn handle(&self, req: &mut MiddlewareRequest) -> Result<Next, Failure> {
        self(req)
    }
}

/// Ordered list of middleware.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    middlewares: Arc<Vec<Arc<dyn Middleware>>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a middleware to the end of the chain
    pub fn use_middleware<M: Middleware + 'static>(&mut self, middleware: M) {
        let mut mws = (*self.middlewares).clone();
        mws.push(Arc::new(middleware));
        self.middlewares = Arc::new(mws);
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Run every middleware in order until one asks to skip or fails.
    pub async fn run(&self, req: &mut MiddlewareRequest) -> Result<Next, Failure> {
        for (index, middleware) in self.middlewares.iter().enumerate() {
            trace!(middleware_index = index, "Executing middleware");
            if middleware.handle(req).await? == Next::Route {
                debug!(middleware_index = index, "Middleware skipped to route");
                return Ok(Next::Route);
            }
        }
        Ok(Next::Continue)
    }
}

/// Run several chains back to back; `Next::Route` ends the whole stage.
pub async fn run_middleware(
    chains: &[&MiddlewareChain],
    req: &mut MiddlewareRequest,
) -> Result<(), Failure> {
    for chain in chains {
        if chain.run(req).await? == Next::Route {
            break;
        }
    }
    Ok(())
}

/// Stores an `x-request-id` value in `locals["requestId"]`, generating one
/// when the header is missing.
pub struct RequestIdMiddleware;

#[async_trait]
impl Middleware for RequestIdMiddleware {
    async fn handle(&self, req: &mut MiddlewareRequest) -> Result<Next, Failure> {
        let request_id = req
            .header("x-request-id")
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        req.locals
            .insert("requestId".to_string(), Value::String(request_id));
        Ok(Next::Continue)
    }
}

/// Rejects requests whose method is not in the allowed list with a 405.
pub struct AllowMethods {
    methods: Vec<String>,
}

impl AllowMethods {
    pub fn new<I, S>(methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            methods: methods
                .into_iter()
                .map(|m| m.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }
}

#[async_trait]
impl Middleware for AllowMethods {
    async fn handle(&self, req: &mut MiddlewareRequest) -> Result<Next, Failure> {
        if self
            .methods
            .iter()
            .any(|m| m.eq_ignore_ascii_case(&req.method))
        {
            Ok(Next::Continue)
        } else {
            Err(PartialResponse::new()
                .status(405)
                .header("allow", self.methods.join(", ").to_ascii_uppercase())
                .into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn count(req: &mut MiddlewareRequest) -> Result<Next, Failure> {
        let current = req.locals.get("count").and_then(Value::as_u64).unwrap_or(0);
        req.locals.insert("count".to_string(), Value::from(current + 1));
        Ok(Next::Continue)
    }

    #[tokio::test]
    async fn test_runs_every_middleware() {
        let mut chain = MiddlewareChain::new();
        chain.use_middleware(count);
        chain.use_middleware(count);

        let mut req = MiddlewareRequest::new("get", Headers::new());
        assert_eq!(chain.run(&mut req).await, Ok(Next::Continue));
        assert_eq!(req.locals["count"], 2);
    }

    #[tokio::test]
    async fn test_route_skips_remaining() {
        let mut chain = MiddlewareChain::new();
        chain.use_middleware(|_: &mut MiddlewareRequest| -> Result<Next, Failure> {
            Ok(Next::Route)
        });
        chain.use_middleware(count);

        let second = chain.clone();
        let mut req = MiddlewareRequest::default();
        run_middleware(&[&chain, &second], &mut req).await.unwrap();
        assert!(req.locals.get("count").is_none());
    }

    #[tokio::test]
    async fn test_failure_aborts_chain() {
        let mut chain = MiddlewareChain::new();
        chain.use_middleware(|_: &mut MiddlewareRequest| -> Result<Next, Failure> {
            Err(Failure::Error(Error::Middleware("denied".to_string())))
        });
        chain.use_middleware(count);

        let mut req = MiddlewareRequest::default();
        let result = chain.run(&mut req).await;
        assert_eq!(
            result,
            Err(Failure::Error(Error::Middleware("denied".to_string())))
        );
        assert!(req.locals.get("count").is_none());
    }

    #[tokio::test]
    async fn test_request_id_keeps_existing_header() {
        let mut headers = Headers::new();
        headers.insert("x-request-id".to_string(), "abc".to_string());
        let mut req = MiddlewareRequest::new("get", headers);

        RequestIdMiddleware.handle(&mut req).await.unwrap();
        assert_eq!(req.locals["requestId"], "abc");
    }

    #[tokio::test]
    async fn test_request_id_generates_when_missing() {
        let mut req = MiddlewareRequest::default();
        RequestIdMiddleware.handle(&mut req).await.unwrap();
        assert_eq!(req.locals["requestId"].as_str().unwrap().len(), 36);
    }

    #[tokio::test]
    async fn test_allow_methods_rejects_with_405() {
        let allow = AllowMethods::new(["GET", "post"]);

        let mut req = MiddlewareRequest::new("post", Headers::new());
        assert_eq!(allow.handle(&mut req).await, Ok(Next::Continue));

        let mut req = MiddlewareRequest::new("delete", Headers::new());
        match allow.handle(&mut req).await {
            Err(Failure::Literal(partial)) => {
                assert_eq!(partial.status_code, Some(405));
                assert_eq!(
                    partial.headers.unwrap().get("allow"),
                    Some(&"GET, POST".to_string())
                );
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
