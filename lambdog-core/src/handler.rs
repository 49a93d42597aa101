// Business handler abstraction
//
// Handlers are written as plain async functions taking the merged props and
// the invocation arguments. They are type-erased once, when the route tree or
// wrapper is built, and invoked through a single vtable call per request.

use crate::middleware::MiddlewareRequest;
use crate::routing::Params;
use crate::{Event, Failure, Props};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// What a handler produces: `Ok(None)` means "no content".
pub type HandlerResult = Result<Option<Value>, Failure>;

/// Boxed future returned by type-erased handlers.
pub type HandlerFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send>>;

/// Everything about the invocation besides the merged props.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandlerArgs {
    /// The event as received, header names lower-cased.
    pub event: Event,
    /// Path params captured by routing or `path_to_props`.
    pub params: Params,
    /// Query string parameters.
    pub query: Props,
    /// Decoded body: parsed JSON, a form object, or the raw text.
    pub body: Value,
    /// Request view after middleware ran, including `locals`.
    pub request: MiddlewareRequest,
}

/// A handler that can process an invocation.
pub trait Handler: Send + Sync + 'static {
    /// The future returned by `call`.
    type Future: Future<Output = HandlerResult> + Send + 'static;

    fn call(&self, props: Props, args: HandlerArgs) -> Self::Future;
}

/// A function handler that wraps an async function.
#[derive(Clone)]
pub struct FnHandler<F> {
    f: F,
}

impl<F> FnHandler<F> {
    #[inline(always)]
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Props, HandlerArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    type Future = Fut;

    #[inline(always)]
    fn call(&self, props: Props, args: HandlerArgs) -> Self::Future {
        (self.f)(props, args)
    }
}

/// Type-erased handler for storing in route trees.
#[derive(Clone)]
pub struct BoxedHandler {
    inner: Arc<dyn ErasedHandler>,
}

impl BoxedHandler {
    #[inline]
    pub fn new<H: Handler>(handler: H) -> Self {
        Self {
            inner: Arc::new(HandlerWrapper { handler }),
        }
    }

    #[inline(always)]
    pub fn call(&self, props: Props, args: HandlerArgs) -> HandlerFuture {
        self.inner.call(props, args)
    }
}

impl fmt::Debug for BoxedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BoxedHandler")
    }
}

trait ErasedHandler: Send + Sync {
    fn call(&self, props: Props, args: HandlerArgs) -> HandlerFuture;
}

struct HandlerWrapper<H: Handler> {
    handler: H,
}

impl<H: Handler> ErasedHandler for HandlerWrapper<H> {
    #[inline(always)]
    fn call(&self, props: Props, args: HandlerArgs) -> HandlerFuture {
        Box::pin(self.handler.call(props, args))
    }
}

/// Create a handler from an async function.
///
/// # Example
///
/// ```
/// use lambdog_core::{handler, HandlerArgs, HandlerResult, Props};
/// use serde_json::Value;
///
/// async fn echo(props: Props, _args: HandlerArgs) -> HandlerResult {
///     Ok(Some(Value::Object(props)))
/// }
///
/// let h = handler(echo);
/// ```
#[inline]
pub fn handler<F, Fut>(f: F) -> BoxedHandler
where
    F: Fn(Props, HandlerArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    BoxedHandler::new(FnHandler::new(f))
}

/// Create a handler from a synchronous function.
pub fn sync_handler<F>(f: F) -> BoxedHandler
where
    F: Fn(Props, HandlerArgs) -> HandlerResult + Send + Sync + 'static,
{
    handler(move |props, args| std::future::ready(f(props, args)))
}
