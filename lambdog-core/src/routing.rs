// Route tree and ordered-priority route matching

use crate::logging::trace;
use crate::middleware::{Middleware, MiddlewareChain};
use crate::BoxedHandler;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Path parameters captured while walking the route tree.
pub type Params = HashMap<String, String>;

/// What a single route node matches at its depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matches one segment equal to the literal.
    Literal(String),
    /// `:name`: matches any segment, binding it under `name`.
    Param(String),
    /// `.`: matches only when no segment remains.
    Current,
    /// `*`: matches anything, consuming nothing.
    Wildcard,
}

impl Segment {
    pub fn parse(path: &str) -> Self {
        match path {
            "*" => Segment::Wildcard,
            "." => Segment::Current,
            _ => match path.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(path.to_string()),
            },
        }
    }

    /// Whether this node matches the head segment (`None` once exhausted).
    pub fn matches(&self, segment: Option<&str>) -> bool {
        match self {
            Segment::Wildcard | Segment::Param(_) => true,
            Segment::Current => segment.is_none(),
            Segment::Literal(literal) => segment == Some(literal.as_str()),
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Segment::Wildcard | Segment::Current)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(literal) => f.write_str(literal),
            Segment::Param(name) => write!(f, ":{}", name),
            Segment::Current => f.write_str("."),
            Segment::Wildcard => f.write_str("*"),
        }
    }
}

/// A node in the declarative route tree.
///
/// Generic over the handler payload so trees can be matched independently of
/// how handlers are invoked.
#[derive(Clone)]
pub struct Route<H = BoxedHandler> {
    method: Option<String>,
    segment: Segment,
    handler: Option<H>,
    children: Vec<Route<H>>,
    middleware: MiddlewareChain,
}

impl<H> Route<H> {
    /// Create a route for a path matcher (`literal`, `:name`, `.` or `*`).
    pub fn new(path: &str) -> Self {
        Self {
            method: None,
            segment: Segment::parse(path),
            handler: None,
            children: Vec::new(),
            middleware: MiddlewareChain::new(),
        }
    }

    /// Restrict the route to a method (case-insensitive).
    pub fn method(mut self, method: &str) -> Self {
        self.method = Some(method.to_ascii_lowercase());
        self
    }

    pub fn handler(mut self, handler: H) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn children(mut self, children: Vec<Route<H>>) -> Self {
        self.children = children;
        self
    }

    pub fn child(mut self, child: Route<H>) -> Self {
        self.children.push(child);
        self
    }

    /// Attach middleware that runs when this route is the one matched.
    pub fn middleware<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middleware.use_middleware(middleware);
        self
    }

    pub fn get(path: &str, handler: H) -> Self {
        Self::new(path).method("get").handler(handler)
    }

    pub fn post(path: &str, handler: H) -> Self {
        Self::new(path).method("post").handler(handler)
    }

    pub fn put(path: &str, handler: H) -> Self {
        Self::new(path).method("put").handler(handler)
    }

    pub fn patch(path: &str, handler: H) -> Self {
        Self::new(path).method("patch").handler(handler)
    }

    pub fn delete(path: &str, handler: H) -> Self {
        Self::new(path).method("delete").handler(handler)
    }

    /// Match any method.
    pub fn any(path: &str, handler: H) -> Self {
        Self::new(path).handler(handler)
    }

    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    pub fn declared_method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    pub fn route_handler(&self) -> Option<&H> {
        self.handler.as_ref()
    }

    pub fn route_children(&self) -> &[Route<H>] {
        &self.children
    }

    pub fn route_middleware(&self) -> &MiddlewareChain {
        &self.middleware
    }

    fn accepts(&self, method: &str) -> bool {
        self.method
            .as_deref()
            .is_none_or(|declared| declared.eq_ignore_ascii_case(method))
    }
}

impl<H: fmt::Debug> fmt::Debug for Route<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.segment.to_string())
            .field("handler", &self.handler)
            .field("children", &self.children)
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

/// The outcome of a successful match.
#[derive(Debug)]
pub struct RouteMatch<'a, H> {
    pub handler: &'a H,
    pub route: &'a Route<H>,
    pub params: Params,
}

/// Resolve `method` and `segments` against a list of sibling routes.
///
/// Routes are tried in declared order and the first match wins. A route with
/// children that fails deeper lets later siblings try; each sibling starts
/// from the inherited params so speculative bindings never leak across.
/// `*` and `.` handlers answer with the inherited params only.
pub fn find_route<'a, H>(
    method: &str,
    segments: &[&str],
    routes: &'a [Route<H>],
    inherited: &Params,
) -> Option<RouteMatch<'a, H>> {
    let head = segments.first().copied();

    for route in routes {
        if !route.segment.matches(head) {
            continue;
        }

        let mut params = inherited.clone();
        if let (Segment::Param(name), Some(value)) = (&route.segment, head) {
            params.insert(name.clone(), decode_segment(value).into_owned());
        }

        if let Some(handler) = &route.handler {
            if route.accepts(method) {
                if route.segment.is_terminal() {
                    trace!(route = %route.segment, "terminal route matched");
                    return Some(RouteMatch {
                        handler,
                        route,
                        params: inherited.clone(),
                    });
                }
                if segments.len() == 1 {
                    trace!(route = %route.segment, "leaf route matched");
                    return Some(RouteMatch {
                        handler,
                        route,
                        params,
                    });
                }
            }
        }

        if !route.children.is_empty() {
            let rest = segments.get(1..).unwrap_or_default();
            if let Some(found) = find_route(method, rest, &route.children, &params) {
                return Some(found);
            }
        }
    }

    None
}

/// Split a request path into segments.
///
/// `""` has no segments, `"/"` has one empty segment, and a single leading
/// slash is dropped before splitting.
pub fn split_path(path: &str) -> Vec<&str> {
    if path.is_empty() {
        return Vec::new();
    }
    path.strip_prefix('/').unwrap_or(path).split('/').collect()
}

/// Percent-decode a path segment. Invalid UTF-8 decodes lossily.
pub fn decode_segment(segment: &str) -> Cow<'_, str> {
    match urlencoding::decode(segment) {
        Ok(decoded) => decoded,
        Err(_) => {
            let bytes = urlencoding::decode_binary(segment.as_bytes());
            Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}

/// An immutable, shareable route tree.
#[derive(Clone)]
pub struct Router<H = BoxedHandler> {
    routes: Arc<Vec<Route<H>>>,
}

impl<H> Router<H> {
    pub fn new(routes: Vec<Route<H>>) -> Self {
        Self {
            routes: Arc::new(routes),
        }
    }

    pub fn routes(&self) -> &[Route<H>] {
        &self.routes
    }

    /// Match a lower-cased method against already split segments.
    pub fn find(&self, method: &str, segments: &[&str]) -> Option<RouteMatch<'_, H>> {
        find_route(method, segments, &self.routes, &Params::new())
    }
}

impl<H> From<Vec<Route<H>>> for Router<H> {
    fn from(routes: Vec<Route<H>>) -> Self {
        Self::new(routes)
    }
}

impl<H: fmt::Debug> fmt::Debug for Router<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.routes.iter()).finish()
    }
}
