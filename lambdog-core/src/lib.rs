// Core library for lambdog
// Wraps serverless function handlers: body decoding, route resolution,
// middleware, props merging, response encoding and ETag negotiation.

pub mod application;
pub mod body_parser;
pub mod conditional;
pub mod config;
pub mod encoder;
pub mod error;
pub mod handler;
pub mod http;
pub mod logging;
pub mod middleware;
pub mod prefix;
pub mod props;
pub mod routing;

// Re-export commonly used types
pub use application::{Lambdog, Target, with_handler, with_json_handler};
pub use config::{ErrorCallback, LambdogConfig};
pub use encoder::{ContentEncoder, Encoded, json_encoder, text_encoder};
pub use error::*;
pub use handler::{BoxedHandler, Handler, HandlerArgs, HandlerResult, handler, sync_handler};
pub use http::*;
pub use middleware::{
    AllowMethods, Middleware, MiddlewareChain, MiddlewareRequest, Next, RequestIdMiddleware,
};
pub use prefix::PathPrefix;
pub use props::Props;
pub use routing::{Params, Route, RouteMatch, Router, Segment, find_route, split_path};
