// lambdog - serverless function handler wrapper
//
// Wraps a business handler, or a tree of routes, so that it receives merged
// props and its result is answered with caching headers and ETags.

// Re-export core functionality
pub use lambdog_core::*;

// Re-export the Lambda adapter
#[cfg(feature = "lambda")]
pub use lambdog_lambda;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        BoxedHandler, Error, Event, Failure, HandlerArgs, HandlerResult, Lambdog, LambdogConfig,
        Middleware, MiddlewareRequest, Next, PartialResponse, PathPrefix, Props, Response, Route,
        handler, sync_handler, with_handler, with_json_handler,
    };

    #[cfg(feature = "lambda")]
    pub use lambdog_lambda::{LambdaConfig, LambdaRuntime};

    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{Value, json};
}
