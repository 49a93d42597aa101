//! # lambdog Lambda
//!
//! AWS Lambda runtime adapter for lambdog handlers.
//!
//! Serves a [`Lambdog`](lambdog_core::Lambdog) wrapper behind API Gateway,
//! ALB, or Lambda Function URLs.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lambdog_core::{handler, with_json_handler, HandlerArgs, HandlerResult, LambdogConfig, Props};
//! use lambdog_lambda::LambdaRuntime;
//! use serde_json::Value;
//!
//! async fn hello(props: Props, _args: HandlerArgs) -> HandlerResult {
//!     Ok(Some(Value::Object(props)))
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), lambda_runtime::Error> {
//!     let _guard = lambdog_lambda::init_tracing();
//!
//!     let app = with_json_handler(handler(hello), LambdogConfig::from_env()?);
//!     LambdaRuntime::new(app).run().await
//! }
//! ```
//!
//! ## Deployment
//!
//! ```bash
//! cargo lambda build --release
//! cargo lambda deploy
//! ```

mod error;
mod request;
mod response;
mod runtime;

pub use error::{LambdaError, Result};
pub use request::{REQUEST_ID_HEADER, event_from_request};
pub use response::into_lambda_response;
pub use runtime::{LambdaConfig, LambdaRuntime};

// Re-export lambda types
pub use lambda_http;
pub use lambda_runtime;

use lambdog_core::logging::{LogConfig, LogFormat, LogLevel};
use tracing_appender::non_blocking::WorkerGuard;

/// Initialize tracing for Lambda/CloudWatch.
///
/// Flattened JSON lines on STDOUT. `LAMBDOG_LOG_LEVEL` and `RUST_LOG` are
/// honored. Keep the guard alive for the lifetime of the function.
pub fn init_tracing() -> Option<WorkerGuard> {
    LogConfig::from_env()
        .unwrap_or_default()
        .format(LogFormat::Json)
        .with_targets(false)
        .init()
}

/// Initialize tracing with a fixed log level.
pub fn init_tracing_with_level(level: LogLevel) -> Option<WorkerGuard> {
    LogConfig::new()
        .level(level)
        .format(LogFormat::Json)
        .with_targets(false)
        .init()
}
