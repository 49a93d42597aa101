// Wrapper configuration and environment loading

use crate::encoder::ContentEncoder;
use crate::middleware::{Middleware, MiddlewareChain};
use crate::prefix::PathPrefix;
use crate::{Error, Headers, PartialResponse, Result};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Name of the marketing header added to every response.
pub const MARKETING_HEADER: &str = "lambdog";

/// Renders a structured error as a response override.
///
/// The result is applied on top of the default error response
/// (`400`, empty body, marketing headers plus `content-type: text/plain`).
pub type ErrorCallback = Arc<dyn Fn(&Error) -> PartialResponse + Send + Sync>;

/// The error callback used when none is configured.
///
/// Responds 400 `text/plain`; the body is the message in production and the
/// full diagnostic trace otherwise.
pub fn default_error_callback(production: bool) -> ErrorCallback {
    Arc::new(move |error: &Error| {
        let body = if production {
            error.message()
        } else {
            error.trace()
        };
        PartialResponse::new()
            .status(400)
            .header("content-type", "text/plain")
            .body(body)
    })
}

/// Marketing headers identifying the library version.
pub fn default_marketing_headers() -> Headers {
    let mut headers = Headers::new();
    headers.insert(
        MARKETING_HEADER.to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    );
    headers
}

/// Options shared by [`with_json_handler`](crate::with_json_handler) and
/// [`with_handler`](crate::with_handler).
#[derive(Clone)]
pub struct LambdogConfig {
    /// Positional `:name` template for direct mode, e.g. `x/:id`.
    pub path_to_props: Option<String>,
    pub path_prefix: PathPrefix,
    /// `None` uses [`default_error_callback`].
    pub error_callback: Option<ErrorCallback>,
    /// Seconds for `cache-control: max-age`; `None` omits the header.
    pub max_age: Option<u32>,
    /// `None` uses the entry point's encoder.
    pub content_encoder: Option<ContentEncoder>,
    /// `None` uses the entry point's content type.
    pub content_type: Option<String>,
    pub marketing_headers: Headers,
    /// Hide diagnostic traces from error bodies.
    pub production: bool,
    /// Runs before any route middleware.
    pub middleware: MiddlewareChain,
}

impl LambdogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `LAMBDOG_*` environment variables.
    ///
    /// | Variable                | Effect                                        |
    /// |-------------------------|-----------------------------------------------|
    /// | `LAMBDOG_MAX_AGE`       | seconds; `-1` disables cache-control          |
    /// | `LAMBDOG_CONTENT_TYPE`  | response content type                         |
    /// | `LAMBDOG_PATH_PREFIX`   | `none`, a `^`-anchored pattern, or a literal  |
    /// | `LAMBDOG_PATH_TO_PROPS` | direct mode template                          |
    /// | `LAMBDOG_PRODUCTION`    | `true`/`false`/`1`/`0`                        |
    pub fn from_env() -> Result<Self> {
        Self::from_loader(&EnvLoader::new(Some("LAMBDOG".to_string())))
    }

    /// Build from any loader; used by [`from_env`](Self::from_env).
    pub fn from_loader(loader: &EnvLoader) -> Result<Self> {
        let mut config = Self::default();

        if let Some(max_age) = loader.parse_var::<i64>("MAX_AGE")? {
            config.max_age = match max_age {
                -1 => None,
                seconds => Some(u32::try_from(seconds).map_err(|_| {
                    Error::Config(format!("MAX_AGE out of range: {}", seconds))
                })?),
            };
        }
        if let Some(content_type) = loader.load_var("CONTENT_TYPE") {
            config.content_type = Some(content_type);
        }
        if let Some(prefix) = loader.load_var("PATH_PREFIX") {
            config.path_prefix = parse_path_prefix(&prefix)?;
        }
        if let Some(template) = loader.load_var("PATH_TO_PROPS") {
            config.path_to_props = Some(template);
        }
        if let Some(production) = loader.load_var("PRODUCTION") {
            config.production = parse_bool(&production)?;
        }

        Ok(config)
    }

    pub fn path_to_props(mut self, template: impl Into<String>) -> Self {
        self.path_to_props = Some(template.into());
        self
    }

    pub fn path_prefix(mut self, prefix: PathPrefix) -> Self {
        self.path_prefix = prefix;
        self
    }

    pub fn error_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Error) -> PartialResponse + Send + Sync + 'static,
    {
        self.error_callback = Some(Arc::new(callback));
        self
    }

    pub fn max_age(mut self, seconds: u32) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn without_max_age(mut self) -> Self {
        self.max_age = None;
        self
    }

    pub fn content_encoder(mut self, encoder: ContentEncoder) -> Self {
        self.content_encoder = Some(encoder);
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Add or replace a marketing header.
    pub fn marketing_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.marketing_headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Replace all marketing headers.
    pub fn marketing_headers(mut self, headers: Headers) -> Self {
        self.marketing_headers = headers;
        self
    }

    pub fn production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    /// Append wrapper-level middleware.
    pub fn middleware<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middleware.use_middleware(middleware);
        self
    }
}

impl Default for LambdogConfig {
    fn default() -> Self {
        Self {
            path_to_props: None,
            path_prefix: PathPrefix::default(),
            error_callback: None,
            max_age: None,
            content_encoder: None,
            content_type: None,
            marketing_headers: default_marketing_headers(),
            production: false,
            middleware: MiddlewareChain::new(),
        }
    }
}

impl fmt::Debug for LambdogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LambdogConfig")
            .field("path_to_props", &self.path_to_props)
            .field("path_prefix", &self.path_prefix)
            .field("error_callback", &self.error_callback.is_some())
            .field("max_age", &self.max_age)
            .field("content_encoder", &self.content_encoder.is_some())
            .field("content_type", &self.content_type)
            .field("marketing_headers", &self.marketing_headers)
            .field("production", &self.production)
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

fn parse_path_prefix(value: &str) -> Result<PathPrefix> {
    match value.trim() {
        "" | "none" => Ok(PathPrefix::None),
        pattern if pattern.starts_with('^') => PathPrefix::pattern(pattern),
        literal => Ok(PathPrefix::literal(literal)),
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(Error::Config(format!("expected a boolean, got `{}`", other))),
    }
}

/// Environment variable loader
///
/// Keys are upper-cased and joined to the prefix with `_`. A loader built
/// with [`from_map`](Self::from_map) reads a fixed map instead of the
/// process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvLoader {
    prefix: Option<String>,
    source: Option<HashMap<String, String>>,
}

impl EnvLoader {
    pub fn new(prefix: Option<String>) -> Self {
        Self {
            prefix,
            source: None,
        }
    }

    /// Loader over a fixed set of variables.
    pub fn from_map(prefix: Option<String>, vars: HashMap<String, String>) -> Self {
        Self {
            prefix,
            source: Some(vars),
        }
    }

    /// Full variable name for `key`.
    pub fn key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }

    /// Load a specific variable, if set.
    pub fn load_var(&self, key: &str) -> Option<String> {
        let full_key = self.key(key);
        match &self.source {
            Some(vars) => vars.get(&full_key).cloned(),
            None => env::var(&full_key).ok(),
        }
    }

    /// Load with default value
    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|| default.to_string())
    }

    /// Load and parse a variable; a value that fails to parse is an error.
    pub fn parse_var<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.load_var(key)
            .map(|raw| {
                raw.trim().parse::<T>().map_err(|e| {
                    Error::Config(format!("invalid value for {}: {}", self.key(key), e))
                })
            })
            .transpose()
    }
}
