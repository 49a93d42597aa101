//! Logging setup for lambdog functions.
//!
//! Function logs are collected from the process output streams, so the
//! writer is always STDOUT or STDERR behind a non-blocking appender. The
//! default is JSON at INFO, which log aggregators index without extra parsing.
//!
//! # Examples
//!
//! ```no_run
//! use lambdog_core::logging::*;
//!
//! #[tokio::main]
//! async fn main() {
//!     let _guard = LogConfig::new()
//!         .level(LogLevel::Debug)
//!         .format(LogFormat::Compact)
//!         .init();
//!
//!     info!("cold start");
//! }
//! ```

use crate::config::EnvLoader;
use crate::{Error, Result};
use std::io;
use std::str::FromStr;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub use tracing::{debug, error, info, trace, warn};

/// Log level for filtering messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Convert to tracing Level
    pub fn to_tracing_level(&self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }

    /// Directive string for EnvFilter
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(Error::Config(format!("unknown log level `{}`", other))),
        }
    }
}

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Structured, one JSON object per line
    Json,
    Plain,
    /// Multi-line, for local development
    Pretty,
    Compact,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "plain" | "text" => Ok(LogFormat::Plain),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            other => Err(Error::Config(format!("unknown log format `{}`", other))),
        }
    }
}

/// Output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Include target (module path)
    pub targets: bool,
    /// Log span close events with timings
    pub spans: bool,
    /// Enable ANSI colors (ignored for JSON)
    pub colors: bool,
    /// Custom filter directives, overriding `level` and `RUST_LOG`
    pub env_filter: Option<String>,
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `LAMBDOG_LOG_LEVEL` and `LAMBDOG_LOG_FORMAT`.
    ///
    /// Unparseable values are reported rather than ignored.
    pub fn from_env() -> Result<Self> {
        let loader = EnvLoader::new(Some("LAMBDOG".to_string()));
        let mut config = Self::default();
        if let Some(level) = loader.parse_var("LOG_LEVEL")? {
            config.level = level;
        }
        if let Some(format) = loader.parse_var("LOG_FORMAT")? {
            config.format = format;
        }
        Ok(config)
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_targets(mut self, enable: bool) -> Self {
        self.targets = enable;
        self
    }

    pub fn with_spans(mut self, enable: bool) -> Self {
        self.spans = enable;
        self
    }

    pub fn with_colors(mut self, enable: bool) -> Self {
        self.colors = enable;
        self
    }

    /// Set filter directives such as `lambdog_core=debug,hyper=warn`.
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    fn build_filter(&self) -> EnvFilter {
        match &self.env_filter {
            Some(directives) => {
                EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
            }
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(self.level.as_str())),
        }
    }

    /// Install the global subscriber.
    ///
    /// The returned guard flushes buffered lines when dropped, so keep it
    /// alive for the lifetime of the function. Fails if a global subscriber
    /// is already installed.
    pub fn try_init(self) -> Result<WorkerGuard> {
        let (writer, guard) = match self.output {
            LogOutput::Stdout => tracing_appender::non_blocking(io::stdout()),
            LogOutput::Stderr => tracing_appender::non_blocking(io::stderr()),
        };
        let filter = self.build_filter();
        let fmt_span = if self.spans {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        let registry = tracing_subscriber::registry().with(filter);
        let installed = match self.format {
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .flatten_event(true)
                        .with_current_span(self.spans)
                        .with_span_list(false)
                        .with_target(self.targets)
                        .with_span_events(fmt_span)
                        .with_writer(writer),
                )
                .try_init(),
            LogFormat::Plain => registry
                .with(
                    fmt::layer()
                        .with_target(self.targets)
                        .with_ansi(self.colors)
                        .with_span_events(fmt_span)
                        .with_writer(writer),
                )
                .try_init(),
            LogFormat::Pretty => registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_target(self.targets)
                        .with_ansi(self.colors)
                        .with_span_events(fmt_span)
                        .with_writer(writer),
                )
                .try_init(),
            LogFormat::Compact => registry
                .with(
                    fmt::layer()
                        .compact()
                        .with_target(self.targets)
                        .with_ansi(self.colors)
                        .with_span_events(fmt_span)
                        .with_writer(writer),
                )
                .try_init(),
        };

        installed.map_err(|e| Error::Config(format!("logging already initialized: {}", e)))?;
        Ok(guard)
    }

    /// Like [`try_init`](Self::try_init), but a second initialization is a
    /// no-op returning `None`.
    pub fn init(self) -> Option<WorkerGuard> {
        self.try_init().ok()
    }
}

impl Default for LogConfig {
    /// JSON to STDOUT at INFO
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Json,
            output: LogOutput::Stdout,
            targets: true,
            spans: false,
            colors: false,
            env_filter: None,
        }
    }
}
