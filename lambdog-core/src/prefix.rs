// Path prefix strip strategies
//
// The path is stripped once per invocation, before segmenting. Every strategy
// is a pure string transform chosen at configuration time.

use crate::{Error, Result};
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Matches an optional Netlify functions prefix and captures the remainder.
pub const NETLIFY_FUNCTIONS_PATTERN: &str = r"(?s)^(?:/\.netlify/functions/[^/]+)?(.*)$";

/// Custom strip function.
pub type PrefixFn = Arc<dyn Fn(&str) -> Result<String> + Send + Sync>;

/// How to remove a leading portion of the request path.
#[derive(Clone)]
pub enum PathPrefix {
    /// Leave the path untouched.
    None,
    /// Strip this exact prefix when present and followed by `/` or the end
    /// of the path.
    Literal(String),
    /// Keep the first capture group. A path the pattern rejects is an error.
    Pattern(Regex),
    /// Arbitrary transform.
    Custom(PrefixFn),
}

impl PathPrefix {
    /// Literal prefix strategy.
    pub fn literal(prefix: impl Into<String>) -> Self {
        PathPrefix::Literal(prefix.into())
    }

    /// Compile a pattern strategy. The pattern needs at least one capture group.
    pub fn pattern(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| Error::Config(format!("invalid path prefix pattern: {}", e)))?;
        if regex.captures_len() < 2 {
            return Err(Error::Config(format!(
                "path prefix pattern `{}` has no capture group",
                pattern
            )));
        }
        Ok(PathPrefix::Pattern(regex))
    }

    /// Custom strategy from a closure.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<String> + Send + Sync + 'static,
    {
        PathPrefix::Custom(Arc::new(f))
    }

    /// The default: strip `/.netlify/functions/<name>` when present.
    pub fn netlify() -> Self {
        // The pattern is a constant known to compile with one group.
        match Regex::new(NETLIFY_FUNCTIONS_PATTERN) {
            Ok(regex) => PathPrefix::Pattern(regex),
            Err(_) => PathPrefix::None,
        }
    }

    /// Apply the strategy to `path`.
    pub fn strip(&self, path: &str) -> Result<String> {
        match self {
            PathPrefix::None => Ok(path.to_string()),
            PathPrefix::Literal(prefix) => Ok(path
                .strip_prefix(prefix.as_str())
                .filter(|rest| rest.is_empty() || rest.starts_with('/') || prefix.ends_with('/'))
                .unwrap_or(path)
                .to_string()),
            PathPrefix::Pattern(regex) => regex
                .captures(path)
                .and_then(|captures| captures.get(1))
                .map(|m| m.as_str().to_string())
                .ok_or_else(|| {
                    Error::PrefixStrip(format!(
                        "path `{}` does not match prefix pattern `{}`",
                        path,
                        regex.as_str()
                    ))
                }),
            PathPrefix::Custom(f) => f(path),
        }
    }
}

impl Default for PathPrefix {
    fn default() -> Self {
        Self::netlify()
    }
}

impl fmt::Debug for PathPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathPrefix::None => f.write_str("None"),
            PathPrefix::Literal(prefix) => f.debug_tuple("Literal").field(prefix).finish(),
            PathPrefix::Pattern(regex) => f.debug_tuple("Pattern").field(&regex.as_str()).finish(),
            PathPrefix::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
