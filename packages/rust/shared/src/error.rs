//! Error types for Postsmith.
//!
//! Library crates use [`PostsmithError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Maximum number of characters of a response body kept in an error.
pub const BODY_PREFIX_CHARS: usize = 300;

/// Top-level error type for all Postsmith operations.
#[derive(Debug, thiserror::Error)]
pub enum PostsmithError {
    /// Configuration loading or validation error (missing credentials, bad TOML).
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level HTTP failure (DNS, TLS, timeout, connection reset).
    #[error("network error: {0}")]
    Network(String),

    /// An upstream API answered with a non-success status.
    #[error("{service} API returned HTTP {status}: {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// The content store refused to create a post.
    #[error("publish failed with HTTP {status}: {body}")]
    Publish { status: u16, body: String },

    /// A response or input file could not be decoded.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (empty topic list, empty completion, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PostsmithError>;

impl PostsmithError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Build an [`PostsmithError::Api`] keeping only a prefix of the body.
    pub fn api(service: &'static str, status: u16, body: &str) -> Self {
        Self::Api {
            service,
            status,
            body: body_prefix(body),
        }
    }

    /// Build a [`PostsmithError::Publish`] keeping only a prefix of the body.
    pub fn publish(status: u16, body: &str) -> Self {
        Self::Publish {
            status,
            body: body_prefix(body),
        }
    }

    /// HTTP status attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Publish { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Truncate a response body to [`BODY_PREFIX_CHARS`] characters for logging.
pub fn body_prefix(body: &str) -> String {
    let mut chars = body.chars();
    let prefix: String = chars.by_ref().take(BODY_PREFIX_CHARS).collect();
    if chars.next().is_some() {
        format!("{prefix}...")
    } else {
        prefix
    }
}
