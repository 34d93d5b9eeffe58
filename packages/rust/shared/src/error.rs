//! Error types for figforge.
//!
//! Library crates use [`FigforgeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all figforge operations.
#[derive(Debug, thiserror::Error)]
pub enum FigforgeError {
    /// Caller supplied malformed parameters (e.g. a zero chunk size).
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// A prompt template referenced a slot with no value in the mapping.
    #[error("missing slot `{name}` in prompt mapping")]
    MissingSlot { name: String },

    /// Generation call failed (network, quota, malformed response, refusal,
    /// or timeout). Opaque to the driver; never retried internally.
    #[error("generation error: {0}")]
    Generation(String),

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The run was canceled by the caller.
    #[error("run canceled")]
    Canceled,
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FigforgeError>;

impl FigforgeError {
    /// Create an invalid-input error from any displayable message.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    /// Create a missing-slot error for a slot name.
    pub fn missing_slot(name: impl Into<String>) -> Self {
        Self::MissingSlot { name: name.into() }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = FigforgeError::invalid_input("max_lines_per_chunk must be positive");
        assert_eq!(
            err.to_string(),
            "invalid input: max_lines_per_chunk must be positive"
        );

        let err = FigforgeError::missing_slot("current_code");
        assert!(err.to_string().contains("`current_code`"));

        let err = FigforgeError::Generation("HTTP 429".into());
        assert_eq!(err.to_string(), "generation error: HTTP 429");
    }
}
