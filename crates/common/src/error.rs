//! Error types shared across frameintro crates.

use std::path::PathBuf;

/// Top-level error type for frameintro operations.
///
/// The timing paths themselves never fail; errors only arise while
/// loading configuration or input scripts.
#[derive(Debug, thiserror::Error)]
pub enum IntroError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid timing table: {message}")]
    InvalidTiming { message: String },

    #[error("Input script error on line {line}: {message}")]
    Script { line: usize, message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using IntroError.
pub type IntroResult<T> = Result<T, IntroError>;

impl IntroError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn invalid_timing(msg: impl Into<String>) -> Self {
        Self::InvalidTiming {
            message: msg.into(),
        }
    }

    pub fn script(line: usize, msg: impl Into<String>) -> Self {
        Self::Script {
            line,
            message: msg.into(),
        }
    }
}
