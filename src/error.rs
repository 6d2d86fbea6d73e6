//! Error types for the mailer.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal configuration problems, raised when a [`Mailer`](crate::Mailer) is built.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required config: {0}")]
    Missing(&'static str),

    #[error("apikey length should be greater than 0")]
    EmptyApiKey,

    #[error("templateLanguage has an invalid value: {0}")]
    InvalidTemplateLanguage(String),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to encode or decode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to render view '{view}': {reason}")]
    Render { view: String, reason: String },

    #[error("failed to parse raw message: {0}")]
    Parse(String),

    #[error("I/O error reading '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl MailError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, MailError>;
