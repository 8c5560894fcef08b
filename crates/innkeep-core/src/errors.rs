use std::path::PathBuf;

/// Core error type for the admin console.
///
/// Adapter crates map their specific errors into this type so the poller and
/// the console can tell retryable failures from operator mistakes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid path: {path}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    #[error("http {status}: {body}")]
    Http { status: u16, body: String },

    #[error("external error: {0}")]
    External(String),

    #[error("auth error: {0}")]
    Auth(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;
