// Error types for the ember application.
// Covers HN API errors, cache errors, and general application errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmberError {
    #[error("request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Http {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cache write failed: {0}")]
    CachePersist(#[source] std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no usable application directories on this platform")]
    MissingDirs,

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, EmberError>;
