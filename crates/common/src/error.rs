//! Unified error type for feed acquisition and configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure, timeout, or non-success status from a feed.
    #[error("Feed fetch failed: {0}")]
    Fetch(String),

    /// Feed body was not in the expected shape.
    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for network/transport failures.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Error::Fetch(_))
    }

    /// True for malformed feed content, including raw JSON decode failures.
    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse(_) | Error::Json(_))
    }

    /// Copy of this error with the same class and message, for handing one
    /// failure to several callers.
    pub fn duplicate(&self) -> Error {
        match self {
            Error::Fetch(msg) => Error::Fetch(msg.clone()),
            Error::Parse(msg) => Error::Parse(msg.clone()),
            Error::Json(e) => Error::Parse(format!("JSON parse error: {e}")),
            Error::Config(msg) => Error::Config(msg.clone()),
            Error::Io(e) => Error::Io(std::io::Error::new(e.kind(), e.to_string())),
        }
    }
}
