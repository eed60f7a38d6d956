//! Error types for the StudyBuilder core library
//!
//! Every failure surfaced by the gateway, the resource clients and the
//! state containers is expressed through [`Error`]. HTTP failures keep the
//! full [`HttpError`] so callers can inspect status, body and correlation id
//! after the notification side effects have run.

use thiserror::Error;

use crate::http::HttpError;

/// Main error type for StudyBuilder client operations
#[derive(Error, Debug)]
pub enum Error {
    /// A request reached the backend (or failed in transit) and was rejected
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// The request could not be prepared for dispatch
    #[error("HTTP request error: {message}")]
    HttpRequest {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Message catalog errors
    #[error("Localization error: {message}")]
    Localization { message: String },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal error with context
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// HTTP status of the underlying response, when one was received
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Http(http) => http.status_code,
            _ => None,
        }
    }

    /// The HTTP failure behind this error, if any
    pub fn as_http(&self) -> Option<&HttpError> {
        match self {
            Error::Http(http) => Some(http),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}
