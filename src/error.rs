//! Error types for fpds-task-orders
//!
//! One error enum covers the whole crate. Any error returned by a
//! [`TaskOrderSource`](crate::feed::TaskOrderSource) is recorded against that
//! contractor and the batch continues; errors from local files abort the run.

use thiserror::Error;

/// Result type alias for fpds-task-orders operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for fpds-task-orders
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "feed.base_url")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The feed answered with a non-success HTTP status
    #[error("feed returned HTTP {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or request URL
        message: String,
    },

    /// The feed body was not well-formed XML
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The feed body parsed but did not look like an ATOM feed page
    #[error("feed error: {0}")]
    Feed(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a configuration error tied to a key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}
