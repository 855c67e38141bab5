/*!
 * Error types for the textmill application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to a translation backend
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The backend answered, but with nothing usable
    #[error("Backend returned an empty translation")]
    EmptyTranslation,

    /// Every mirror of a backend was tried and none answered
    #[error("All {count} endpoints of {backend} failed")]
    AllEndpointsFailed {
        /// Backend name
        backend: String,
        /// Number of endpoints tried
        count: usize,
    },
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors that can occur while accepting an input file
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FileError {
    /// Extension is not in the allow-list
    #[error("Unsupported file type: {0}")]
    Unsupported(String),

    /// File exceeds the size limit
    #[error("File {name} is too large ({size} bytes, limit {limit} bytes)")]
    TooLarge {
        /// File name
        name: String,
        /// Actual size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },

    /// Content is not valid UTF-8 text
    #[error("Failed to decode {0} as UTF-8 text")]
    Decode(String),
}

/// Errors raised by the durable key/value store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying SQLite failure
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored value could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Lock could not be acquired
    #[error("Store lock poisoned: {0}")]
    Lock(String),
}
