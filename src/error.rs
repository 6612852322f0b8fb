//! Error types for jsonld-inject
//!
//! This module provides the error type hierarchy using `thiserror`.
//! The injector itself has exactly one failure kind, [`SerializeError`];
//! the other variants belong to the document, configuration and CLI layers.

use thiserror::Error;

/// The main error type for jsonld-inject operations
#[derive(Error, Debug)]
pub enum Error {
    /// The record could not be represented as JSON
    #[error("Serialization error: {0}")]
    Serialize(#[from] SerializeError),

    /// A block could not be placed into a host document
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures converting a caller record into a metadata value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SerializeError {
    /// NaN or an infinity was found
    #[error("non-finite number cannot be represented in JSON")]
    NonFiniteNumber,

    /// A map key was not a string, char, integer or boolean
    #[error("map key must be a string")]
    KeyMustBeString,

    /// Nesting exceeded the configured limit (usually a self-referencing record)
    #[error("nesting depth exceeds limit of {limit} (cyclic record?)")]
    DepthLimitExceeded {
        /// The limit that was hit
        limit: usize,
    },

    /// A 128-bit integer outside the 64-bit range
    #[error("number out of range for JSON")]
    NumberOutOfRange,

    /// Error raised by the record's own `Serialize` implementation
    #[error("{0}")]
    Custom(String),
}

impl serde::ser::Error for SerializeError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        SerializeError::Custom(msg.to_string())
    }
}

/// Host document integration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// Neither `</head>` nor `</body>` was found
    #[error("document has no </head> or </body> to insert before")]
    NoInsertionPoint,

    /// An empty marker matches everywhere, so it is refused
    #[error("marker must not be empty")]
    EmptyMarker,

    /// The placeholder marker does not occur in the document
    #[error("marker not found in document: {0}")]
    MarkerNotFound(String),
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A setting had an unusable value
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        /// Setting name
        key: String,
        /// Offending value
        value: String,
        /// Why it was rejected
        reason: String,
    },
}

impl ConfigError {
    /// Create an invalid-value error
    pub fn invalid<K, V, R>(key: K, value: V, reason: R) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        ConfigError::InvalidValue {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for jsonld-inject operations
pub type Result<T> = std::result::Result<T, Error>;
