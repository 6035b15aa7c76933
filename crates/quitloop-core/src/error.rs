//! Core error types for quitloop-core.
//!
//! Flow transitions never fail; invalid triggers are absorbed by the
//! controller. Errors only come from the edges: storage, configuration and
//! the waitlist client.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for quitloop-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key-value storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing database
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked by another writer
    #[error("Database is locked")]
    Locked,

    /// The data directory could not be resolved or created
    #[error("Failed to access data directory: {0}")]
    DataDir(String),

    /// The log could not be serialized for writing
    #[error("Failed to encode event log: {0}")]
    Encode(#[from] serde_json::Error),

    /// Write rejected by the store (used by non-SQLite stores)
    #[error("Write to '{key}' failed: {message}")]
    WriteFailed { key: String, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Email address rejected before submission
    #[error("Invalid email address: '{0}'")]
    InvalidEmail(String),
}

/// Waitlist endpoint errors.
#[derive(Error, Debug)]
pub enum WaitlistError {
    /// Local validation failed, nothing was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Endpoint rejected the submission (HTTP 400)
    #[error("Submission rejected: {0}")]
    Rejected(String),

    /// Endpoint failed (5xx or unexpected status)
    #[error("Waitlist server error (HTTP {status})")]
    Server { status: u16 },

    /// Request never completed
    #[error("Waitlist request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Endpoint URL is not usable
    #[error("Invalid waitlist endpoint '{endpoint}': {source}")]
    Endpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked
                    || inner.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}
