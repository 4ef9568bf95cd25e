//! Error types for formkeep.
//!
//! Storage and file failures are modelled here. Field-level validation
//! failures are not errors: they are returned as data by
//! [`crate::form::Validator`] and never appear in [`Error`].

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for formkeep operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Key-Value Storage Errors ===
    /// Reading a key from the key-value store failed.
    #[error("failed to read key '{key}': {message}")]
    StorageRead {
        /// The key being read.
        key: String,
        /// Description of what went wrong.
        message: String,
    },

    /// Writing or removing a key in the key-value store failed.
    #[error("failed to write key '{key}': {message}")]
    StorageWrite {
        /// The key being written.
        key: String,
        /// Description of what went wrong.
        message: String,
    },

    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    // === File Storage Errors ===
    /// Reading a file or directory failed.
    #[error("failed to read {path}: {message}")]
    FileRead {
        /// Path being read.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    /// Writing, copying or deleting a file failed.
    #[error("failed to write {path}: {message}")]
    FileWrite {
        /// Path being written.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Form Input Errors ===
    /// A field name that the form does not have.
    #[error("unknown form field '{name}'")]
    InvalidField {
        /// The name that was given.
        name: String,
    },

    /// A value that cannot be applied to a field.
    #[error("invalid value for {field}: {message}")]
    InvalidFieldValue {
        /// Wire name of the field.
        field: String,
        /// Description of what went wrong.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for formkeep operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a key-value read error.
    #[must_use]
    pub fn storage_read(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StorageRead {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a key-value write error.
    #[must_use]
    pub fn storage_write(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StorageWrite {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a file read error.
    #[must_use]
    pub fn file_read(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::FileRead {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file write error.
    #[must_use]
    pub fn file_write(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::FileWrite {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid field value error.
    #[must_use]
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidFieldValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error came from the key-value store.
    #[must_use]
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            Self::StorageRead { .. }
                | Self::StorageWrite { .. }
                | Self::DatabaseOpen { .. }
                | Self::DatabaseQuery(_)
        )
    }

    /// Check if this error came from the file store.
    #[must_use]
    pub fn is_file_error(&self) -> bool {
        matches!(
            self,
            Self::FileRead { .. } | Self::FileWrite { .. } | Self::DirectoryCreate { .. }
        )
    }
}
