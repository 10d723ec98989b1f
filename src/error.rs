//! Error types and handling for bloodbank-records.
//!
//! Address normalization, flattening and filtering are total and never fail.
//! Errors only come from record validation and from the storage backends.

/// Result type alias for record operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for record operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A record failed validation before reaching the store
    #[error("Invalid record: {message}")]
    InvalidRecord {
        /// Error message
        message: String,
    },

    /// A record addressed by id does not exist
    #[error("Record not found: {id}")]
    NotFound {
        /// Id of the missing record
        id: uuid::Uuid,
    },

    /// Storage backend errors that are not SQL errors
    #[error("Storage error: {message}")]
    StorageError {
        /// Error message
        message: String,
    },

    /// SQLite errors
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {source}")]
    SqliteError {
        /// Source error
        #[from]
        source: rusqlite::Error,
    },

    /// I/O errors
    #[error("I/O error: {source}")]
    IoError {
        /// Source error
        #[from]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a new invalid record error
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }

    /// Create a new not found error
    pub fn not_found(id: uuid::Uuid) -> Self {
        Self::NotFound { id }
    }

    /// Create a new storage error
    pub fn storage_error(message: impl Into<String>) -> Self {
        Self::StorageError {
            message: message.into(),
        }
    }
}
