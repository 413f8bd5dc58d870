//! Store error types.
//!
//! Provides error handling for list storage operations using `thiserror`.

use std::path::PathBuf;
use thiserror::Error;

/// List store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No list name was supplied.
    #[error("list name is required")]
    MissingName,

    /// The list name is not filesystem-safe.
    #[error("invalid list name: {0}")]
    InvalidName(String),

    /// Requested list does not exist.
    #[error("list '{list}' not found")]
    NotFound {
        /// List name
        list: String,
    },

    /// A list with this name already exists.
    #[error("list '{list}' already exists")]
    AlreadyExists {
        /// List name
        list: String,
    },

    /// No row with the given place ID exists in the list.
    #[error("row with place ID {place_id} not found in list '{list}'")]
    RowNotFound {
        /// List name
        list: String,
        /// Place identifier that was looked up
        place_id: String,
    },

    /// Field is not one of the editable row fields.
    #[error("invalid field '{field}': expected one of hidden, called, interested, note")]
    InvalidField {
        /// Field name as supplied
        field: String,
    },

    /// Value does not fit the field being edited.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for rejection
        reason: String,
    },

    /// Writing or swapping the list document failed. The previous document is untouched.
    #[error("failed to persist {}: {source}", path.display())]
    Persistence {
        /// Target document path
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// The list document could not be decoded.
    #[error("corrupt list document {}: {source}", path.display())]
    Corrupt {
        /// Document path
        path: PathBuf,
        /// Decode failure
        source: serde_json::Error,
    },

    /// Serialization failed before anything was written.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error outside the write path.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
