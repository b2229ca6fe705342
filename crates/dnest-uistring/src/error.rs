//! Error types for UIString loading.

use thiserror::Error;

/// Errors that can occur when loading a UIString table.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing error.
    #[error("XML error at byte {position}: {message}")]
    Xml { position: u64, message: String },

    /// A `message` element without a `mid` attribute.
    #[error("message element at byte {position} has no mid attribute")]
    MissingMessageId { position: u64 },

    /// A `mid` attribute that is not an integer id.
    #[error("invalid message id {value:?} at byte {position}")]
    InvalidMessageId { value: String, position: u64 },
}

/// Result type for UIString operations.
pub type Result<T> = std::result::Result<T, Error>;
