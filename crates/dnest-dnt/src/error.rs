//! Error types for DNT parsing.

use thiserror::Error;

/// Errors that can occur when decoding a DNT table.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error (truncation, text decoding).
    #[error("{0}")]
    Common(#[from] dnest_common::Error),

    /// The 4-byte header is not all zero.
    #[error("not a recognized DNT file, invalid header: {actual:02x?}")]
    InvalidHeader { actual: [u8; 4] },

    /// A schema entry carries a type tag outside the known set.
    #[error("unknown column type {tag} for column {column} ({name:?}) at offset {offset:#x}")]
    UnknownColumnType {
        column: usize,
        name: String,
        tag: u8,
        offset: usize,
    },

    /// Two columns end up with the same name once the leading character is dropped.
    #[error("duplicate column name {name:?} for column {column} at offset {offset:#x}")]
    DuplicateColumn {
        column: usize,
        name: String,
        offset: usize,
    },

    /// Export error.
    #[error("export error: {0}")]
    Export(String),
}

/// Result type for DNT operations.
pub type Result<T> = std::result::Result<T, Error>;
