//! Error types for dnest-common.

use thiserror::Error;

/// Common error type for dnest decoders.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of data at offset {offset:#x}: needed {needed} bytes but only {available} available")]
    UnexpectedEof {
        needed: usize,
        available: usize,
        offset: usize,
    },

    /// Invalid magic bytes encountered.
    #[error("invalid magic at offset {offset:#x}: expected {expected:02x?}, got {actual:02x?}")]
    InvalidMagic {
        expected: Vec<u8>,
        actual: Vec<u8>,
        offset: usize,
    },

    /// Bytes that are not valid in the legacy Korean codepage.
    #[error("invalid EUC-KR text at offset {offset:#x}: {bytes:02x?}")]
    Encoding { bytes: Vec<u8>, offset: usize },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
