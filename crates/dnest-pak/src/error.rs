//! Error types for the PAK crate.

use thiserror::Error;

/// Errors that can occur when working with PAK archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] dnest_common::Error),

    /// The file does not start with the packing-file identifier.
    #[error("not a valid PAK archive: bad identifier {actual:?}")]
    InvalidSignature { actual: Vec<u8> },

    /// The header marker at 0x100 is wrong.
    #[error("not a valid PAK archive: bad marker {actual:02x?} at offset {offset:#x}")]
    InvalidMarker { offset: u64, actual: [u8; 4] },

    /// A directory record has non-zero bytes in its reserved region.
    #[error(
        "corrupt file listing in PAK archive: entry {index} at offset {offset:#x} \
         has non-zero reserved byte {value:#04x} at +{position}"
    )]
    CorruptEntry {
        index: usize,
        offset: u64,
        position: usize,
        value: u8,
    },

    /// The stream ended before a structure or payload was complete.
    #[error("truncated {what}: needed {needed} bytes at offset {offset:#x}")]
    Truncated {
        what: &'static str,
        offset: u64,
        needed: u64,
    },

    /// Decompression error.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// An entry path that would escape the extraction root.
    #[error("refusing to extract unsafe path: {0}")]
    UnsafePath(String),

    /// Entry not found.
    #[error("entry not found: {0}")]
    EntryNotFound(String),

    /// A failure while reading or extracting one entry.
    #[error("{name}: {source}")]
    Entry {
        name: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Attach the name of the entry being processed.
    pub(crate) fn in_entry(self, name: impl Into<String>) -> Self {
        Error::Entry {
            name: name.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through [`Error::Entry`] wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Error::Entry { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type for PAK operations.
pub type Result<T> = std::result::Result<T, Error>;
