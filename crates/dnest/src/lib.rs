//! dnest - Dragon Nest resource extraction and decoding library.
//!
//! This crate provides a unified interface to the dnest crates for working
//! with Dragon Nest client resources.
//!
//! # Crates
//!
//! - [`dnest_common`] - Common utilities (binary cursor, EUC-KR decoding)
//! - [`dnest_pak`] - PAK archive reading and extraction
//! - [`dnest_dnt`] - DNT data table decoding
//! - [`dnest_uistring`] - UIString message tables
//!
//! # Example
//!
//! ```no_run
//! use dnest::prelude::*;
//!
//! // Open a PAK archive and pull a table out of it
//! let archive = PakArchive::open("Resource00.pak")?;
//! if let Some(entry) = archive.find("resource/ext/itemtable.dnt") {
//!     let data = archive.read(entry)?;
//!
//!     let table = DntFile::parse(&data)?;
//!     println!("Rows: {}", table.row_count());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use dnest_common as common;
pub use dnest_dnt as dnt;
pub use dnest_pak as pak;
pub use dnest_uistring as uistring;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use dnest_common::BinaryReader;
    pub use dnest_dnt::{Column, ColumnType, DntFile, Row, Value};
    pub use dnest_pak::{PakArchive, PakEntry};
    pub use dnest_uistring::UiStringTable;
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
