//! PAK archive reader for Dragon Nest game files.
//!
//! A PAK archive is a flat container of individually zlib-compressed files
//! with a directory of fixed-size records:
//!
//! ```text
//! 0x000  "EyedentityGames Packing File 0.1", NUL padded
//! 0x100  0B 00 00 00
//! 0x104  u32 file count
//! 0x108  u32 directory offset
//! ...    entry data
//! dir    file count × 316-byte records:
//!        [256 path][u32 zsize][u32 size][u32 zsize][u32 offset][u32 ?][40 zero bytes]
//! ```
//!
//! Opening an archive validates the header and decodes the whole directory;
//! any corrupt record rejects the archive. Entries are extracted one at a
//! time on demand.
//!
//! # Example
//!
//! ```no_run
//! use dnest_pak::PakArchive;
//!
//! let archive = PakArchive::open("Resource00.pak")?;
//!
//! for entry in archive.iter() {
//!     println!("{}: {} bytes", entry, entry.uncompressed_size());
//! }
//!
//! if let Some(entry) = archive.find("resource/uistring/uistring.xml") {
//!     archive.extract(entry, "out")?;
//! }
//! # Ok::<(), dnest_pak::Error>(())
//! ```

mod archive;
mod decompress;
mod entry;
mod error;
pub mod raw;

pub use archive::PakArchive;
pub use decompress::decompress_zlib_sized;
pub use entry::PakEntry;
pub use error::{Error, Result};
