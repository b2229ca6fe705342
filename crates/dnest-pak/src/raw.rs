//! On-disk PAK structures.

use zerocopy::byteorder::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Identifier at the very start of every archive.
pub const SIGNATURE: &[u8] = b"EyedentityGames Packing File 0.1";

/// Absolute offset of the archive header that follows the identifier.
pub const HEADER_OFFSET: u64 = 0x100;

/// Marker opening the archive header.
pub const HEADER_MARKER: [u8; 4] = [0x0B, 0x00, 0x00, 0x00];

/// Size of the NUL-padded path field of a directory record.
pub const PATH_SIZE: usize = 0x100;

/// Size of the zeroed tail of a directory record.
pub const RESERVED_SIZE: usize = 0x28;

/// One directory record, exactly as stored.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct EntryRecord {
    /// NUL-terminated, backslash-separated EUC-KR path.
    pub path: [u8; PATH_SIZE],
    /// Size of the zlib stream.
    pub compressed_size: U32,
    /// Size after inflation.
    pub uncompressed_size: U32,
    /// Duplicate of `compressed_size` in every archive seen so far.
    pub compressed_size_secondary: U32,
    /// Absolute offset of the zlib stream.
    pub offset: U32,
    pub unknown: U32,
    /// Must be all zero.
    pub reserved: [u8; RESERVED_SIZE],
}

impl EntryRecord {
    /// Size of a record on disk.
    pub const SIZE: usize = std::mem::size_of::<Self>();
}

const _: () = assert!(EntryRecord::SIZE == 316);
