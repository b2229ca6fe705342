//! PAK archive entry.

use std::path::{Component, Path, PathBuf};

use dnest_common::text::{decode_euckr, until_nul};
use dnest_common::BinaryReader;

use crate::raw::EntryRecord;
use crate::{Error, Result};

/// An entry (file) within a PAK archive.
///
/// This contains metadata about the file, not the file data itself.
/// Use [`PakArchive::read`](crate::PakArchive::read) or
/// [`PakArchive::extract`](crate::PakArchive::extract) to get the contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PakEntry {
    /// Path segments, split on backslashes.
    segments: Vec<String>,
    /// Size of the zlib stream in bytes.
    compressed_size: u32,
    /// Size of the inflated data in bytes.
    uncompressed_size: u32,
    /// Second copy of the compressed size; not used for extraction.
    compressed_size_secondary: u32,
    /// Absolute offset of the zlib stream in the archive.
    offset: u32,
    unknown: u32,
}

impl PakEntry {
    /// Decode one directory record at the reader's position.
    ///
    /// `index` is the record's position in the directory and `base` the
    /// absolute archive offset of the reader's first byte; both only feed
    /// error messages.
    pub fn parse(reader: &mut BinaryReader<'_>, index: usize, base: u64) -> Result<Self> {
        let offset = base + reader.position() as u64;
        let record: EntryRecord = reader.read_struct()?;

        if let Some(position) = record.reserved.iter().position(|&b| b != 0) {
            return Err(Error::CorruptEntry {
                index,
                offset,
                position: EntryRecord::SIZE - record.reserved.len() + position,
                value: record.reserved[position],
            });
        }

        let path = decode_euckr(until_nul(&record.path), offset as usize)?;
        let segments = path
            .split('\\')
            .filter(|segment| !segment.is_empty())
            .map(str::to_owned)
            .collect();

        Ok(Self {
            segments,
            compressed_size: record.compressed_size.get(),
            uncompressed_size: record.uncompressed_size.get(),
            compressed_size_secondary: record.compressed_size_secondary.get(),
            offset: record.offset.get(),
            unknown: record.unknown.get(),
        })
    }

    /// Path segments inside the archive.
    #[inline]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The archive path with backslash separators, e.g. `resource\ui\main.dds`.
    pub fn name(&self) -> String {
        self.segments.join("\\")
    }

    /// The archive path as a relative [`PathBuf`].
    pub fn path(&self) -> PathBuf {
        self.segments.iter().collect()
    }

    /// Get the compressed size in bytes.
    #[inline]
    pub fn compressed_size(&self) -> u32 {
        self.compressed_size
    }

    /// Get the uncompressed size in bytes, as recorded in the directory.
    #[inline]
    pub fn uncompressed_size(&self) -> u32 {
        self.uncompressed_size
    }

    /// Second compressed-size field of the record.
    #[inline]
    pub fn compressed_size_secondary(&self) -> u32 {
        self.compressed_size_secondary
    }

    /// Absolute offset of the entry's data.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Unidentified directory field.
    #[inline]
    pub fn unknown(&self) -> u32 {
        self.unknown
    }

    /// Get the file extension, if any.
    pub fn extension(&self) -> Option<&str> {
        self.segments
            .last()
            .and_then(|file| Path::new(file).extension())
            .and_then(|ext| ext.to_str())
    }

    /// Resolve where this entry is written under `root`.
    ///
    /// `.` segments are skipped. Segments that climb out of `root` (`..`) or
    /// that are absolute are rejected, as is an empty path.
    pub fn output_path(&self, root: &Path) -> Result<PathBuf> {
        let mut relative = PathBuf::new();
        for segment in &self.segments {
            for component in Path::new(segment).components() {
                match component {
                    Component::Normal(part) => relative.push(part),
                    Component::CurDir => {}
                    Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                        return Err(Error::UnsafePath(self.name()));
                    }
                }
            }
        }

        if relative.as_os_str().is_empty() {
            return Err(Error::UnsafePath(self.name()));
        }

        Ok(root.join(relative))
    }
}

impl std::fmt::Display for PakEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::raw::{PATH_SIZE, RESERVED_SIZE};

    /// Encode a directory record.
    pub(crate) fn record(path: &[u8], zsize: u32, size: u32, offset: u32) -> Vec<u8> {
        let mut out = vec![0u8; PATH_SIZE];
        out[..path.len()].copy_from_slice(path);
        for value in [zsize, size, zsize, offset, 0] {
            out.extend_from_slice(&value.to_le_bytes());
        }
        out.extend_from_slice(&[0u8; RESERVED_SIZE]);
        out
    }

    fn parse_one(bytes: &[u8]) -> Result<PakEntry> {
        PakEntry::parse(&mut BinaryReader::new(bytes), 0, 0)
    }

    #[test]
    fn test_parse_record() {
        let bytes = record(br"resource\ui\main.dds", 10, 20, 0x400);
        assert_eq!(bytes.len(), EntryRecord::SIZE);

        let entry = parse_one(&bytes).unwrap();
        assert_eq!(entry.segments(), ["resource", "ui", "main.dds"]);
        assert_eq!(entry.name(), r"resource\ui\main.dds");
        assert_eq!(entry.compressed_size(), 10);
        assert_eq!(entry.uncompressed_size(), 20);
        assert_eq!(entry.compressed_size_secondary(), 10);
        assert_eq!(entry.offset(), 0x400);
        assert_eq!(entry.unknown(), 0);
        assert_eq!(entry.extension(), Some("dds"));
    }

    #[test]
    fn test_path_stops_at_nul() {
        let mut bytes = record(br"a\b.txt", 1, 1, 0);
        // Leftovers after the terminator are ignored
        bytes[10..14].copy_from_slice(b"junk");

        let entry = parse_one(&bytes).unwrap();
        assert_eq!(entry.name(), r"a\b.txt");
    }

    #[test]
    fn test_leading_backslash_dropped() {
        let entry = parse_one(&record(br"\mapdata\grid.ini", 1, 1, 0)).unwrap();
        assert_eq!(entry.segments(), ["mapdata", "grid.ini"]);
    }

    #[test]
    fn test_korean_path() {
        // "\한글.txt"
        let mut path = vec![b'\\', 0xC7, 0xD1, 0xB1, 0xDB];
        path.extend_from_slice(b".txt");
        let entry = parse_one(&record(&path, 1, 1, 0)).unwrap();
        assert_eq!(entry.segments(), ["한글.txt"]);
    }

    #[test]
    fn test_reserved_must_be_zero() {
        for position in [0, 17, RESERVED_SIZE - 1] {
            let mut bytes = record(br"a.txt", 1, 1, 0);
            let at = EntryRecord::SIZE - RESERVED_SIZE + position;
            bytes[at] = 0x5A;

            match parse_one(&bytes).unwrap_err() {
                Error::CorruptEntry {
                    position: found,
                    value,
                    ..
                } => {
                    assert_eq!(found, at);
                    assert_eq!(value, 0x5A);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_truncated_record() {
        let bytes = record(br"a.txt", 1, 1, 0);
        assert!(matches!(
            parse_one(&bytes[..EntryRecord::SIZE - 1]),
            Err(Error::Common(dnest_common::Error::UnexpectedEof { .. }))
        ));
    }

    #[test]
    fn test_output_path() {
        let entry = parse_one(&record(br"a\b\c.txt", 1, 1, 0)).unwrap();
        let root = Path::new("out");
        assert_eq!(
            entry.output_path(root).unwrap(),
            root.join("a").join("b").join("c.txt")
        );
    }

    #[test]
    fn test_output_path_rejects_escape() {
        let entry = parse_one(&record(br"..\..\evil.txt", 1, 1, 0)).unwrap();
        assert!(matches!(
            entry.output_path(Path::new("out")),
            Err(Error::UnsafePath(_))
        ));

        let entry = parse_one(&record(br"a\..\b.txt", 1, 1, 0)).unwrap();
        assert!(entry.output_path(Path::new("out")).is_err());
    }

    #[test]
    fn test_output_path_skips_cur_dir() {
        let entry = parse_one(&record(br".\a\.\b.txt", 1, 1, 0)).unwrap();
        assert_eq!(
            entry.output_path(Path::new("out")).unwrap(),
            Path::new("out").join("a").join("b.txt")
        );
    }

    #[test]
    fn test_output_path_rejects_empty() {
        let entry = parse_one(&record(b"", 1, 1, 0)).unwrap();
        assert!(entry.segments().is_empty());
        assert!(entry.output_path(Path::new("out")).is_err());
    }
}
