//! PAK archive reader.
//!
//! The directory is parsed eagerly when the archive is opened; entry data is
//! read lazily, one entry at a time, through the archive's single stream.

use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt};
use dnest_common::BinaryReader;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::decompress;
use crate::entry::PakEntry;
use crate::raw::{EntryRecord, HEADER_MARKER, HEADER_OFFSET, SIGNATURE};
use crate::{Error, Result};

/// Deflate cannot expand data by more than this factor.
const MAX_DEFLATE_RATIO: usize = 1032;

/// An open PAK archive.
///
/// Entries are kept sorted by data offset so that extracting them in order
/// reads the archive front to back.
///
/// The underlying stream is a single cursor shared by every read. It sits
/// behind a mutex, so reads through one archive from several threads are
/// serialized; the `parallel` feature instead opens one file handle per
/// worker.
pub struct PakArchive<R = BufReader<File>> {
    /// Backing file, when opened from disk
    path: Option<PathBuf>,
    /// Shared seekable stream
    stream: Mutex<R>,
    /// Entries sorted by offset
    entries: Vec<PakEntry>,
    /// Offset of the directory
    directory_offset: u32,
}

impl PakArchive<BufReader<File>> {
    /// Open a PAK archive and read its directory.
    ///
    /// The file is closed again if the directory cannot be read.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Reading filelist for {}", path.display());

        let file = File::open(path)?;
        let mut archive = Self::from_reader(BufReader::new(file))?;
        archive.path = Some(path.to_path_buf());
        Ok(archive)
    }
}

impl<R: Read + Seek> PakArchive<R> {
    /// Read the directory of an archive from any seekable stream.
    pub fn from_reader(mut stream: R) -> Result<Self> {
        let (directory_offset, entries) = read_directory(&mut stream)?;

        Ok(Self {
            path: None,
            stream: Mutex::new(stream),
            entries,
            directory_offset,
        })
    }

    /// Path of the backing file, if the archive was opened from disk.
    #[inline]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get the archive file name.
    pub fn name(&self) -> &str {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
    }

    /// Absolute offset of the directory.
    #[inline]
    pub fn directory_offset(&self) -> u32 {
        self.directory_offset
    }

    /// All entries, sorted by offset.
    #[inline]
    pub fn entries(&self) -> &[PakEntry] {
        &self.entries
    }

    /// Iterate over entries in offset order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, PakEntry> {
        self.entries.iter()
    }

    /// Get the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the archive has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get entry by index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&PakEntry> {
        self.entries.get(index)
    }

    /// Find an entry by path (case-insensitive, `/` or `\` separators).
    pub fn find(&self, name: &str) -> Option<&PakEntry> {
        let normalized = name.replace('/', "\\");
        let normalized = normalized.trim_start_matches('\\');
        self.entries
            .iter()
            .find(|e| e.name().eq_ignore_ascii_case(normalized))
    }

    /// Read the raw compressed bytes of an entry.
    pub fn read_compressed(&self, entry: &PakEntry) -> Result<Vec<u8>> {
        let mut stream = self.stream.lock();
        read_payload(&mut *stream, entry).map_err(|e| e.in_entry(entry.name()))
    }

    /// Read and inflate an entry.
    pub fn read(&self, entry: &PakEntry) -> Result<Vec<u8>> {
        let compressed = self.read_compressed(entry)?;
        inflate(entry, &compressed).map_err(|e| e.in_entry(entry.name()))
    }

    /// Extract one entry under `destination`, recreating its directories.
    ///
    /// Returns the path that was written. A failure here only concerns this
    /// entry; the archive stays usable.
    pub fn extract<P: AsRef<Path>>(&self, entry: &PakEntry, destination: P) -> Result<PathBuf> {
        let destination = destination.as_ref();
        info!("Extracting file {} to {}", entry, destination.display());

        let out = entry
            .output_path(destination)
            .map_err(|e| e.in_entry(entry.name()))?;
        let data = self.read(entry)?;
        write_file(&out, &data).map_err(|e| e.in_entry(entry.name()))?;
        Ok(out)
    }

    /// Extract every entry in offset order, stopping at the first failure.
    ///
    /// `progress` is called after each entry with its index.
    pub fn extract_all<P, F>(&self, destination: P, mut progress: F) -> Result<usize>
    where
        P: AsRef<Path>,
        F: FnMut(usize, &PakEntry),
    {
        let destination = destination.as_ref();
        for (index, entry) in self.entries.iter().enumerate() {
            self.extract(entry, destination)?;
            progress(index, entry);
        }
        Ok(self.entries.len())
    }

    /// Close the archive, releasing the stream.
    pub fn close(self) {}

    /// Close the archive and hand back the stream.
    pub fn into_inner(self) -> R {
        self.stream.into_inner()
    }
}

#[cfg(feature = "parallel")]
impl PakArchive<BufReader<File>> {
    /// Extract every entry using all rayon workers.
    ///
    /// Each worker opens its own handle on the backing file and seeks
    /// independently. Results are returned per entry, in entry order.
    pub fn extract_all_parallel<P>(&self, destination: P) -> Result<Vec<Result<PathBuf>>>
    where
        P: AsRef<Path>,
    {
        let entries: Vec<&PakEntry> = self.entries.iter().collect();
        self.extract_parallel(&entries, destination)
    }

    /// Extract the given entries using all rayon workers.
    ///
    /// Results are returned in the order of `entries`.
    pub fn extract_parallel<P>(
        &self,
        entries: &[&PakEntry],
        destination: P,
    ) -> Result<Vec<Result<PathBuf>>>
    where
        P: AsRef<Path>,
    {
        use rayon::prelude::*;

        let path = self.path.as_deref().ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                "archive has no backing file",
            ))
        })?;
        let destination = destination.as_ref();

        let results = entries
            .par_iter()
            .map_init(
                || File::open(path).map(BufReader::new),
                |stream, entry| {
                    let stream = stream
                        .as_mut()
                        .map_err(|e| Error::Io(io::Error::new(e.kind(), e.to_string())))?;
                    extract_with(stream, entry, destination).map_err(|e| e.in_entry(entry.name()))
                },
            )
            .collect();

        Ok(results)
    }
}

impl<R> std::fmt::Debug for PakArchive<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PakArchive")
            .field("path", &self.path)
            .field("entries", &self.entries.len())
            .field("directory_offset", &self.directory_offset)
            .finish()
    }
}

/// Validate the headers and decode the directory, sorted by offset.
fn read_directory<R: Read + Seek>(stream: &mut R) -> Result<(u32, Vec<PakEntry>)> {
    stream.seek(SeekFrom::Start(0))?;
    let signature = read_up_to(stream, SIGNATURE.len() as u64)?;
    if signature != SIGNATURE {
        return Err(Error::InvalidSignature { actual: signature });
    }

    stream.seek(SeekFrom::Start(HEADER_OFFSET))?;
    let marker = read_up_to(stream, HEADER_MARKER.len() as u64)?;
    if marker != HEADER_MARKER {
        let mut actual = [0u8; 4];
        actual[..marker.len()].copy_from_slice(&marker);
        return Err(Error::InvalidMarker {
            offset: HEADER_OFFSET,
            actual,
        });
    }

    let counts_offset = HEADER_OFFSET + HEADER_MARKER.len() as u64;
    let truncated_header = |e: io::Error| truncated(e, "archive header", counts_offset, 8);
    let file_count = stream
        .read_u32::<LittleEndian>()
        .map_err(truncated_header)?;
    let directory_offset = stream
        .read_u32::<LittleEndian>()
        .map_err(truncated_header)?;
    debug!(file_count, directory_offset, "PAK header");

    let directory_size = file_count as u64 * EntryRecord::SIZE as u64;
    stream.seek(SeekFrom::Start(directory_offset as u64))?;
    let directory = read_up_to(stream, directory_size)?;
    if (directory.len() as u64) < directory_size {
        return Err(Error::Truncated {
            what: "directory",
            offset: directory_offset as u64,
            needed: directory_size,
        });
    }

    let mut reader = BinaryReader::new(&directory);
    let mut entries = (0..file_count as usize)
        .map(|index| PakEntry::parse(&mut reader, index, directory_offset as u64))
        .collect::<Result<Vec<_>>>()?;

    entries.sort_by_key(PakEntry::offset);

    Ok((directory_offset, entries))
}

/// Read at most `limit` bytes, growing the buffer as data arrives.
fn read_up_to<R: Read>(stream: &mut R, limit: u64) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    stream.take(limit).read_to_end(&mut buf)?;
    Ok(buf)
}

fn truncated(e: io::Error, what: &'static str, offset: u64, needed: u64) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        Error::Truncated {
            what,
            offset,
            needed,
        }
    } else {
        Error::Io(e)
    }
}

/// Seek to an entry and read exactly its compressed bytes.
fn read_payload<R: Read + Seek>(stream: &mut R, entry: &PakEntry) -> Result<Vec<u8>> {
    let offset = entry.offset() as u64;
    let size = entry.compressed_size() as u64;

    stream.seek(SeekFrom::Start(offset))?;
    let compressed = read_up_to(stream, size)?;
    if (compressed.len() as u64) < size {
        return Err(Error::Truncated {
            what: "entry data",
            offset,
            needed: size,
        });
    }
    Ok(compressed)
}

/// Inflate an entry's bytes. The recorded size is a capacity hint only.
fn inflate(entry: &PakEntry, compressed: &[u8]) -> Result<Vec<u8>> {
    let hint = (entry.uncompressed_size() as usize)
        .min(compressed.len().saturating_mul(MAX_DEFLATE_RATIO));
    let data = decompress::decompress_zlib_sized(compressed, hint)?;

    if data.len() != entry.uncompressed_size() as usize {
        warn!(
            entry = %entry,
            expected = entry.uncompressed_size(),
            actual = data.len(),
            "inflated size differs from directory"
        );
    }
    Ok(data)
}

fn write_file(out: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(out, data)?;
    Ok(())
}

/// Read, inflate and write one entry through a caller-owned stream.
#[cfg(feature = "parallel")]
fn extract_with<R: Read + Seek>(stream: &mut R, entry: &PakEntry, destination: &Path) -> Result<PathBuf> {
    let out = entry.output_path(destination)?;
    let compressed = read_payload(stream, entry)?;
    let data = inflate(entry, &compressed)?;
    write_file(&out, &data)?;
    Ok(out)
}
