//! Binary reader for parsing byte slices.
//!
//! This module provides [`BinaryReader`], a cursor over a byte slice with the
//! primitive decoders shared by the DNT and PAK formats. Every read consumes a
//! fixed, statically known number of bytes and fails with
//! [`Error::UnexpectedEof`] when fewer are left.

use zerocopy::FromBytes;

use crate::text::{decode_euckr, until_nul};
use crate::{Error, Result};

/// A little-endian cursor over a byte slice.
///
/// # Example
///
/// ```
/// use dnest_common::BinaryReader;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x00, 0x00, 0x80, 0x3F];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_u32().unwrap(), 0x04030201);
/// assert_eq!(reader.read_f32().unwrap(), 1.0);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    /// Create a new reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Create a new reader starting at a specific position.
    #[inline]
    pub const fn new_at(data: &'a [u8], position: usize) -> Self {
        Self { data, position }
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the total length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Seek to an absolute position.
    #[inline]
    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    /// Get the remaining bytes as a slice.
    #[inline]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.position.min(self.data.len())..]
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::UnexpectedEof {
                needed: count,
                available: self.remaining(),
                offset: self.position,
            });
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a fixed-size byte array.
    #[inline]
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    /// Read a little-endian u16.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    /// Read a little-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    /// Read a little-endian IEEE-754 f32.
    #[inline]
    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_array().map(f32::from_le_bytes)
    }

    /// Read a 4-byte boolean record.
    ///
    /// Only the first byte is significant (non-zero = true); the three
    /// trailing bytes are padding and are not inspected.
    #[inline]
    pub fn read_padded_bool(&mut self) -> Result<bool> {
        self.read_bytes(4).map(|b| b[0] != 0)
    }

    /// Read a `u16` length-prefixed EUC-KR string.
    pub fn read_varchar(&mut self) -> Result<String> {
        let length = self.read_u16()? as usize;
        let offset = self.position;
        let bytes = self.read_bytes(length)?;
        decode_euckr(bytes, offset)
    }

    /// Read a fixed-size buffer holding a NUL-terminated EUC-KR string.
    ///
    /// Always consumes `buffer_size` bytes; anything after the first NUL is
    /// ignored.
    pub fn read_fixed_euckr(&mut self, buffer_size: usize) -> Result<String> {
        let offset = self.position;
        let bytes = self.read_bytes(buffer_size)?;
        decode_euckr(until_nul(bytes), offset)
    }

    /// Read a struct using zerocopy.
    ///
    /// The struct must implement `FromBytes` from the zerocopy crate.
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let offset = self.position;
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            needed: size,
            available: bytes.len(),
            offset,
        })
    }

    /// Check whether the unread bytes start with `prefix`, without advancing.
    #[inline]
    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.remaining_bytes().starts_with(prefix)
    }

    /// Expect specific magic bytes.
    pub fn expect_magic(&mut self, expected: &[u8]) -> Result<()> {
        let offset = self.position;
        let actual = self.read_bytes(expected.len())?;
        if actual != expected {
            return Err(Error::InvalidMagic {
                expected: expected.to_vec(),
                actual: actual.to_vec(),
                offset,
            });
        }
        Ok(())
    }
}
