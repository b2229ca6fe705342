//! Legacy Korean codepage text decoding.
//!
//! Every string in DNT tables and PAK directories is stored in EUC-KR
//! (the client actually writes the CP949 superset, which is what
//! [`encoding_rs::EUC_KR`] implements).

use encoding_rs::EUC_KR;

use crate::{Error, Result};

/// Decode EUC-KR bytes into an owned string.
///
/// Malformed sequences are an error rather than being replaced with U+FFFD.
/// `offset` is only used to describe where the bytes came from.
pub fn decode_euckr(bytes: &[u8], offset: usize) -> Result<String> {
    EUC_KR
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| Error::Encoding {
            bytes: bytes.to_vec(),
            offset,
        })
}

/// Return the bytes before the first NUL, or the whole slice if there is none.
#[inline]
pub fn until_nul(bytes: &[u8]) -> &[u8] {
    match memchr::memchr(0, bytes) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}
