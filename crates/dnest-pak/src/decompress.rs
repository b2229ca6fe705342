//! Decompression utilities for PAK archives.
//!
//! Entry payloads are complete zlib streams (2-byte header, deflate data,
//! Adler-32 trailer).

use flate2::{Decompress, FlushDecompress, Status};

use crate::{Error, Result};

/// Inflate a zlib stream, using `size_hint` as the initial capacity.
///
/// The stream must be complete: input that ends before the zlib trailer is an
/// error, as is a corrupt stream. Bytes after the end of the stream are
/// ignored.
pub fn decompress_zlib_sized(data: &[u8], size_hint: usize) -> Result<Vec<u8>> {
    let mut inflater = Decompress::new(true);
    let mut output = Vec::with_capacity(size_hint.max(64));

    loop {
        if output.len() == output.capacity() {
            output.reserve(output.capacity());
        }

        let consumed = inflater.total_in() as usize;
        let before = (inflater.total_in(), inflater.total_out());
        // `Finish` on a first call demands the whole output fits, so stream
        // with `None` and detect the end ourselves.
        let status = inflater
            .decompress_vec(&data[consumed..], &mut output, FlushDecompress::None)
            .map_err(|e| Error::Decompression(e.to_string()))?;

        match status {
            Status::StreamEnd => return Ok(output),
            Status::Ok | Status::BufError => {
                // Output always has room here, so no progress means no more input.
                if before == (inflater.total_in(), inflater.total_out()) {
                    return Err(Error::Decompression(format!(
                        "incomplete zlib stream: {} of {} bytes consumed, {} bytes produced",
                        inflater.total_in(),
                        data.len(),
                        inflater.total_out()
                    )));
                }
            }
        }
    }
}
