//! Chunk traversal and image data collection.
//!
//! Every chunk is `[length: u32 BE][type: 4 bytes][payload][crc: u32 BE]`.
//! [`Chunks`] walks them with every offset checked against the input, and
//! [`collect_image_data`] gathers the IDAT payloads in file order.

use std::fmt;

use bootpng_core::{FormatError, Result};

use crate::crc::crc32_update;
use crate::header::{read_u32_be, FIRST_CHUNK_OFFSET};

/// Length, type and CRC fields around each payload.
pub const CHUNK_OVERHEAD: usize = 12;

/// Largest chunk length the format allows (2^31 - 1).
pub const MAX_CHUNK_LENGTH: u32 = i32::MAX as u32;

/// PNG chunk type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkType([u8; 4]);

impl ChunkType {
    /// IHDR - Image header.
    pub const IHDR: Self = Self(*b"IHDR");
    /// IDAT - Image data.
    pub const IDAT: Self = Self(*b"IDAT");
    /// IEND - Image end.
    pub const IEND: Self = Self(*b"IEND");

    /// Create from bytes.
    pub fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Get bytes.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Critical chunks have bit 5 of the first byte clear (uppercase).
    pub fn is_critical(&self) -> bool {
        (self.0[0] & 0x20) == 0
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// A borrowed view of one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Offset of the length field in the file.
    pub offset: usize,
    /// Chunk type.
    pub chunk_type: ChunkType,
    /// Payload.
    pub data: &'a [u8],
    /// Stored CRC.
    pub crc: u32,
}

impl Chunk<'_> {
    /// CRC over type and payload.
    pub fn computed_crc(&self) -> u32 {
        let crc = crc32_update(0xFFFF_FFFF, self.chunk_type.as_bytes());
        crc32_update(crc, self.data) ^ 0xFFFF_FFFF
    }

    /// Compare the stored CRC with the computed one.
    pub fn verify_crc(&self) -> Result<()> {
        let actual = self.computed_crc();
        if actual != self.crc {
            return Err(FormatError::CrcMismatch {
                chunk: self.chunk_type.to_string(),
                expected: self.crc,
                actual,
            }
            .into());
        }
        Ok(())
    }
}

/// Iterator over the chunks of a PNG file.
///
/// Yields chunks up to and including IEND, or until the input ends exactly
/// on a chunk boundary. A chunk that does not fit yields one error and ends
/// the iteration.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    data: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> Chunks<'a> {
    /// Walk chunks starting at `offset`.
    pub fn new(data: &'a [u8], offset: usize) -> Self {
        Self {
            data,
            offset,
            done: false,
        }
    }

    /// Walk the chunks after the signature and IHDR.
    pub fn after_header(data: &'a [u8]) -> Self {
        Self::new(data, FIRST_CHUNK_OFFSET)
    }

    fn read_chunk(&self) -> Result<Chunk<'a>> {
        let offset = self.offset;
        let out_of_bounds = FormatError::ChunkOutOfBounds { offset };

        let header = offset
            .checked_add(8)
            .and_then(|end| self.data.get(offset..end))
            .ok_or_else(|| out_of_bounds.clone())?;
        // The CRC must fit too, even for an empty payload.
        if offset + CHUNK_OVERHEAD > self.data.len() {
            return Err(out_of_bounds.into());
        }

        let length = read_u32_be(&header[..4]);
        if length > MAX_CHUNK_LENGTH {
            return Err(FormatError::ChunkTooLarge(length).into());
        }
        let chunk_type = ChunkType::new([header[4], header[5], header[6], header[7]]);

        let payload_start = offset + 8;
        let payload_end = payload_start
            .checked_add(length as usize)
            .ok_or_else(|| out_of_bounds.clone())?;
        let crc_bytes = payload_end
            .checked_add(4)
            .and_then(|end| self.data.get(payload_end..end))
            .ok_or(out_of_bounds)?;

        Ok(Chunk {
            offset,
            chunk_type,
            data: &self.data[payload_start..payload_end],
            crc: read_u32_be(crc_bytes),
        })
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Result<Chunk<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= self.data.len() {
            return None;
        }

        match self.read_chunk() {
            Ok(chunk) => {
                if chunk.chunk_type == ChunkType::IEND {
                    self.done = true;
                } else {
                    self.offset += CHUNK_OVERHEAD + chunk.data.len();
                }
                Some(Ok(chunk))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Concatenate all IDAT payloads after the header, in file order.
///
/// The first pass validates every chunk and sums the IDAT lengths; the
/// second copies them into a buffer allocated once at the exact size.
/// Unknown critical chunks are rejected as unsupported.
pub fn collect_image_data(data: &[u8], verify_crc: bool) -> Result<Vec<u8>> {
    let mut total = 0usize;
    let mut count = 0usize;

    for chunk in Chunks::after_header(data) {
        let chunk = chunk?;
        tracing::trace!(
            chunk_type = %chunk.chunk_type,
            length = chunk.data.len(),
            offset = chunk.offset,
            "Visiting chunk"
        );

        if verify_crc {
            chunk.verify_crc()?;
        }

        match chunk.chunk_type {
            ChunkType::IDAT => {
                total = total
                    .checked_add(chunk.data.len())
                    .ok_or(FormatError::SizeOverflow("image data"))?;
                count += 1;
            }
            ChunkType::IEND => {}
            other if other.is_critical() => {
                return Err(FormatError::UnsupportedChunk(other.to_string()).into());
            }
            _ => {}
        }
    }

    let mut compressed = Vec::new();
    compressed.try_reserve_exact(total)?;
    for chunk in Chunks::after_header(data) {
        let chunk = chunk?;
        if chunk.chunk_type == ChunkType::IDAT {
            compressed.extend_from_slice(chunk.data);
        }
    }

    tracing::trace!(chunks = count, bytes = total, "Collected image data");
    Ok(compressed)
}
