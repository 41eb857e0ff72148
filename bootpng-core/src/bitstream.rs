//! Bitstream reading and writing utilities.
//!
//! DEFLATE packs its fields least-significant bit first: bit 0 of byte 0 is
//! the first bit of the stream, and multi-bit fields are assembled with
//! their first-read bit as the lowest bit of the value. Huffman codes are the
//! exception; they are written most-significant bit first, which
//! [`BitWriter::write_code`] provides for building test streams.

use crate::error::{BitstreamError, Result};

/// An LSB-first bit cursor over a borrowed byte buffer.
///
/// The cursor is an absolute bit offset that only moves forward. Every read
/// validates that it stays inside the buffer before touching any byte, so a
/// truncated or hostile stream produces [`BitstreamError::UnexpectedEnd`]
/// instead of an out-of-bounds access.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BitReader<'a> {
    /// Create a new bit reader from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Length of the underlying buffer in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check whether the underlying buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the total number of bits in the stream.
    pub fn total_bits(&self) -> usize {
        self.data.len() * 8
    }

    /// Get the current absolute bit position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Index of the byte holding the next bit.
    pub fn byte_position(&self) -> usize {
        self.position >> 3
    }

    /// Get the number of remaining bits.
    pub fn remaining_bits(&self) -> usize {
        self.total_bits().saturating_sub(self.position)
    }

    /// Check if the cursor has reached the end of the buffer.
    pub fn is_eof(&self) -> bool {
        self.byte_position() >= self.data.len()
    }

    /// Check if the stream is byte-aligned.
    pub fn is_byte_aligned(&self) -> bool {
        self.position & 7 == 0
    }

    /// Skip to the next byte boundary.
    pub fn align_to_byte(&mut self) {
        self.position = (self.position + 7) & !7;
    }

    /// Read a single bit.
    pub fn read_bit(&mut self) -> Result<bool> {
        let byte = *self
            .data
            .get(self.byte_position())
            .ok_or(BitstreamError::UnexpectedEnd {
                position: self.position,
            })?;

        let bit = (byte >> (self.position & 7)) & 1;
        self.position += 1;
        Ok(bit != 0)
    }

    /// Read up to 32 bits, least-significant bit first.
    pub fn read_bits(&mut self, n: u8) -> Result<u32> {
        if n == 0 {
            return Ok(0);
        }
        if n > 32 {
            return Err(BitstreamError::TooManyBits { requested: n }.into());
        }
        if self.remaining_bits() < n as usize {
            return Err(BitstreamError::UnexpectedEnd {
                position: self.position,
            }
            .into());
        }

        let mut value = 0u32;
        for i in 0..n {
            value |= (self.read_bit()? as u32) << i;
        }

        Ok(value)
    }

    /// Byte-align, then borrow the next `n` whole bytes.
    pub fn read_aligned_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.align_to_byte();

        let start = self.byte_position();
        let bytes = start
            .checked_add(n)
            .and_then(|end| self.data.get(start..end))
            .ok_or(BitstreamError::UnexpectedEnd {
                position: self.position,
            })?;

        self.position += n * 8;
        Ok(bytes)
    }

    /// Byte-align, then read a little-endian u16.
    pub fn read_u16_le(&mut self) -> Result<u16> {
        let bytes = self.read_aligned_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Byte-align, then read a big-endian u32.
    pub fn read_u32_be(&mut self) -> Result<u32> {
        let bytes = self.read_aligned_bytes(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

/// An LSB-first bit writer, the mirror image of [`BitReader`].
///
/// Used to assemble DEFLATE streams for tests, benchmarks and fuzz seeds.
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    data: Vec<u8>,
    bit_pos: u8,
}

impl BitWriter {
    /// Create a new bit writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new bit writer with capacity.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            data: Vec::with_capacity(bytes),
            bit_pos: 0,
        }
    }

    /// Get the current bit position.
    pub fn position(&self) -> usize {
        if self.bit_pos == 0 {
            self.data.len() * 8
        } else {
            (self.data.len() - 1) * 8 + self.bit_pos as usize
        }
    }

    /// Check if the writer is byte-aligned.
    pub fn is_byte_aligned(&self) -> bool {
        self.bit_pos == 0
    }

    /// Write a single bit.
    pub fn write_bit(&mut self, bit: bool) {
        if self.bit_pos == 0 {
            self.data.push(0);
        }

        if bit {
            if let Some(last) = self.data.last_mut() {
                *last |= 1 << self.bit_pos;
            }
        }

        self.bit_pos = (self.bit_pos + 1) & 7;
    }

    /// Write the low `n` bits of `value`, least-significant bit first.
    pub fn write_bits(&mut self, value: u32, n: u8) {
        for i in 0..n.min(32) {
            self.write_bit((value >> i) & 1 != 0);
        }
    }

    /// Write an `n`-bit Huffman code, most-significant bit first.
    pub fn write_code(&mut self, code: u32, n: u8) {
        for i in (0..n.min(32)).rev() {
            self.write_bit((code >> i) & 1 != 0);
        }
    }

    /// Align to byte boundary by writing zero bits.
    pub fn align_to_byte(&mut self) {
        self.bit_pos = 0;
    }

    /// Byte-align, then append raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.align_to_byte();
        self.data.extend_from_slice(bytes);
    }

    /// Get the written data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Take the written data, consuming the writer.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
