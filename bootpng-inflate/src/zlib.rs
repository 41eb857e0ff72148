//! zlib stream framing (RFC 1950) around the block decoder.

use bootpng_core::{BitReader, InflateError, Result};

use crate::block::{inflate_block, BlockType, OutputBuffer};

/// Largest prime below 2^16.
const ADLER_MOD: u32 = 65521;

/// Bytes that can be summed before `b` could overflow a u32.
const ADLER_NMAX: usize = 5552;

/// Validated two-byte zlib header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZlibHeader {
    /// Compression method and info.
    pub cmf: u8,
    /// Flags.
    pub flg: u8,
}

impl ZlibHeader {
    /// Parse and validate the first two bytes of a zlib stream.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let (cmf, flg) = match data {
            [cmf, flg, ..] => (*cmf, *flg),
            _ => return Err(InflateError::TruncatedHeader.into()),
        };

        if (cmf as u16 * 256 + flg as u16) % 31 != 0 {
            return Err(InflateError::HeaderCheck { cmf, flg }.into());
        }
        if cmf & 0x0F != 8 {
            return Err(InflateError::CompressionMethod(cmf & 0x0F).into());
        }
        if cmf >> 4 > 7 {
            return Err(InflateError::WindowSize(cmf >> 4).into());
        }
        if flg & 0x20 != 0 {
            return Err(InflateError::PresetDictionary.into());
        }

        Ok(Self { cmf, flg })
    }

    /// LZ77 window size in bytes.
    pub fn window_size(&self) -> usize {
        1 << ((self.cmf >> 4) + 8)
    }

    /// FLEVEL hint (0 = fastest .. 3 = maximum compression).
    pub fn level_hint(&self) -> u8 {
        self.flg >> 6
    }
}

/// Inflate configuration.
#[derive(Debug, Clone, Default)]
pub struct InflateConfig {
    /// Check the Adler-32 trailer of zlib streams.
    pub verify_checksum: bool,
    /// Maximum output size; `None` for no limit.
    pub capacity: Option<usize>,
}

impl InflateConfig {
    /// Default configuration: no checksum check, unbounded output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether the Adler-32 trailer is checked.
    pub fn with_checksum(mut self, verify: bool) -> Self {
        self.verify_checksum = verify;
        self
    }

    /// Limit output to `capacity` bytes.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    fn output(&self) -> Result<OutputBuffer> {
        match self.capacity {
            Some(capacity) => OutputBuffer::with_capacity(capacity),
            None => Ok(OutputBuffer::unbounded()),
        }
    }
}

/// Inflate a zlib stream.
pub fn inflate_zlib(data: &[u8], config: &InflateConfig) -> Result<Vec<u8>> {
    let header = ZlibHeader::parse(data)?;
    tracing::trace!(
        window_size = header.window_size(),
        level = header.level_hint(),
        "Parsed zlib header"
    );

    let mut reader = BitReader::new(&data[2..]);
    let mut out = config.output()?;
    inflate_blocks(&mut reader, &mut out)?;

    if config.verify_checksum {
        let expected = reader.read_u32_be()?;
        let actual = adler32(out.as_slice());
        if expected != actual {
            return Err(InflateError::ChecksumMismatch { expected, actual }.into());
        }
    }

    Ok(out.into_vec())
}

/// Inflate a raw DEFLATE stream with no zlib framing.
pub fn inflate_raw(data: &[u8], config: &InflateConfig) -> Result<Vec<u8>> {
    let mut reader = BitReader::new(data);
    let mut out = config.output()?;
    inflate_blocks(&mut reader, &mut out)?;
    Ok(out.into_vec())
}

/// Decode blocks until one with BFINAL set completes.
pub fn inflate_blocks(reader: &mut BitReader<'_>, out: &mut OutputBuffer) -> Result<()> {
    loop {
        if reader.is_eof() {
            return Err(InflateError::InputExhausted.into());
        }

        let is_final = reader.read_bit()?;
        let block_type = BlockType::from_bits(reader.read_bits(2)?)?;
        tracing::trace!(
            is_final,
            block_type = ?block_type,
            offset = reader.byte_position(),
            "Inflating block"
        );

        inflate_block(reader, block_type, out)?;

        if is_final {
            return Ok(());
        }
    }
}

/// Adler-32 checksum (RFC 1950 §8.2).
pub fn adler32(data: &[u8]) -> u32 {
    let mut a: u32 = 1;
    let mut b: u32 = 0;

    for chunk in data.chunks(ADLER_NMAX) {
        for &byte in chunk {
            a += byte as u32;
            b += a;
        }
        a %= ADLER_MOD;
        b %= ADLER_MOD;
    }

    (b << 16) | a
}
