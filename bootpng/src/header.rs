//! PNG signature and IHDR validation.

use bootpng_core::{FormatError, Result};

use crate::chunk::ChunkType;
use crate::decoder::DecoderConfig;

/// PNG signature bytes.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Smallest input accepted for header parsing.
///
/// This is a compatibility threshold, not a bound derived from the format:
/// a complete IHDR alone needs 33 bytes.
pub const MIN_FILE_SIZE: usize = 29;

/// IHDR payload length.
pub const IHDR_LENGTH: u32 = 13;

/// Offset of the first chunk after IHDR.
pub const FIRST_CHUNK_OFFSET: usize = 33;

/// PNG color type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorType {
    /// Grayscale.
    Grayscale = 0,
    /// RGB.
    Rgb = 2,
    /// Indexed color.
    Indexed = 3,
    /// Grayscale with alpha.
    GrayscaleAlpha = 4,
    /// RGBA.
    Rgba = 6,
}

impl ColorType {
    /// Create color type from value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ColorType::Grayscale),
            2 => Some(ColorType::Rgb),
            3 => Some(ColorType::Indexed),
            4 => Some(ColorType::GrayscaleAlpha),
            6 => Some(ColorType::Rgba),
            _ => None,
        }
    }

    /// Samples per pixel.
    pub fn channels(&self) -> u8 {
        match self {
            ColorType::Grayscale | ColorType::Indexed => 1,
            ColorType::GrayscaleAlpha => 2,
            ColorType::Rgb => 3,
            ColorType::Rgba => 4,
        }
    }
}

/// Decoded pixel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PixelFormat {
    /// RGBA, 8 bits per channel, 32 bits per pixel.
    Rgba8,
}

impl PixelFormat {
    /// The output format for a color type / bit depth pair, if supported.
    pub fn from_png(color_type: ColorType, bit_depth: u8) -> Option<Self> {
        match (color_type, bit_depth) {
            (ColorType::Rgba, 8) => Some(PixelFormat::Rgba8),
            _ => None,
        }
    }

    /// Bytes per pixel.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgba8 => 4,
        }
    }

    /// Number of channels.
    pub fn channels(&self) -> u8 {
        match self {
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// Validated IHDR contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Bits per sample.
    pub bit_depth: u8,
    /// Color type.
    pub color_type: ColorType,
    /// Output pixel format.
    pub format: PixelFormat,
}

impl ImageHeader {
    /// Validate the signature and IHDR of a PNG file.
    ///
    /// Checks run in a fixed order so that a file with several problems
    /// always reports the same one: size, signature, IHDR placement and
    /// length, pixel format, compression method, filter method, interlace
    /// method, dimensions.
    pub fn parse(data: &[u8], config: &DecoderConfig) -> Result<Self> {
        if data.len() < MIN_FILE_SIZE {
            return Err(FormatError::TooShort { len: data.len() }.into());
        }
        if data[..8] != PNG_SIGNATURE {
            return Err(FormatError::BadSignature.into());
        }
        if ChunkType::new([data[12], data[13], data[14], data[15]]) != ChunkType::IHDR {
            return Err(FormatError::MissingHeader.into());
        }
        let length = read_u32_be(&data[8..12]);
        if length != IHDR_LENGTH {
            return Err(FormatError::HeaderLength(length).into());
        }

        let width = read_u32_be(&data[16..20]);
        let height = read_u32_be(&data[20..24]);
        let bit_depth = data[24];
        let color_byte = data[25];

        let unsupported = FormatError::UnsupportedFormat {
            color_type: color_byte,
            bit_depth,
        };
        let color_type = ColorType::from_u8(color_byte).ok_or_else(|| unsupported.clone())?;
        let format = PixelFormat::from_png(color_type, bit_depth).ok_or(unsupported)?;

        if data[26] != 0 {
            return Err(FormatError::CompressionMethod(data[26]).into());
        }
        if data[27] != 0 {
            return Err(FormatError::FilterMethod(data[27]).into());
        }
        if data[28] != 0 {
            return Err(FormatError::Interlaced(data[28]).into());
        }

        if width == 0 || height == 0 {
            return Err(FormatError::InvalidDimensions { width, height }.into());
        }
        if width > config.max_width || height > config.max_height {
            return Err(FormatError::DimensionsExceeded {
                width,
                height,
                max_width: config.max_width,
                max_height: config.max_height,
            }
            .into());
        }

        Ok(Self {
            width,
            height,
            bit_depth,
            color_type,
            format,
        })
    }

    /// Bits per pixel.
    pub fn bits_per_pixel(&self) -> usize {
        self.color_type.channels() as usize * self.bit_depth as usize
    }

    /// Bytes one filtered scanline holds, excluding its filter byte.
    pub fn line_bytes(&self) -> Result<usize> {
        (self.width as usize)
            .checked_mul(self.bits_per_pixel())
            .and_then(|bits| bits.checked_add(7))
            .map(|bits| bits / 8)
            .ok_or_else(|| FormatError::SizeOverflow("scanline length").into())
    }

    /// Bytes of filtered image data: one filter byte plus `line_bytes` per row.
    pub fn filtered_size(&self) -> Result<usize> {
        self.line_bytes()?
            .checked_add(1)
            .and_then(|line| line.checked_mul(self.height as usize))
            .ok_or_else(|| FormatError::SizeOverflow("filtered image size").into())
    }

    /// Upper bound on inflated output, `(w * (h * bpp + 7)) / 8 + h`, raised to
    /// `filtered_size` where that alone would be smaller.
    pub fn inflate_capacity(&self) -> Result<usize> {
        let w = self.width as usize;
        let h = self.height as usize;
        let bound = h
            .checked_mul(self.bits_per_pixel())
            .and_then(|bits| bits.checked_add(7))
            .and_then(|bits| bits.checked_mul(w))
            .map(|bits| bits / 8)
            .and_then(|bytes| bytes.checked_add(h))
            .ok_or(FormatError::SizeOverflow("inflate capacity"))?;
        Ok(bound.max(self.filtered_size()?))
    }

    /// Size of the final pixel buffer, `ceil(h * w * bpp / 8)`.
    pub fn image_size(&self) -> Result<usize> {
        (self.height as usize)
            .checked_mul(self.width as usize)
            .and_then(|pixels| pixels.checked_mul(self.bits_per_pixel()))
            .and_then(|bits| bits.checked_add(7))
            .map(|bits| bits / 8)
            .ok_or_else(|| FormatError::SizeOverflow("image size").into())
    }
}

/// Read a big-endian u32 from the first four bytes of `data`.
#[inline]
pub(crate) fn read_u32_be(data: &[u8]) -> u32 {
    u32::from_be_bytes([data[0], data[1], data[2], data[3]])
}
