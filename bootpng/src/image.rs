//! Decoded image buffer.

use bootpng_core::{FormatError, Result};

use crate::header::PixelFormat;

/// A decoded image: row-major pixels, row 0 first, no padding between rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl Image {
    /// Wrap a pixel buffer, which must hold exactly `width * height` pixels.
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(FormatError::InvalidDimensions { width, height }.into());
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(format.bytes_per_pixel()))
            .ok_or(FormatError::SizeOverflow("image size"))?;
        if data.len() != expected {
            return Err(FormatError::TruncatedImageData {
                expected,
                actual: data.len(),
            }
            .into());
        }

        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// Get image width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get image height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get pixel format.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    /// Get pixel data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Take ownership of the pixel data.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Get a row of pixels.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.stride();
        self.data.get(start..start + self.stride())
    }

    /// RGBA value of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width {
            return None;
        }
        let row = self.row(y)?;
        match self.format {
            PixelFormat::Rgba8 => {
                let offset = x as usize * 4;
                let p = row.get(offset..offset + 4)?;
                Some([p[0], p[1], p[2], p[3]])
            }
        }
    }
}
