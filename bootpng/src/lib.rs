//! Minimal PNG decoding for boot-time graphics.
//!
//! This crate decodes a narrow, well-defined subset of PNG:
//! - 8-bit RGBA, non-interlaced
//! - Filter method 0 with all five scanline filters
//! - IDAT split across any number of chunks
//! - Ancillary chunks skipped, unknown critical chunks rejected
//!
//! Every offset, size and bit read is checked against the input, so
//! malformed files fail with an [`Error`] instead of reading or writing out
//! of bounds. Channel reordering for a particular framebuffer is left to the
//! caller.
//!
//! ## Example
//!
//! ```no_run
//! use bootpng::{PngDecoder, DecoderConfig};
//!
//! # let png_data: Vec<u8> = vec![];
//! // One-shot
//! let image = bootpng::decode(&png_data)?;
//! println!("{}x{}", image.width(), image.height());
//!
//! // Probe the header first, with integrity checks enabled
//! let mut decoder = PngDecoder::with_config(&png_data, DecoderConfig::strict());
//! let header = decoder.header()?;
//! if header.width <= 1920 {
//!     let pixels = decoder.decode()?.data();
//!     # let _ = pixels;
//! }
//! # Ok::<(), bootpng::Error>(())
//! ```

#![warn(missing_docs)]

pub mod chunk;
pub mod crc;
pub mod decoder;
pub mod filter;
pub mod header;
pub mod image;
pub mod repack;

pub use bootpng_core::{Error, ErrorKind, Result};
pub use chunk::{Chunk, ChunkType, Chunks};
pub use crc::crc32;
pub use decoder::{DecoderConfig, DecoderState, PngDecoder, Stage};
pub use filter::FilterType;
pub use header::{ColorType, ImageHeader, PixelFormat, PNG_SIGNATURE};
pub use image::Image;

/// Decode a PNG file with the default configuration.
#[tracing::instrument(level = "trace", skip(data), fields(len = data.len()))]
pub fn decode(data: &[u8]) -> Result<Image> {
    let mut decoder = PngDecoder::new(data);
    decoder.decode()?;
    decoder.into_image().ok_or_else(|| Error::invalid_param("decoder produced no image"))
}

/// Check for the PNG signature.
pub fn is_png(data: &[u8]) -> bool {
    data.len() >= PNG_SIGNATURE.len() && data[..PNG_SIGNATURE.len()] == PNG_SIGNATURE
}
