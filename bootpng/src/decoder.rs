//! Decode context: header validation through to the final pixel buffer.

use std::fmt;

use bootpng_core::{Error, FormatError, Result};
use bootpng_inflate::{inflate_zlib, InflateConfig};

use crate::chunk::collect_image_data;
use crate::filter::unfilter;
use crate::header::ImageHeader;
use crate::image::Image;
use crate::repack::remove_padding_bits;

/// Pipeline stage an error originated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Signature and IHDR validation.
    Header,
    /// Chunk traversal and IDAT collection.
    ChunkScan,
    /// zlib decompression.
    Inflate,
    /// Scanline reconstruction and repacking.
    Unfilter,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Header => "header",
            Stage::ChunkScan => "chunk scan",
            Stage::Inflate => "inflate",
            Stage::Unfilter => "unfilter",
        };
        f.write_str(name)
    }
}

/// Lifecycle of a [`PngDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoderState {
    /// Nothing parsed yet.
    New,
    /// Signature and IHDR accepted.
    HeaderParsed,
    /// Pixels available.
    Decoded,
    /// Terminal: every call returns the stored error.
    Failed,
}

/// Decoder configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Largest accepted width; wider images fail as out of resources.
    pub max_width: u32,
    /// Largest accepted height.
    pub max_height: u32,
    /// Check every chunk's CRC-32.
    pub verify_crc: bool,
    /// Check the zlib Adler-32 trailer.
    pub verify_adler32: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_width: u32::MAX,
            max_height: u32::MAX,
            verify_crc: false,
            verify_adler32: false,
        }
    }
}

impl DecoderConfig {
    /// Limit the accepted dimensions.
    pub fn with_max_dimensions(mut self, max_width: u32, max_height: u32) -> Self {
        self.max_width = max_width;
        self.max_height = max_height;
        self
    }

    /// Enable or disable chunk CRC verification.
    pub fn with_crc_check(mut self, verify: bool) -> Self {
        self.verify_crc = verify;
        self
    }

    /// Enable or disable Adler-32 verification.
    pub fn with_adler32_check(mut self, verify: bool) -> Self {
        self.verify_adler32 = verify;
        self
    }

    /// Enable every integrity check.
    pub fn strict() -> Self {
        Self::default().with_crc_check(true).with_adler32_check(true)
    }
}

type StageResult<T> = std::result::Result<T, (Stage, Error)>;

fn at<T>(stage: Stage, result: Result<T>) -> StageResult<T> {
    result.map_err(|e| (stage, e))
}

/// Allocate a zero-filled buffer, reporting allocation failure as an error.
fn zeroed(len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)?;
    buf.resize(len, 0);
    Ok(buf)
}

/// PNG decoder over a borrowed file.
///
/// The decoder moves `New -> HeaderParsed -> Decoded` on success. The first
/// error moves it to `Failed`, drops any decoded pixels and is returned again
/// from every later call.
#[derive(Debug)]
pub struct PngDecoder<'a> {
    data: &'a [u8],
    config: DecoderConfig,
    state: DecoderState,
    header: Option<ImageHeader>,
    image: Option<Image>,
    failure: Option<(Stage, Error)>,
}

impl<'a> PngDecoder<'a> {
    /// Create a decoder with the default configuration.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_config(data, DecoderConfig::default())
    }

    /// Create a decoder with a custom configuration.
    pub fn with_config(data: &'a [u8], config: DecoderConfig) -> Self {
        Self {
            data,
            config,
            state: DecoderState::New,
            header: None,
            image: None,
            failure: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// The stored error and the stage that produced it, once failed.
    pub fn failure(&self) -> Option<(Stage, &Error)> {
        self.failure.as_ref().map(|(stage, error)| (*stage, error))
    }

    /// Decoded pixels, if the last decode succeeded.
    pub fn image(&self) -> Option<&Image> {
        self.image.as_ref()
    }

    /// Take the decoded pixels.
    pub fn into_image(self) -> Option<Image> {
        self.image
    }

    /// Validate the signature and IHDR without touching the image data.
    pub fn header(&mut self) -> Result<ImageHeader> {
        self.check_failed()?;
        if let Some(header) = self.header {
            return Ok(header);
        }

        match ImageHeader::parse(self.data, &self.config) {
            Ok(header) => {
                tracing::debug!(
                    width = header.width,
                    height = header.height,
                    format = ?header.format,
                    "Parsed PNG header"
                );
                self.header = Some(header);
                self.state = DecoderState::HeaderParsed;
                Ok(header)
            }
            Err(e) => Err(self.fail(Stage::Header, e)),
        }
    }

    /// Decode the whole image.
    ///
    /// Calling this again after a successful decode releases the previous
    /// pixels and decodes from scratch.
    pub fn decode(&mut self) -> Result<&Image> {
        let header = self.header()?;
        if self.image.take().is_some() {
            self.state = DecoderState::HeaderParsed;
        }

        match self.decode_pixels(&header) {
            Ok(image) => {
                self.state = DecoderState::Decoded;
                Ok(self.image.insert(image))
            }
            Err((stage, e)) => Err(self.fail(stage, e)),
        }
    }

    fn decode_pixels(&self, header: &ImageHeader) -> StageResult<Image> {
        let compressed = at(
            Stage::ChunkScan,
            collect_image_data(self.data, self.config.verify_crc),
        )?;
        let compressed_len = compressed.len();

        let capacity = at(Stage::Inflate, header.inflate_capacity())?;
        let inflate_config = InflateConfig::new()
            .with_checksum(self.config.verify_adler32)
            .with_capacity(capacity);
        let inflated = at(Stage::Inflate, inflate_zlib(&compressed, &inflate_config))?;
        drop(compressed);

        let pixels = at(Stage::Unfilter, Self::reconstruct(header, &inflated))?;
        tracing::debug!(
            compressed = compressed_len,
            inflated = inflated.len(),
            pixels = pixels.len(),
            "Decoded PNG image"
        );

        at(
            Stage::Unfilter,
            Image::new(header.width, header.height, header.format, pixels),
        )
    }

    /// Undo scanline filtering, then strip row padding for sub-byte pixels.
    fn reconstruct(header: &ImageHeader, inflated: &[u8]) -> Result<Vec<u8>> {
        let filtered_size = header.filtered_size()?;
        if inflated.len() < filtered_size {
            return Err(FormatError::TruncatedImageData {
                expected: filtered_size,
                actual: inflated.len(),
            }
            .into());
        }

        let bpp = header.bits_per_pixel();
        let (width, height) = (header.width, header.height);
        let mut pixels = zeroed(header.image_size()?)?;

        let line_bits = width as usize * bpp;
        if bpp < 8 && line_bits % 8 != 0 {
            let line_bytes = header.line_bytes()?;
            let mut padded = zeroed(line_bytes * height as usize)?;
            unfilter(&mut padded, inflated, width, height, bpp)?;
            remove_padding_bits(&mut pixels, &padded, line_bits, line_bytes * 8, height as usize)?;
        } else {
            unfilter(&mut pixels, inflated, width, height, bpp)?;
        }

        Ok(pixels)
    }

    fn check_failed(&self) -> Result<()> {
        match &self.failure {
            Some((_, error)) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn fail(&mut self, stage: Stage, error: Error) -> Error {
        tracing::warn!(stage = %stage, error = %error, "PNG decode failed");
        self.state = DecoderState::Failed;
        self.image = None;
        self.failure = Some((stage, error.clone()));
        error
    }
}
