//! Error types for the bootpng decoder.
//!
//! Errors are grouped by the layer that detects them (bit reading, DEFLATE
//! decoding, PNG container parsing). Every error also falls into exactly one
//! coarse [`ErrorKind`], which is what firmware-style callers usually branch on.

use std::fmt;

use thiserror::Error;

/// Coarse classification of every decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input breaks a PNG or DEFLATE structural rule.
    InvalidParameter,
    /// The input is well formed but outside the supported subset.
    Unsupported,
    /// A buffer could not be allocated.
    OutOfResources,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidParameter => "invalid parameter",
            ErrorKind::Unsupported => "unsupported",
            ErrorKind::OutOfResources => "out of resources",
        };
        f.write_str(name)
    }
}

/// Main error type for the bootpng crates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Bitstream reading errors.
    #[error("Bitstream error: {0}")]
    Bitstream(#[from] BitstreamError),

    /// zlib / DEFLATE decoding errors.
    #[error("Inflate error: {0}")]
    Inflate(#[from] InflateError),

    /// PNG container and scanline errors.
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Invalid parameter provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Unsupported feature or format.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// A buffer allocation failed.
    #[error("Out of resources: {0}")]
    OutOfResources(String),
}

/// Bitstream reading errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BitstreamError {
    /// A read would advance past the end of the buffer.
    #[error("Unexpected end of bitstream at bit {position}")]
    UnexpectedEnd {
        /// Absolute bit position of the rejected read.
        position: usize,
    },

    /// More bits were requested than fit the return type.
    #[error("Cannot read {requested} bits at once")]
    TooManyBits {
        /// Requested width.
        requested: u8,
    },
}

/// zlib / DEFLATE decoding errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InflateError {
    /// Fewer than two bytes of zlib header.
    #[error("Truncated zlib header")]
    TruncatedHeader,

    /// `(CMF * 256 + FLG) % 31 != 0`.
    #[error("zlib header check failed (0x{cmf:02X}{flg:02X})")]
    HeaderCheck {
        /// Compression method and flags byte.
        cmf: u8,
        /// Flags byte.
        flg: u8,
    },

    /// Compression method other than 8 (deflate).
    #[error("Unsupported compression method {0}")]
    CompressionMethod(u8),

    /// Window size field above 7 (32 KiB).
    #[error("Invalid window size field {0}")]
    WindowSize(u8),

    /// FDICT flag set.
    #[error("Preset dictionaries are not allowed")]
    PresetDictionary,

    /// Block type 3.
    #[error("Invalid block type {0}")]
    InvalidBlockType(u8),

    /// Stored block LEN is not the complement of NLEN.
    #[error("Stored block length mismatch: len={len}, nlen={nlen}")]
    StoredLengthMismatch {
        /// LEN field.
        len: u16,
        /// NLEN field.
        nlen: u16,
    },

    /// A Huffman alphabet needs at least two symbols.
    #[error("Invalid alphabet size {0}")]
    AlphabetSize(usize),

    /// Code lengths describe more codes than the tree can hold.
    #[error("Oversubscribed Huffman code lengths")]
    OversubscribedTree,

    /// A code length exceeds the tree's maximum bit length.
    #[error("Code length {length} exceeds maximum {max}")]
    CodeLengthTooLong {
        /// Offending length.
        length: u8,
        /// Permitted maximum.
        max: u8,
    },

    /// The walk reached a slot that no code fills.
    #[error("Huffman walk reached an unassigned code")]
    UnassignedCode,

    /// The walk produced a node index outside the tree.
    #[error("Corrupt Huffman tree walk at node {0}")]
    CorruptTreeWalk(usize),

    /// Input ran out before a symbol was resolved.
    #[error("Input exhausted before end of block")]
    InputExhausted,

    /// Code-length symbol outside 0..=18.
    #[error("Invalid code length symbol {0}")]
    InvalidCodeLengthSymbol(u16),

    /// Repeat-previous code with no previous length.
    #[error("Repeat code without a previous length")]
    RepeatWithoutPrevious,

    /// A run-length repeat overflows HLIT + HDIST.
    #[error("Code length repeat overflows {limit} symbols")]
    RepeatOverflow {
        /// HLIT + HDIST.
        limit: usize,
    },

    /// The end-of-block symbol has no code.
    #[error("End-of-block symbol has zero code length")]
    MissingEndOfBlock,

    /// Literal/length symbol 286 or 287.
    #[error("Invalid length symbol {0}")]
    InvalidLengthSymbol(u16),

    /// Distance symbol 30 or 31.
    #[error("Invalid distance symbol {0}")]
    InvalidDistanceSymbol(u16),

    /// Back-reference before the start of output.
    #[error("Distance {distance} exceeds {available} bytes of output")]
    DistanceTooFar {
        /// Decoded distance.
        distance: usize,
        /// Bytes produced so far.
        available: usize,
    },

    /// Output would exceed its declared capacity.
    #[error("Output overflow: need {needed} bytes, capacity {capacity}")]
    OutputOverflow {
        /// Size the write would reach.
        needed: usize,
        /// Declared capacity.
        capacity: usize,
    },

    /// Adler-32 trailer does not match the inflated data.
    #[error("Adler-32 mismatch: stored 0x{expected:08X}, computed 0x{actual:08X}")]
    ChecksumMismatch {
        /// Stored checksum.
        expected: u32,
        /// Computed checksum.
        actual: u32,
    },
}

/// PNG container and scanline errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Input shorter than the minimum accepted file size.
    #[error("Input too short: {len} bytes")]
    TooShort {
        /// Input length.
        len: usize,
    },

    /// The 8-byte PNG signature is wrong.
    #[error("Invalid PNG signature")]
    BadSignature,

    /// The first chunk is not IHDR.
    #[error("First chunk is not IHDR")]
    MissingHeader,

    /// IHDR declares a length other than 13.
    #[error("Invalid IHDR length {0}")]
    HeaderLength(u32),

    /// Width or height is zero.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },

    /// Width or height exceeds the configured limit.
    #[error("Dimensions {width}x{height} exceed maximum {max_width}x{max_height}")]
    DimensionsExceeded {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
        /// Configured maximum width.
        max_width: u32,
        /// Configured maximum height.
        max_height: u32,
    },

    /// Color type / bit depth combination outside the supported subset.
    #[error("Unsupported pixel format: color type {color_type}, bit depth {bit_depth}")]
    UnsupportedFormat {
        /// IHDR color type.
        color_type: u8,
        /// IHDR bit depth.
        bit_depth: u8,
    },

    /// Compression method other than 0.
    #[error("Invalid compression method {0}")]
    CompressionMethod(u8),

    /// Filter method other than 0.
    #[error("Unsupported filter method {0}")]
    FilterMethod(u8),

    /// Interlace method other than 0.
    #[error("Unsupported interlace method {0}")]
    Interlaced(u8),

    /// A chunk header or payload extends past the end of input.
    #[error("Chunk at offset {offset} extends past end of input")]
    ChunkOutOfBounds {
        /// Chunk start offset.
        offset: usize,
    },

    /// A chunk length above 2^31 - 1.
    #[error("Chunk length {0} too large")]
    ChunkTooLarge(u32),

    /// An unrecognized critical chunk.
    #[error("Unsupported critical chunk {0}")]
    UnsupportedChunk(String),

    /// Stored CRC does not match the chunk contents.
    #[error("CRC mismatch for chunk {chunk}: stored 0x{expected:08X}, computed 0x{actual:08X}")]
    CrcMismatch {
        /// Chunk type.
        chunk: String,
        /// Stored CRC.
        expected: u32,
        /// Computed CRC.
        actual: u32,
    },

    /// Scanline filter byte outside 0..=4.
    #[error("Invalid filter type {0}")]
    InvalidFilterType(u8),

    /// Inflated data shorter than the scanlines require.
    #[error("Truncated image data: expected {expected} bytes, got {actual}")]
    TruncatedImageData {
        /// Required bytes.
        expected: usize,
        /// Available bytes.
        actual: usize,
    },

    /// A buffer size computation overflowed.
    #[error("Size overflow computing {0}")]
    SizeOverflow(&'static str),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid parameter error.
    pub fn invalid_param(msg: impl Into<String>) -> Self {
        Error::InvalidParameter(msg.into())
    }

    /// Create an unsupported error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Error::Unsupported(msg.into())
    }

    /// Create an out-of-resources error.
    pub fn out_of_resources(msg: impl Into<String>) -> Self {
        Error::OutOfResources(msg.into())
    }

    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Bitstream(_) | Error::Inflate(_) | Error::InvalidParameter(_) => {
                ErrorKind::InvalidParameter
            }
            Error::Format(err) => err.kind(),
            Error::Unsupported(_) => ErrorKind::Unsupported,
            Error::OutOfResources(_) => ErrorKind::OutOfResources,
        }
    }

    /// Check if this is an invalid-input error.
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        self.kind() == ErrorKind::InvalidParameter
    }

    /// Check if this is an unsupported-input error.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        self.kind() == ErrorKind::Unsupported
    }
}

impl FormatError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            FormatError::UnsupportedFormat { .. }
            | FormatError::FilterMethod(_)
            | FormatError::Interlaced(_)
            | FormatError::UnsupportedChunk(_) => ErrorKind::Unsupported,
            FormatError::DimensionsExceeded { .. } => ErrorKind::OutOfResources,
            _ => ErrorKind::InvalidParameter,
        }
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(err: std::collections::TryReserveError) -> Self {
        Error::OutOfResources(err.to_string())
    }
}
