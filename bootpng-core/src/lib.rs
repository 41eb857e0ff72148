//! # bootpng core
//!
//! Core types shared by the bootpng decoder crates:
//! - Error handling types and the three-way [`ErrorKind`] classification
//! - LSB-first bitstream reading (and writing, for tests and fuzzing)

pub mod bitstream;
pub mod error;

pub use bitstream::{BitReader, BitWriter};
pub use error::{BitstreamError, Error, ErrorKind, FormatError, InflateError, Result};
