//! zlib / DEFLATE decompression for bootpng.
//!
//! A from-scratch, bounds-checked inflater built for decoding PNG image data
//! in constrained environments:
//!
//! - Canonical Huffman trees stored as flat tables of tagged nodes
//! - Fixed-Huffman trees built at compile time
//! - Stored, fixed and dynamic blocks
//! - LZ77 back-references, including self-overlapping copies
//! - A hard output limit checked before every write
//! - Optional Adler-32 verification
//!
//! # Example
//!
//! ```
//! use bootpng_inflate::{inflate_zlib, InflateConfig};
//!
//! // zlib header, one final stored block holding "hi", Adler-32.
//! let stream = [0x78, 0x01, 0x01, 0x02, 0x00, 0xFD, 0xFF, b'h', b'i', 0x01, 0x3B, 0x00, 0xD2];
//! let config = InflateConfig::new().with_checksum(true).with_capacity(2);
//! assert_eq!(inflate_zlib(&stream, &config).unwrap(), b"hi");
//! ```

#![warn(missing_docs)]

pub mod block;
pub mod dynamic;
pub mod huffman;
pub mod tables;
pub mod zlib;

pub use block::{inflate_block, BlockType, OutputBuffer};
pub use huffman::{canonical_codes, HuffmanTree, Node};
pub use zlib::{adler32, inflate_blocks, inflate_raw, inflate_zlib, InflateConfig, ZlibHeader};
