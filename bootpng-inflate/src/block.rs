//! DEFLATE block decoding and the bounded output window.

use bootpng_core::{BitReader, InflateError, Result};

use crate::dynamic::read_dynamic_trees;
use crate::huffman::{HuffmanTree, Node};
use crate::tables::{
    DISTANCE_BASE, DISTANCE_EXTRA, END_OF_BLOCK, FIRST_LENGTH_SYMBOL, FIXED_DISTANCE_TREE,
    FIXED_LITERAL_TREE, LAST_LENGTH_SYMBOL, LENGTH_BASE, LENGTH_EXTRA,
};

/// The 2-bit BTYPE field of a block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    /// Uncompressed bytes.
    Stored,
    /// Huffman-coded with the fixed trees.
    FixedHuffman,
    /// Huffman-coded with trees sent in the block header.
    DynamicHuffman,
}

impl BlockType {
    /// Map BTYPE to a block type; 3 is reserved.
    pub fn from_bits(btype: u32) -> Result<Self> {
        match btype {
            0 => Ok(BlockType::Stored),
            1 => Ok(BlockType::FixedHuffman),
            2 => Ok(BlockType::DynamicHuffman),
            other => Err(InflateError::InvalidBlockType(other as u8).into()),
        }
    }
}

/// Inflated output with a hard size limit.
///
/// Every write is checked against the limit before it happens, and growth
/// goes through `try_reserve` so allocation failure is an error rather
/// than an abort. The buffer doubles as the LZ77 window.
#[derive(Debug, Clone)]
pub struct OutputBuffer {
    data: Vec<u8>,
    capacity: usize,
}

impl OutputBuffer {
    /// Pre-allocate exactly `capacity` bytes and refuse to grow past it.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)?;
        Ok(Self { data, capacity })
    }

    /// An output limited only by available memory.
    pub fn unbounded() -> Self {
        Self {
            data: Vec::new(),
            capacity: usize::MAX,
        }
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Size limit.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Written bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Take the written bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    fn reserve(&mut self, additional: usize) -> Result<()> {
        let needed = self
            .data
            .len()
            .checked_add(additional)
            .ok_or(InflateError::OutputOverflow {
                needed: usize::MAX,
                capacity: self.capacity,
            })?;
        if needed > self.capacity {
            return Err(InflateError::OutputOverflow {
                needed,
                capacity: self.capacity,
            }
            .into());
        }
        self.data.try_reserve(additional)?;
        Ok(())
    }

    /// Append one literal byte.
    pub fn push(&mut self, byte: u8) -> Result<()> {
        self.reserve(1)?;
        self.data.push(byte);
        Ok(())
    }

    /// Append a run of bytes.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) -> Result<()> {
        self.reserve(bytes.len())?;
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Copy `length` bytes starting `distance` bytes back.
    ///
    /// When `distance < length` the source overlaps the bytes being
    /// written: the read cursor wraps back to `start - distance` each time
    /// it reaches the copy's own start, which repeats the last `distance`
    /// bytes as a pattern.
    pub fn copy_match(&mut self, distance: usize, length: usize) -> Result<()> {
        let start = self.data.len();
        if distance == 0 || distance > start {
            return Err(InflateError::DistanceTooFar {
                distance,
                available: start,
            }
            .into());
        }
        self.reserve(length)?;

        let mut back = start - distance;
        for _ in 0..length {
            let byte = self.data[back];
            self.data.push(byte);
            back += 1;
            if back >= start {
                back = start - distance;
            }
        }
        Ok(())
    }
}

/// Decode one block body of the given type into `out`.
pub fn inflate_block(
    reader: &mut BitReader<'_>,
    block_type: BlockType,
    out: &mut OutputBuffer,
) -> Result<()> {
    match block_type {
        BlockType::Stored => inflate_stored(reader, out),
        BlockType::FixedHuffman => {
            inflate_huffman(reader, &FIXED_LITERAL_TREE, &FIXED_DISTANCE_TREE, out)
        }
        BlockType::DynamicHuffman => {
            let (literal, distance) = read_dynamic_trees(reader)?;
            inflate_huffman(reader, &literal, &distance, out)
        }
    }
}

/// Copy a stored block verbatim.
pub fn inflate_stored(reader: &mut BitReader<'_>, out: &mut OutputBuffer) -> Result<()> {
    let len = reader.read_u16_le()?;
    let nlen = reader.read_u16_le()?;
    if len as u32 + nlen as u32 != 0xFFFF {
        return Err(InflateError::StoredLengthMismatch { len, nlen }.into());
    }

    out.reserve(len as usize)?;
    let bytes = reader.read_aligned_bytes(len as usize)?;
    out.extend_from_slice(bytes)
}

/// Decode literal/length and distance symbols until end-of-block.
pub fn inflate_huffman<L, D>(
    reader: &mut BitReader<'_>,
    literal: &HuffmanTree<L>,
    distance: &HuffmanTree<D>,
    out: &mut OutputBuffer,
) -> Result<()>
where
    L: AsRef<[Node]>,
    D: AsRef<[Node]>,
{
    loop {
        let symbol = literal.decode_symbol(reader)?;

        match symbol {
            0..=255 => out.push(symbol as u8)?,
            END_OF_BLOCK => return Ok(()),
            FIRST_LENGTH_SYMBOL..=LAST_LENGTH_SYMBOL => {
                let idx = (symbol - FIRST_LENGTH_SYMBOL) as usize;
                let length = LENGTH_BASE[idx] as usize + reader.read_bits(LENGTH_EXTRA[idx])? as usize;

                let dist_symbol = distance.decode_symbol(reader)?;
                let didx = dist_symbol as usize;
                if didx >= DISTANCE_BASE.len() {
                    return Err(InflateError::InvalidDistanceSymbol(dist_symbol).into());
                }
                let dist =
                    DISTANCE_BASE[didx] as usize + reader.read_bits(DISTANCE_EXTRA[didx])? as usize;

                out.copy_match(dist, length)?;
            }
            _ => return Err(InflateError::InvalidLengthSymbol(symbol).into()),
        }
    }
}
