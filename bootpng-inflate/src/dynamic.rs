//! Dynamic-Huffman block header (RFC 1951 §3.2.7).

use bootpng_core::{BitReader, InflateError, Result};

use crate::huffman::HuffmanTree;
use crate::tables::{
    CODE_LENGTH_MAX_BITS, CODE_LENGTH_ORDER, DISTANCE_MAX_BITS, END_OF_BLOCK, LITERAL_MAX_BITS,
    NUM_CODE_LENGTH_CODES, NUM_DISTANCE_SYMBOLS, NUM_LITERAL_SYMBOLS,
};

/// Read the code-length tables of a dynamic block and build the
/// literal/length and distance trees.
pub fn read_dynamic_trees(reader: &mut BitReader<'_>) -> Result<(HuffmanTree, HuffmanTree)> {
    let hlit = reader.read_bits(5)? as usize + 257;
    let hdist = reader.read_bits(5)? as usize + 1;
    let hclen = reader.read_bits(4)? as usize + 4;

    let mut cl_lengths = [0u8; NUM_CODE_LENGTH_CODES];
    for &symbol in &CODE_LENGTH_ORDER[..hclen] {
        cl_lengths[symbol] = reader.read_bits(3)? as u8;
    }
    let cl_tree = HuffmanTree::from_lengths(&cl_lengths, CODE_LENGTH_MAX_BITS)?;

    let total = hlit + hdist;
    let mut lengths = [0u8; NUM_LITERAL_SYMBOLS + NUM_DISTANCE_SYMBOLS];
    let mut i = 0;

    while i < total {
        let symbol = cl_tree.decode_symbol(reader)?;

        let (value, repeat) = match symbol {
            0..=15 => {
                lengths[i] = symbol as u8;
                i += 1;
                continue;
            }
            16 => {
                if i == 0 {
                    return Err(InflateError::RepeatWithoutPrevious.into());
                }
                (lengths[i - 1], reader.read_bits(2)? as usize + 3)
            }
            17 => (0, reader.read_bits(3)? as usize + 3),
            18 => (0, reader.read_bits(7)? as usize + 11),
            _ => return Err(InflateError::InvalidCodeLengthSymbol(symbol).into()),
        };

        if i + repeat > total {
            return Err(InflateError::RepeatOverflow { limit: total }.into());
        }
        lengths[i..i + repeat].fill(value);
        i += repeat;
    }

    let mut literal_lengths = [0u8; NUM_LITERAL_SYMBOLS];
    literal_lengths[..hlit].copy_from_slice(&lengths[..hlit]);
    if literal_lengths[END_OF_BLOCK as usize] == 0 {
        return Err(InflateError::MissingEndOfBlock.into());
    }

    let mut distance_lengths = [0u8; NUM_DISTANCE_SYMBOLS];
    distance_lengths[..hdist].copy_from_slice(&lengths[hlit..total]);

    let literal = HuffmanTree::from_lengths(&literal_lengths, LITERAL_MAX_BITS)?;
    let distance = HuffmanTree::from_lengths(&distance_lengths, DISTANCE_MAX_BITS)?;

    Ok((literal, distance))
}
