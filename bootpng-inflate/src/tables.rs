//! Constant DEFLATE tables (RFC 1951 §3.2.5 - §3.2.7).

use crate::huffman::{HuffmanTree, Node};

/// Literal/length alphabet size, including the two reserved symbols.
pub const NUM_LITERAL_SYMBOLS: usize = 288;
/// Distance alphabet size, including the two reserved symbols.
pub const NUM_DISTANCE_SYMBOLS: usize = 32;
/// Code-length alphabet size.
pub const NUM_CODE_LENGTH_CODES: usize = 19;

/// Longest literal/length code.
pub const LITERAL_MAX_BITS: u8 = 15;
/// Longest distance code.
pub const DISTANCE_MAX_BITS: u8 = 15;
/// Longest code-length code.
pub const CODE_LENGTH_MAX_BITS: u8 = 7;

/// End-of-block symbol.
pub const END_OF_BLOCK: u16 = 256;
/// First length symbol.
pub const FIRST_LENGTH_SYMBOL: u16 = 257;
/// Last valid length symbol.
pub const LAST_LENGTH_SYMBOL: u16 = 285;

/// Base lengths for symbols 257..=285.
pub const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115,
    131, 163, 195, 227, 258,
];

/// Extra bits for symbols 257..=285.
pub const LENGTH_EXTRA: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/// Base distances for distance symbols 0..=29.
pub const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

/// Extra bits for distance symbols 0..=29.
pub const DISTANCE_EXTRA: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// Order in which code-length code lengths are transmitted.
pub const CODE_LENGTH_ORDER: [usize; NUM_CODE_LENGTH_CODES] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Code lengths of the fixed literal/length code.
pub const FIXED_LITERAL_LENGTHS: [u8; NUM_LITERAL_SYMBOLS] = {
    let mut lengths = [0u8; NUM_LITERAL_SYMBOLS];
    let mut n = 0;
    while n < NUM_LITERAL_SYMBOLS {
        lengths[n] = match n {
            0..=143 => 8,
            144..=255 => 9,
            256..=279 => 7,
            _ => 8,
        };
        n += 1;
    }
    lengths
};

/// Code lengths of the fixed distance code.
pub const FIXED_DISTANCE_LENGTHS: [u8; NUM_DISTANCE_SYMBOLS] = [5; NUM_DISTANCE_SYMBOLS];

/// Decode tree for fixed-Huffman literal/length codes.
pub static FIXED_LITERAL_TREE: HuffmanTree<[Node; NUM_LITERAL_SYMBOLS * 2]> =
    HuffmanTree::fixed(&FIXED_LITERAL_LENGTHS, LITERAL_MAX_BITS);

/// Decode tree for fixed-Huffman distance codes.
pub static FIXED_DISTANCE_TREE: HuffmanTree<[Node; NUM_DISTANCE_SYMBOLS * 2]> =
    HuffmanTree::fixed(&FIXED_DISTANCE_LENGTHS, DISTANCE_MAX_BITS);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_table_ends() {
        assert_eq!(LENGTH_BASE[0], 3);
        assert_eq!(LENGTH_BASE[28], 258);
        assert_eq!(LENGTH_BASE.len(), (LAST_LENGTH_SYMBOL - FIRST_LENGTH_SYMBOL + 1) as usize);
        // 227 + 5 extra bits would reach 258, so symbol 285 carries none.
        assert_eq!(LENGTH_EXTRA[28], 0);
    }

    #[test]
    fn test_distance_bases_follow_extra_bits() {
        for i in 0..DISTANCE_BASE.len() - 1 {
            let span = 1u32 << DISTANCE_EXTRA[i];
            assert_eq!(DISTANCE_BASE[i] as u32 + span, DISTANCE_BASE[i + 1] as u32);
        }
        assert_eq!(DISTANCE_BASE[29] as u32 + (1 << DISTANCE_EXTRA[29]) - 1, 32768);
    }

    #[test]
    fn test_code_length_order_is_permutation() {
        let mut seen = [false; NUM_CODE_LENGTH_CODES];
        for &sym in &CODE_LENGTH_ORDER {
            assert!(!seen[sym]);
            seen[sym] = true;
        }
    }

    #[test]
    fn test_fixed_literal_lengths() {
        assert_eq!(FIXED_LITERAL_LENGTHS[0], 8);
        assert_eq!(FIXED_LITERAL_LENGTHS[143], 8);
        assert_eq!(FIXED_LITERAL_LENGTHS[144], 9);
        assert_eq!(FIXED_LITERAL_LENGTHS[255], 9);
        assert_eq!(FIXED_LITERAL_LENGTHS[256], 7);
        assert_eq!(FIXED_LITERAL_LENGTHS[279], 7);
        assert_eq!(FIXED_LITERAL_LENGTHS[280], 8);
        assert_eq!(FIXED_LITERAL_LENGTHS[287], 8);
    }

    #[test]
    fn test_fixed_trees_match_runtime_build() {
        let literal = HuffmanTree::from_lengths(&FIXED_LITERAL_LENGTHS, LITERAL_MAX_BITS).unwrap();
        assert_eq!(literal.nodes(), FIXED_LITERAL_TREE.nodes());

        let distance =
            HuffmanTree::from_lengths(&FIXED_DISTANCE_LENGTHS, DISTANCE_MAX_BITS).unwrap();
        assert_eq!(distance.nodes(), FIXED_DISTANCE_TREE.nodes());
    }
}
