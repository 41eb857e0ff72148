//! Canonical Huffman decode trees.
//!
//! A tree is stored flat: node `i` owns slots `2 * i` (bit 0) and
//! `2 * i + 1` (bit 1), and node 0 is the root. A tree over `n` symbols
//! never needs more than `n - 1` internal nodes, so `2 * n` slots suffice;
//! code lengths that would need more are rejected as oversubscribed.

use bootpng_core::{BitReader, Error, InflateError, Result};

/// Longest code length DEFLATE allows.
pub const MAX_CODE_BITS: u8 = 15;

/// One slot of a flat decode tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Node {
    /// No code reaches this slot.
    #[default]
    Vacant,
    /// A complete code ends here.
    Leaf(u16),
    /// Continue the walk at this internal node.
    Internal(u16),
}

/// A canonical Huffman decode tree.
///
/// `S` is the slot storage: `Vec<Node>` for trees built from a stream, a
/// fixed-size array for the compile-time fixed-Huffman trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree<S = Vec<Node>> {
    nodes: S,
    num_codes: usize,
    max_bits: u8,
}

impl HuffmanTree {
    /// Build a tree from per-symbol code lengths (0 = symbol unused).
    pub fn from_lengths(lengths: &[u8], max_bits: u8) -> Result<Self> {
        let slots = lengths
            .len()
            .checked_mul(2)
            .ok_or(InflateError::AlphabetSize(lengths.len()))?;
        let mut nodes = vec![Node::Vacant; slots];
        build_nodes(lengths, max_bits, &mut nodes)?;

        Ok(Self {
            nodes,
            num_codes: lengths.len(),
            max_bits,
        })
    }
}

impl<const N: usize> HuffmanTree<[Node; N]> {
    /// Build a tree at compile time. Panics (at compile time) on invalid
    /// lengths, so it is only meant for constant tables.
    pub const fn fixed(lengths: &[u8], max_bits: u8) -> Self {
        let mut nodes = [Node::Vacant; N];
        match build_nodes(lengths, max_bits, &mut nodes) {
            Ok(()) => {}
            Err(_) => panic!("invalid fixed Huffman code lengths"),
        }

        Self {
            nodes,
            num_codes: lengths.len(),
            max_bits,
        }
    }
}

impl<S: AsRef<[Node]>> HuffmanTree<S> {
    /// Alphabet size.
    pub fn num_codes(&self) -> usize {
        self.num_codes
    }

    /// Maximum code length accepted when the tree was built.
    pub fn max_bits(&self) -> u8 {
        self.max_bits
    }

    /// Flat slot table.
    pub fn nodes(&self) -> &[Node] {
        self.nodes.as_ref()
    }

    /// Decode one symbol, consuming one bit per tree level.
    pub fn decode_symbol(&self, reader: &mut BitReader<'_>) -> Result<u16> {
        let nodes = self.nodes.as_ref();
        let mut pos = 0usize;

        loop {
            if reader.is_eof() {
                return Err(InflateError::InputExhausted.into());
            }
            let slot = 2 * pos + reader.read_bit()? as usize;

            match nodes.get(slot) {
                Some(Node::Leaf(symbol)) => return Ok(*symbol),
                Some(Node::Internal(next)) => {
                    let next = *next as usize;
                    if next >= self.num_codes {
                        return Err(InflateError::CorruptTreeWalk(next).into());
                    }
                    pos = next;
                }
                Some(Node::Vacant) => return Err(InflateError::UnassignedCode.into()),
                None => return Err(InflateError::CorruptTreeWalk(slot).into()),
            }
        }
    }
}

/// Canonical code for every symbol (RFC 1951 §3.2.2). Unused symbols get 0.
pub fn canonical_codes(lengths: &[u8], max_bits: u8) -> Result<Vec<u32>> {
    let mut next = first_codes(lengths, max_bits).map_err(Error::from)?;

    Ok(lengths
        .iter()
        .map(|&len| {
            if len == 0 {
                return 0;
            }
            let code = next[len as usize];
            next[len as usize] += 1;
            code
        })
        .collect())
}

/// First canonical code of each length, after validating the lengths.
const fn first_codes(
    lengths: &[u8],
    max_bits: u8,
) -> std::result::Result<[u32; MAX_CODE_BITS as usize + 1], InflateError> {
    if max_bits > MAX_CODE_BITS {
        return Err(InflateError::CodeLengthTooLong {
            length: max_bits,
            max: MAX_CODE_BITS,
        });
    }

    let mut bl_count = [0u32; MAX_CODE_BITS as usize + 1];
    let mut i = 0;
    while i < lengths.len() {
        let len = lengths[i];
        if len > max_bits {
            return Err(InflateError::CodeLengthTooLong {
                length: len,
                max: max_bits,
            });
        }
        bl_count[len as usize] += 1;
        i += 1;
    }
    bl_count[0] = 0;

    let mut next_code = [0u32; MAX_CODE_BITS as usize + 1];
    let mut bits = 1;
    while bits <= MAX_CODE_BITS as usize {
        next_code[bits] = (next_code[bits - 1] + bl_count[bits - 1]) << 1;
        if next_code[bits] + bl_count[bits] > 1 << bits {
            return Err(InflateError::OversubscribedTree);
        }
        bits += 1;
    }

    Ok(next_code)
}

/// Fill `nodes` (exactly `2 * lengths.len()` vacant slots) with the tree.
const fn build_nodes(
    lengths: &[u8],
    max_bits: u8,
    nodes: &mut [Node],
) -> std::result::Result<(), InflateError> {
    let num_codes = lengths.len();
    if num_codes < 2 || nodes.len() != 2 * num_codes || num_codes > u16::MAX as usize {
        return Err(InflateError::AlphabetSize(num_codes));
    }

    let mut next_code = match first_codes(lengths, max_bits) {
        Ok(codes) => codes,
        Err(e) => return Err(e),
    };

    let mut filled = 0usize;
    let mut symbol = 0;
    while symbol < num_codes {
        let len = lengths[symbol] as usize;
        if len == 0 {
            symbol += 1;
            continue;
        }
        let code = next_code[len];
        next_code[len] += 1;

        let mut pos = 0usize;
        let mut bit_index = len;
        while bit_index > 0 {
            bit_index -= 1;
            if pos + 2 > num_codes {
                return Err(InflateError::OversubscribedTree);
            }

            let slot = 2 * pos + ((code >> bit_index) & 1) as usize;
            let last = bit_index == 0;
            match nodes[slot] {
                Node::Vacant => {
                    if last {
                        nodes[slot] = Node::Leaf(symbol as u16);
                    } else {
                        filled += 1;
                        nodes[slot] = Node::Internal(filled as u16);
                        pos = filled;
                    }
                }
                Node::Internal(next) => {
                    if last {
                        return Err(InflateError::OversubscribedTree);
                    }
                    pos = next as usize;
                }
                Node::Leaf(_) => return Err(InflateError::OversubscribedTree),
            }
        }
        symbol += 1;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bootpng_core::BitWriter;

    #[test]
    fn test_canonical_codes_rfc_example() {
        // RFC 1951 §3.2.2: ABCDEFGH with lengths (3, 3, 3, 3, 3, 2, 4, 4).
        let lengths = [3, 3, 3, 3, 3, 2, 4, 4];
        let codes = canonical_codes(&lengths, 15).unwrap();
        assert_eq!(
            codes,
            vec![0b010, 0b011, 0b100, 0b101, 0b110, 0b00, 0b1110, 0b1111]
        );
    }

    #[test]
    fn test_decode_rfc_example() {
        let lengths = [3, 3, 3, 3, 3, 2, 4, 4];
        let tree = HuffmanTree::from_lengths(&lengths, 15).unwrap();
        let codes = canonical_codes(&lengths, 15).unwrap();

        let message = [5u16, 0, 7, 6, 1, 2, 3, 4];
        let mut writer = BitWriter::new();
        for &sym in &message {
            writer.write_code(codes[sym as usize], lengths[sym as usize]);
        }
        let data = writer.into_data();

        let mut reader = BitReader::new(&data);
        for &expected in &message {
            assert_eq!(tree.decode_symbol(&mut reader).unwrap(), expected);
        }
    }

    #[test]
    fn test_oversubscribed_lengths() {
        let err = HuffmanTree::from_lengths(&[1, 1, 1], 15).unwrap_err();
        assert_eq!(err, Error::Inflate(InflateError::OversubscribedTree));
    }

    #[test]
    fn test_length_above_max() {
        let err = HuffmanTree::from_lengths(&[8, 1, 1], 7).unwrap_err();
        assert_eq!(
            err,
            Error::Inflate(InflateError::CodeLengthTooLong { length: 8, max: 7 })
        );
    }

    #[test]
    fn test_alphabet_too_small() {
        let err = HuffmanTree::from_lengths(&[1], 15).unwrap_err();
        assert_eq!(err, Error::Inflate(InflateError::AlphabetSize(1)));
    }

    #[test]
    fn test_incomplete_code_hits_vacant_slot() {
        // One code of length 1: "0" decodes, "1" has no symbol.
        let tree = HuffmanTree::from_lengths(&[1, 0], 15).unwrap();

        let mut reader = BitReader::new(&[0b0000_0000]);
        assert_eq!(tree.decode_symbol(&mut reader).unwrap(), 0);

        let mut reader = BitReader::new(&[0b0000_0001]);
        assert_eq!(
            tree.decode_symbol(&mut reader).unwrap_err(),
            Error::Inflate(InflateError::UnassignedCode)
        );
    }

    #[test]
    fn test_empty_tree_has_no_codes() {
        let tree = HuffmanTree::from_lengths(&[0; 32], 15).unwrap();
        assert!(tree.nodes().iter().all(|n| *n == Node::Vacant));

        let mut reader = BitReader::new(&[0xFF]);
        assert!(tree.decode_symbol(&mut reader).is_err());
    }

    #[test]
    fn test_decode_at_eof() {
        let tree = HuffmanTree::from_lengths(&[1, 1], 15).unwrap();
        let mut reader = BitReader::new(&[]);
        assert_eq!(
            tree.decode_symbol(&mut reader).unwrap_err(),
            Error::Inflate(InflateError::InputExhausted)
        );
    }

    #[test]
    fn test_code_runs_out_mid_symbol() {
        // Four 2-bit codes use the whole byte; the fifth has nothing to read.
        let tree = HuffmanTree::from_lengths(&[2, 2, 2, 2], 15).unwrap();
        let mut reader = BitReader::new(&[0xFF]);
        for _ in 0..4 {
            assert_eq!(tree.decode_symbol(&mut reader).unwrap(), 3);
        }
        assert_eq!(
            tree.decode_symbol(&mut reader).unwrap_err(),
            Error::Inflate(InflateError::InputExhausted)
        );
    }

    #[test]
    fn test_deep_chain_exceeds_node_budget() {
        // 32 codes of length 15 need more internal nodes than 32 symbols allow.
        let err = HuffmanTree::from_lengths(&[15; 32], 15).unwrap_err();
        assert_eq!(err, Error::Inflate(InflateError::OversubscribedTree));
    }

    #[test]
    fn test_leaf_count_matches_used_symbols() {
        let lengths = [2, 0, 3, 3, 2, 2];
        let tree = HuffmanTree::from_lengths(&lengths, 15).unwrap();
        let leaves = tree
            .nodes()
            .iter()
            .filter(|n| matches!(n, Node::Leaf(_)))
            .count();
        assert_eq!(leaves, 5);
        assert_eq!(tree.num_codes(), 6);
        assert_eq!(tree.max_bits(), 15);
    }
}
