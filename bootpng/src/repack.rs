//! Removal of per-scanline padding bits for sub-byte pixel layouts.

use bootpng_core::{Error, FormatError, Result};

/// Read bit `pos` of `data`, most significant bit of each byte first.
#[inline]
fn read_bit_msb(data: &[u8], pos: usize) -> u8 {
    (data[pos >> 3] >> (7 - (pos & 7))) & 1
}

/// Set or clear bit `pos` of `data`, most significant bit first.
#[inline]
fn write_bit_msb(data: &mut [u8], pos: usize, bit: u8) {
    let mask = 1u8 << (7 - (pos & 7));
    if bit != 0 {
        data[pos >> 3] |= mask;
    } else {
        data[pos >> 3] &= !mask;
    }
}

fn required_bytes(line_bits: usize, height: usize, what: &'static str) -> Result<usize> {
    line_bits
        .checked_mul(height)
        .and_then(|bits| bits.checked_add(7))
        .map(|bits| bits / 8)
        .ok_or_else(|| FormatError::SizeOverflow(what).into())
}

/// Pack `height` scanlines of `ilinebits` bits each into lines of
/// `olinebits` bits, dropping the `ilinebits - olinebits` padding bits at the
/// end of every input line.
///
/// Both buffers are bit streams in PNG order (MSB first). Bits of `out`
/// beyond `olinebits * height` are left untouched.
pub fn remove_padding_bits(
    out: &mut [u8],
    input: &[u8],
    olinebits: usize,
    ilinebits: usize,
    height: usize,
) -> Result<()> {
    if olinebits > ilinebits {
        return Err(Error::invalid_param(format!(
            "output line of {olinebits} bits is wider than input line of {ilinebits} bits"
        )));
    }

    let in_needed = required_bytes(ilinebits, height, "padded scanlines")?;
    if input.len() < in_needed {
        return Err(FormatError::TruncatedImageData {
            expected: in_needed,
            actual: input.len(),
        }
        .into());
    }
    let out_needed = required_bytes(olinebits, height, "packed scanlines")?;
    if out.len() < out_needed {
        return Err(FormatError::TruncatedImageData {
            expected: out_needed,
            actual: out.len(),
        }
        .into());
    }

    let diff = ilinebits - olinebits;
    let mut ibp = 0usize;
    let mut obp = 0usize;
    for _ in 0..height {
        for _ in 0..olinebits {
            write_bit_msb(out, obp, read_bit_msb(input, ibp));
            ibp += 1;
            obp += 1;
        }
        ibp += diff;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_bit_lines() {
        // Three 3-bit lines, each padded to a byte.
        let input = [0b1010_0000, 0b0110_0000, 0b1110_0000];
        let mut out = [0u8; 2];
        remove_padding_bits(&mut out, &input, 3, 8, 3).unwrap();
        // 101 011 111 -> 1010_1111 1xxx_xxxx
        assert_eq!(out, [0b1010_1111, 0b1000_0000]);
    }

    #[test]
    fn test_padding_bits_are_dropped() {
        // Garbage in the padding must not leak into the output.
        let input = [0b1011_1111, 0b0101_1111];
        let mut out = [0u8; 1];
        remove_padding_bits(&mut out, &input, 4, 8, 2).unwrap();
        assert_eq!(out, [0b1011_0101]);
    }

    #[test]
    fn test_clears_stale_output_bits() {
        let input = [0b0000_0000];
        let mut out = [0xFF];
        remove_padding_bits(&mut out, &input, 4, 8, 1).unwrap();
        assert_eq!(out, [0b0000_1111]);
    }

    #[test]
    fn test_two_bit_pixels_across_bytes() {
        // 5 two-bit pixels = 10 bits per line, padded to 16.
        let input = [0b1101_1000, 0b1100_0000, 0b0001_1011, 0b0100_0000];
        let mut out = [0u8; 3];
        remove_padding_bits(&mut out, &input, 10, 16, 2).unwrap();
        // 1101100011 0001101101 -> 11011000 11000110 1101xxxx
        assert_eq!(out, [0b1101_1000, 0b1100_0110, 0b1101_0000]);
    }

    #[test]
    fn test_aligned_lines_copy_through() {
        let input = [0x12, 0x34, 0x56];
        let mut out = [0u8; 3];
        remove_padding_bits(&mut out, &input, 8, 8, 3).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn test_rejects_short_buffers() {
        let mut out = [0u8; 1];
        assert!(matches!(
            remove_padding_bits(&mut out, &[0u8; 1], 3, 8, 2).unwrap_err(),
            Error::Format(FormatError::TruncatedImageData { expected: 2, actual: 1 })
        ));

        let mut out = [0u8; 1];
        assert!(remove_padding_bits(&mut out, &[0u8; 4], 6, 8, 4).is_err());
    }

    #[test]
    fn test_rejects_wider_output() {
        let mut out = [0u8; 2];
        let err = remove_padding_bits(&mut out, &[0u8; 2], 9, 8, 1).unwrap_err();
        assert!(err.is_invalid());
    }
}
