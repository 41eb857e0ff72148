//! PNG scanline reconstruction (filter method 0).

use bootpng_core::{FormatError, Result};

/// PNG filter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    /// No filter.
    None = 0,
    /// Sub filter (difference from left pixel).
    Sub = 1,
    /// Up filter (difference from pixel above).
    Up = 2,
    /// Average filter (average of left and above).
    Average = 3,
    /// Paeth filter (predictor based on left, above, upper-left).
    Paeth = 4,
}

impl FilterType {
    /// Create from byte value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(FilterType::None),
            1 => Some(FilterType::Sub),
            2 => Some(FilterType::Up),
            3 => Some(FilterType::Average),
            4 => Some(FilterType::Paeth),
            _ => None,
        }
    }
}

impl TryFrom<u8> for FilterType {
    type Error = FormatError;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        FilterType::from_u8(value).ok_or(FormatError::InvalidFilterType(value))
    }
}

/// Paeth predictor function.
///
/// Picks whichever of left (`a`), above (`b`) and upper-left (`c`) is
/// closest to `a + b - c`, preferring `a`, then `b`.
#[inline]
pub fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
    let pa = (b as i16 - c as i16).abs();
    let pb = (a as i16 - c as i16).abs();
    let pc = (a as i16 + b as i16 - 2 * c as i16).abs();

    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

/// Reconstruct one scanline into `recon`.
///
/// `scanline` is the filtered line without its filter byte and `precon` is
/// the previous reconstructed line, absent for the first row. Missing
/// neighbours (left of the first pixel, above the first row) count as zero.
pub fn unfilter_scanline(
    recon: &mut [u8],
    scanline: &[u8],
    precon: Option<&[u8]>,
    bytewidth: usize,
    filter_type: FilterType,
) -> Result<()> {
    let len = recon.len();
    if scanline.len() < len || precon.is_some_and(|p| p.len() < len) {
        return Err(FormatError::TruncatedImageData {
            expected: len,
            actual: scanline.len().min(precon.map_or(usize::MAX, <[u8]>::len)),
        }
        .into());
    }
    let scanline = &scanline[..len];
    let bytewidth = bytewidth.min(len);

    match (filter_type, precon) {
        (FilterType::None, _) | (FilterType::Up, None) => {
            recon.copy_from_slice(scanline);
        }
        (FilterType::Sub, _) | (FilterType::Paeth, None) => {
            recon[..bytewidth].copy_from_slice(&scanline[..bytewidth]);
            for i in bytewidth..len {
                recon[i] = scanline[i].wrapping_add(recon[i - bytewidth]);
            }
        }
        (FilterType::Up, Some(prev)) => {
            for i in 0..len {
                recon[i] = scanline[i].wrapping_add(prev[i]);
            }
        }
        (FilterType::Average, Some(prev)) => {
            for i in 0..bytewidth {
                recon[i] = scanline[i].wrapping_add(prev[i] / 2);
            }
            for i in bytewidth..len {
                let avg = (recon[i - bytewidth] as u16 + prev[i] as u16) / 2;
                recon[i] = scanline[i].wrapping_add(avg as u8);
            }
        }
        (FilterType::Average, None) => {
            recon[..bytewidth].copy_from_slice(&scanline[..bytewidth]);
            for i in bytewidth..len {
                recon[i] = scanline[i].wrapping_add(recon[i - bytewidth] / 2);
            }
        }
        (FilterType::Paeth, Some(prev)) => {
            // paeth(0, b, 0) is always b.
            for i in 0..bytewidth {
                recon[i] = scanline[i].wrapping_add(prev[i]);
            }
            for i in bytewidth..len {
                let predicted = paeth_predictor(recon[i - bytewidth], prev[i], prev[i - bytewidth]);
                recon[i] = scanline[i].wrapping_add(predicted);
            }
        }
    }

    Ok(())
}

/// Reconstruct a whole non-interlaced image.
///
/// `input` holds `height` rows of one filter byte plus `linebytes` filtered
/// bytes; `out` receives `height * linebytes` reconstructed bytes.
pub fn unfilter(out: &mut [u8], input: &[u8], width: u32, height: u32, bpp: usize) -> Result<()> {
    let bytewidth = bpp.div_ceil(8);
    let linebytes = (width as usize)
        .checked_mul(bpp)
        .map(|bits| bits.div_ceil(8))
        .ok_or(FormatError::SizeOverflow("scanline length"))?;
    let h = height as usize;

    let needed_in = linebytes
        .checked_add(1)
        .and_then(|line| line.checked_mul(h))
        .ok_or(FormatError::SizeOverflow("filtered image size"))?;
    if input.len() < needed_in {
        return Err(FormatError::TruncatedImageData {
            expected: needed_in,
            actual: input.len(),
        }
        .into());
    }
    let needed_out = linebytes
        .checked_mul(h)
        .ok_or(FormatError::SizeOverflow("image size"))?;
    if out.len() < needed_out {
        return Err(FormatError::TruncatedImageData {
            expected: needed_out,
            actual: out.len(),
        }
        .into());
    }

    for y in 0..h {
        let in_start = y * (linebytes + 1);
        let filter_type = FilterType::try_from(input[in_start])?;
        let scanline = &input[in_start + 1..in_start + 1 + linebytes];

        let (done, rest) = out.split_at_mut(y * linebytes);
        let recon = &mut rest[..linebytes];
        let precon = if y == 0 {
            None
        } else {
            Some(&done[(y - 1) * linebytes..])
        };

        unfilter_scanline(recon, scanline, precon, bytewidth, filter_type)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bootpng_core::Error;

    /// Filter a row for encoding; the inverse of `unfilter_scanline`.
    fn filter_row(
        filter_type: FilterType,
        current: &[u8],
        previous: Option<&[u8]>,
        bytes_per_pixel: usize,
    ) -> Vec<u8> {
        let left = |i: usize| if i >= bytes_per_pixel { current[i - bytes_per_pixel] } else { 0 };
        let above = |i: usize| previous.map_or(0, |p| p[i]);
        let upper_left = |i: usize| {
            if i >= bytes_per_pixel {
                previous.map_or(0, |p| p[i - bytes_per_pixel])
            } else {
                0
            }
        };

        (0..current.len())
            .map(|i| {
                let predicted = match filter_type {
                    FilterType::None => 0,
                    FilterType::Sub => left(i),
                    FilterType::Up => above(i),
                    FilterType::Average => ((left(i) as u16 + above(i) as u16) / 2) as u8,
                    FilterType::Paeth => paeth_predictor(left(i), above(i), upper_left(i)),
                };
                current[i].wrapping_sub(predicted)
            })
            .collect()
    }

    const ALL_FILTERS: [FilterType; 5] = [
        FilterType::None,
        FilterType::Sub,
        FilterType::Up,
        FilterType::Average,
        FilterType::Paeth,
    ];

    fn unfiltered(filter: FilterType, scan: &[u8], prev: Option<&[u8]>, bw: usize) -> Vec<u8> {
        let mut recon = vec![0u8; scan.len()];
        unfilter_scanline(&mut recon, scan, prev, bw, filter).unwrap();
        recon
    }

    #[test]
    fn test_filter_type() {
        assert_eq!(FilterType::from_u8(0), Some(FilterType::None));
        assert_eq!(FilterType::from_u8(4), Some(FilterType::Paeth));
        assert_eq!(FilterType::from_u8(5), None);
        assert_eq!(FilterType::try_from(9), Err(FormatError::InvalidFilterType(9)));
    }

    #[test]
    fn test_unfilter_none() {
        assert_eq!(unfiltered(FilterType::None, &[10, 20, 30, 40], None, 3), vec![10, 20, 30, 40]);
    }

    #[test]
    fn test_unfilter_sub() {
        assert_eq!(unfiltered(FilterType::Sub, &[10, 20, 30, 5], None, 3), vec![10, 20, 30, 15]);
    }

    #[test]
    fn test_unfilter_up() {
        let prev = [5, 10, 15, 20];
        assert_eq!(
            unfiltered(FilterType::Up, &[1, 2, 3, 4], Some(&prev), 3),
            vec![6, 12, 18, 24]
        );
        assert_eq!(unfiltered(FilterType::Up, &[1, 2, 3, 4], None, 3), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_unfilter_average() {
        let prev = [10, 20, 30, 40];
        // First byte: 1 + 10/2; second: 2 + (6 + 20)/2.
        assert_eq!(
            unfiltered(FilterType::Average, &[1, 2, 3, 4], Some(&prev), 1),
            vec![6, 15, 25, 36]
        );
        assert_eq!(
            unfiltered(FilterType::Average, &[8, 2, 3, 4], None, 1),
            vec![8, 6, 6, 7]
        );
    }

    #[test]
    fn test_unfilter_wraps_mod_256() {
        let prev = [200, 200];
        assert_eq!(unfiltered(FilterType::Up, &[100, 56], Some(&prev), 1), vec![44, 0]);
        assert_eq!(unfiltered(FilterType::Sub, &[255, 1], None, 1), vec![255, 0]);
    }

    #[test]
    fn test_paeth_predictor() {
        assert_eq!(paeth_predictor(0, 0, 0), 0);
        assert_eq!(paeth_predictor(100, 100, 100), 100);
        // p = 10 + 20 - 5 = 25: closest to b.
        assert_eq!(paeth_predictor(10, 20, 5), 20);
        // p = 20 + 10 - 5 = 25: closest to a.
        assert_eq!(paeth_predictor(20, 10, 5), 20);
        // p = 10 + 10 - 20 = 0: a and b tie, a wins.
        assert_eq!(paeth_predictor(10, 10, 20), 10);
        // p = 30 + 40 - 35 = 35: exactly c.
        assert_eq!(paeth_predictor(30, 40, 35), 35);
        assert_eq!(paeth_predictor(3, 9, 8), 3);
        assert_eq!(paeth_predictor(9, 3, 10), 3);
        assert_eq!(paeth_predictor(50, 60, 100), 50);
    }

    #[test]
    fn test_paeth_without_previous_is_sub() {
        let scan = [7, 9, 250, 3, 1, 2, 3, 4];
        for bw in 1..=4 {
            assert_eq!(
                unfiltered(FilterType::Paeth, &scan, None, bw),
                unfiltered(FilterType::Sub, &scan, None, bw)
            );
        }
    }

    #[test]
    fn test_filter_roundtrip() {
        let original = vec![100, 150, 200, 50, 75, 100];
        let previous = vec![50, 60, 70, 80, 90, 100];

        for filter in ALL_FILTERS {
            for prev in [None, Some(previous.as_slice())] {
                let filtered = filter_row(filter, &original, prev, 3);
                assert_eq!(
                    unfiltered(filter, &filtered, prev, 3),
                    original,
                    "Roundtrip failed for {:?}",
                    filter
                );
            }
        }
    }

    #[test]
    fn test_unfilter_image() {
        // 2x2 RGBA8: row 0 Sub, row 1 Up.
        let row0 = [1, 2, 3, 4, 5, 6, 7, 8];
        let row1 = [9, 9, 9, 9, 1, 1, 1, 1];
        let mut input = vec![1];
        input.extend(filter_row(FilterType::Sub, &row0, None, 4));
        input.push(2);
        input.extend(filter_row(FilterType::Up, &row1, Some(&row0), 4));

        let mut out = vec![0u8; 16];
        unfilter(&mut out, &input, 2, 2, 32).unwrap();
        assert_eq!(&out[..8], &row0);
        assert_eq!(&out[8..], &row1);
    }

    #[test]
    fn test_unfilter_rejects_bad_filter_byte() {
        let input = [5, 0, 0, 0, 0];
        let mut out = [0u8; 4];
        assert_eq!(
            unfilter(&mut out, &input, 1, 1, 32).unwrap_err(),
            Error::Format(FormatError::InvalidFilterType(5))
        );
    }

    #[test]
    fn test_unfilter_rejects_short_input() {
        let input = [0, 1, 2, 3];
        let mut out = [0u8; 4];
        assert!(matches!(
            unfilter(&mut out, &input, 1, 1, 32).unwrap_err(),
            Error::Format(FormatError::TruncatedImageData { expected: 5, actual: 4 })
        ));
    }
}
