//! PNG fixture builders shared by the integration tests.

#![allow(dead_code)]

use bootpng::filter::{paeth_predictor, FilterType};
use bootpng::{crc32, PNG_SIGNATURE};
use miniz_oxide::deflate::compress_to_vec_zlib;

/// Serialize one chunk with a correct CRC.
pub fn chunk(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = (payload.len() as u32).to_be_bytes().to_vec();
    out.extend_from_slice(kind);
    out.extend_from_slice(payload);
    let mut crc_input = kind.to_vec();
    crc_input.extend_from_slice(payload);
    out.extend_from_slice(&crc32(&crc_input).to_be_bytes());
    out
}

/// IHDR payload.
pub fn ihdr_payload(width: u32, height: u32, bit_depth: u8, color_type: u8, interlace: u8) -> Vec<u8> {
    let mut payload = Vec::with_capacity(13);
    payload.extend_from_slice(&width.to_be_bytes());
    payload.extend_from_slice(&height.to_be_bytes());
    payload.extend_from_slice(&[bit_depth, color_type, 0, 0, interlace]);
    payload
}

/// Signature, the given IHDR payload, then `chunks` verbatim.
pub fn assemble(ihdr: &[u8], chunks: &[Vec<u8>]) -> Vec<u8> {
    let mut data = PNG_SIGNATURE.to_vec();
    data.extend(chunk(b"IHDR", ihdr));
    for c in chunks {
        data.extend_from_slice(c);
    }
    data
}

/// An RGBA8 PNG whose zlib stream is split into one IDAT per slice.
pub fn rgba_png(width: u32, height: u32, idat_parts: &[&[u8]]) -> Vec<u8> {
    let mut chunks: Vec<Vec<u8>> = idat_parts.iter().map(|part| chunk(b"IDAT", part)).collect();
    chunks.push(chunk(b"IEND", b""));
    assemble(&ihdr_payload(width, height, 8, 6, 0), &chunks)
}

/// zlib stream made of one final stored block.
pub fn stored_zlib(raw: &[u8]) -> Vec<u8> {
    let len = raw.len() as u16;
    let mut z = vec![0x78, 0x01, 0x01];
    z.extend_from_slice(&len.to_le_bytes());
    z.extend_from_slice(&(!len).to_le_bytes());
    z.extend_from_slice(raw);
    z.extend_from_slice(&bootpng_inflate::adler32(raw).to_be_bytes());
    z
}

/// Filter one row the way an encoder would.
pub fn filter_row(filter: FilterType, row: &[u8], prev: Option<&[u8]>, bpp: usize) -> Vec<u8> {
    let left = |i: usize| if i >= bpp { row[i - bpp] } else { 0 };
    let above = |i: usize| prev.map_or(0, |p| p[i]);
    let upper_left = |i: usize| if i >= bpp { prev.map_or(0, |p| p[i - bpp]) } else { 0 };

    (0..row.len())
        .map(|i| {
            let predicted = match filter {
                FilterType::None => 0,
                FilterType::Sub => left(i),
                FilterType::Up => above(i),
                FilterType::Average => ((left(i) as u16 + above(i) as u16) / 2) as u8,
                FilterType::Paeth => paeth_predictor(left(i), above(i), upper_left(i)),
            };
            row[i].wrapping_sub(predicted)
        })
        .collect()
}

/// Filter RGBA8 pixels row by row, cycling through `filters`.
pub fn filter_image(pixels: &[u8], width: u32, height: u32, filters: &[FilterType]) -> Vec<u8> {
    let stride = width as usize * 4;
    let mut out = Vec::with_capacity((stride + 1) * height as usize);
    for y in 0..height as usize {
        let filter = filters[y % filters.len()];
        let row = &pixels[y * stride..(y + 1) * stride];
        let prev = (y > 0).then(|| &pixels[(y - 1) * stride..y * stride]);
        out.push(filter as u8);
        out.extend(filter_row(filter, row, prev, 4));
    }
    out
}

/// Encode RGBA8 pixels into a complete PNG.
pub fn encode_rgba(pixels: &[u8], width: u32, height: u32, filters: &[FilterType], level: u8) -> Vec<u8> {
    let raw = filter_image(pixels, width, height, filters);
    let compressed = compress_to_vec_zlib(&raw, level);
    rgba_png(width, height, &[&compressed])
}

/// Deterministic test pattern.
pub fn gradient(width: u32, height: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            pixels.extend_from_slice(&[
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                ((x + y) % 256) as u8,
                255 - (x % 256) as u8,
            ]);
        }
    }
    pixels
}
