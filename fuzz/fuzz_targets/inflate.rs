#![no_main]

//! Fuzz target for the inflater.
//!
//! Feeds arbitrary bytes as both raw DEFLATE and zlib streams under a fixed
//! output limit and checks the limit is never exceeded.

use arbitrary::Arbitrary;
use bootpng_inflate::{inflate_raw, inflate_zlib, InflateConfig};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct InflateInput {
    data: Vec<u8>,
    capacity: u16,
    verify_checksum: bool,
}

fuzz_target!(|input: InflateInput| {
    let capacity = input.capacity as usize;
    let config = InflateConfig::new()
        .with_capacity(capacity)
        .with_checksum(input.verify_checksum);

    if let Ok(out) = inflate_raw(&input.data, &config) {
        assert!(out.len() <= capacity);
    }
    if let Ok(out) = inflate_zlib(&input.data, &config) {
        assert!(out.len() <= capacity);
    }
});
