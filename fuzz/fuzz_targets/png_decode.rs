#![no_main]

use bootpng::{DecoderConfig, DecoderState, PngDecoder, PNG_SIGNATURE};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Raw input, then the same bytes behind a valid signature so the fuzzer
    // spends its time past the first check.
    let _ = bootpng::decode(data);

    let mut prefixed = PNG_SIGNATURE.to_vec();
    prefixed.extend_from_slice(data);

    // Keep allocations bounded.
    let config = DecoderConfig::strict().with_max_dimensions(4096, 4096);
    let mut decoder = PngDecoder::with_config(&prefixed, config);

    if let Ok(header) = decoder.header() {
        let expected = header.image_size();
        match decoder.decode() {
            Ok(image) => {
                assert_eq!(Ok(image.data().len()), expected);
                assert_eq!(decoder.state(), DecoderState::Decoded);
            }
            Err(err) => {
                assert_eq!(decoder.state(), DecoderState::Failed);
                assert_eq!(decoder.failure().map(|(_, e)| e), Some(&err));
                assert!(decoder.image().is_none());
            }
        }
    }
});
