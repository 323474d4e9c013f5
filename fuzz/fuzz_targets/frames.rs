#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: splitting a capture into frames and decoding each one.
fuzz_target!(|data: &[u8]| {
    let decoder = mongo_decoder::MongoDecoder::default();
    for frame in mongo_decoder::frames(data, decoder.config()) {
        let Ok(frame) = frame else { break };
        let _ = decoder.decode(frame);
    }
});
