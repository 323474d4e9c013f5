#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: decode_message over arbitrary bytes.
//
// Catches bugs in:
// - Header and length-field validation
// - Per-opcode body parsing
// - OP_MSG section and checksum handling
// - Reads past the declared message length
fuzz_target!(|data: &[u8]| {
    let msg = mongo_decoder::decode_message(data);
    assert!(msg.consumed <= data.len());
});
