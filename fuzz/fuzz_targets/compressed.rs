#![no_main]

use libfuzzer_sys::fuzz_target;
use mongo_wire::header::opcode;

// Fuzz target: OP_COMPRESSED envelopes.
//
// Input format:
//   - First byte: compressor id
//   - Remaining bytes: compressed payload
//
// The envelope is wrapped in a valid header claiming an OP_QUERY inside,
// so every input reaches a decompression backend.
//
// Catches bugs in:
// - Backend error handling on corrupt streams
// - The output ceiling (max_uncompressed_size) and snappy's length query
// - Re-dispatch over the decompressed buffer
fuzz_target!(|data: &[u8]| {
    let Some((&compressor, payload)) = data.split_first() else {
        return;
    };
    let Ok(length) = i32::try_from(16 + 9 + payload.len()) else {
        return;
    };

    let mut msg = Vec::with_capacity(16 + 9 + payload.len());
    msg.extend_from_slice(&length.to_le_bytes());
    msg.extend_from_slice(&1i32.to_le_bytes());
    msg.extend_from_slice(&0i32.to_le_bytes());
    msg.extend_from_slice(&opcode::COMPRESSED.to_le_bytes());
    msg.extend_from_slice(&opcode::QUERY.to_le_bytes());
    msg.extend_from_slice(&(payload.len() as i32).saturating_mul(4).to_le_bytes());
    msg.push(compressor);
    msg.extend_from_slice(payload);

    let decoded = mongo_decoder::decode_message(&msg);
    assert!(decoded.consumed <= msg.len());
});
