#![warn(clippy::pedantic)]

//! Shared helpers for the integration tests and benchmarks.

/// Byte-level builders for BSON documents and wire messages.
pub use mongo_decoder::fixtures;

/// Concatenate messages the way a capture file stores them.
pub fn capture(messages: &[Vec<u8>]) -> Vec<u8> {
    messages.concat()
}

/// A small OP_MSG `{ ping: 1, $db: "admin" }`, as a driver sends it.
pub fn ping(request_id: u32) -> Vec<u8> {
    use fixtures::{DocBuilder, message, msg_body};
    use mongo_wire::header::opcode;

    message(
        request_id,
        0,
        opcode::MSG,
        &msg_body(0, &DocBuilder::new().int32("ping", 1).string("$db", "admin")),
    )
}
