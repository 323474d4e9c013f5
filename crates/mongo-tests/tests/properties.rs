//! Property tests: the decoder terminates and stays in bounds on any input.
//!
//! Inputs range from pure noise to well-formed headers over random
//! bodies to valid documents with random bytes flipped. For every one the
//! decoder must return, never claim more bytes than it was given, and
//! either finish cleanly or explain itself with diagnostics.

use mongo_decoder::{DecoderConfig, decode_document, decode_message, frames};
use mongo_tests::fixtures::{DocBuilder, message};
use mongo_types::{BsonValue, DiagnosticKind};
use mongo_wire::header::opcode;
use proptest::prelude::*;

fn known_opcode() -> impl Strategy<Value = i32> {
    prop::sample::select(vec![
        opcode::REPLY,
        opcode::MESSAGE,
        opcode::UPDATE,
        opcode::INSERT,
        opcode::RESERVED,
        opcode::QUERY,
        opcode::GET_MORE,
        opcode::DELETE,
        opcode::KILL_CURSORS,
        opcode::COMMAND,
        opcode::COMMAND_REPLY,
        opcode::COMPRESSED,
        opcode::MSG,
    ])
}

proptest! {
    /// Noise never panics and never overclaims.
    #[test]
    fn random_bytes_terminate(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let msg = decode_message(&bytes);
        prop_assert!(msg.consumed <= bytes.len());
        if msg.header.is_none() {
            prop_assert!(msg.truncated.is_some());
        }
    }

    /// A valid header over a random body: the message is either fully
    /// accounted for, reports its leftovers, or is truncated.
    #[test]
    fn random_body_is_accounted_for(
        op in known_opcode(),
        body in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let bytes = message(1, 0, op, &body);
        let msg = decode_message(&bytes);
        prop_assert!(msg.consumed <= bytes.len());
        let trailing = msg
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::TrailingUnknownData);
        prop_assert!(msg.truncated.is_some() || trailing || msg.consumed == bytes.len());
    }

    /// Random bytes as a bare document.
    #[test]
    fn random_document_terminates(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode_document(&bytes, &DecoderConfig::default());
    }

    /// One corrupted byte anywhere in a valid message.
    #[test]
    fn single_byte_corruption_terminates(index in 0usize..64, value in any::<u8>()) {
        let doc = DocBuilder::new()
            .string("insert", "orders")
            .document("doc", &DocBuilder::new().int32("qty", 3).boolean("paid", false));
        let mut bytes = message(1, 0, opcode::MSG, &mongo_tests::fixtures::msg_body(0, &doc));
        let index = index % bytes.len();
        bytes[index] = value;
        let msg = decode_message(&bytes);
        prop_assert!(msg.consumed <= bytes.len());
    }

    /// Int32 fields come back in wire order with their values.
    #[test]
    fn int32_fields_decode_in_order(
        fields in prop::collection::vec(("[a-z]{1,8}", any::<i32>()), 0..16),
    ) {
        let builder = fields
            .iter()
            .fold(DocBuilder::new(), |b, (name, v)| b.int32(name, *v));
        let bytes = builder.build();
        let (doc, consumed, diags) = decode_document(&bytes, &DecoderConfig::default());
        prop_assert!(diags.is_empty());
        prop_assert_eq!(consumed, bytes.len());
        let decoded: Vec<(String, BsonValue)> =
            doc.iter().map(|e| (e.name.clone(), e.value.clone())).collect();
        let expected: Vec<(String, BsonValue)> =
            fields.into_iter().map(|(n, v)| (n, BsonValue::Int32(v))).collect();
        prop_assert_eq!(decoded, expected);
    }

    /// Frame splitting stops on its own for any capture.
    #[test]
    fn frame_splitting_terminates(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut total = 0usize;
        for frame in frames(&bytes, &DecoderConfig::default()) {
            match frame {
                Ok(f) => total += f.len(),
                Err(_) => break,
            }
        }
        prop_assert!(total <= bytes.len());
    }
}
