use mongo_types::{Diagnostic, DiagnosticKind, OpCode, OpcodeBody};
use mongo_wire::header::opcode;
use mongo_wire::{HEADER_SIZE, MsgHeader, WireError};
use tracing::debug;

use crate::config::DecoderConfig;
use crate::context::DecodeContext;
use crate::dispatch::dispatch;
use crate::error::DecodeError;
use crate::frames::frames;

/// One wire message, decoded as far as its bytes allowed.
///
/// ```text
/// ┌──────────────────────────────────────────────────────────────┐
/// │ DecodedMessage                                               │
/// │   header:           Option<MsgHeader> ← None under 16 bytes  │
/// │   body:             OpcodeBody        ← possibly partial     │
/// │   effective_opcode: i32               ← inner op if wrapped  │
/// │   consumed:         usize                                    │
/// │   diagnostics:      Vec<Diagnostic>   ← in detection order   │
/// │   truncated:        Option<WireError> ← set on underrun      │
/// └──────────────────────────────────────────────────────────────┘
/// ```
///
/// Decoding never fails outright. A read past the end of the buffer stops
/// the walk, sets `truncated`, and leaves everything read up to that
/// point in `body`.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedMessage {
    pub header: Option<MsgHeader>,
    pub body: OpcodeBody,

    /// The header's opcode, or the `originalOpcode` of a compression
    /// envelope. Zero when there is no header.
    pub effective_opcode: i32,

    /// Bytes of the input this message accounts for. When truncated this
    /// is the whole message buffer: there is nothing further to read.
    pub consumed: usize,

    pub diagnostics: Vec<Diagnostic>,
    pub truncated: Option<WireError>,
}

impl DecodedMessage {
    /// True for OP_REPLY, the only legacy opcode sent by the server.
    pub fn is_response(&self) -> bool {
        self.header.is_some_and(|h| h.opcode == opcode::REPLY)
    }

    /// True when the message was fully decoded without a single
    /// diagnostic.
    pub fn is_clean(&self) -> bool {
        self.truncated.is_none() && self.diagnostics.is_empty()
    }

    /// One-line description, e.g. `Request : Query (Compressed)`.
    pub fn summary(&self) -> String {
        let direction = if self.is_response() {
            "Response"
        } else {
            "Request"
        };
        let name = OpCode::from_wire(self.effective_opcode).name();
        let compressed = self
            .header
            .is_some_and(|h| h.opcode != self.effective_opcode);
        if compressed {
            format!("{direction} : {name} (Compressed)")
        } else {
            format!("{direction} : {name}")
        }
    }
}

/// Decoder for individual wire messages.
///
/// Holds only configuration, so one instance can be shared freely and
/// used from many threads; each call builds its own decode state.
///
/// Decoding a message runs in three steps:
///
///   1. **Header**: parse the 16-byte header. The declared length cuts
///      the message buffer when it fits inside the input; otherwise the
///      whole input is the message.
///   2. **Body**: dispatch on the header opcode. Compressed messages are
///      unwrapped and re-dispatched on their original opcode.
///   3. **Accounting**: bytes left over after a complete body are
///      reported as `TrailingUnknownData`. An underrun is reported as
///      `BufferUnderrun` and marks the message truncated.
///
/// # Example
///
/// ```rust
/// use mongo_decoder::MongoDecoder;
///
/// // OP_MSG { ping: 1 }
/// let bytes = [
///     0x24, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0xDD, 0x07, 0, 0,
///     0, 0, 0, 0, 0,
///     0x0F, 0, 0, 0, 0x10, b'p', b'i', b'n', b'g', 0, 1, 0, 0, 0, 0,
/// ];
/// let msg = MongoDecoder::default().decode(&bytes);
/// assert!(msg.is_clean());
/// assert_eq!(msg.summary(), "Request : Extensible Message Format");
/// ```
#[derive(Clone, Debug, Default)]
pub struct MongoDecoder {
    config: DecoderConfig,
}

impl MongoDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode one message from the start of `bytes`.
    pub fn decode(&self, bytes: &[u8]) -> DecodedMessage {
        let mut ctx = DecodeContext::new(&self.config);

        let header = match MsgHeader::read_from(bytes) {
            Ok(header) => header,
            Err(e) => {
                ctx.report(e.offset(), DiagnosticKind::BufferUnderrun, e.to_string());
                return DecodedMessage {
                    header: None,
                    body: OpcodeBody::Empty,
                    effective_opcode: 0,
                    consumed: 0,
                    diagnostics: ctx.into_diagnostics(),
                    truncated: Some(e),
                };
            }
        };

        let buf = match header.message_len() {
            Some(len) if len <= bytes.len() => &bytes[..len],
            _ => bytes,
        };
        debug!(
            length = header.length,
            request_id = header.request_id,
            response_to = header.response_to,
            opcode = header.opcode,
            available = bytes.len(),
            "message"
        );

        let mut body = OpcodeBody::Empty;
        let res = dispatch(&mut ctx, header.opcode, buf, HEADER_SIZE, &mut body);
        let effective_opcode = ctx.effective_opcode().unwrap_or(header.opcode);

        let (consumed, truncated) = match res {
            Ok(n) => {
                let consumed = (HEADER_SIZE + n).min(buf.len());
                if consumed < buf.len() {
                    ctx.report(
                        consumed,
                        DiagnosticKind::TrailingUnknownData,
                        format!("{} bytes of unknown data after the body", buf.len() - consumed),
                    );
                }
                (consumed, None)
            }
            Err(e) => {
                ctx.report(e.offset(), DiagnosticKind::BufferUnderrun, e.to_string());
                (buf.len(), Some(e))
            }
        };

        DecodedMessage {
            header: Some(header),
            body,
            effective_opcode,
            consumed,
            diagnostics: ctx.into_diagnostics(),
            truncated,
        }
    }

    /// Decode every message in a capture of back-to-back frames.
    ///
    /// Frames are split with [`frames`](crate::frames::frames) using this
    /// decoder's `max_message_size`. A framing error is yielded once and
    /// ends the iteration.
    pub fn decode_stream<'a>(
        &'a self,
        bytes: &'a [u8],
    ) -> impl Iterator<Item = Result<DecodedMessage, DecodeError>> + 'a {
        frames(bytes, &self.config).map(|frame| frame.map(|f| self.decode(f)))
    }
}

/// Decode one message with the default limits.
pub fn decode_message(bytes: &[u8]) -> DecodedMessage {
    MongoDecoder::default().decode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{
        self, BodyBuilder, DocBuilder, compress_message, message, msg_body, query_message,
    };
    use mongo_types::{BsonValue, DataSource};

    #[test]
    fn short_input_has_no_header() {
        let msg = decode_message(&[0x10, 0, 0, 0, 1, 0]);
        assert_eq!(msg.header, None);
        assert_eq!(msg.body, OpcodeBody::Empty);
        assert_eq!(msg.consumed, 0);
        assert_eq!(msg.effective_opcode, 0);
        assert!(matches!(msg.truncated, Some(WireError::UnexpectedEof { .. })));
        assert_eq!(msg.diagnostics[0].kind, DiagnosticKind::BufferUnderrun);
        assert_eq!(msg.summary(), "Request : Unknown");
    }

    #[test]
    fn well_formed_query_consumes_declared_length() {
        let bytes = query_message(7, "shop.orders", &DocBuilder::new().string("find", "orders"));
        let msg = decode_message(&bytes);
        assert!(msg.is_clean(), "{:?}", msg.diagnostics);
        assert_eq!(msg.consumed, bytes.len());
        assert_eq!(msg.effective_opcode, opcode::QUERY);
        assert_eq!(msg.header.map(|h| h.request_id), Some(7));
        assert_eq!(msg.summary(), "Request : Query");
    }

    #[test]
    fn bytes_after_declared_length_are_ignored() {
        let mut bytes = query_message(1, "a.b", &DocBuilder::new());
        let len = bytes.len();
        bytes.extend_from_slice(&[0xEE; 10]);
        let msg = decode_message(&bytes);
        assert!(msg.is_clean());
        assert_eq!(msg.consumed, len);
    }

    #[test]
    fn leftover_body_bytes_are_trailing_data() {
        // GetMore stops after cursorId; anything behind it is unclaimed.
        let body = BodyBuilder::new()
            .i32(0)
            .cstring("db.c")
            .i32(10)
            .i64(99)
            .bytes(&[1, 2, 3])
            .build();
        let bytes = message(1, 0, opcode::GET_MORE, &body);
        let msg = decode_message(&bytes);
        assert_eq!(msg.truncated, None);
        assert_eq!(msg.consumed, bytes.len() - 3);
        assert_eq!(msg.diagnostics.len(), 1);
        assert_eq!(msg.diagnostics[0].kind, DiagnosticKind::TrailingUnknownData);
        assert_eq!(msg.diagnostics[0].offset, bytes.len() - 3);
    }

    #[test]
    fn unknown_opcode_leaves_whole_body_as_trailing_data() {
        let bytes = message(1, 0, 4242, &[9, 9, 9, 9]);
        let msg = decode_message(&bytes);
        assert_eq!(msg.body, OpcodeBody::Empty);
        assert_eq!(msg.consumed, HEADER_SIZE);
        assert_eq!(msg.diagnostics[0].kind, DiagnosticKind::TrailingUnknownData);
        assert_eq!(msg.summary(), "Request : Unknown");
    }

    #[test]
    fn truncated_body_keeps_partial_results() {
        let bytes = query_message(1, "db.coll", &DocBuilder::new().int32("a", 1).int32("b", 2));
        let cut = &bytes[..bytes.len() - 4];
        let msg = decode_message(cut);
        assert!(msg.truncated.is_some());
        assert_eq!(msg.consumed, cut.len());
        let OpcodeBody::Query(query) = &msg.body else {
            panic!("expected Query, got {:?}", msg.body);
        };
        assert_eq!(query.collection.collection, "coll");
        let doc = query.query.as_ref().unwrap();
        assert!(doc.truncated);
        assert_eq!(doc.get("a"), Some(&BsonValue::Int32(1)));
        assert_eq!(msg.diagnostics.last().unwrap().kind, DiagnosticKind::BufferUnderrun);
    }

    #[test]
    fn reply_is_a_response() {
        let body = BodyBuilder::new()
            .u32(0)
            .i64(0)
            .i32(0)
            .i32(1)
            .document(&DocBuilder::new().double("ok", 1.0))
            .build();
        let msg = decode_message(&message(2, 1, opcode::REPLY, &body));
        assert!(msg.is_clean());
        assert!(msg.is_response());
        assert_eq!(msg.summary(), "Response : Reply");
    }

    #[test]
    fn zlib_query_is_summarised_as_compressed() {
        let plain = query_message(3, "db.c", &DocBuilder::new().int32("x", 1));
        let wrapped = compress_message(&plain, 2, fixtures::zlib);
        let msg = decode_message(&wrapped);
        assert!(msg.is_clean(), "{:?}", msg.diagnostics);
        assert_eq!(msg.consumed, wrapped.len());
        assert_eq!(msg.effective_opcode, 2004);
        assert_eq!(msg.summary(), "Request : Query (Compressed)");

        let direct = decode_message(&plain);
        assert_eq!(msg.body.innermost(), &direct.body);
    }

    #[test]
    fn underrun_inside_decompressed_payload_is_attributed() {
        let inner = msg_body(0, &DocBuilder::new().string("k", "value"));
        let payload = fixtures::zlib(&inner[..inner.len() - 2]);
        let body = fixtures::compressed_body(opcode::MSG, inner.len(), 2, &payload);
        let bytes = message(1, 0, opcode::COMPRESSED, &body);
        let msg = decode_message(&bytes);
        assert!(msg.truncated.is_some());
        assert_eq!(msg.effective_opcode, opcode::MSG);
        let last = msg.diagnostics.last().unwrap();
        assert_eq!(last.kind, DiagnosticKind::BufferUnderrun);
        assert_eq!(last.source, DataSource::Decompressed);
    }

    #[test]
    fn decode_stream_walks_every_frame() {
        let mut capture = query_message(1, "a.b", &DocBuilder::new());
        capture.extend(message(2, 0, opcode::MSG, &msg_body(0, &DocBuilder::new().int32("ping", 1))));
        let decoder = MongoDecoder::default();
        let msgs: Vec<_> = decoder.decode_stream(&capture).collect::<Result<_, _>>().unwrap();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[1].summary(), "Request : Extensible Message Format");
    }
}
