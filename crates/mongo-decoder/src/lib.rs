#![warn(clippy::pedantic)]

pub mod config;
pub mod decoder;
pub mod decompression;
pub mod error;
pub mod frames;
pub mod streaming;

mod compressed;
mod context;
mod dispatch;
mod document;
mod handlers;
mod msg;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

pub use config::DecoderConfig;
pub use decoder::{DecodedMessage, MongoDecoder, decode_message};
pub use decompression::Decompressor;
pub use error::{CodecError, DecodeError};
pub use frames::{Frames, frames};
pub use streaming::StreamingDecoder;

/// Decode a single BSON document at the start of `bytes`.
///
/// Intended for tools and fuzzing that work on bare BSON rather than
/// wire messages. Returns the document, the bytes consumed and any
/// diagnostics; an underrun leaves the document marked `truncated`.
pub fn decode_document(
  bytes: &[u8],
  config: &DecoderConfig,
) -> (mongo_types::BsonDocument, usize, Vec<mongo_types::Diagnostic>) {
  let mut ctx = context::DecodeContext::new(config);
  let mut doc = mongo_types::BsonDocument::default();
  let consumed = match document::read_document(&mut ctx, bytes, 0, &mut doc) {
    Ok(n) => n,
    Err(e) => {
      ctx.report(
        e.offset(),
        mongo_types::DiagnosticKind::BufferUnderrun,
        e.to_string(),
      );
      bytes.len()
    }
  };
  (doc, consumed, ctx.into_diagnostics())
}
