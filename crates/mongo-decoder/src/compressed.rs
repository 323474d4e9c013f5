use mongo_types::{
    CompressionInfo, CompressorId, DataSource, DiagnosticKind, OpCompressed, OpcodeBody,
};
use mongo_wire::WireError;
use mongo_wire::primitives::{read_i32_le, read_u8, remaining};
use tracing::debug;

use crate::context::DecodeContext;
use crate::decompression;
use crate::dispatch::dispatch;
use crate::error::CodecError;
use crate::handlers::decode_into;

/// Size of the envelope in front of the payload.
const ENVELOPE_SIZE: usize = 9;

/// OP_COMPRESSED: unwrap the payload and decode the message inside.
///
/// ```text
/// ┌────────────────┬──────────────────┬──────────────┬───────────┐
/// │ originalOpcode │ uncompressedSize │ compressorId │ payload   │
/// │ i32            │ i32              │ u8           │ ...       │
/// └────────────────┴──────────────────┴──────────────┴───────────┘
/// ```
///
/// The original opcode becomes the message's effective opcode as soon as
/// it is read. Then:
///
/// - `Noop`: the payload is the inner body, decoded in place. Consumes
///   the envelope plus whatever the inner handler consumed.
/// - any other compressor: the payload is decompressed into a fresh
///   buffer and the inner body is decoded from offset 0 of that buffer.
///   The rest of the message is consumed regardless of the outcome.
///
/// Unknown compressors, backends missing from this build, failed
/// decompression and envelopes nested inside envelopes are all reported
/// as `UnsupportedCompression`, leaving `inner` empty.
pub(crate) fn decode_compressed(
    ctx: &mut DecodeContext<'_>,
    buf: &[u8],
    offset: usize,
    body: &mut OpcodeBody,
) -> Result<usize, WireError> {
    decode_into(body, OpcodeBody::Compressed, |compressed: &mut OpCompressed| {
        let original_opcode = read_i32_le(buf, offset)?;
        let nested = ctx.in_compression();
        if !nested {
            ctx.set_effective_opcode(original_opcode);
        }
        let uncompressed_size = read_i32_le(buf, offset + 4)?;
        let compressor = CompressorId::from_wire_byte(read_u8(buf, offset + 8)?);
        let payload_offset = offset + ENVELOPE_SIZE;
        compressed.info = CompressionInfo {
            original_opcode,
            uncompressed_size,
            compressor,
            payload_len: remaining(buf, payload_offset),
        };
        let rest = ENVELOPE_SIZE + compressed.info.payload_len;

        debug!(
            offset,
            original_opcode,
            uncompressed_size,
            compressor = compressor.name(),
            "compressed message"
        );

        if nested {
            ctx.report(
                offset,
                DiagnosticKind::UnsupportedCompression,
                "compressed message nested inside a compressed message",
            );
            return Ok(rest);
        }

        if compressor == CompressorId::Noop {
            let inner = ctx.within_envelope(DataSource::Frame, |ctx| {
                dispatch(ctx, original_opcode, buf, payload_offset, &mut compressed.inner)
            });
            return Ok(ENVELOPE_SIZE + inner?);
        }

        let payload = &buf[payload_offset.min(buf.len())..];
        let Some(decompressed) = decompress(ctx, offset, compressor, payload) else {
            return Ok(rest);
        };
        compressed.decompressed = true;
        ctx.within_envelope(DataSource::Decompressed, |ctx| {
            dispatch(ctx, original_opcode, &decompressed, 0, &mut compressed.inner)
        })?;
        Ok(rest)
    })
}

/// Run the backend for `compressor`, turning every failure into a
/// diagnostic. `None` means there is nothing to decode further.
fn decompress(
    ctx: &mut DecodeContext<'_>,
    offset: usize,
    compressor: CompressorId,
    payload: &[u8],
) -> Option<Vec<u8>> {
    let limit = ctx.config().max_uncompressed_size;
    let codec = match decompression::backend(compressor) {
        Ok(codec) => codec,
        Err(e) => {
            let message = match compressor {
                CompressorId::Unknown(id) => format!("Unsupported compression format: {id}"),
                _ => e.to_string(),
            };
            ctx.report(offset, DiagnosticKind::UnsupportedCompression, message);
            return None;
        }
    };

    if let Some(len) = codec.decompressed_len(payload) {
        if len > limit {
            ctx.report(
                offset,
                DiagnosticKind::CompressedSizeTooLarge,
                format!("Uncompressed size too large: {len} bytes, limit {limit}"),
            );
            return None;
        }
    }

    match codec.decompress(payload, limit) {
        Ok(out) => {
            debug!(
                compressor = codec.id().name(),
                compressed = payload.len(),
                decompressed = out.len(),
                "payload decompressed"
            );
            Some(out)
        }
        Err(CodecError::DecompressionBomb { actual, limit }) => {
            ctx.report(
                offset,
                DiagnosticKind::CompressedSizeTooLarge,
                format!("Uncompressed size too large: at least {actual} bytes, limit {limit}"),
            );
            None
        }
        Err(e) => {
            ctx.report(
                offset,
                DiagnosticKind::UnsupportedCompression,
                format!("Error uncompressing {} data: {e}", compressor.name()),
            );
            None
        }
    }
}
