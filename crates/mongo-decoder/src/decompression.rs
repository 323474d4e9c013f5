// Decompression backends for OP_COMPRESSED payloads.
//
// Each backend implements `Decompressor`. zlib is always compiled in;
// snappy and zstd sit behind cargo features of the same name. `backend`
// maps a compressor id to whatever this build has, and a missing backend
// is an error value, never a build failure.
//
// Every backend bounds its output by the caller's limit. Formats that
// carry their decompressed size up front (snappy) also expose it so the
// unwrapper can refuse an oversized payload before allocating.

use std::io::Read;

use mongo_types::CompressorId;

use crate::error::CodecError;

/// One decompression algorithm.
///
/// Implementations must be safe to call from many threads at once; the
/// decoder shares a single static instance per algorithm.
pub trait Decompressor: Send + Sync {
    fn id(&self) -> CompressorId;

    /// Decompressed size as recorded in the payload itself, for formats
    /// that record it. `None` when the format has no such field or the
    /// field cannot be read.
    fn decompressed_len(&self, _data: &[u8]) -> Option<usize> {
        None
    }

    /// Decompress `data`, producing at most `limit` bytes.
    ///
    /// # Errors
    ///
    /// - [`CodecError::DecompressFailed`] if the payload is not valid for
    ///   this format.
    /// - [`CodecError::DecompressionBomb`] if the output would exceed
    ///   `limit`.
    fn decompress(&self, data: &[u8], limit: usize) -> Result<Vec<u8>, CodecError>;
}

/// Look up the backend for a compressor id.
///
/// # Errors
///
/// [`CodecError::BackendUnavailable`] for an unknown id, for `Noop`
/// (there is nothing to decompress), and for algorithms whose cargo
/// feature is disabled.
pub fn backend(id: CompressorId) -> Result<&'static dyn Decompressor, CodecError> {
    match id {
        CompressorId::Zlib => Ok(&Zlib),
        #[cfg(feature = "snappy")]
        CompressorId::Snappy => Ok(&Snappy),
        #[cfg(feature = "zstd")]
        CompressorId::Zstd => Ok(&Zstd),
        other => Err(CodecError::BackendUnavailable { compressor: other }),
    }
}

/// Drain `reader` into memory, failing once more than `limit` bytes
/// come out.
fn read_bounded(reader: impl Read, limit: usize) -> Result<Vec<u8>, CodecError> {
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    let mut out = Vec::new();
    reader
        .take(cap)
        .read_to_end(&mut out)
        .map_err(|e| CodecError::DecompressFailed(e.to_string()))?;
    if out.len() > limit {
        return Err(CodecError::DecompressionBomb {
            actual: out.len(),
            limit,
        });
    }
    Ok(out)
}

// ── zlib ──────────────────────────────────────────────────────────────

/// zlib stream (RFC 1950), via `flate2`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Zlib;

impl Decompressor for Zlib {
    fn id(&self) -> CompressorId {
        CompressorId::Zlib
    }

    fn decompress(&self, data: &[u8], limit: usize) -> Result<Vec<u8>, CodecError> {
        read_bounded(flate2::read::ZlibDecoder::new(data), limit)
    }
}

// ── snappy ────────────────────────────────────────────────────────────

/// Raw snappy block (not the framed format), via `snap`.
#[cfg(feature = "snappy")]
#[derive(Clone, Copy, Debug, Default)]
pub struct Snappy;

#[cfg(feature = "snappy")]
impl Decompressor for Snappy {
    fn id(&self) -> CompressorId {
        CompressorId::Snappy
    }

    fn decompressed_len(&self, data: &[u8]) -> Option<usize> {
        snap::raw::decompress_len(data).ok()
    }

    fn decompress(&self, data: &[u8], limit: usize) -> Result<Vec<u8>, CodecError> {
        let len = snap::raw::decompress_len(data)
            .map_err(|e| CodecError::DecompressFailed(e.to_string()))?;
        if len > limit {
            return Err(CodecError::DecompressionBomb { actual: len, limit });
        }
        snap::raw::Decoder::new()
            .decompress_vec(data)
            .map_err(|e| CodecError::DecompressFailed(e.to_string()))
    }
}

// ── zstd ──────────────────────────────────────────────────────────────

/// zstd frame, via `zstd`.
#[cfg(feature = "zstd")]
#[derive(Clone, Copy, Debug, Default)]
pub struct Zstd;

#[cfg(feature = "zstd")]
impl Decompressor for Zstd {
    fn id(&self) -> CompressorId {
        CompressorId::Zstd
    }

    fn decompress(&self, data: &[u8], limit: usize) -> Result<Vec<u8>, CodecError> {
        let decoder = zstd::stream::read::Decoder::new(data)
            .map_err(|e| CodecError::DecompressFailed(e.to_string()))?;
        read_bounded(decoder, limit)
    }
}
