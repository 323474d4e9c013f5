use mongo_types::CompressorId;
use mongo_wire::WireError;

/// Errors from splitting and reading frames.
///
/// Decoding a single message never fails: problems inside a message are
/// diagnostics on the `DecodedMessage`. These errors are for the layer
/// that finds message boundaries in a byte stream, where a bad length
/// means there is no next message to decode.
///
/// ```text
///   DecodeError
///   ├── Wire(WireError)        ← stream ended inside a frame
///   ├── InvalidFrameLength     ← length prefix below 16 or above the limit
///   └── Io(std::io::Error)     ← from the underlying async reader
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error(transparent)]
    Wire(#[from] WireError),

    /// A frame's length prefix cannot describe a message: shorter than
    /// a header, or longer than `DecoderConfig::max_message_size`.
    #[error("invalid frame length {length} at offset {offset}")]
    InvalidFrameLength { offset: usize, length: i32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure of a decompression backend.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The backend could not decode the payload (corrupt data, wrong
    /// format, truncated stream).
    #[error("decompression failed: {0}")]
    DecompressFailed(String),

    /// Decompressed output would exceed the configured limit. `actual`
    /// is a lower bound when the backend stopped early.
    #[error("decompressed size {actual} exceeds limit {limit}")]
    DecompressionBomb { actual: usize, limit: usize },

    /// No backend for this compressor id in this build.
    #[error("no decompression backend for {}", .compressor.name())]
    BackendUnavailable { compressor: CompressorId },
}
