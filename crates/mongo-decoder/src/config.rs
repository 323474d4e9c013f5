/// Default BSON nesting ceiling.
pub const DEFAULT_MAX_NESTING: usize = 100;

/// Default largest document the decoder will walk (16,000,000 bytes, the
/// server's own limit).
pub const DEFAULT_MAX_DOCUMENT_SIZE: usize = 16 * 1000 * 1000;

/// Default ceiling on a single decompressed payload (20 MiB).
pub const DEFAULT_MAX_UNCOMPRESSED_SIZE: usize = 20 * 1024 * 1024;

/// Default largest frame accepted by the frame splitter and the
/// streaming reader (the server's `maxMessageSizeBytes`).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 48_000_000;

/// Limits applied while decoding.
///
/// Every limit exists because the corresponding size or depth comes off
/// the wire. The defaults match what a real server enforces, so captures
/// of legitimate traffic never trip them.
///
/// ```text
/// ┌────────────────────────┬──────────────┬───────────────────────────┐
/// │ Field                  │ Default      │ Exceeding it              │
/// ├────────────────────────┼──────────────┼───────────────────────────┤
/// │ max_nesting            │ 100          │ RecursionExceeded         │
/// │ max_document_size      │ 16,000,000   │ DocumentLengthTooLong     │
/// │ max_uncompressed_size  │ 20 MiB       │ CompressedSizeTooLarge    │
/// │ max_message_size       │ 48,000,000   │ InvalidFrameLength        │
/// └────────────────────────┴──────────────┴───────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
    pub max_nesting: usize,
    pub max_document_size: usize,
    pub max_uncompressed_size: usize,
    /// Only consulted when splitting a byte stream into frames;
    /// `decode_message` takes whatever frame it is given.
    pub max_message_size: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_nesting: DEFAULT_MAX_NESTING,
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
            max_uncompressed_size: DEFAULT_MAX_UNCOMPRESSED_SIZE,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}
