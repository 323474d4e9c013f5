/// Compressor identifiers carried in the OP_COMPRESSED envelope.
///
/// ```text
/// ┌──────┬─────────┬─────────────────────────────┐
/// │ Wire │ Variant │ Backend                     │
/// ├──────┼─────────┼─────────────────────────────┤
/// │ 0    │ Noop    │ payload is the inner body   │
/// │ 1    │ Snappy  │ raw snappy block            │
/// │ 2    │ Zlib    │ zlib stream (always built)  │
/// │ 3    │ Zstd    │ zstd frame                  │
/// └──────┴─────────┴─────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompressorId {
    Noop,
    Snappy,
    Zlib,
    Zstd,
    Unknown(u8),
}

impl CompressorId {
    pub fn from_wire_byte(b: u8) -> Self {
        match b {
            0 => Self::Noop,
            1 => Self::Snappy,
            2 => Self::Zlib,
            3 => Self::Zstd,
            other => Self::Unknown(other),
        }
    }

    pub fn to_wire_byte(self) -> u8 {
        match self {
            Self::Noop => 0,
            Self::Snappy => 1,
            Self::Zlib => 2,
            Self::Zstd => 3,
            Self::Unknown(b) => b,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Noop => "Noop (Uncompressed)",
            Self::Snappy => "Snappy",
            Self::Zlib => "Zlib",
            Self::Zstd => "Zstd",
            Self::Unknown(_) => "Unknown",
        }
    }
}

/// The 9-byte envelope in front of a compressed payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompressionInfo {
    /// Opcode of the wrapped message.
    pub original_opcode: i32,
    /// Size the sender claims the payload inflates to. Informational;
    /// the decoder bounds decompression by its own limit instead.
    pub uncompressed_size: i32,
    pub compressor: CompressorId,
    /// Bytes of compressed payload following the envelope.
    pub payload_len: usize,
}

impl Default for CompressionInfo {
    fn default() -> Self {
        Self {
            original_opcode: 0,
            uncompressed_size: 0,
            compressor: CompressorId::Noop,
            payload_len: 0,
        }
    }
}
