/// Low-level read failures.
///
/// Every variant means the same thing to the layers above: a read could
/// not be satisfied from the bytes that were actually captured, so the
/// current message cannot be decoded any further. The decoder surfaces
/// these as a `BufferUnderrun` and keeps whatever it had built so far.
///
/// Offsets are relative to the start of the buffer handed to the read
/// (the message frame, or a decompressed payload).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// A fixed-width or length-prefixed read ran past the end of the buffer.
    #[error("unexpected end of input at offset {offset}: needed {needed} bytes, {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A NUL-terminated string had no terminator before the buffer ended.
    #[error("unterminated string at offset {offset}")]
    UnterminatedString { offset: usize },

    /// A length field read from the wire was negative.
    #[error("negative length {value} at offset {offset}")]
    NegativeLength { offset: usize, value: i32 },
}

impl WireError {
    /// Offset of the read that failed.
    pub fn offset(&self) -> usize {
        match self {
            Self::UnexpectedEof { offset, .. }
            | Self::UnterminatedString { offset }
            | Self::NegativeLength { offset, .. } => *offset,
        }
    }
}
