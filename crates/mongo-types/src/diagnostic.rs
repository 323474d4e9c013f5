use std::fmt;

/// Which buffer a diagnostic offset points into.
///
/// Offsets inside a decompressed payload are meaningless against the
/// captured frame, so every diagnostic carries its source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DataSource {
    /// The captured message bytes.
    #[default]
    Frame,
    /// A buffer produced by decompressing an OP_COMPRESSED payload.
    Decompressed,
}

/// Classification of a non-fatal decode problem.
///
/// Everything except `BufferUnderrun` is recoverable: the decoder records
/// it and carries on with the documented fallback. `BufferUnderrun` is
/// recorded once, when the read that failed ends the message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Document nesting went past the configured ceiling.
    RecursionExceeded,
    /// Declared document length below the 5-byte minimum.
    DocumentLengthTooShort,
    /// Declared document length above the configured maximum.
    DocumentLengthTooLong,
    /// The element walk did not land on the document's terminator.
    DocumentLengthMismatch,
    /// A code-with-scope element's total length disagrees with its parts.
    JsScopeLengthMismatch,
    /// Unknown compressor, disabled backend, failed decompression, or a
    /// nested compression envelope.
    UnsupportedCompression,
    /// Decompressed size would exceed the configured ceiling.
    CompressedSizeTooLarge,
    /// OP_MSG section with an unrecognized kind byte.
    UnknownSectionKind,
    /// Bytes left over after the body was decoded.
    TrailingUnknownData,
    /// A read ran past the captured bytes; decoding stopped.
    BufferUnderrun,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RecursionExceeded => "recursion-exceeded",
            Self::DocumentLengthTooShort => "document-length-too-short",
            Self::DocumentLengthTooLong => "document-length-too-long",
            Self::DocumentLengthMismatch => "document-length-mismatch",
            Self::JsScopeLengthMismatch => "js-scope-length-mismatch",
            Self::UnsupportedCompression => "unsupported-compression",
            Self::CompressedSizeTooLarge => "compressed-size-too-large",
            Self::UnknownSectionKind => "unknown-section-kind",
            Self::TrailingUnknownData => "trailing-unknown-data",
            Self::BufferUnderrun => "buffer-underrun",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded decode problem: where, what, and a human-readable note.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub source: DataSource,
    pub offset: usize,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let src = match self.source {
            DataSource::Frame => "",
            DataSource::Decompressed => " (decompressed)",
        };
        write!(f, "[{}] at {}{}: {}", self.kind, self.offset, src, self.message)
    }
}
