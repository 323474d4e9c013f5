use mongo_types::{DataSource, Diagnostic, DiagnosticKind};
use tracing::debug;

use crate::config::DecoderConfig;

/// Per-message decode state.
///
/// One of these is created for every top-level `decode_message` call and
/// dropped when it returns. It owns everything that changes while a
/// message is walked: the document nesting depth, whether we are inside a
/// compression envelope, which buffer offsets currently refer to, the
/// effective opcode and the diagnostics collected so far. Nothing here is
/// shared between messages, so concurrent decodes need no coordination.
pub(crate) struct DecodeContext<'c> {
    config: &'c DecoderConfig,
    depth: usize,
    compression_depth: usize,
    source: DataSource,
    effective_opcode: Option<i32>,
    diagnostics: Vec<Diagnostic>,
}

impl<'c> DecodeContext<'c> {
    pub(crate) fn new(config: &'c DecoderConfig) -> Self {
        Self {
            config,
            depth: 0,
            compression_depth: 0,
            source: DataSource::Frame,
            effective_opcode: None,
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn config(&self) -> &'c DecoderConfig {
        self.config
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    /// Step into a document. Returns `false`, leaving the depth as it
    /// was, when that would go past `max_nesting`.
    pub(crate) fn enter_document(&mut self) -> bool {
        if self.depth >= self.config.max_nesting {
            return false;
        }
        self.depth += 1;
        true
    }

    pub(crate) fn leave_document(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub(crate) fn in_compression(&self) -> bool {
        self.compression_depth > 0
    }

    /// Run `f` with offsets attributed to `source` and the compression
    /// depth raised by one.
    ///
    /// On success both are restored. On error they are left as they
    /// were at the failure: an error ends the whole message, and the
    /// framer reports the underrun against the buffer it happened in.
    pub(crate) fn within_envelope<T, E>(
        &mut self,
        source: DataSource,
        f: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E> {
        let saved = std::mem::replace(&mut self.source, source);
        self.compression_depth += 1;
        let res = f(self);
        if res.is_ok() {
            self.compression_depth -= 1;
            self.source = saved;
        }
        res
    }

    pub(crate) fn set_effective_opcode(&mut self, opcode: i32) {
        self.effective_opcode = Some(opcode);
    }

    pub(crate) fn effective_opcode(&self) -> Option<i32> {
        self.effective_opcode
    }

    /// Record a diagnostic against the current buffer.
    pub(crate) fn report(&mut self, offset: usize, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        debug!(offset, %kind, source = ?self.source, "{message}");
        self.diagnostics.push(Diagnostic {
            source: self.source,
            offset,
            kind,
            message,
        });
    }

    pub(crate) fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
