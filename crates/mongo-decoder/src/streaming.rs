use mongo_wire::WireError;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::config::DecoderConfig;
use crate::decoder::{DecodedMessage, MongoDecoder};
use crate::error::DecodeError;
use crate::frames::frame_len;

/// Asynchronous frame reader. Yields decoded messages one at a time
/// without buffering the whole stream.
///
/// Each call to [`next`](Self::next) reads exactly one frame: the int32
/// length prefix, then the rest of the message. Nothing is read ahead,
/// so the caller controls backpressure by how often it awaits.
///
/// ```text
///   next() ─► read 4 bytes ─► validate length ─► read up to len-4 ─► decode
///                │                  │                   │
///                ▼                  ▼                   ▼
///            EOF: None     InvalidFrameLength    Wire(UnexpectedEof)
/// ```
///
/// Any error ends the stream: later calls return `None`.
///
/// # Example
///
/// ```rust,no_run
/// use mongo_decoder::StreamingDecoder;
/// use tokio::io::AsyncRead;
///
/// async fn dump(reader: impl AsyncRead + Unpin) {
///     let mut stream = StreamingDecoder::new(reader);
///     while let Some(msg) = stream.next().await {
///         match msg {
///             Ok(msg) => println!("{}", msg.summary()),
///             Err(e) => eprintln!("stream error: {e}"),
///         }
///     }
/// }
/// ```
pub struct StreamingDecoder<R> {
  reader: R,
  decoder: MongoDecoder,
  /// Frame buffer, reused across messages.
  buf: Vec<u8>,
  /// Stream offset of the next frame.
  position: usize,
  done: bool,
}

impl<R: AsyncRead + Unpin> StreamingDecoder<R> {
  /// Create a streaming decoder with the default limits.
  #[must_use]
  pub fn new(reader: R) -> Self {
    Self::with_config(reader, DecoderConfig::default())
  }

  #[must_use]
  pub fn with_config(reader: R, config: DecoderConfig) -> Self {
    Self {
      reader,
      decoder: MongoDecoder::new(config),
      buf: Vec::with_capacity(4096),
      position: 0,
      done: false,
    }
  }

  /// Stream offset of the next frame.
  pub fn position(&self) -> usize {
    self.position
  }

  /// Read and decode the next message.
  ///
  /// Returns `None` at a clean end of stream (no bytes of a new frame
  /// read) and after any error.
  pub async fn next(&mut self) -> Option<Result<DecodedMessage, DecodeError>> {
    if self.done {
      return None;
    }
    let res = self.read_frame().await.transpose()?;
    if res.is_err() {
      self.done = true;
    }
    Some(res.map(|()| {
      let msg = self.decoder.decode(&self.buf);
      self.position += self.buf.len();
      msg
    }))
  }

  /// Fill `buf` with the next frame. `Ok(None)` on clean EOF.
  async fn read_frame(&mut self) -> Result<Option<()>, DecodeError> {
    let mut prefix = [0u8; 4];
    let got = self.read_fully(&mut prefix).await?;
    if got == 0 {
      self.done = true;
      return Ok(None);
    }
    if got < prefix.len() {
      return Err(self.eof(prefix.len(), got));
    }

    let length = i32::from_le_bytes(prefix);
    let Some(len) = frame_len(length, self.decoder.config().max_message_size) else {
      return Err(DecodeError::InvalidFrameLength {
        offset: self.position,
        length,
      });
    };
    debug!(offset = self.position, length, "frame");

    // The buffer grows with the bytes that actually arrive, not with the
    // length prefix.
    self.buf.clear();
    self.buf.extend_from_slice(&prefix);
    let rest = u64::try_from(len - 4).unwrap_or(u64::MAX);
    let got = (&mut self.reader).take(rest).read_to_end(&mut self.buf).await?;
    if got < len - 4 {
      return Err(self.eof(len, 4 + got));
    }
    Ok(Some(()))
  }

  /// Read until `buf` is full or the reader is exhausted. Returns the
  /// bytes read.
  async fn read_fully(&mut self, buf: &mut [u8]) -> Result<usize, DecodeError> {
    let mut filled = 0;
    while filled < buf.len() {
      let n = self.reader.read(&mut buf[filled..]).await?;
      if n == 0 {
        break;
      }
      filled += n;
    }
    Ok(filled)
  }

  fn eof(&self, needed: usize, available: usize) -> DecodeError {
    WireError::UnexpectedEof {
      offset: self.position,
      needed,
      available,
    }
    .into()
  }
}
