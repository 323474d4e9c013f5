use mongo_wire::{HEADER_SIZE, WireError};
use mongo_wire::primitives::read_i32_le;

use crate::config::DecoderConfig;
use crate::error::DecodeError;

/// Split a capture of back-to-back wire messages into frames.
///
/// Each frame starts with its own int32 length, which includes the
/// length field itself. Iteration stops at the end of the input or after
/// the first error.
///
/// ```text
///   ┌─────┬────────────────┬─────┬──────────────┬─────┬─────────
///   │ len │ rest of frame  │ len │ rest         │ len │ ...
///   └─────┴────────────────┴─────┴──────────────┴─────┴─────────
///   ◄──────── len ────────►◄────── len ───────►
/// ```
pub fn frames<'a>(bytes: &'a [u8], config: &DecoderConfig) -> Frames<'a> {
  Frames {
    bytes,
    offset: 0,
    max: config.max_message_size,
    done: false,
  }
}

/// Iterator returned by [`frames`].
#[derive(Clone, Debug)]
pub struct Frames<'a> {
  bytes: &'a [u8],
  offset: usize,
  max: usize,
  done: bool,
}

impl<'a> Frames<'a> {
  /// Offset of the next frame in the input.
  pub fn offset(&self) -> usize {
    self.offset
  }

  fn next_frame(&mut self) -> Result<&'a [u8], DecodeError> {
    let length = read_i32_le(self.bytes, self.offset)?;
    let len = frame_len(length, self.max).ok_or(DecodeError::InvalidFrameLength {
      offset: self.offset,
      length,
    })?;
    let available = self.bytes.len() - self.offset;
    if len > available {
      return Err(
        WireError::UnexpectedEof {
          offset: self.offset,
          needed: len,
          available,
        }
        .into(),
      );
    }
    let frame = &self.bytes[self.offset..self.offset + len];
    self.offset += len;
    Ok(frame)
  }
}

impl<'a> Iterator for Frames<'a> {
  type Item = Result<&'a [u8], DecodeError>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.done || self.offset >= self.bytes.len() {
      return None;
    }
    let res = self.next_frame();
    if res.is_err() {
      self.done = true;
    }
    Some(res)
  }
}

/// A length prefix as a frame size, if it is at least a header and at
/// most `max`.
pub(crate) fn frame_len(length: i32, max: usize) -> Option<usize> {
  usize::try_from(length)
    .ok()
    .filter(|&len| (HEADER_SIZE..=max).contains(&len))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::fixtures::{DocBuilder, message, query_message};
  use mongo_wire::header::opcode;

  #[test]
  fn splits_concatenated_messages() {
    let first = query_message(1, "a.b", &DocBuilder::new());
    let second = message(2, 1, opcode::MESSAGE, b"hi\0");
    let mut capture = first.clone();
    capture.extend_from_slice(&second);

    let out: Vec<_> = frames(&capture, &DecoderConfig::default())
      .collect::<Result<_, _>>()
      .unwrap();
    assert_eq!(out, vec![first.as_slice(), second.as_slice()]);
  }

  #[test]
  fn empty_input_has_no_frames() {
    assert_eq!(frames(&[], &DecoderConfig::default()).count(), 0);
  }

  #[test]
  fn short_final_frame_is_underrun() {
    let mut capture = message(1, 0, opcode::MESSAGE, b"x\0");
    let whole = capture.len();
    capture.extend_from_slice(&message(2, 0, opcode::MESSAGE, b"yy\0")[..10]);

    let mut it = frames(&capture, &DecoderConfig::default());
    assert!(it.next().unwrap().is_ok());
    assert_eq!(it.offset(), whole);
    assert!(matches!(
      it.next(),
      Some(Err(DecodeError::Wire(WireError::UnexpectedEof { needed: 19, available: 10, .. })))
    ));
    assert!(it.next().is_none());
  }

  #[test]
  fn partial_length_prefix_is_underrun() {
    let mut it = frames(&[0x20, 0x00], &DecoderConfig::default());
    assert!(matches!(it.next(), Some(Err(DecodeError::Wire(_)))));
    assert!(it.next().is_none());
  }

  #[test]
  fn bad_lengths_stop_iteration() {
    let config = DecoderConfig {
      max_message_size: 64,
      ..DecoderConfig::default()
    };
    for length in [0i32, 15, -4, 65] {
      let mut bytes = length.to_le_bytes().to_vec();
      bytes.resize(80, 0);
      let mut it = frames(&bytes, &config);
      assert!(matches!(
        it.next(),
        Some(Err(DecodeError::InvalidFrameLength { offset: 0, length: l })) if l == length
      ));
      assert!(it.next().is_none());
    }
  }
}
