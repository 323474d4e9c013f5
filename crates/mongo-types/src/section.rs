use crate::bson::BsonDocument;

/// OP_MSG section kind byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SectionKind {
  Body,
  DocumentSequence,
  Unknown(u8),
}

impl SectionKind {
  pub fn from_wire_byte(b: u8) -> Self {
    match b {
      0 => Self::Body,
      1 => Self::DocumentSequence,
      other => Self::Unknown(other),
    }
  }

  pub fn to_wire_byte(self) -> u8 {
    match self {
      Self::Body => 0,
      Self::DocumentSequence => 1,
      Self::Unknown(b) => b,
    }
  }

  pub fn name(self) -> &'static str {
    match self {
      Self::Body => "Body",
      Self::DocumentSequence => "Document Sequence",
      Self::Unknown(_) => "Unknown",
    }
  }
}

/// One section of an OP_MSG.
///
/// ```text
/// kind 0  ┌──────┬───────────────┐
///         │ 0x00 │ document      │
///         └──────┴───────────────┘
/// kind 1  ┌──────┬──────────┬────────────┬─────────────────┐
///         │ 0x01 │ size i32 │ identifier │ document*       │
///         └──────┴──────────┴────────────┴─────────────────┘
/// ```
///
/// `size` counts itself, the identifier and the documents, but not the
/// kind byte.
#[derive(Clone, Debug, PartialEq)]
pub enum Section {
  Body(BsonDocument),
  DocumentSequence {
    size: i32,
    identifier: String,
    documents: Vec<BsonDocument>,
  },
  /// A kind byte this decoder does not know. The section was skipped
  /// using the length that follows the kind byte.
  Unknown { kind: u8, size: i32 },
}

impl Section {
  pub fn kind(&self) -> SectionKind {
    match self {
      Self::Body(_) => SectionKind::Body,
      Self::DocumentSequence { .. } => SectionKind::DocumentSequence,
      Self::Unknown { kind, .. } => SectionKind::Unknown(*kind),
    }
  }
}
