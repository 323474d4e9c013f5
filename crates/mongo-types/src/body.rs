use crate::bson::BsonDocument;
use crate::compression::CompressionInfo;
use crate::flags::{DeleteFlags, InsertFlags, MsgFlags, QueryFlags, ReplyFlags, UpdateFlags};
use crate::opcode::OpCode;
use crate::section::Section;

/// The decoded body of one wire message, one variant per opcode that has
/// a body decoder.
///
/// Every struct here derives `Default` because the decoder builds bodies
/// field by field and hands back whatever it has when the capture runs
/// out. A field still at its default after a truncated decode simply was
/// not reached; `DecodedMessage::truncated` says where reading stopped.
/// Document fields that may not be reached are `Option`s so that "absent"
/// and "empty document" stay distinguishable.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum OpcodeBody {
  /// Unknown or reserved opcode, or no header to dispatch on.
  #[default]
  Empty,
  Reply(OpReply),
  Message(OpMessage),
  Update(OpUpdate),
  Insert(OpInsert),
  Query(OpQuery),
  GetMore(OpGetMore),
  Delete(OpDelete),
  KillCursors(OpKillCursors),
  Command(OpCommand),
  CommandReply(OpCommandReply),
  Compressed(OpCompressed),
  Msg(OpMsg),
}

impl OpcodeBody {
  /// The opcode whose layout this body follows, or `None` for `Empty`.
  pub fn opcode(&self) -> Option<OpCode> {
    Some(match self {
      Self::Empty => return None,
      Self::Reply(_) => OpCode::Reply,
      Self::Message(_) => OpCode::Message,
      Self::Update(_) => OpCode::Update,
      Self::Insert(_) => OpCode::Insert,
      Self::Query(_) => OpCode::Query,
      Self::GetMore(_) => OpCode::GetMore,
      Self::Delete(_) => OpCode::Delete,
      Self::KillCursors(_) => OpCode::KillCursors,
      Self::Command(_) => OpCode::Command,
      Self::CommandReply(_) => OpCode::CommandReply,
      Self::Compressed(_) => OpCode::Compressed,
      Self::Msg(_) => OpCode::Msg,
    })
  }

  /// Look through any compression envelope to the body it carries.
  pub fn innermost(&self) -> &OpcodeBody {
    match self {
      Self::Compressed(c) => c.inner.innermost(),
      other => other,
    }
  }
}

/// A `db.collection` namespace string as carried by the legacy opcodes.
///
/// Split at the first `.`; a name without one is all database and no
/// collection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FullCollectionName {
  pub full: String,
  pub database: String,
  pub collection: String,
}

impl FullCollectionName {
  pub fn parse(full: impl Into<String>) -> Self {
    let full = full.into();
    let (database, collection) = match full.split_once('.') {
      Some((db, coll)) => (db.to_owned(), coll.to_owned()),
      None => (full.clone(), String::new()),
    };
    Self {
      full,
      database,
      collection,
    }
  }
}

/// OP_REPLY (1).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OpReply {
  pub flags: ReplyFlags,
  pub cursor_id: i64,
  pub starting_from: i32,
  pub number_returned: i32,
  pub documents: Vec<BsonDocument>,
}

/// OP_MESSAGE (1000): a bare diagnostic string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OpMessage {
  pub message: String,
}

/// OP_UPDATE (2001).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OpUpdate {
  pub zero: i32,
  pub collection: FullCollectionName,
  pub flags: UpdateFlags,
  pub selector: Option<BsonDocument>,
  pub update: Option<BsonDocument>,
}

/// OP_INSERT (2002).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OpInsert {
  pub flags: InsertFlags,
  pub collection: FullCollectionName,
  pub documents: Vec<BsonDocument>,
}

/// OP_QUERY (2004).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OpQuery {
  pub flags: QueryFlags,
  pub collection: FullCollectionName,
  pub number_to_skip: i32,
  pub number_to_return: i32,
  pub query: Option<BsonDocument>,
  /// Zero or more projection documents following the query.
  pub return_field_selectors: Vec<BsonDocument>,
}

/// OP_GET_MORE (2005).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OpGetMore {
  pub zero: i32,
  pub collection: FullCollectionName,
  pub number_to_return: i32,
  pub cursor_id: i64,
}

/// OP_DELETE (2006).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OpDelete {
  pub zero: i32,
  pub collection: FullCollectionName,
  pub flags: DeleteFlags,
  pub selector: Option<BsonDocument>,
}

/// OP_KILL_CURSORS (2007).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OpKillCursors {
  pub zero: i32,
  /// As declared. The ids themselves are read until the message ends,
  /// regardless of this count.
  pub number_of_cursor_ids: i32,
  pub cursor_ids: Vec<i64>,
}

/// OP_COMMAND (2010).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OpCommand {
  pub database: String,
  pub command_name: String,
  pub metadata: Option<BsonDocument>,
  pub command_args: Option<BsonDocument>,
}

/// OP_COMMANDREPLY (2011).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OpCommandReply {
  pub metadata: Option<BsonDocument>,
  pub command_reply: Option<BsonDocument>,
  pub output_docs: Option<BsonDocument>,
}

/// OP_COMPRESSED (2012).
///
/// `inner` is the decoded body of the wrapped message, or `Empty` when
/// the payload could not be unwrapped (a diagnostic says why).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OpCompressed {
  pub info: CompressionInfo,
  pub inner: Box<OpcodeBody>,
  /// True when `inner` was decoded from a decompressed buffer rather
  /// than straight from the frame (the noop compressor).
  pub decompressed: bool,
}

/// OP_MSG (2013).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OpMsg {
  pub flags: MsgFlags,
  pub sections: Vec<Section>,
  /// Raw CRC-32C trailer, present when the flags say so. Not verified.
  pub checksum: Option<u32>,
}

impl OpMsg {
  /// The single kind-0 section, if any.
  pub fn body(&self) -> Option<&BsonDocument> {
    self.sections.iter().find_map(|s| match s {
      Section::Body(doc) => Some(doc),
      _ => None,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn collection_name_split_at_first_dot() {
    let name = FullCollectionName::parse("test.system.indexes");
    assert_eq!(name.database, "test");
    assert_eq!(name.collection, "system.indexes");
    assert_eq!(name.full, "test.system.indexes");
  }

  #[test]
  fn collection_name_without_dot() {
    let name = FullCollectionName::parse("admin");
    assert_eq!(name.database, "admin");
    assert_eq!(name.collection, "");
  }

  #[test]
  fn innermost_unwraps_envelopes() {
    let body = OpcodeBody::Compressed(OpCompressed {
      inner: Box::new(OpcodeBody::Message(OpMessage {
        message: "hi".into(),
      })),
      ..OpCompressed::default()
    });
    assert_eq!(body.opcode(), Some(OpCode::Compressed));
    assert_eq!(body.innermost().opcode(), Some(OpCode::Message));
    assert_eq!(OpcodeBody::Empty.opcode(), None);
  }

  #[test]
  fn msg_body_finds_kind_zero() {
    let msg = OpMsg {
      sections: vec![
        Section::Unknown { kind: 5, size: 4 },
        Section::Body(BsonDocument {
          length: 5,
          ..BsonDocument::default()
        }),
      ],
      ..OpMsg::default()
    };
    assert_eq!(msg.body().map(|d| d.length), Some(5));
  }
}
