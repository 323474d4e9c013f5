#![warn(clippy::pedantic)]

pub mod element_type;
pub mod bson;
pub mod opcode;
pub mod flags;
pub mod section;
pub mod compression;
pub mod body;
pub mod diagnostic;

pub use body::{
  FullCollectionName, OpCommand, OpCommandReply, OpCompressed, OpDelete, OpGetMore, OpInsert,
  OpKillCursors, OpMessage, OpMsg, OpQuery, OpReply, OpUpdate, OpcodeBody,
};
pub use bson::{Binary, BinarySubtype, BsonDocument, BsonElement, BsonValue, ObjectId};
pub use compression::{CompressionInfo, CompressorId};
pub use diagnostic::{DataSource, Diagnostic, DiagnosticKind};
pub use element_type::ElementType;
pub use flags::{DeleteFlags, InsertFlags, MsgFlags, QueryFlags, ReplyFlags, UpdateFlags};
pub use opcode::OpCode;
pub use section::{Section, SectionKind};
