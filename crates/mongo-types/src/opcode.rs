use mongo_wire::header::opcode;

/// Message opcodes.
///
/// Mirrors the raw numbers in `mongo_wire::header::opcode`. The opcode
/// space is an open `int32`; values this decoder does not know become
/// `Unknown(n)` and decode as an empty body.
///
/// ```text
/// ┌──────┬──────────────┬───────────────────────────────────┐
/// │ Wire │ Variant      │ Notes                             │
/// ├──────┼──────────────┼───────────────────────────────────┤
/// │ 1    │ Reply        │ legacy server reply               │
/// │ 1000 │ Message      │ legacy diagnostic string          │
/// │ 2001 │ Update       │ legacy                            │
/// │ 2002 │ Insert       │ legacy                            │
/// │ 2003 │ Reserved     │ never sent; no body decoder       │
/// │ 2004 │ Query        │ legacy                            │
/// │ 2005 │ GetMore      │ legacy                            │
/// │ 2006 │ Delete       │ legacy                            │
/// │ 2007 │ KillCursors  │ legacy                            │
/// │ 2010 │ Command      │ legacy RPC                        │
/// │ 2011 │ CommandReply │ legacy RPC                        │
/// │ 2012 │ Compressed   │ envelope around another opcode    │
/// │ 2013 │ Msg          │ extensible message format         │
/// └──────┴──────────────┴───────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpCode {
    Reply,
    Message,
    Update,
    Insert,
    Reserved,
    Query,
    GetMore,
    Delete,
    KillCursors,
    Command,
    CommandReply,
    Compressed,
    Msg,
    Unknown(i32),
}

impl OpCode {
    pub fn from_wire(value: i32) -> Self {
        match value {
            opcode::REPLY => Self::Reply,
            opcode::MESSAGE => Self::Message,
            opcode::UPDATE => Self::Update,
            opcode::INSERT => Self::Insert,
            opcode::RESERVED => Self::Reserved,
            opcode::QUERY => Self::Query,
            opcode::GET_MORE => Self::GetMore,
            opcode::DELETE => Self::Delete,
            opcode::KILL_CURSORS => Self::KillCursors,
            opcode::COMMAND => Self::Command,
            opcode::COMMAND_REPLY => Self::CommandReply,
            opcode::COMPRESSED => Self::Compressed,
            opcode::MSG => Self::Msg,
            other => Self::Unknown(other),
        }
    }

    pub fn wire_id(self) -> i32 {
        match self {
            Self::Reply => opcode::REPLY,
            Self::Message => opcode::MESSAGE,
            Self::Update => opcode::UPDATE,
            Self::Insert => opcode::INSERT,
            Self::Reserved => opcode::RESERVED,
            Self::Query => opcode::QUERY,
            Self::GetMore => opcode::GET_MORE,
            Self::Delete => opcode::DELETE,
            Self::KillCursors => opcode::KILL_CURSORS,
            Self::Command => opcode::COMMAND,
            Self::CommandReply => opcode::COMMAND_REPLY,
            Self::Compressed => opcode::COMPRESSED,
            Self::Msg => opcode::MSG,
            Self::Unknown(n) => n,
        }
    }

    /// Display name used in message summaries.
    pub fn name(self) -> &'static str {
        match self {
            Self::Reply => "Reply",
            Self::Message => "Message",
            Self::Update => "Update document",
            Self::Insert => "Insert document",
            Self::Reserved => "Reserved",
            Self::Query => "Query",
            Self::GetMore => "Get More",
            Self::Delete => "Delete document",
            Self::KillCursors => "Kill Cursors",
            Self::Command => "Command Request",
            Self::CommandReply => "Command Reply",
            Self::Compressed => "Compressed Data",
            Self::Msg => "Extensible Message Format",
            Self::Unknown(_) => "Unknown",
        }
    }
}
