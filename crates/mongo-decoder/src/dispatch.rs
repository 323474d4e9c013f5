use mongo_types::{OpCode, OpcodeBody};
use mongo_wire::WireError;
use tracing::debug;

use crate::compressed::decode_compressed;
use crate::context::DecodeContext;
use crate::handlers;
use crate::msg::decode_msg;

/// Signature shared by every opcode body handler.
pub(crate) type Handler =
    fn(&mut DecodeContext<'_>, &[u8], usize, &mut OpcodeBody) -> Result<usize, WireError>;

/// Handler for an opcode. Reserved and unknown opcodes get one that
/// reads nothing.
fn handler_for(opcode: OpCode) -> Handler {
    match opcode {
        OpCode::Reply => handlers::reply,
        OpCode::Message => handlers::message,
        OpCode::Update => handlers::update,
        OpCode::Insert => handlers::insert,
        OpCode::Query => handlers::query,
        OpCode::GetMore => handlers::get_more,
        OpCode::Delete => handlers::delete,
        OpCode::KillCursors => handlers::kill_cursors,
        OpCode::Command => handlers::command,
        OpCode::CommandReply => handlers::command_reply,
        OpCode::Compressed => decode_compressed,
        OpCode::Msg => decode_msg,
        OpCode::Reserved | OpCode::Unknown(_) => no_body,
    }
}

fn no_body(
    _ctx: &mut DecodeContext<'_>,
    _buf: &[u8],
    _offset: usize,
    body: &mut OpcodeBody,
) -> Result<usize, WireError> {
    *body = OpcodeBody::Empty;
    Ok(0)
}

/// Decode the body of `opcode` starting at `offset`.
///
/// Returns the bytes consumed. `body` holds whatever was decoded even
/// when an error comes back.
pub(crate) fn dispatch(
    ctx: &mut DecodeContext<'_>,
    opcode: i32,
    buf: &[u8],
    offset: usize,
    body: &mut OpcodeBody,
) -> Result<usize, WireError> {
    let op = OpCode::from_wire(opcode);
    debug!(opcode, name = op.name(), offset, "dispatch");
    handler_for(op)(ctx, buf, offset, body)
}
