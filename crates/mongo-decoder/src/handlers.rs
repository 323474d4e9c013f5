use mongo_types::{
    BsonDocument, DeleteFlags, FullCollectionName, InsertFlags, OpCommand, OpCommandReply,
    OpDelete, OpGetMore, OpInsert, OpKillCursors, OpMessage, OpQuery, OpReply, OpUpdate,
    OpcodeBody, QueryFlags, ReplyFlags, UpdateFlags,
};
use mongo_wire::WireError;
use mongo_wire::primitives::{read_cstring, read_i32_le, read_i64_le, read_u32_le};

use crate::context::DecodeContext;
use crate::document::read_document;

// Legacy opcode bodies. Every handler has the dispatcher's signature:
// it gets the message buffer and the offset where its body starts, fills
// in `body`, and returns the bytes it consumed.
//
// "Until the buffer ends" loops (insert documents, query projections,
// kill-cursor ids) stop at the end of the message buffer, which the
// framer has already cut to the declared message length.

/// Build a body of type `T` through `read`, then store it in `body` whether
/// or not `read` finished.
pub(crate) fn decode_into<T: Default>(
    body: &mut OpcodeBody,
    wrap: fn(T) -> OpcodeBody,
    read: impl FnOnce(&mut T) -> Result<usize, WireError>,
) -> Result<usize, WireError> {
    let mut value = T::default();
    let res = read(&mut value);
    *body = wrap(value);
    res
}

/// Read a document into an optional slot, keeping partial results.
pub(crate) fn read_document_into(
    ctx: &mut DecodeContext<'_>,
    buf: &[u8],
    offset: usize,
    slot: &mut Option<BsonDocument>,
) -> Result<usize, WireError> {
    let mut doc = BsonDocument::default();
    let res = read_document(ctx, buf, offset, &mut doc);
    *slot = Some(doc);
    res
}

/// Read a document and append it to `docs`, keeping partial results.
pub(crate) fn push_document(
    ctx: &mut DecodeContext<'_>,
    buf: &[u8],
    offset: usize,
    docs: &mut Vec<BsonDocument>,
) -> Result<usize, WireError> {
    let mut doc = BsonDocument::default();
    let res = read_document(ctx, buf, offset, &mut doc);
    docs.push(doc);
    res
}

fn read_collection(buf: &[u8], offset: usize) -> Result<(FullCollectionName, usize), WireError> {
    let (full, n) = read_cstring(buf, offset)?;
    Ok((FullCollectionName::parse(full), n))
}

// ── OP_REPLY ──────────────────────────────────────────────────────────

pub(crate) fn reply(
    ctx: &mut DecodeContext<'_>,
    buf: &[u8],
    offset: usize,
    body: &mut OpcodeBody,
) -> Result<usize, WireError> {
    decode_into(body, OpcodeBody::Reply, |reply: &mut OpReply| {
        let mut pos = offset;
        reply.flags = ReplyFlags::from_raw(read_u32_le(buf, pos)?);
        pos += 4;
        reply.cursor_id = read_i64_le(buf, pos)?;
        pos += 8;
        reply.starting_from = read_i32_le(buf, pos)?;
        pos += 4;
        reply.number_returned = read_i32_le(buf, pos)?;
        pos += 4;
        for _ in 0..reply.number_returned {
            pos += push_document(ctx, buf, pos, &mut reply.documents)?;
        }
        Ok(pos - offset)
    })
}

// ── OP_MESSAGE ────────────────────────────────────────────────────────

pub(crate) fn message(
    _ctx: &mut DecodeContext<'_>,
    buf: &[u8],
    offset: usize,
    body: &mut OpcodeBody,
) -> Result<usize, WireError> {
    decode_into(body, OpcodeBody::Message, |msg: &mut OpMessage| {
        let (text, n) = read_cstring(buf, offset)?;
        msg.message = text;
        Ok(n)
    })
}

// ── OP_UPDATE ─────────────────────────────────────────────────────────

pub(crate) fn update(
    ctx: &mut DecodeContext<'_>,
    buf: &[u8],
    offset: usize,
    body: &mut OpcodeBody,
) -> Result<usize, WireError> {
    decode_into(body, OpcodeBody::Update, |update: &mut OpUpdate| {
        let mut pos = offset;
        update.zero = read_i32_le(buf, pos)?;
        pos += 4;
        let (collection, n) = read_collection(buf, pos)?;
        update.collection = collection;
        pos += n;
        update.flags = UpdateFlags::from_raw(read_u32_le(buf, pos)?);
        pos += 4;
        pos += read_document_into(ctx, buf, pos, &mut update.selector)?;
        pos += read_document_into(ctx, buf, pos, &mut update.update)?;
        Ok(pos - offset)
    })
}

// ── OP_INSERT ─────────────────────────────────────────────────────────

pub(crate) fn insert(
    ctx: &mut DecodeContext<'_>,
    buf: &[u8],
    offset: usize,
    body: &mut OpcodeBody,
) -> Result<usize, WireError> {
    decode_into(body, OpcodeBody::Insert, |insert: &mut OpInsert| {
        let mut pos = offset;
        insert.flags = InsertFlags::from_raw(read_u32_le(buf, pos)?);
        pos += 4;
        let (collection, n) = read_collection(buf, pos)?;
        insert.collection = collection;
        pos += n;
        while pos < buf.len() {
            pos += push_document(ctx, buf, pos, &mut insert.documents)?;
        }
        Ok(pos - offset)
    })
}

// ── OP_QUERY ──────────────────────────────────────────────────────────

pub(crate) fn query(
    ctx: &mut DecodeContext<'_>,
    buf: &[u8],
    offset: usize,
    body: &mut OpcodeBody,
) -> Result<usize, WireError> {
    decode_into(body, OpcodeBody::Query, |query: &mut OpQuery| {
        let mut pos = offset;
        query.flags = QueryFlags::from_raw(read_u32_le(buf, pos)?);
        pos += 4;
        let (collection, n) = read_collection(buf, pos)?;
        query.collection = collection;
        pos += n;
        query.number_to_skip = read_i32_le(buf, pos)?;
        pos += 4;
        query.number_to_return = read_i32_le(buf, pos)?;
        pos += 4;
        pos += read_document_into(ctx, buf, pos, &mut query.query)?;
        while pos < buf.len() {
            pos += push_document(ctx, buf, pos, &mut query.return_field_selectors)?;
        }
        Ok(pos - offset)
    })
}

// ── OP_GET_MORE ───────────────────────────────────────────────────────

pub(crate) fn get_more(
    _ctx: &mut DecodeContext<'_>,
    buf: &[u8],
    offset: usize,
    body: &mut OpcodeBody,
) -> Result<usize, WireError> {
    decode_into(body, OpcodeBody::GetMore, |get_more: &mut OpGetMore| {
        let mut pos = offset;
        get_more.zero = read_i32_le(buf, pos)?;
        pos += 4;
        let (collection, n) = read_collection(buf, pos)?;
        get_more.collection = collection;
        pos += n;
        get_more.number_to_return = read_i32_le(buf, pos)?;
        pos += 4;
        get_more.cursor_id = read_i64_le(buf, pos)?;
        pos += 8;
        Ok(pos - offset)
    })
}

// ── OP_DELETE ─────────────────────────────────────────────────────────

pub(crate) fn delete(
    ctx: &mut DecodeContext<'_>,
    buf: &[u8],
    offset: usize,
    body: &mut OpcodeBody,
) -> Result<usize, WireError> {
    decode_into(body, OpcodeBody::Delete, |delete: &mut OpDelete| {
        let mut pos = offset;
        delete.zero = read_i32_le(buf, pos)?;
        pos += 4;
        let (collection, n) = read_collection(buf, pos)?;
        delete.collection = collection;
        pos += n;
        delete.flags = DeleteFlags::from_raw(read_u32_le(buf, pos)?);
        pos += 4;
        pos += read_document_into(ctx, buf, pos, &mut delete.selector)?;
        Ok(pos - offset)
    })
}

// ── OP_KILL_CURSORS ───────────────────────────────────────────────────

pub(crate) fn kill_cursors(
    _ctx: &mut DecodeContext<'_>,
    buf: &[u8],
    offset: usize,
    body: &mut OpcodeBody,
) -> Result<usize, WireError> {
    decode_into(body, OpcodeBody::KillCursors, |kill: &mut OpKillCursors| {
        let mut pos = offset;
        kill.zero = read_i32_le(buf, pos)?;
        pos += 4;
        kill.number_of_cursor_ids = read_i32_le(buf, pos)?;
        pos += 4;
        while pos < buf.len() {
            kill.cursor_ids.push(read_i64_le(buf, pos)?);
            pos += 8;
        }
        Ok(pos - offset)
    })
}

// ── OP_COMMAND / OP_COMMANDREPLY ──────────────────────────────────────

pub(crate) fn command(
    ctx: &mut DecodeContext<'_>,
    buf: &[u8],
    offset: usize,
    body: &mut OpcodeBody,
) -> Result<usize, WireError> {
    decode_into(body, OpcodeBody::Command, |command: &mut OpCommand| {
        let mut pos = offset;
        let (database, n) = read_cstring(buf, pos)?;
        command.database = database;
        pos += n;
        let (name, n) = read_cstring(buf, pos)?;
        command.command_name = name;
        pos += n;
        pos += read_document_into(ctx, buf, pos, &mut command.metadata)?;
        pos += read_document_into(ctx, buf, pos, &mut command.command_args)?;
        Ok(pos - offset)
    })
}

pub(crate) fn command_reply(
    ctx: &mut DecodeContext<'_>,
    buf: &[u8],
    offset: usize,
    body: &mut OpcodeBody,
) -> Result<usize, WireError> {
    decode_into(body, OpcodeBody::CommandReply, |reply: &mut OpCommandReply| {
        let mut pos = offset;
        pos += read_document_into(ctx, buf, pos, &mut reply.metadata)?;
        pos += read_document_into(ctx, buf, pos, &mut reply.command_reply)?;
        if pos < buf.len() {
            pos += read_document_into(ctx, buf, pos, &mut reply.output_docs)?;
        }
        Ok(pos - offset)
    })
}
