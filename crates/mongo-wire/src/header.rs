use crate::error::WireError;
use crate::primitives::{read_i32_le, read_u32_le};

/// Total header size in bytes (fixed).
pub const HEADER_SIZE: usize = 16;

/// Known opcode numbers.
///
/// These are the raw values found at header offset 12. The `mongo-types`
/// crate defines the `OpCode` enum built on top of them.
pub mod opcode {
    pub const REPLY: i32 = 1;
    pub const MESSAGE: i32 = 1000;
    pub const UPDATE: i32 = 2001;
    pub const INSERT: i32 = 2002;
    pub const RESERVED: i32 = 2003;
    pub const QUERY: i32 = 2004;
    pub const GET_MORE: i32 = 2005;
    pub const DELETE: i32 = 2006;
    pub const KILL_CURSORS: i32 = 2007;
    pub const COMMAND: i32 = 2010;
    pub const COMMAND_REPLY: i32 = 2011;
    pub const COMPRESSED: i32 = 2012;
    pub const MSG: i32 = 2013;
}

/// Standard message header — the first 16 bytes of every wire message.
///
/// ```text
/// ┌────────┬─────────┬──────────────────────────────────────────┐
/// │ Offset │ Size    │ Description                              │
/// ├────────┼─────────┼──────────────────────────────────────────┤
/// │ 0x00   │ 4 bytes │ messageLength (int32, includes header)   │
/// │ 0x04   │ 4 bytes │ requestID                                │
/// │ 0x08   │ 4 bytes │ responseTo                               │
/// │ 0x0C   │ 4 bytes │ opCode (int32)                           │
/// └────────┴─────────┴──────────────────────────────────────────┘
/// ```
///
/// All four fields are little-endian.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MsgHeader {
    pub length: i32,
    pub request_id: u32,
    pub response_to: u32,
    pub opcode: i32,
}

impl MsgHeader {
    /// Parse a header from the first 16 bytes of the provided buffer.
    ///
    /// No field is validated here: a length that disagrees with the
    /// captured byte count or an unknown opcode is the framer's problem,
    /// not a header parse failure.
    ///
    /// # Errors
    ///
    /// [`WireError::UnexpectedEof`] if the buffer is shorter than
    /// [`HEADER_SIZE`].
    pub fn read_from(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < HEADER_SIZE {
            return Err(WireError::UnexpectedEof {
                offset: 0,
                needed: HEADER_SIZE,
                available: buf.len(),
            });
        }

        Ok(Self {
            length: read_i32_le(buf, 0)?,
            request_id: read_u32_le(buf, 4)?,
            response_to: read_u32_le(buf, 8)?,
            opcode: read_i32_le(buf, 12)?,
        })
    }

    /// The declared message length as a usable byte count, if it can
    /// describe a message at all (at least a full header).
    pub fn message_len(&self) -> Option<usize> {
        usize::try_from(self.length)
            .ok()
            .filter(|&len| len >= HEADER_SIZE)
    }
}
