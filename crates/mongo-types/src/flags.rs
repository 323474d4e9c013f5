// Per-opcode flag words.
//
// Each is a newtype over the raw little-endian u32 so that unknown bits
// survive decoding untouched. Named constants cover the bits the
// protocol defines; the `is_*` accessors are what callers should use.

/// OP_REPLY `responseFlags`.
///
/// Bit layout:
///   bit 0 = cursor not found
///   bit 1 = query failure
///   bit 2 = shard config stale
///   bit 3 = await capable
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplyFlags(u32);

impl ReplyFlags {
    pub const CURSOR_NOT_FOUND: Self = Self(1 << 0);
    pub const QUERY_FAILURE: Self = Self(1 << 1);
    pub const SHARD_CONFIG_STALE: Self = Self(1 << 2);
    pub const AWAIT_CAPABLE: Self = Self(1 << 3);

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn is_cursor_not_found(self) -> bool {
        self.0 & Self::CURSOR_NOT_FOUND.0 != 0
    }

    pub fn is_query_failure(self) -> bool {
        self.0 & Self::QUERY_FAILURE.0 != 0
    }

    pub fn is_shard_config_stale(self) -> bool {
        self.0 & Self::SHARD_CONFIG_STALE.0 != 0
    }

    pub fn is_await_capable(self) -> bool {
        self.0 & Self::AWAIT_CAPABLE.0 != 0
    }
}

/// OP_UPDATE flags: bit 0 = upsert, bit 1 = multi update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateFlags(u32);

impl UpdateFlags {
    pub const UPSERT: Self = Self(1 << 0);
    pub const MULTI_UPDATE: Self = Self(1 << 1);

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn is_upsert(self) -> bool {
        self.0 & Self::UPSERT.0 != 0
    }

    pub fn is_multi_update(self) -> bool {
        self.0 & Self::MULTI_UPDATE.0 != 0
    }
}

/// OP_INSERT flags: bit 0 = continue on error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InsertFlags(u32);

impl InsertFlags {
    pub const CONTINUE_ON_ERROR: Self = Self(1 << 0);

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn is_continue_on_error(self) -> bool {
        self.0 & Self::CONTINUE_ON_ERROR.0 != 0
    }
}

/// OP_QUERY flags.
///
/// Bit layout (bit 0 is reserved):
///   bit 1 = tailable cursor
///   bit 2 = slave ok
///   bit 3 = oplog replay
///   bit 4 = no cursor timeout
///   bit 5 = await data
///   bit 6 = exhaust
///   bit 7 = partial
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueryFlags(u32);

impl QueryFlags {
    pub const TAILABLE_CURSOR: Self = Self(1 << 1);
    pub const SLAVE_OK: Self = Self(1 << 2);
    pub const OPLOG_REPLAY: Self = Self(1 << 3);
    pub const NO_CURSOR_TIMEOUT: Self = Self(1 << 4);
    pub const AWAIT_DATA: Self = Self(1 << 5);
    pub const EXHAUST: Self = Self(1 << 6);
    pub const PARTIAL: Self = Self(1 << 7);

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn is_tailable_cursor(self) -> bool {
        self.0 & Self::TAILABLE_CURSOR.0 != 0
    }

    pub fn is_slave_ok(self) -> bool {
        self.0 & Self::SLAVE_OK.0 != 0
    }

    pub fn is_oplog_replay(self) -> bool {
        self.0 & Self::OPLOG_REPLAY.0 != 0
    }

    pub fn is_no_cursor_timeout(self) -> bool {
        self.0 & Self::NO_CURSOR_TIMEOUT.0 != 0
    }

    pub fn is_await_data(self) -> bool {
        self.0 & Self::AWAIT_DATA.0 != 0
    }

    pub fn is_exhaust(self) -> bool {
        self.0 & Self::EXHAUST.0 != 0
    }

    pub fn is_partial(self) -> bool {
        self.0 & Self::PARTIAL.0 != 0
    }
}

/// OP_DELETE flags: bit 0 = single remove.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeleteFlags(u32);

impl DeleteFlags {
    pub const SINGLE_REMOVE: Self = Self(1 << 0);

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn is_single_remove(self) -> bool {
        self.0 & Self::SINGLE_REMOVE.0 != 0
    }
}

/// OP_MSG `flagBits`.
///
/// Bit layout:
///   bit 0  = checksum present (a CRC-32C trails the sections)
///   bit 1  = more to come
///   bit 16 = exhaust allowed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MsgFlags(u32);

impl MsgFlags {
    pub const CHECKSUM_PRESENT: Self = Self(1 << 0);
    pub const MORE_TO_COME: Self = Self(1 << 1);
    pub const EXHAUST_ALLOWED: Self = Self(1 << 16);

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn is_checksum_present(self) -> bool {
        self.0 & Self::CHECKSUM_PRESENT.0 != 0
    }

    pub fn is_more_to_come(self) -> bool {
        self.0 & Self::MORE_TO_COME.0 != 0
    }

    pub fn is_exhaust_allowed(self) -> bool {
        self.0 & Self::EXHAUST_ALLOWED.0 != 0
    }
}
