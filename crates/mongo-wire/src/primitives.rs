use crate::error::WireError;

// Every read here takes the whole buffer plus an absolute offset and
// checks the span against `buf.len()` before touching it. Nothing above
// this module indexes into wire bytes directly, so a lying length field
// can only ever produce a `WireError`, never an out-of-bounds access.
//
// Integers are little-endian unless the function name says otherwise.

/// Borrow `len` bytes starting at `offset`.
///
/// # Errors
///
/// [`WireError::UnexpectedEof`] if `offset + len` is past the end of
/// `buf` (or overflows).
pub fn take(buf: &[u8], offset: usize, len: usize) -> Result<&[u8], WireError> {
    match offset.checked_add(len) {
        Some(end) if end <= buf.len() => Ok(&buf[offset..end]),
        _ => Err(WireError::UnexpectedEof {
            offset,
            needed: len,
            available: remaining(buf, offset),
        }),
    }
}

/// Number of bytes left in `buf` from `offset` (zero if past the end).
pub fn remaining(buf: &[u8], offset: usize) -> usize {
    buf.len().saturating_sub(offset)
}

fn array<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N], WireError> {
    let mut out = [0u8; N];
    out.copy_from_slice(take(buf, offset, N)?);
    Ok(out)
}

/// Read a single byte.
///
/// # Errors
///
/// [`WireError::UnexpectedEof`] if `offset` is at or past the end.
pub fn read_u8(buf: &[u8], offset: usize) -> Result<u8, WireError> {
    Ok(array::<1>(buf, offset)?[0])
}

/// # Errors
///
/// [`WireError::UnexpectedEof`] if fewer than 4 bytes remain.
pub fn read_i32_le(buf: &[u8], offset: usize) -> Result<i32, WireError> {
    Ok(i32::from_le_bytes(array(buf, offset)?))
}

/// # Errors
///
/// [`WireError::UnexpectedEof`] if fewer than 4 bytes remain.
pub fn read_u32_le(buf: &[u8], offset: usize) -> Result<u32, WireError> {
    Ok(u32::from_le_bytes(array(buf, offset)?))
}

/// # Errors
///
/// [`WireError::UnexpectedEof`] if fewer than 8 bytes remain.
pub fn read_i64_le(buf: &[u8], offset: usize) -> Result<i64, WireError> {
    Ok(i64::from_le_bytes(array(buf, offset)?))
}

/// # Errors
///
/// [`WireError::UnexpectedEof`] if fewer than 8 bytes remain.
pub fn read_u64_le(buf: &[u8], offset: usize) -> Result<u64, WireError> {
    Ok(u64::from_le_bytes(array(buf, offset)?))
}

/// # Errors
///
/// [`WireError::UnexpectedEof`] if fewer than 8 bytes remain.
pub fn read_f64_le(buf: &[u8], offset: usize) -> Result<f64, WireError> {
    Ok(f64::from_le_bytes(array(buf, offset)?))
}

/// Read exactly `N` raw bytes into a fixed array (ObjectId, etc.).
///
/// # Errors
///
/// [`WireError::UnexpectedEof`] if fewer than `N` bytes remain.
pub fn read_array<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N], WireError> {
    array(buf, offset)
}

/// Read an `int32` length field and reject negative values.
///
/// BSON and the wire protocol store every length as a signed 32-bit
/// integer. A negative value can never describe a real span, so it is
/// treated as a hard read failure rather than being cast.
///
/// # Errors
///
/// - [`WireError::UnexpectedEof`] if fewer than 4 bytes remain.
/// - [`WireError::NegativeLength`] if the value is below zero.
pub fn read_length(buf: &[u8], offset: usize) -> Result<usize, WireError> {
    let value = read_i32_le(buf, offset)?;
    usize::try_from(value).map_err(|_| WireError::NegativeLength { offset, value })
}

/// Read a NUL-terminated string.
///
/// Returns `(text, bytes_consumed)` where `bytes_consumed` includes the
/// terminator. Invalid UTF-8 is replaced rather than rejected; the
/// decoder reports what was on the wire and never fails on text content.
///
/// # Errors
///
/// [`WireError::UnterminatedString`] if no NUL byte occurs before the
/// end of `buf`.
pub fn read_cstring(buf: &[u8], offset: usize) -> Result<(String, usize), WireError> {
    let rest = buf
        .get(offset..)
        .ok_or(WireError::UnterminatedString { offset })?;
    let nul = rest
        .iter()
        .position(|&b| b == 0)
        .ok_or(WireError::UnterminatedString { offset })?;
    Ok((String::from_utf8_lossy(&rest[..nul]).into_owned(), nul + 1))
}

/// Read a BSON `string`: an `int32` byte count (including the trailing
/// NUL) followed by that many bytes.
///
/// Returns `(text, bytes_consumed)` with `bytes_consumed = 4 + count`.
/// A missing trailing NUL is tolerated; the declared count is what
/// moves the cursor.
///
/// # Errors
///
/// - [`WireError::NegativeLength`] if the count is negative.
/// - [`WireError::UnexpectedEof`] if the bytes are not all there.
pub fn read_string(buf: &[u8], offset: usize) -> Result<(String, usize), WireError> {
    let len = read_length(buf, offset)?;
    let raw = take(buf, offset.saturating_add(4), len)?;
    let text = raw.strip_suffix(&[0]).unwrap_or(raw);
    Ok((String::from_utf8_lossy(text).into_owned(), 4 + len))
}
