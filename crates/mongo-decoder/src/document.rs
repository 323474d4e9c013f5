use mongo_types::{
    Binary, BinarySubtype, BsonDocument, BsonElement, BsonValue, DiagnosticKind, ElementType,
    ObjectId,
};
use mongo_wire::WireError;
use mongo_wire::primitives::{
    read_array, read_cstring, read_f64_le, read_i32_le, read_i64_le, read_length, read_string,
    read_u8, read_u64_le, take,
};
use tracing::trace;

use crate::context::DecodeContext;

// Documents and values are decoded by two mutually recursive functions:
// `read_document` walks the element list and calls `read_value` for each
// element, and `read_value` calls back into `read_document` for the
// container types (document, array, code-with-scope).
//
// Both write into a caller-supplied target and return the number of bytes
// consumed. On `Err` the target still holds everything decoded before the
// failing read, so a truncated capture yields a partial tree.

/// Smallest well-formed document: length (4) + terminator (1).
const EMPTY_DOCUMENT_LEN: i32 = 5;

/// Bytes to skip for a document whose contents are not walked.
///
/// Never less than the length field itself so the cursor always moves.
fn skip_len(length: i32) -> usize {
    usize::try_from(length.max(4)).unwrap_or(4)
}

/// Decode one BSON document starting at `offset`.
///
/// ```text
///   read length L
///   depth + 1 > max_nesting   → RecursionExceeded, consume max(4, L)
///   L < 5                     → DocumentLengthTooShort, consume max(4, L)
///   L > max_document_size     → DocumentLengthTooLong, consume L
///   L == 5                    → empty document, consume 5
///   otherwise                 → walk elements up to offset + L - 1, consume L
/// ```
///
/// # Errors
///
/// A [`WireError`] when a read runs past the end of `buf`. `doc` is
/// marked `truncated` and keeps the elements decoded so far.
pub(crate) fn read_document(
    ctx: &mut DecodeContext<'_>,
    buf: &[u8],
    offset: usize,
    doc: &mut BsonDocument,
) -> Result<usize, WireError> {
    let length = match read_i32_le(buf, offset) {
        Ok(length) => length,
        Err(e) => {
            doc.truncated = true;
            return Err(e);
        }
    };
    doc.length = length;
    trace!(offset, length, depth = ctx.depth(), "document");

    if !ctx.enter_document() {
        let max = ctx.config().max_nesting;
        ctx.report(
            offset,
            DiagnosticKind::RecursionExceeded,
            format!("BSON document recursion exceeds {max}"),
        );
        return Ok(skip_len(length));
    }

    let res = read_document_body(ctx, buf, offset, length, doc);
    ctx.leave_document();
    if res.is_err() {
        doc.truncated = true;
    }
    res
}

fn read_document_body(
    ctx: &mut DecodeContext<'_>,
    buf: &[u8],
    offset: usize,
    length: i32,
    doc: &mut BsonDocument,
) -> Result<usize, WireError> {
    if length < EMPTY_DOCUMENT_LEN {
        ctx.report(
            offset,
            DiagnosticKind::DocumentLengthTooShort,
            format!("BSON document length too short: {length}"),
        );
        return Ok(skip_len(length));
    }

    let len = skip_len(length);
    if len > ctx.config().max_document_size {
        ctx.report(
            offset,
            DiagnosticKind::DocumentLengthTooLong,
            format!("BSON document length too long: {length}"),
        );
        return Ok(len);
    }

    // Index of the terminating NUL.
    let terminator = offset + len - 1;
    if length == EMPTY_DOCUMENT_LEN {
        read_u8(buf, terminator)?;
        return Ok(len);
    }

    let mut cursor = offset + 4;
    loop {
        cursor += read_element(ctx, buf, cursor, doc)?;
        if cursor >= terminator {
            break;
        }
    }
    // The terminator must have been captured even though its value is
    // never checked.
    read_u8(buf, terminator)?;

    if cursor > terminator {
        ctx.report(
            offset,
            DiagnosticKind::DocumentLengthMismatch,
            format!(
                "elements end at {cursor}, past the terminator at {terminator} for declared length {length}"
            ),
        );
    }
    Ok(len)
}

/// Decode one element: type tag, name, value.
fn read_element(
    ctx: &mut DecodeContext<'_>,
    buf: &[u8],
    offset: usize,
    doc: &mut BsonDocument,
) -> Result<usize, WireError> {
    let tag = read_u8(buf, offset)?;
    let element_type = ElementType::from_wire_id(tag);
    let (name, name_len) = read_cstring(buf, offset + 1)?;

    let mut value = None;
    let res = read_value(ctx, buf, offset + 1 + name_len, element_type, &mut value);
    if let Some(value) = value {
        doc.elements.push(BsonElement {
            name,
            element_type,
            value,
        });
    }
    Ok(1 + name_len + res?)
}

/// Decode the value of one element given its type tag.
///
/// Scalars fill `slot` only when fully read. Containers always fill it,
/// possibly with a truncated document, so partial trees survive.
///
/// Bytes consumed per type:
///
/// ```text
/// Double, DateTime, Timestamp, Int64   8
/// Int32                                4
/// Boolean                              1
/// ObjectId                             12
/// String, JsCode, Symbol               4 + declared length
/// Binary                               5 + declared length
/// Regex                                both cstrings, terminators included
/// DbPointer                            4 + declared length + 12
/// Document, Array                      whatever the document consumed
/// JsCodeWithScope                      4 + string + scope document
/// Undefined, Null, MinKey, MaxKey      0
/// unknown tag                          0
/// ```
pub(crate) fn read_value(
    ctx: &mut DecodeContext<'_>,
    buf: &[u8],
    offset: usize,
    element_type: ElementType,
    slot: &mut Option<BsonValue>,
) -> Result<usize, WireError> {
    let (value, consumed) = match element_type {
        ElementType::Double => (BsonValue::Double(read_f64_le(buf, offset)?), 8),
        ElementType::String => {
            let (s, n) = read_string(buf, offset)?;
            (BsonValue::String(s), n)
        }
        ElementType::JsCode => {
            let (s, n) = read_string(buf, offset)?;
            (BsonValue::JsCode(s), n)
        }
        ElementType::Symbol => {
            let (s, n) = read_string(buf, offset)?;
            (BsonValue::Symbol(s), n)
        }
        ElementType::Document | ElementType::Array => {
            let mut child = BsonDocument::default();
            let res = read_document(ctx, buf, offset, &mut child);
            *slot = Some(if element_type == ElementType::Document {
                BsonValue::Document(child)
            } else {
                BsonValue::Array(child)
            });
            return res;
        }
        ElementType::Binary => {
            let len = read_length(buf, offset)?;
            let subtype = BinarySubtype::from_wire_byte(read_u8(buf, offset + 4)?);
            let bytes = take(buf, offset + 5, len)?.to_vec();
            (BsonValue::Binary(Binary { subtype, bytes }), 5 + len)
        }
        ElementType::Undefined => (BsonValue::Undefined, 0),
        ElementType::ObjectId => (BsonValue::ObjectId(ObjectId(read_array(buf, offset)?)), 12),
        ElementType::Boolean => (BsonValue::Boolean(read_u8(buf, offset)? != 0), 1),
        ElementType::DateTime => (BsonValue::DateTime(read_i64_le(buf, offset)?), 8),
        ElementType::Null => (BsonValue::Null, 0),
        ElementType::Regex => {
            let (pattern, p) = read_cstring(buf, offset)?;
            let (options, o) = read_cstring(buf, offset + p)?;
            (BsonValue::Regex { pattern, options }, p + o)
        }
        ElementType::DbPointer => {
            let (namespace, n) = read_string(buf, offset)?;
            let id = ObjectId(read_array(buf, offset + n)?);
            (BsonValue::DbPointer { namespace, id }, n + 12)
        }
        ElementType::JsCodeWithScope => return read_code_with_scope(ctx, buf, offset, slot),
        ElementType::Int32 => (BsonValue::Int32(read_i32_le(buf, offset)?), 4),
        ElementType::Timestamp => (BsonValue::Timestamp(read_u64_le(buf, offset)?), 8),
        ElementType::Int64 => (BsonValue::Int64(read_i64_le(buf, offset)?), 8),
        ElementType::MinKey => (BsonValue::MinKey, 0),
        ElementType::MaxKey => (BsonValue::MaxKey, 0),
        ElementType::Unknown(type_id) => (BsonValue::Unknown { type_id }, 0),
    };
    *slot = Some(value);
    Ok(consumed)
}

/// `code_w_s ::= int32 string document`
///
/// The leading `int32` covers the whole value. The scope document is
/// walked by its own length; when the two disagree the mismatch is
/// reported and the document's own length wins.
fn read_code_with_scope(
    ctx: &mut DecodeContext<'_>,
    buf: &[u8],
    offset: usize,
    slot: &mut Option<BsonValue>,
) -> Result<usize, WireError> {
    let total = read_i32_le(buf, offset)?;
    let (code, code_len) = read_string(buf, offset + 4)?;

    let scope_offset = offset + 4 + code_len;
    let mut scope = BsonDocument::default();
    let res = read_document(ctx, buf, scope_offset, &mut scope);
    let scope_len = scope.length;
    *slot = Some(BsonValue::JsCodeWithScope { code, scope });
    let scope_consumed = res?;

    // code_len already includes the string's own 4-byte prefix.
    let expected = i64::from(total) - 4 - i64::try_from(code_len).unwrap_or(i64::MAX);
    if expected != i64::from(scope_len) {
        ctx.report(
            offset,
            DiagnosticKind::JsScopeLengthMismatch,
            format!(
                "code with scope length {total} leaves {expected} bytes for the scope, which declares {scope_len}"
            ),
        );
    }
    Ok(4 + code_len + scope_consumed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecoderConfig;
    use crate::fixtures::DocBuilder;
    use mongo_types::DataSource;

    fn decode(bytes: &[u8]) -> (BsonDocument, Result<usize, WireError>, Vec<mongo_types::Diagnostic>) {
        decode_with(&DecoderConfig::default(), bytes)
    }

    fn decode_with(
        config: &DecoderConfig,
        bytes: &[u8],
    ) -> (BsonDocument, Result<usize, WireError>, Vec<mongo_types::Diagnostic>) {
        let mut ctx = DecodeContext::new(config);
        let mut doc = BsonDocument::default();
        let res = read_document(&mut ctx, bytes, 0, &mut doc);
        (doc, res, ctx.into_diagnostics())
    }

    /// Decode a single-element document and return the value plus the
    /// bytes the value itself consumed.
    fn single_value(builder: DocBuilder, name: &str) -> (BsonValue, usize) {
        let bytes = builder.build();
        let (doc, res, diags) = decode(&bytes);
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
        assert_eq!(res.unwrap(), bytes.len());
        assert_eq!(doc.len(), 1);
        // length(4) + tag(1) + name + NUL + value + terminator(1)
        let value_len = bytes.len() - 4 - 1 - (name.len() + 1) - 1;
        (doc.elements[0].value.clone(), value_len)
    }

    // ── Length checks ─────────────────────────────────────────────────────

    #[test]
    fn empty_document() {
        let (doc, res, diags) = decode(&hex::decode("0500000000").unwrap());
        assert_eq!(res.unwrap(), 5);
        assert!(doc.is_empty());
        assert_eq!(doc.length, 5);
        assert!(diags.is_empty());
    }

    #[test]
    fn length_three_is_too_short() {
        let (doc, res, diags) = decode(&[0x03, 0x00, 0x00, 0x00, 0x10, 0x61]);
        assert_eq!(res.unwrap(), 4);
        assert!(doc.is_empty());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::DocumentLengthTooShort);
        assert_eq!(diags[0].source, DataSource::Frame);
    }

    #[test]
    fn negative_length_is_too_short() {
        let (_, res, diags) = decode(&(-20i32).to_le_bytes());
        assert_eq!(res.unwrap(), 4);
        assert_eq!(diags[0].kind, DiagnosticKind::DocumentLengthTooShort);
    }

    #[test]
    fn oversized_length_is_skipped_unread() {
        let mut bytes = 16_000_001i32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0x10, b'a', 0]);
        let (doc, res, diags) = decode(&bytes);
        assert_eq!(res.unwrap(), 16_000_001);
        assert!(doc.is_empty());
        assert_eq!(diags[0].kind, DiagnosticKind::DocumentLengthTooLong);
    }

    #[test]
    fn length_header_underrun() {
        let (doc, res, _) = decode(&[0x05, 0x00]);
        assert!(matches!(res, Err(WireError::UnexpectedEof { .. })));
        assert!(doc.truncated);
    }

    #[test]
    fn truncated_document_keeps_decoded_elements() {
        let bytes = DocBuilder::new().int32("a", 1).int32("b", 2).build();
        let cut = &bytes[..bytes.len() - 3];
        let (doc, res, _) = decode(cut);
        assert!(res.is_err());
        assert!(doc.truncated);
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.get("a"), Some(&BsonValue::Int32(1)));
    }

    #[test]
    fn missing_terminator_is_underrun() {
        let bytes = DocBuilder::new().int32("a", 1).build();
        let (doc, res, _) = decode(&bytes[..bytes.len() - 1]);
        assert!(matches!(res, Err(WireError::UnexpectedEof { .. })));
        assert!(doc.truncated);
        assert_eq!(doc.get("a"), Some(&BsonValue::Int32(1)));

        let (_, res, _) = decode(&[0x05, 0x00, 0x00, 0x00]);
        assert!(res.is_err());
    }

    #[test]
    fn walk_past_terminator_is_a_mismatch() {
        // Declares 8 bytes but carries an int32 element (needs 12).
        let mut bytes = DocBuilder::new().int32("a", 7).build();
        bytes[0] = 8;
        let (doc, res, diags) = decode(&bytes);
        assert_eq!(res.unwrap(), 8);
        assert_eq!(doc.get("a"), Some(&BsonValue::Int32(7)));
        assert_eq!(diags[0].kind, DiagnosticKind::DocumentLengthMismatch);
    }

    // ── Nesting ───────────────────────────────────────────────────────────

    #[test]
    fn nesting_at_limit_is_accepted() {
        let bytes = crate::fixtures::nested_document(100);
        let (_, res, diags) = decode(&bytes);
        assert_eq!(res.unwrap(), bytes.len());
        assert!(diags.is_empty());
    }

    #[test]
    fn nesting_past_limit_is_reported() {
        let bytes = crate::fixtures::nested_document(101);
        let (doc, res, diags) = decode(&bytes);
        assert_eq!(res.unwrap(), bytes.len());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::RecursionExceeded);

        // 100 levels are present; the 101st is an unwalked empty shell.
        let mut depth = 1;
        let mut cur = &doc;
        while let Some(BsonValue::Document(inner)) = cur.get("d") {
            depth += 1;
            cur = inner;
        }
        assert_eq!(depth, 101);
        assert!(cur.is_empty());
        assert_eq!(cur.length, 5);
    }

    #[test]
    fn depth_resets_between_siblings() {
        let config = DecoderConfig {
            max_nesting: 3,
            ..DecoderConfig::default()
        };
        let leaf = DocBuilder::new().int32("x", 1);
        let mid = DocBuilder::new().document("leaf", &leaf);
        let bytes = DocBuilder::new()
            .document("first", &mid)
            .document("second", &mid)
            .build();
        let (_, res, diags) = decode_with(&config, &bytes);
        assert_eq!(res.unwrap(), bytes.len());
        assert!(diags.is_empty());
    }

    // ── Per-type consumed counts ──────────────────────────────────────────

    #[test]
    fn fixed_width_values() {
        let (v, n) = single_value(DocBuilder::new().double("d", 2.5), "d");
        assert_eq!((v, n), (BsonValue::Double(2.5), 8));
        let (v, n) = single_value(DocBuilder::new().int32("i", -3), "i");
        assert_eq!((v, n), (BsonValue::Int32(-3), 4));
        let (v, n) = single_value(DocBuilder::new().int64("l", 1 << 40), "l");
        assert_eq!((v, n), (BsonValue::Int64(1 << 40), 8));
        let (v, n) = single_value(DocBuilder::new().datetime("t", 1_600_000_000_000), "t");
        assert_eq!((v, n), (BsonValue::DateTime(1_600_000_000_000), 8));
        let (v, n) = single_value(DocBuilder::new().timestamp("ts", (5 << 32) | 9), "ts");
        assert_eq!((v, n), (BsonValue::Timestamp((5 << 32) | 9), 8));
        let (v, n) = single_value(DocBuilder::new().boolean("b", true), "b");
        assert_eq!((v, n), (BsonValue::Boolean(true), 1));
    }

    #[test]
    fn boolean_is_any_nonzero_byte() {
        let bytes = DocBuilder::new().raw_element(0x08, "b", &[0x02]).build();
        let (doc, _, _) = decode(&bytes);
        assert_eq!(doc.get("b"), Some(&BsonValue::Boolean(true)));
    }

    #[test]
    fn valueless_types() {
        for (builder, expected) in [
            (DocBuilder::new().undefined("v"), BsonValue::Undefined),
            (DocBuilder::new().null("v"), BsonValue::Null),
            (DocBuilder::new().min_key("v"), BsonValue::MinKey),
            (DocBuilder::new().max_key("v"), BsonValue::MaxKey),
        ] {
            assert_eq!(single_value(builder, "v"), (expected, 0));
        }
    }

    #[test]
    fn string_like_values() {
        let (v, n) = single_value(DocBuilder::new().string("s", "hey"), "s");
        assert_eq!((v, n), (BsonValue::String("hey".into()), 4 + 4));
        let (v, n) = single_value(DocBuilder::new().js_code("c", "f()"), "c");
        assert_eq!((v, n), (BsonValue::JsCode("f()".into()), 4 + 4));
        let (v, n) = single_value(DocBuilder::new().symbol("y", ""), "y");
        assert_eq!((v, n), (BsonValue::Symbol(String::new()), 4 + 1));
    }

    #[test]
    fn binary_value() {
        let (v, n) = single_value(DocBuilder::new().binary("b", 0x04, &[1, 2, 3]), "b");
        assert_eq!(n, 5 + 3);
        assert_eq!(
            v,
            BsonValue::Binary(Binary {
                subtype: BinarySubtype::Md5,
                bytes: vec![1, 2, 3],
            })
        );
    }

    #[test]
    fn object_id_value() {
        let raw = hex::decode("00000001aabbccddee000001").unwrap();
        let oid: [u8; 12] = raw.try_into().unwrap();
        let (v, n) = single_value(DocBuilder::new().object_id("_id", oid), "_id");
        assert_eq!(n, 12);
        let BsonValue::ObjectId(id) = v else {
            panic!("expected ObjectId, got {v:?}");
        };
        assert_eq!(id.time(), 1);
        assert_eq!(id.host_hash(), 0x00CC_BBAA);
        assert_eq!(id.pid(), 0xEEDD);
        assert_eq!(id.increment(), 1);
    }

    #[test]
    fn regex_value() {
        let (v, n) = single_value(DocBuilder::new().regex("r", "^a.*", "i"), "r");
        assert_eq!(n, 5 + 2);
        assert_eq!(
            v,
            BsonValue::Regex {
                pattern: "^a.*".into(),
                options: "i".into()
            }
        );
    }

    #[test]
    fn db_pointer_value() {
        let (v, n) = single_value(DocBuilder::new().db_pointer("p", "db.c", [7; 12]), "p");
        assert_eq!(n, 4 + 5 + 12);
        assert_eq!(
            v,
            BsonValue::DbPointer {
                namespace: "db.c".into(),
                id: ObjectId([7; 12]),
            }
        );
    }

    #[test]
    fn embedded_document_and_array() {
        let inner = DocBuilder::new().int32("0", 1);
        let inner_len = inner.build().len();
        let (v, n) = single_value(DocBuilder::new().document("d", &inner), "d");
        assert_eq!(n, inner_len);
        assert!(matches!(v, BsonValue::Document(ref d) if d.len() == 1));
        let (v, n) = single_value(DocBuilder::new().array("a", &inner), "a");
        assert_eq!(n, inner_len);
        assert!(matches!(v, BsonValue::Array(ref d) if d.get("0") == Some(&BsonValue::Int32(1))));
    }

    #[test]
    fn code_with_scope_value() {
        let scope = DocBuilder::new().int32("x", 1);
        let scope_len = scope.build().len();
        let (v, n) = single_value(DocBuilder::new().js_code_with_scope("f", "x+1", &scope), "f");
        assert_eq!(n, 4 + (4 + 4) + scope_len);
        let BsonValue::JsCodeWithScope { code, scope } = v else {
            panic!("expected code with scope, got {v:?}");
        };
        assert_eq!(code, "x+1");
        assert_eq!(scope.get("x"), Some(&BsonValue::Int32(1)));
    }

    #[test]
    fn code_with_scope_length_mismatch_is_reported() {
        let scope = DocBuilder::new().int32("x", 1).build();
        let mut value = Vec::new();
        value.extend_from_slice(&99i32.to_le_bytes());
        value.extend_from_slice(&2i32.to_le_bytes());
        value.extend_from_slice(b"f\0");
        value.extend_from_slice(&scope);
        let bytes = DocBuilder::new().raw_element(0x0F, "f", &value).build();

        let (doc, res, diags) = decode(&bytes);
        assert_eq!(res.unwrap(), bytes.len());
        assert_eq!(doc.len(), 1);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::JsScopeLengthMismatch);
    }

    #[test]
    fn unknown_tag_consumes_no_value_bytes() {
        let bytes = DocBuilder::new()
            .raw_element(0x42, "odd", &[])
            .int32("after", 5)
            .build();
        let (doc, res, diags) = decode(&bytes);
        assert_eq!(res.unwrap(), bytes.len());
        assert!(diags.is_empty());
        assert_eq!(doc.elements[0].value, BsonValue::Unknown { type_id: 0x42 });
        assert_eq!(doc.get("after"), Some(&BsonValue::Int32(5)));
    }

    #[test]
    fn duplicate_names_kept_in_order() {
        let bytes = DocBuilder::new().int32("k", 1).string("k", "two").build();
        let (doc, _, _) = decode(&bytes);
        let names: Vec<_> = doc.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["k", "k"]);
        assert_eq!(doc.elements[1].value, BsonValue::String("two".into()));
    }

    #[test]
    fn negative_string_length_is_underrun() {
        let bytes = DocBuilder::new()
            .raw_element(0x02, "s", &(-1i32).to_le_bytes())
            .build();
        let (doc, res, _) = decode(&bytes);
        assert!(matches!(res, Err(WireError::NegativeLength { value: -1, .. })));
        assert!(doc.truncated);
        assert!(doc.is_empty());
    }

    #[test]
    fn string_length_past_buffer_is_underrun() {
        let bytes = DocBuilder::new()
            .raw_element(0x02, "s", &1000i32.to_le_bytes())
            .build();
        let (_, res, _) = decode(&bytes);
        assert!(matches!(res, Err(WireError::UnexpectedEof { needed: 1000, .. })));
    }
}
