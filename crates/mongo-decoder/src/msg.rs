use mongo_types::{BsonDocument, DiagnosticKind, MsgFlags, OpMsg, OpcodeBody, Section, SectionKind};
use mongo_wire::WireError;
use mongo_wire::primitives::{read_cstring, read_i32_le, read_u32_le, read_u8, remaining};

use crate::context::DecodeContext;
use crate::document::read_document;
use crate::handlers::{decode_into, push_document};

/// OP_MSG: flag bits, then sections until the buffer is exhausted.
///
/// ```text
/// ┌──────────┬─────────────────────────────┬───────────────────┐
/// │ flagBits │ section, section, ...       │ checksum (opt.)   │
/// │ u32      │ kind u8 + kind-specific     │ u32, if bit 0 set │
/// └──────────┴─────────────────────────────┴───────────────────┘
/// ```
///
/// With `checksumPresent` set and at least four bytes after the flags,
/// the last four bytes of the message are taken as the checksum and
/// sections stop short of them.
pub(crate) fn decode_msg(
    ctx: &mut DecodeContext<'_>,
    buf: &[u8],
    offset: usize,
    body: &mut OpcodeBody,
) -> Result<usize, WireError> {
    decode_into(body, OpcodeBody::Msg, |msg: &mut OpMsg| {
        msg.flags = MsgFlags::from_raw(read_u32_le(buf, offset)?);
        let mut pos = offset + 4;

        let mut sections_end = buf.len();
        if msg.flags.is_checksum_present() && remaining(buf, pos) >= 4 {
            sections_end -= 4;
            msg.checksum = Some(read_u32_le(buf, sections_end)?);
        }
        let sections = &buf[..sections_end];

        while pos < sections_end {
            pos += read_section(ctx, sections, pos, &mut msg.sections)?;
        }

        if msg.checksum.is_some() {
            pos = pos.max(sections_end) + 4;
        }
        Ok(pos - offset)
    })
}

/// One section. Returns the bytes it occupies, kind byte included.
fn read_section(
    ctx: &mut DecodeContext<'_>,
    buf: &[u8],
    offset: usize,
    sections: &mut Vec<Section>,
) -> Result<usize, WireError> {
    let kind = SectionKind::from_wire_byte(read_u8(buf, offset)?);
    match kind {
        SectionKind::Body => {
            let mut doc = BsonDocument::default();
            let res = read_document(ctx, buf, offset + 1, &mut doc);
            sections.push(Section::Body(doc));
            Ok(1 + res?)
        }
        SectionKind::DocumentSequence => read_document_sequence(ctx, buf, offset, sections),
        SectionKind::Unknown(kind) => {
            ctx.report(
                offset,
                DiagnosticKind::UnknownSectionKind,
                format!("Unknown section type: {kind}"),
            );
            let size = read_i32_le(buf, offset + 1)?;
            let skip = section_span(offset + 1, size)?;
            sections.push(Section::Unknown { kind, size });
            Ok(1 + skip)
        }
    }
}

/// Kind 1: `size i32, identifier cstring, document*`.
///
/// Documents are read while the declared size has bytes left for them,
/// so the walk stops at the size even when documents disagree with it.
fn read_document_sequence(
    ctx: &mut DecodeContext<'_>,
    buf: &[u8],
    offset: usize,
    sections: &mut Vec<Section>,
) -> Result<usize, WireError> {
    let size = read_i32_le(buf, offset + 1)?;
    let span = section_span(offset + 1, size)?;
    let (identifier, id_len) = read_cstring(buf, offset + 5)?;

    let mut documents = Vec::new();
    let mut to_read = i64::from(size) - 4 - i64::try_from(id_len).unwrap_or(i64::MAX);
    let mut pos = offset + 5 + id_len;
    let mut res = Ok(());
    while to_read > 0 {
        match push_document(ctx, buf, pos, &mut documents) {
            Ok(n) => {
                pos += n;
                to_read -= i64::try_from(n).unwrap_or(i64::MAX);
            }
            Err(e) => {
                res = Err(e);
                break;
            }
        }
    }

    sections.push(Section::DocumentSequence {
        size,
        identifier,
        documents,
    });
    res.map(|()| 1 + span)
}

/// Bytes covered by a section's `size` field, never less than the field
/// itself.
fn section_span(offset: usize, size: i32) -> Result<usize, WireError> {
    if size < 0 {
        return Err(WireError::NegativeLength {
            offset,
            value: size,
        });
    }
    Ok(usize::try_from(size.max(4)).unwrap_or(4))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecoderConfig;
    use crate::fixtures::{BodyBuilder, DocBuilder, document_sequence, msg_body};
    use mongo_types::BsonValue;
    use mongo_wire::HEADER_SIZE;

    fn run(body: &[u8]) -> (OpMsg, Result<usize, WireError>, Vec<mongo_types::Diagnostic>) {
        let config = DecoderConfig::default();
        let mut ctx = DecodeContext::new(&config);
        let mut buf = vec![0u8; HEADER_SIZE];
        buf.extend_from_slice(body);
        let mut out = OpcodeBody::Empty;
        let res = decode_msg(&mut ctx, &buf, HEADER_SIZE, &mut out);
        let OpcodeBody::Msg(msg) = out else {
            panic!("expected Msg, got {out:?}");
        };
        (msg, res, ctx.into_diagnostics())
    }

    #[test]
    fn single_body_section() {
        let body = msg_body(0, &DocBuilder::new().int32("ping", 1).string("$db", "admin"));
        let (msg, res, diags) = run(&body);
        assert_eq!(res.unwrap(), body.len());
        assert!(diags.is_empty());
        assert_eq!(msg.sections.len(), 1);
        assert_eq!(msg.body().and_then(|d| d.get("$db")), Some(&BsonValue::String("admin".into())));
        assert_eq!(msg.checksum, None);
    }

    #[test]
    fn body_and_document_sequence() {
        let docs = [
            DocBuilder::new().int32("_id", 1),
            DocBuilder::new().int32("_id", 2),
        ];
        let mut body = msg_body(0, &DocBuilder::new().string("insert", "c"));
        body.extend_from_slice(&document_sequence("documents", &docs));
        let (msg, res, diags) = run(&body);
        assert_eq!(res.unwrap(), body.len());
        assert!(diags.is_empty());
        assert_eq!(msg.sections.len(), 2);
        let Section::DocumentSequence {
            identifier,
            documents,
            ..
        } = &msg.sections[1]
        else {
            panic!("expected a document sequence");
        };
        assert_eq!(identifier, "documents");
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[1].get("_id"), Some(&BsonValue::Int32(2)));
    }

    #[test]
    fn empty_document_sequence() {
        let mut body = BodyBuilder::new().u32(0).build();
        body.extend_from_slice(&document_sequence("updates", &[]));
        let (msg, res, _) = run(&body);
        assert_eq!(res.unwrap(), body.len());
        assert!(matches!(&msg.sections[0], Section::DocumentSequence { documents, .. } if documents.is_empty()));
    }

    #[test]
    fn checksum_trailer_is_split_off() {
        let mut body = msg_body(1, &DocBuilder::new().int32("ok", 1));
        body.extend_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
        let (msg, res, diags) = run(&body);
        assert_eq!(res.unwrap(), body.len());
        assert!(diags.is_empty());
        assert!(msg.flags.is_checksum_present());
        assert_eq!(msg.checksum, Some(0xDEAD_BEEF));
        assert_eq!(msg.sections.len(), 1);
    }

    #[test]
    fn checksum_flag_without_room_is_ignored() {
        let body = BodyBuilder::new().u32(1).bytes(&[0x00, 0x05]).build();
        let (msg, res, _) = run(&body);
        assert_eq!(msg.checksum, None);
        // The two bytes are read as a body section and run out.
        assert!(res.is_err());
    }

    #[test]
    fn unknown_section_kind_is_skipped() {
        let mut body = BodyBuilder::new().u32(0).u8(7).i32(8).bytes(&[0xAA; 4]).build();
        body.extend_from_slice(&BodyBuilder::new().u8(0).document(&DocBuilder::new()).build());
        let (msg, res, diags) = run(&body);
        assert_eq!(res.unwrap(), body.len());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::UnknownSectionKind);
        assert_eq!(msg.sections[0], Section::Unknown { kind: 7, size: 8 });
        assert_eq!(msg.sections[1].kind(), SectionKind::Body);
    }

    #[test]
    fn unknown_section_with_negative_size_is_underrun() {
        let body = BodyBuilder::new().u32(0).u8(9).i32(-1).build();
        let (_, res, diags) = run(&body);
        assert!(matches!(res, Err(WireError::NegativeLength { value: -1, .. })));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::UnknownSectionKind);
        assert_eq!(diags[0].offset, HEADER_SIZE + 4);
    }

    #[test]
    fn tiny_section_size_still_advances() {
        let body = BodyBuilder::new().u32(0).u8(9).i32(0).build();
        let (msg, res, _) = run(&body);
        assert_eq!(res.unwrap(), 4 + 5);
        assert_eq!(msg.sections.len(), 1);
    }
}
