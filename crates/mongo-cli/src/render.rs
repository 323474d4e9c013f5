/// Text and JSON renderings of decoded messages.
///
/// The text form is an indented tree, two spaces per level:
///
/// ```text
/// Message 0 @ 0: Request : Query
///   header: length=58 request_id=7 response_to=0 opcode=2004
///   flags: 0x00000000
///   collection: shop.orders (db=shop, coll=orders)
///   skip: 0  return: -1
///   query:
///     find: String "orders"
/// ```
///
/// The JSON form maps documents to objects. A document that repeats a
/// field name becomes an array of `[name, value]` pairs instead, so every
/// element survives in wire order. Values without a JSON equivalent are
/// tagged with their BSON type name.
use std::collections::HashSet;
use std::fmt::Write as _;

use mongo_decoder::DecodedMessage;
use mongo_types::bson::{timestamp_increment, timestamp_time};
use mongo_types::{BsonDocument, BsonValue, Diagnostic, FullCollectionName, OpcodeBody, Section};
use serde_json::{Map, Value, json};

// ── Text ──────────────────────────────────────────────────────────────────────

/// Indented line writer.
struct Tree {
    out: String,
    depth: usize,
}

impl Tree {
    fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.depth += 1;
        f(self);
        self.depth -= 1;
    }

    fn document(&mut self, label: &str, doc: Option<&BsonDocument>) {
        match doc {
            Some(doc) => {
                self.line(format!("{label}:{}", truncated_marker(doc)));
                self.nested(|t| t.elements(doc));
            }
            None => self.line(format!("{label}: (absent)")),
        }
    }

    fn elements(&mut self, doc: &BsonDocument) {
        for element in doc {
            match &element.value {
                BsonValue::Document(inner) | BsonValue::Array(inner) => {
                    self.line(format!(
                        "{}: {}{}",
                        element.name,
                        element.element_type.name(),
                        truncated_marker(inner)
                    ));
                    self.nested(|t| t.elements(inner));
                }
                BsonValue::JsCodeWithScope { code, scope } => {
                    self.line(format!(
                        "{}: {} {code:?}",
                        element.name,
                        element.element_type.name()
                    ));
                    self.nested(|t| t.elements(scope));
                }
                value => self.line(format!(
                    "{}: {} {}",
                    element.name,
                    element.element_type.name(),
                    scalar_text(value)
                )),
            }
        }
    }

    fn collection(&mut self, name: &FullCollectionName) {
        self.line(format!(
            "collection: {} (db={}, coll={})",
            name.full, name.database, name.collection
        ));
    }

    fn body(&mut self, body: &OpcodeBody) {
        match body {
            OpcodeBody::Empty => self.line("(no body)"),
            OpcodeBody::Reply(r) => {
                self.line(format!("flags: 0x{:08X}", r.flags.raw()));
                self.line(format!(
                    "cursor_id: {}  starting_from: {}  number_returned: {}",
                    r.cursor_id, r.starting_from, r.number_returned
                ));
                for (i, doc) in r.documents.iter().enumerate() {
                    self.document(&format!("document[{i}]"), Some(doc));
                }
            }
            OpcodeBody::Message(m) => self.line(format!("message: {:?}", m.message)),
            OpcodeBody::Update(u) => {
                self.collection(&u.collection);
                self.line(format!("flags: 0x{:08X}", u.flags.raw()));
                self.document("selector", u.selector.as_ref());
                self.document("update", u.update.as_ref());
            }
            OpcodeBody::Insert(i) => {
                self.line(format!("flags: 0x{:08X}", i.flags.raw()));
                self.collection(&i.collection);
                for (n, doc) in i.documents.iter().enumerate() {
                    self.document(&format!("document[{n}]"), Some(doc));
                }
            }
            OpcodeBody::Query(q) => {
                self.line(format!("flags: 0x{:08X}", q.flags.raw()));
                self.collection(&q.collection);
                self.line(format!(
                    "skip: {}  return: {}",
                    q.number_to_skip, q.number_to_return
                ));
                self.document("query", q.query.as_ref());
                for (n, doc) in q.return_field_selectors.iter().enumerate() {
                    self.document(&format!("return_field_selector[{n}]"), Some(doc));
                }
            }
            OpcodeBody::GetMore(g) => {
                self.collection(&g.collection);
                self.line(format!(
                    "return: {}  cursor_id: {}",
                    g.number_to_return, g.cursor_id
                ));
            }
            OpcodeBody::Delete(d) => {
                self.collection(&d.collection);
                self.line(format!("flags: 0x{:08X}", d.flags.raw()));
                self.document("selector", d.selector.as_ref());
            }
            OpcodeBody::KillCursors(k) => {
                self.line(format!("number_of_cursor_ids: {}", k.number_of_cursor_ids));
                for id in &k.cursor_ids {
                    self.line(format!("cursor_id: {id}"));
                }
            }
            OpcodeBody::Command(c) => {
                self.line(format!("database: {}  command: {}", c.database, c.command_name));
                self.document("metadata", c.metadata.as_ref());
                self.document("command_args", c.command_args.as_ref());
            }
            OpcodeBody::CommandReply(c) => {
                self.document("metadata", c.metadata.as_ref());
                self.document("command_reply", c.command_reply.as_ref());
                if let Some(out) = &c.output_docs {
                    self.document("output_docs", Some(out));
                }
            }
            OpcodeBody::Compressed(c) => {
                self.line(format!(
                    "compressed: original_opcode={} uncompressed_size={} compressor={} payload={} bytes",
                    c.info.original_opcode,
                    c.info.uncompressed_size,
                    c.info.compressor.name(),
                    c.info.payload_len
                ));
                self.nested(|t| t.body(&c.inner));
            }
            OpcodeBody::Msg(m) => {
                self.line(format!("flags: 0x{:08X}", m.flags.raw()));
                for section in &m.sections {
                    self.section(section);
                }
                if let Some(sum) = m.checksum {
                    self.line(format!("checksum: 0x{sum:08X}"));
                }
            }
        }
    }

    fn section(&mut self, section: &Section) {
        match section {
            Section::Body(doc) => self.document("section Body", Some(doc)),
            Section::DocumentSequence {
                size,
                identifier,
                documents,
            } => {
                self.line(format!("section Document Sequence {identifier:?} size={size}"));
                self.nested(|t| {
                    for (i, doc) in documents.iter().enumerate() {
                        t.document(&format!("[{i}]"), Some(doc));
                    }
                });
            }
            Section::Unknown { kind, size } => {
                self.line(format!("section kind {kind} size={size} (skipped)"));
            }
        }
    }
}

fn truncated_marker(doc: &BsonDocument) -> &'static str {
    if doc.truncated { " (truncated)" } else { "" }
}

/// Short text for a non-container value.
pub fn scalar_text(value: &BsonValue) -> String {
    match value {
        BsonValue::Double(v) => v.to_string(),
        BsonValue::String(s) | BsonValue::JsCode(s) | BsonValue::Symbol(s) => format!("{s:?}"),
        BsonValue::Document(d) | BsonValue::Array(d) => format!("{{{} elements}}", d.len()),
        BsonValue::Binary(b) => format!("{:?}, {} bytes", b.subtype, b.bytes.len()),
        BsonValue::Undefined => "undefined".to_string(),
        BsonValue::ObjectId(oid) => format!("ObjectId(\"{}\")", oid.to_hex()),
        BsonValue::Boolean(b) => b.to_string(),
        BsonValue::DateTime(ms) => format!("{ms} ms"),
        BsonValue::Null => "null".to_string(),
        BsonValue::Regex { pattern, options } => format!("/{pattern}/{options}"),
        BsonValue::DbPointer { namespace, id } => format!("{namespace:?} {}", id.to_hex()),
        BsonValue::JsCodeWithScope { code, .. } => format!("{code:?} (with scope)"),
        BsonValue::Int32(v) => v.to_string(),
        BsonValue::Timestamp(raw) => format!(
            "time={} increment={}",
            timestamp_time(*raw),
            timestamp_increment(*raw)
        ),
        BsonValue::Int64(v) => v.to_string(),
        BsonValue::MinKey => "MinKey".to_string(),
        BsonValue::MaxKey => "MaxKey".to_string(),
        BsonValue::Unknown { type_id } => format!("(unknown type 0x{type_id:02X})"),
    }
}

/// Render one message: summary line, header, body tree, diagnostics.
pub fn message_text(index: usize, offset: usize, msg: &DecodedMessage) -> String {
    let mut tree = Tree {
        out: String::new(),
        depth: 0,
    };
    tree.line(format!("Message {index} @ {offset}: {}", msg.summary()));
    tree.nested(|t| {
        match msg.header {
            Some(h) => t.line(format!(
                "header: length={} request_id={} response_to={} opcode={}",
                h.length, h.request_id, h.response_to, h.opcode
            )),
            None => t.line("header: (incomplete)"),
        }
        t.body(&msg.body);
        if !msg.diagnostics.is_empty() {
            t.line("diagnostics:");
            t.nested(|t| {
                for d in &msg.diagnostics {
                    t.line(d.to_string());
                }
            });
        }
        if let Some(e) = &msg.truncated {
            t.line(format!("truncated: {e}"));
        }
    });
    tree.out
}

/// 16 bytes per line: offset, hex, printable ASCII.
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (i, chunk) in bytes.chunks(16).enumerate() {
        let offset = i * 16;
        let hex = chunk
            .iter()
            .fold(String::with_capacity(chunk.len() * 3), |mut s, b| {
                if !s.is_empty() {
                    s.push(' ');
                }
                let _ = write!(s, "{b:02x}");
                s
            });
        let ascii: String = chunk
            .iter()
            .map(|&b| if b.is_ascii_graphic() { b as char } else { '.' })
            .collect();
        let _ = writeln!(out, "  {offset:04x}  {hex:<47}  {ascii}");
    }
    out
}

// ── JSON ──────────────────────────────────────────────────────────────────────

/// One message in the `--json` report.
#[derive(serde::Serialize)]
pub struct MessageReport {
    pub index: usize,
    pub offset: usize,
    pub summary: String,
    pub header: Option<HeaderReport>,
    pub effective_opcode: i32,
    pub consumed: usize,
    pub body: Value,
    pub diagnostics: Vec<DiagnosticReport>,
    pub truncated: Option<String>,
}

#[derive(serde::Serialize)]
pub struct HeaderReport {
    pub length: i32,
    pub request_id: u32,
    pub response_to: u32,
    pub opcode: i32,
}

#[derive(serde::Serialize)]
pub struct DiagnosticReport {
    pub kind: &'static str,
    pub offset: usize,
    pub decompressed: bool,
    pub message: String,
}

impl From<&Diagnostic> for DiagnosticReport {
    fn from(d: &Diagnostic) -> Self {
        Self {
            kind: d.kind.as_str(),
            offset: d.offset,
            decompressed: d.source == mongo_types::DataSource::Decompressed,
            message: d.message.clone(),
        }
    }
}

impl MessageReport {
    pub fn new(index: usize, offset: usize, msg: &DecodedMessage) -> Self {
        Self {
            index,
            offset,
            summary: msg.summary(),
            header: msg.header.map(|h| HeaderReport {
                length: h.length,
                request_id: h.request_id,
                response_to: h.response_to,
                opcode: h.opcode,
            }),
            effective_opcode: msg.effective_opcode,
            consumed: msg.consumed,
            body: body_json(&msg.body),
            diagnostics: msg.diagnostics.iter().map(DiagnosticReport::from).collect(),
            truncated: msg.truncated.as_ref().map(ToString::to_string),
        }
    }
}

fn opt_document(doc: Option<&BsonDocument>) -> Value {
    doc.map_or(Value::Null, document_json)
}

fn documents(docs: &[BsonDocument]) -> Value {
    Value::Array(docs.iter().map(document_json).collect())
}

fn collection_json(name: &FullCollectionName) -> Value {
    json!({ "full": name.full, "database": name.database, "collection": name.collection })
}

pub fn body_json(body: &OpcodeBody) -> Value {
    match body {
        OpcodeBody::Empty => Value::Null,
        OpcodeBody::Reply(r) => json!({
            "flags": r.flags.raw(),
            "cursor_id": r.cursor_id,
            "starting_from": r.starting_from,
            "number_returned": r.number_returned,
            "documents": documents(&r.documents),
        }),
        OpcodeBody::Message(m) => json!({ "message": m.message }),
        OpcodeBody::Update(u) => json!({
            "collection": collection_json(&u.collection),
            "flags": u.flags.raw(),
            "selector": opt_document(u.selector.as_ref()),
            "update": opt_document(u.update.as_ref()),
        }),
        OpcodeBody::Insert(i) => json!({
            "flags": i.flags.raw(),
            "collection": collection_json(&i.collection),
            "documents": documents(&i.documents),
        }),
        OpcodeBody::Query(q) => json!({
            "flags": q.flags.raw(),
            "collection": collection_json(&q.collection),
            "number_to_skip": q.number_to_skip,
            "number_to_return": q.number_to_return,
            "query": opt_document(q.query.as_ref()),
            "return_field_selectors": documents(&q.return_field_selectors),
        }),
        OpcodeBody::GetMore(g) => json!({
            "collection": collection_json(&g.collection),
            "number_to_return": g.number_to_return,
            "cursor_id": g.cursor_id,
        }),
        OpcodeBody::Delete(d) => json!({
            "collection": collection_json(&d.collection),
            "flags": d.flags.raw(),
            "selector": opt_document(d.selector.as_ref()),
        }),
        OpcodeBody::KillCursors(k) => json!({
            "number_of_cursor_ids": k.number_of_cursor_ids,
            "cursor_ids": k.cursor_ids,
        }),
        OpcodeBody::Command(c) => json!({
            "database": c.database,
            "command_name": c.command_name,
            "metadata": opt_document(c.metadata.as_ref()),
            "command_args": opt_document(c.command_args.as_ref()),
        }),
        OpcodeBody::CommandReply(c) => json!({
            "metadata": opt_document(c.metadata.as_ref()),
            "command_reply": opt_document(c.command_reply.as_ref()),
            "output_docs": opt_document(c.output_docs.as_ref()),
        }),
        OpcodeBody::Compressed(c) => json!({
            "original_opcode": c.info.original_opcode,
            "uncompressed_size": c.info.uncompressed_size,
            "compressor": c.info.compressor.name(),
            "payload_len": c.info.payload_len,
            "decompressed": c.decompressed,
            "inner": body_json(&c.inner),
        }),
        OpcodeBody::Msg(m) => json!({
            "flags": m.flags.raw(),
            "sections": m.sections.iter().map(section_json).collect::<Vec<_>>(),
            "checksum": m.checksum,
        }),
    }
}

fn section_json(section: &Section) -> Value {
    match section {
        Section::Body(doc) => json!({ "kind": "Body", "document": document_json(doc) }),
        Section::DocumentSequence {
            size,
            identifier,
            documents: docs,
        } => json!({
            "kind": "Document Sequence",
            "size": size,
            "identifier": identifier,
            "documents": documents(docs),
        }),
        Section::Unknown { kind, size } => json!({ "kind": kind, "size": size }),
    }
}

pub fn document_json(doc: &BsonDocument) -> Value {
    let mut seen = HashSet::with_capacity(doc.len());
    if !doc.iter().all(|e| seen.insert(e.name.as_str())) {
        return Value::Array(
            doc.iter()
                .map(|e| json!([e.name, value_json(&e.value)]))
                .collect(),
        );
    }

    let mut map = Map::with_capacity(doc.len());
    for element in doc {
        map.insert(element.name.clone(), value_json(&element.value));
    }
    Value::Object(map)
}

fn value_json(value: &BsonValue) -> Value {
    match value {
        BsonValue::Double(v) => json!(v),
        BsonValue::String(s) => json!(s),
        BsonValue::Document(d) => document_json(d),
        BsonValue::Array(d) => Value::Array(d.iter().map(|e| value_json(&e.value)).collect()),
        BsonValue::Boolean(b) => json!(b),
        BsonValue::Null => Value::Null,
        BsonValue::Int32(v) => json!(v),
        BsonValue::Int64(v) => json!(v),
        BsonValue::ObjectId(oid) => json!({ "$oid": oid.to_hex() }),
        BsonValue::DateTime(ms) => json!({ "$date": ms }),
        BsonValue::JsCodeWithScope { code, scope } => {
            json!({ "$code": code, "$scope": document_json(scope) })
        }
        other => json!({ "$type": type_label(other), "value": scalar_text(other) }),
    }
}

fn type_label(value: &BsonValue) -> &'static str {
    match value {
        BsonValue::Binary(_) => "binary",
        BsonValue::Undefined => "undefined",
        BsonValue::Regex { .. } => "regex",
        BsonValue::DbPointer { .. } => "dbPointer",
        BsonValue::JsCode(_) => "javascript",
        BsonValue::Symbol(_) => "symbol",
        BsonValue::Timestamp(_) => "timestamp",
        BsonValue::MinKey => "minKey",
        BsonValue::MaxKey => "maxKey",
        _ => "unknown",
    }
}
