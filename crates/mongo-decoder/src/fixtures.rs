//! Byte-level builders for BSON documents and wire messages.
//!
//! The decoder has no encoder counterpart, so tests, benches and fuzz
//! seeds assemble their inputs here. Builders write exactly the bytes
//! asked for, which also makes it easy to produce deliberately broken
//! input (see [`DocBuilder::raw_element`]).

use std::io::Write as _;

use mongo_wire::HEADER_SIZE;
use mongo_wire::header::opcode;

/// Builds one BSON document. Elements are appended in call order.
#[derive(Clone, Debug, Default)]
pub struct DocBuilder {
    elements: Vec<u8>,
}

impl DocBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element with an arbitrary tag and raw value bytes.
    #[must_use]
    pub fn raw_element(mut self, tag: u8, name: &str, value: &[u8]) -> Self {
        self.elements.push(tag);
        self.elements.extend_from_slice(name.as_bytes());
        self.elements.push(0);
        self.elements.extend_from_slice(value);
        self
    }

    #[must_use]
    pub fn double(self, name: &str, v: f64) -> Self {
        self.raw_element(0x01, name, &v.to_le_bytes())
    }

    #[must_use]
    pub fn string(self, name: &str, v: &str) -> Self {
        self.raw_element(0x02, name, &bson_string(v))
    }

    #[must_use]
    pub fn document(self, name: &str, doc: &DocBuilder) -> Self {
        self.raw_element(0x03, name, &doc.build())
    }

    #[must_use]
    pub fn array(self, name: &str, doc: &DocBuilder) -> Self {
        self.raw_element(0x04, name, &doc.build())
    }

    #[must_use]
    pub fn binary(self, name: &str, subtype: u8, bytes: &[u8]) -> Self {
        let mut value = len_i32(bytes.len()).to_le_bytes().to_vec();
        value.push(subtype);
        value.extend_from_slice(bytes);
        self.raw_element(0x05, name, &value)
    }

    #[must_use]
    pub fn undefined(self, name: &str) -> Self {
        self.raw_element(0x06, name, &[])
    }

    #[must_use]
    pub fn object_id(self, name: &str, id: [u8; 12]) -> Self {
        self.raw_element(0x07, name, &id)
    }

    #[must_use]
    pub fn boolean(self, name: &str, v: bool) -> Self {
        self.raw_element(0x08, name, &[u8::from(v)])
    }

    #[must_use]
    pub fn datetime(self, name: &str, millis: i64) -> Self {
        self.raw_element(0x09, name, &millis.to_le_bytes())
    }

    #[must_use]
    pub fn null(self, name: &str) -> Self {
        self.raw_element(0x0A, name, &[])
    }

    #[must_use]
    pub fn regex(self, name: &str, pattern: &str, options: &str) -> Self {
        let mut value = cstring(pattern);
        value.extend_from_slice(&cstring(options));
        self.raw_element(0x0B, name, &value)
    }

    #[must_use]
    pub fn db_pointer(self, name: &str, namespace: &str, id: [u8; 12]) -> Self {
        let mut value = bson_string(namespace);
        value.extend_from_slice(&id);
        self.raw_element(0x0C, name, &value)
    }

    #[must_use]
    pub fn js_code(self, name: &str, code: &str) -> Self {
        self.raw_element(0x0D, name, &bson_string(code))
    }

    #[must_use]
    pub fn symbol(self, name: &str, v: &str) -> Self {
        self.raw_element(0x0E, name, &bson_string(v))
    }

    #[must_use]
    pub fn js_code_with_scope(self, name: &str, code: &str, scope: &DocBuilder) -> Self {
        let code = bson_string(code);
        let scope = scope.build();
        let mut value = len_i32(4 + code.len() + scope.len()).to_le_bytes().to_vec();
        value.extend_from_slice(&code);
        value.extend_from_slice(&scope);
        self.raw_element(0x0F, name, &value)
    }

    #[must_use]
    pub fn int32(self, name: &str, v: i32) -> Self {
        self.raw_element(0x10, name, &v.to_le_bytes())
    }

    #[must_use]
    pub fn timestamp(self, name: &str, v: u64) -> Self {
        self.raw_element(0x11, name, &v.to_le_bytes())
    }

    #[must_use]
    pub fn int64(self, name: &str, v: i64) -> Self {
        self.raw_element(0x12, name, &v.to_le_bytes())
    }

    #[must_use]
    pub fn min_key(self, name: &str) -> Self {
        self.raw_element(0xFF, name, &[])
    }

    #[must_use]
    pub fn max_key(self, name: &str) -> Self {
        self.raw_element(0x7F, name, &[])
    }

    /// Serialize: length prefix, elements, terminator.
    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.elements.len() + 5);
        out.extend_from_slice(&len_i32(self.elements.len() + 5).to_le_bytes());
        out.extend_from_slice(&self.elements);
        out.push(0);
        out
    }
}

/// Builds an opcode body field by field.
#[derive(Clone, Debug, Default)]
pub struct BodyBuilder {
    bytes: Vec<u8>,
}

impl BodyBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn u8(mut self, v: u8) -> Self {
        self.bytes.push(v);
        self
    }

    #[must_use]
    pub fn i32(mut self, v: i32) -> Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    #[must_use]
    pub fn u32(mut self, v: u32) -> Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    #[must_use]
    pub fn i64(mut self, v: i64) -> Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    #[must_use]
    pub fn cstring(mut self, s: &str) -> Self {
        self.bytes.extend_from_slice(&cstring(s));
        self
    }

    #[must_use]
    pub fn document(mut self, doc: &DocBuilder) -> Self {
        self.bytes.extend_from_slice(&doc.build());
        self
    }

    #[must_use]
    pub fn bytes(mut self, raw: &[u8]) -> Self {
        self.bytes.extend_from_slice(raw);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}

/// Prefix `body` with a 16-byte header whose length covers both.
pub fn message(request_id: u32, response_to: u32, op: i32, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_SIZE + body.len());
    out.extend_from_slice(&len_i32(HEADER_SIZE + body.len()).to_le_bytes());
    out.extend_from_slice(&request_id.to_le_bytes());
    out.extend_from_slice(&response_to.to_le_bytes());
    out.extend_from_slice(&op.to_le_bytes());
    out.extend_from_slice(body);
    out
}

/// OP_QUERY body: flags, namespace, skip 0, return -1, one query document.
pub fn query_body(collection: &str, query: &DocBuilder) -> Vec<u8> {
    BodyBuilder::new()
        .u32(0)
        .cstring(collection)
        .i32(0)
        .i32(-1)
        .document(query)
        .build()
}

/// A complete OP_QUERY message.
pub fn query_message(request_id: u32, collection: &str, query: &DocBuilder) -> Vec<u8> {
    message(request_id, 0, opcode::QUERY, &query_body(collection, query))
}

/// OP_MSG body with a single kind-0 section.
pub fn msg_body(flags: u32, body: &DocBuilder) -> Vec<u8> {
    BodyBuilder::new().u32(flags).u8(0).document(body).build()
}

/// A kind-1 section: kind byte, size, identifier, documents.
pub fn document_sequence(identifier: &str, docs: &[DocBuilder]) -> Vec<u8> {
    let docs: Vec<u8> = docs.iter().flat_map(DocBuilder::build).collect();
    let size = 4 + identifier.len() + 1 + docs.len();
    BodyBuilder::new()
        .u8(1)
        .i32(len_i32(size))
        .cstring(identifier)
        .bytes(&docs)
        .build()
}

/// OP_COMPRESSED body: the 9-byte envelope followed by `payload`.
pub fn compressed_body(original_opcode: i32, uncompressed_size: usize, compressor: u8, payload: &[u8]) -> Vec<u8> {
    BodyBuilder::new()
        .i32(original_opcode)
        .i32(len_i32(uncompressed_size))
        .u8(compressor)
        .bytes(payload)
        .build()
}

/// Wrap a whole message in OP_COMPRESSED using `compress` on its body.
///
/// The header of `inner` is replaced; its opcode becomes the envelope's
/// `originalOpcode`.
pub fn compress_message(inner: &[u8], compressor: u8, compress: impl Fn(&[u8]) -> Vec<u8>) -> Vec<u8> {
    let request_id = u32::from_le_bytes([inner[4], inner[5], inner[6], inner[7]]);
    let response_to = u32::from_le_bytes([inner[8], inner[9], inner[10], inner[11]]);
    let op = i32::from_le_bytes([inner[12], inner[13], inner[14], inner[15]]);
    let body = &inner[HEADER_SIZE..];
    let payload = compress(body);
    message(
        request_id,
        response_to,
        opcode::COMPRESSED,
        &compressed_body(op, body.len(), compressor, &payload),
    )
}

/// `depth` documents, each holding the next under the key `"d"`; the
/// innermost is empty.
pub fn nested_document(depth: usize) -> Vec<u8> {
    let mut doc = vec![0x05, 0x00, 0x00, 0x00, 0x00];
    for _ in 1..depth {
        let mut elements = vec![0x03, b'd', 0x00];
        elements.extend_from_slice(&doc);
        let mut outer = len_i32(elements.len() + 5).to_le_bytes().to_vec();
        outer.extend_from_slice(&elements);
        outer.push(0);
        doc = outer;
    }
    doc
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).expect("write to Vec");
    encoder.finish().expect("finish zlib stream")
}

#[cfg(feature = "snappy")]
pub fn snappy(data: &[u8]) -> Vec<u8> {
    snap::raw::Encoder::new()
        .compress_vec(data)
        .expect("snappy compress")
}

#[cfg(feature = "zstd")]
pub fn zstd(data: &[u8]) -> Vec<u8> {
    zstd::encode_all(data, 3).expect("zstd compress")
}

pub fn cstring(s: &str) -> Vec<u8> {
    let mut out = s.as_bytes().to_vec();
    out.push(0);
    out
}

/// BSON `string`: int32 length (with NUL), bytes, NUL.
pub fn bson_string(s: &str) -> Vec<u8> {
    let mut out = len_i32(s.len() + 1).to_le_bytes().to_vec();
    out.extend_from_slice(s.as_bytes());
    out.push(0);
    out
}

fn len_i32(len: usize) -> i32 {
    i32::try_from(len).expect("fixture larger than i32::MAX")
}
