use crate::element_type::ElementType;

/// A decoded BSON document.
///
/// ```text
/// ┌─────────────────────────────────────────────────────┐
/// │ length   int32   (bytes, including itself and NUL)  │
/// │ elements (type byte, cstring name, value)*          │
/// │ 0x00     terminator                                 │
/// └─────────────────────────────────────────────────────┘
/// ```
///
/// Elements keep wire order; duplicate names are kept as they appear.
/// `length` is whatever the wire declared, even when the decoder had to
/// give up on the contents (too short, too long, too deeply nested), in
/// which case `elements` is empty and a diagnostic explains why.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BsonDocument {
    pub length: i32,
    pub elements: Vec<BsonElement>,
    /// The capture ran out while this document was being read; the
    /// elements present are the ones decoded before the end.
    pub truncated: bool,
}

impl BsonDocument {
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// First element with the given name.
    pub fn get(&self, name: &str) -> Option<&BsonValue> {
        self.elements
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BsonElement> {
        self.elements.iter()
    }
}

impl<'a> IntoIterator for &'a BsonDocument {
    type Item = &'a BsonElement;
    type IntoIter = std::slice::Iter<'a, BsonElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

/// One named, typed entry of a document.
#[derive(Clone, Debug, PartialEq)]
pub struct BsonElement {
    pub name: String,
    pub element_type: ElementType,
    pub value: BsonValue,
}

/// A decoded element value, one variant per [`ElementType`].
#[derive(Clone, Debug, PartialEq)]
pub enum BsonValue {
    Double(f64),
    String(String),
    Document(BsonDocument),
    Array(BsonDocument),
    Binary(Binary),
    Undefined,
    ObjectId(ObjectId),
    Boolean(bool),
    /// Milliseconds since the Unix epoch.
    DateTime(i64),
    Null,
    Regex { pattern: String, options: String },
    DbPointer { namespace: String, id: ObjectId },
    JsCode(String),
    Symbol(String),
    JsCodeWithScope { code: String, scope: BsonDocument },
    Int32(i32),
    Timestamp(u64),
    Int64(i64),
    MinKey,
    MaxKey,
    /// Unrecognized tag; no value bytes were consumed.
    Unknown { type_id: u8 },
}

/// Accessors for the two halves of a BSON timestamp.
///
/// The 64-bit value is stored little-endian on the wire; the high 32
/// bits are seconds since the epoch and the low 32 bits an ordinal.
#[allow(clippy::cast_possible_truncation)]
pub fn timestamp_time(raw: u64) -> u32 {
    (raw >> 32) as u32
}

#[allow(clippy::cast_possible_truncation)]
pub fn timestamp_increment(raw: u64) -> u32 {
    (raw & 0xFFFF_FFFF) as u32
}

/// A 12-byte ObjectId.
///
/// The layout mixes byte orders. The timestamp and counter are big-endian
/// so that raw byte comparison sorts by creation time; the legacy host
/// hash and process id in the middle are little-endian.
///
/// ```text
/// ┌────────┬─────────┬──────────────────────────────┬────────────┐
/// │ Offset │ Size    │ Field                        │ Byte order │
/// ├────────┼─────────┼──────────────────────────────┼────────────┤
/// │ 0      │ 4 bytes │ time (seconds since epoch)   │ big        │
/// │ 4      │ 3 bytes │ host hash  ┐ machine id      │ little     │
/// │ 7      │ 2 bytes │ pid        ┘ (5 bytes)       │ little     │
/// │ 9      │ 3 bytes │ increment                    │ big        │
/// └────────┴─────────┴──────────────────────────────┴────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectId(pub [u8; 12]);

impl ObjectId {
    pub fn bytes(&self) -> &[u8; 12] {
        &self.0
    }

    pub fn time(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    pub fn machine_id(&self) -> [u8; 5] {
        [self.0[4], self.0[5], self.0[6], self.0[7], self.0[8]]
    }

    pub fn host_hash(&self) -> u32 {
        u32::from_le_bytes([self.0[4], self.0[5], self.0[6], 0])
    }

    pub fn pid(&self) -> u16 {
        u16::from_le_bytes([self.0[7], self.0[8]])
    }

    pub fn increment(&self) -> u32 {
        u32::from_be_bytes([0, self.0[9], self.0[10], self.0[11]])
    }

    /// Lowercase hex, the way drivers print ObjectIds.
    pub fn to_hex(&self) -> String {
        self.0.iter().fold(String::with_capacity(24), |mut s, b| {
            use std::fmt::Write as _;
            let _ = write!(s, "{b:02x}");
            s
        })
    }
}

/// Binary element payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binary {
    pub subtype: BinarySubtype,
    pub bytes: Vec<u8>,
}

/// Binary subtype byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinarySubtype {
    Generic,
    Function,
    /// Subtype 2, the old length-wrapped binary form.
    BinaryOld,
    Uuid,
    Md5,
    /// 0x80 and above are reserved for applications.
    User(u8),
    Other(u8),
}

impl BinarySubtype {
    pub fn from_wire_byte(b: u8) -> Self {
        match b {
            0x00 => Self::Generic,
            0x01 => Self::Function,
            0x02 => Self::BinaryOld,
            0x03 => Self::Uuid,
            0x04 => Self::Md5,
            0x80..=0xFF => Self::User(b),
            other => Self::Other(other),
        }
    }

    pub fn to_wire_byte(self) -> u8 {
        match self {
            Self::Generic => 0x00,
            Self::Function => 0x01,
            Self::BinaryOld => 0x02,
            Self::Uuid => 0x03,
            Self::Md5 => 0x04,
            Self::User(b) | Self::Other(b) => b,
        }
    }
}
