/// BSON element type tags.
///
/// Each element in a document starts with a one-byte tag selecting how
/// the value bytes after the element name are laid out. Unknown tags are
/// captured by `Unknown(u8)` rather than rejected; the decoder skips
/// them with zero value bytes so one odd field does not sink a document.
///
/// ```text
/// ┌──────┬──────────────────┬──────────────────────────────────────────┐
/// │ Wire │ Variant          │ Value layout                             │
/// ├──────┼──────────────────┼──────────────────────────────────────────┤
/// │ 0x01 │ Double           │ 8 bytes, IEEE 754                        │
/// │ 0x02 │ String           │ int32 len + bytes (incl. NUL)            │
/// │ 0x03 │ Document         │ embedded document                        │
/// │ 0x04 │ Array            │ embedded document, keys "0", "1", ...    │
/// │ 0x05 │ Binary           │ int32 len + subtype byte + bytes         │
/// │ 0x06 │ Undefined        │ (none), deprecated                       │
/// │ 0x07 │ ObjectId         │ 12 bytes                                 │
/// │ 0x08 │ Boolean          │ 1 byte                                   │
/// │ 0x09 │ DateTime         │ int64 ms since epoch                     │
/// │ 0x0A │ Null             │ (none)                                   │
/// │ 0x0B │ Regex            │ cstring pattern + cstring options        │
/// │ 0x0C │ DbPointer        │ string + 12-byte ObjectId, deprecated    │
/// │ 0x0D │ JsCode           │ string                                   │
/// │ 0x0E │ Symbol           │ string                                   │
/// │ 0x0F │ JsCodeWithScope  │ int32 total + string + document          │
/// │ 0x10 │ Int32            │ 4 bytes                                  │
/// │ 0x11 │ Timestamp        │ 8 bytes                                  │
/// │ 0x12 │ Int64            │ 8 bytes                                  │
/// │ 0xFF │ MinKey           │ (none)                                   │
/// │ 0x7F │ MaxKey           │ (none)                                   │
/// └──────┴──────────────────┴──────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementType {
    Double,
    String,
    Document,
    Array,
    Binary,
    Undefined,
    ObjectId,
    Boolean,
    DateTime,
    Null,
    Regex,
    DbPointer,
    JsCode,
    Symbol,
    JsCodeWithScope,
    Int32,
    Timestamp,
    Int64,
    MinKey,
    MaxKey,
    /// A tag this decoder does not know. The raw byte is kept for display.
    Unknown(u8),
}

impl ElementType {
    /// Return the single-byte wire tag for this type.
    pub fn wire_id(self) -> u8 {
        match self {
            Self::Double => 0x01,
            Self::String => 0x02,
            Self::Document => 0x03,
            Self::Array => 0x04,
            Self::Binary => 0x05,
            Self::Undefined => 0x06,
            Self::ObjectId => 0x07,
            Self::Boolean => 0x08,
            Self::DateTime => 0x09,
            Self::Null => 0x0A,
            Self::Regex => 0x0B,
            Self::DbPointer => 0x0C,
            Self::JsCode => 0x0D,
            Self::Symbol => 0x0E,
            Self::JsCodeWithScope => 0x0F,
            Self::Int32 => 0x10,
            Self::Timestamp => 0x11,
            Self::Int64 => 0x12,
            Self::MinKey => 0xFF,
            Self::MaxKey => 0x7F,
            Self::Unknown(id) => id,
        }
    }

    /// Parse a wire tag into an [`ElementType`].
    pub fn from_wire_id(id: u8) -> Self {
        match id {
            0x01 => Self::Double,
            0x02 => Self::String,
            0x03 => Self::Document,
            0x04 => Self::Array,
            0x05 => Self::Binary,
            0x06 => Self::Undefined,
            0x07 => Self::ObjectId,
            0x08 => Self::Boolean,
            0x09 => Self::DateTime,
            0x0A => Self::Null,
            0x0B => Self::Regex,
            0x0C => Self::DbPointer,
            0x0D => Self::JsCode,
            0x0E => Self::Symbol,
            0x0F => Self::JsCodeWithScope,
            0x10 => Self::Int32,
            0x11 => Self::Timestamp,
            0x12 => Self::Int64,
            0xFF => Self::MinKey,
            0x7F => Self::MaxKey,
            other => Self::Unknown(other),
        }
    }

    /// Human-readable type name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Double => "Double",
            Self::String => "String",
            Self::Document => "Document",
            Self::Array => "Array",
            Self::Binary => "Binary",
            Self::Undefined => "Undefined",
            Self::ObjectId => "Object ID",
            Self::Boolean => "Boolean",
            Self::DateTime => "Datetime",
            Self::Null => "NULL",
            Self::Regex => "Regular Expression",
            Self::DbPointer => "DBPointer",
            Self::JsCode => "JavaScript Code",
            Self::Symbol => "Symbol",
            Self::JsCodeWithScope => "JavaScript Code w/Scope",
            Self::Int32 => "Int32",
            Self::Timestamp => "Timestamp",
            Self::Int64 => "Int64",
            Self::MinKey => "Min Key",
            Self::MaxKey => "Max Key",
            Self::Unknown(_) => "Unknown",
        }
    }
}
