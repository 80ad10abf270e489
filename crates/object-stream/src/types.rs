//! Generic structures recovered from an object stream.

use std::fmt;

/// Sequential reference number assigned to a class descriptor, string,
/// object, array or enum constant as it appears in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub u32);

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// One declared field of a class descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Primitive type code (`B C D F I J S Z`) or `L` / `[` for objects.
    pub type_code: u8,
    pub name: String,
    /// JVM type signature of object fields, e.g. `Ljava/util/Map;`.
    pub class_name: Option<String>,
}

impl FieldSpec {
    pub fn is_object(&self) -> bool {
        matches!(self.type_code, b'L' | b'[')
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDesc {
    pub name: String,
    pub serial_version_uid: u64,
    pub flags: u8,
    pub fields: Vec<FieldSpec>,
    pub super_class: Option<Handle>,
}

/// A single value read from field data, an annotation, or the top level.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Byte(i8),
    Char(u16),
    Double(f64),
    Float(f32),
    Int(i32),
    Long(i64),
    Short(i16),
    Boolean(bool),
    /// Freshly decoded content registered under this handle.
    New(Handle),
    /// Back-reference to content registered earlier in the stream.
    BackReference(Handle),
    BlockData(Vec<u8>),
}

impl Value {
    /// Handle of the referenced content, new or back-referenced.
    pub fn handle(&self) -> Option<Handle> {
        match self {
            Value::New(handle) | Value::BackReference(handle) => Some(*handle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInstance {
    pub class: Handle,
    /// Field values of every class in the hierarchy, superclass first.
    pub fields: Vec<(String, Value)>,
    /// Objects written by custom `writeObject` methods (block data dropped).
    pub annotations: Vec<Value>,
}

impl ObjectInstance {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }
}

/// Content registered in the handle table.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    ClassDesc(ClassDesc),
    Str(String),
    Object(ObjectInstance),
    /// A `java.lang.Class` instance for the given descriptor.
    Class(Handle),
    /// Array contents are walked but not kept.
    Array { class: Handle },
    Enum { class: Handle, constant: Handle },
}

/// Decoded value of a hashed-map entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValue {
    ScalarText(String),
    NestedCollection(Vec<EntryValue>),
    BackReference(Handle),
    Null,
    /// An object this decoder does not interpret.
    Opaque { class_name: String },
}

/// One key/value pair taken from a hashed-map annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: Value,
    pub value: Value,
}

/// A hashed-map instance found while walking the stream.
#[derive(Debug, Clone, PartialEq)]
pub struct MapRecord {
    pub class_name: String,
    pub entries: Vec<MapEntry>,
    /// Entries dropped because their key or value was a dangling reference.
    pub skipped: usize,
}
