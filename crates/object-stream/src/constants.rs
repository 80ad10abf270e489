//! Object serialization stream constants.

/// Stream magic number.
pub const STREAM_MAGIC: u16 = 0xaced;
/// The only stream protocol version ever emitted by producers.
pub const STREAM_VERSION: u16 = 5;
/// Magic and version as they appear at the start of every stream.
pub const STREAM_HEADER: [u8; 4] = [0xac, 0xed, 0x00, 0x05];

// Type codes (TC_*)
pub const TC_NULL: u8 = 0x70;
pub const TC_REFERENCE: u8 = 0x71;
pub const TC_CLASSDESC: u8 = 0x72;
pub const TC_OBJECT: u8 = 0x73;
pub const TC_STRING: u8 = 0x74;
pub const TC_ARRAY: u8 = 0x75;
pub const TC_CLASS: u8 = 0x76;
pub const TC_BLOCKDATA: u8 = 0x77;
pub const TC_ENDBLOCKDATA: u8 = 0x78;
pub const TC_RESET: u8 = 0x79;
pub const TC_BLOCKDATALONG: u8 = 0x7a;
pub const TC_EXCEPTION: u8 = 0x7b;
pub const TC_LONGSTRING: u8 = 0x7c;
pub const TC_PROXYCLASSDESC: u8 = 0x7d;
pub const TC_ENUM: u8 = 0x7e;

/// First handle number assigned in a stream.
pub const BASE_WIRE_HANDLE: u32 = 0x7e_0000;

// Class descriptor flags (SC_*)
pub const SC_WRITE_METHOD: u8 = 0x01;
pub const SC_SERIALIZABLE: u8 = 0x02;
pub const SC_EXTERNALIZABLE: u8 = 0x04;

/// Hashed-map classes whose `writeObject` annotation is a block-data
/// prelude followed by alternating key/value objects.
pub const MAP_CLASSES: &[&str] = &[
    "java.util.HashMap",
    "java.util.LinkedHashMap",
    "java.util.Hashtable",
];

/// Collection classes whose `writeObject` annotation is a block-data
/// prelude followed by the elements.
pub const COLLECTION_CLASSES: &[&str] = &[
    "java.util.ArrayList",
    "java.util.LinkedList",
    "java.util.HashSet",
    "java.util.LinkedHashSet",
];

/// Boxed primitive classes carrying a single `value` field.
pub const BOXED_CLASSES: &[&str] = &[
    "java.lang.Boolean",
    "java.lang.Byte",
    "java.lang.Short",
    "java.lang.Integer",
    "java.lang.Long",
];

pub fn is_map_class(name: &str) -> bool {
    MAP_CLASSES.contains(&name)
}

pub fn is_collection_class(name: &str) -> bool {
    COLLECTION_CLASSES.contains(&name)
}

pub fn is_boxed_class(name: &str) -> bool {
    BOXED_CLASSES.contains(&name)
}
