//! Object stream encoder for job-data maps.
//!
//! Produces `java.util.HashMap<String, Object>` payloads laid out the way
//! the JVM writes them: the `HashMap` descriptor with its `loadFactor` and
//! `threshold` fields, a block-data prelude with bucket count and size,
//! then alternating key and value objects. Repeated class descriptors and
//! repeated string literals are written as back-references, as interned
//! literals are by the producer. Optionally the map is wrapped in a
//! scheduler job-data map object that holds it in a `map` field.

use std::collections::HashMap;

use lstasko_buffers::Writer;

use crate::constants::*;
use crate::types::Handle;

/// A map value the encoder can write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeValue {
    Text(String),
    List(Vec<String>),
    Null,
}

impl From<&str> for EncodeValue {
    fn from(text: &str) -> Self {
        EncodeValue::Text(text.to_owned())
    }
}

impl From<Vec<&str>> for EncodeValue {
    fn from(items: Vec<&str>) -> Self {
        EncodeValue::List(items.into_iter().map(str::to_owned).collect())
    }
}

struct ClassSpec {
    name: &'static str,
    serial_version_uid: u64,
    flags: u8,
    fields: &'static [(u8, &'static str, Option<&'static str>)],
    super_class: Option<&'static ClassSpec>,
}

static HASH_MAP: ClassSpec = ClassSpec {
    name: "java.util.HashMap",
    serial_version_uid: 0x0507_dac1_c316_60d1,
    flags: SC_WRITE_METHOD | SC_SERIALIZABLE,
    fields: &[(b'F', "loadFactor", None), (b'I', "threshold", None)],
    super_class: None,
};

static ARRAY_LIST: ClassSpec = ClassSpec {
    name: "java.util.ArrayList",
    serial_version_uid: 0x7881_d21d_99c7_619d,
    flags: SC_WRITE_METHOD | SC_SERIALIZABLE,
    fields: &[(b'I', "size", None)],
    super_class: None,
};

static DIRTY_FLAG_MAP: ClassSpec = ClassSpec {
    name: "org.quartz.utils.DirtyFlagMap",
    serial_version_uid: 0x13e6_2ead_2876_0ace,
    flags: SC_SERIALIZABLE,
    fields: &[(b'Z', "dirty", None), (b'L', "map", Some("Ljava/util/Map;"))],
    super_class: None,
};

static STRING_KEY_DIRTY_FLAG_MAP: ClassSpec = ClassSpec {
    name: "org.quartz.utils.StringKeyDirtyFlagMap",
    serial_version_uid: 0x0828_2ac5_d9a7_1a9b,
    flags: SC_SERIALIZABLE,
    fields: &[(b'Z', "allowsTransientData", None)],
    super_class: Some(&DIRTY_FLAG_MAP),
};

static JOB_DATA_MAP: ClassSpec = ClassSpec {
    name: "org.quartz.JobDataMap",
    serial_version_uid: 0x9fb0_83e8_bfa9_b0cb,
    flags: SC_SERIALIZABLE,
    fields: &[],
    super_class: Some(&STRING_KEY_DIRTY_FLAG_MAP),
};

/// Encoder for string-keyed maps.
#[derive(Debug, Default)]
pub struct ObjectStreamEncoder {
    writer: Writer,
    next_handle: u32,
    classes: HashMap<&'static str, Handle>,
    strings: HashMap<String, Handle>,
    job_data_map: bool,
}

impl ObjectStreamEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoder that wraps every map in a scheduler job-data map object.
    pub fn job_data_map() -> Self {
        Self {
            job_data_map: true,
            ..Self::default()
        }
    }

    /// Encodes one stream holding a map with `entries` in order.
    pub fn encode_map(&mut self, entries: &[(&str, EncodeValue)]) -> Vec<u8> {
        self.next_handle = BASE_WIRE_HANDLE;
        self.classes.clear();
        self.strings.clear();
        self.writer.buf(&STREAM_HEADER);
        if self.job_data_map {
            self.write_job_data_map(entries);
        } else {
            self.write_hash_map(entries);
        }
        self.writer.flush()
    }

    fn new_handle(&mut self) -> Handle {
        let handle = Handle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn write_reference(&mut self, handle: Handle) {
        self.writer.u8(TC_REFERENCE);
        self.writer.u32(handle.0);
    }

    fn write_class_desc(&mut self, spec: &'static ClassSpec) {
        if let Some(handle) = self.classes.get(spec.name).copied() {
            self.write_reference(handle);
            return;
        }
        self.writer.u8(TC_CLASSDESC);
        self.writer.utf8_u16(spec.name);
        self.writer.u64(spec.serial_version_uid);
        let handle = self.new_handle();
        self.classes.insert(spec.name, handle);
        self.writer.u8(spec.flags);
        self.writer.u16(spec.fields.len() as u16);
        for (type_code, name, signature) in spec.fields {
            self.writer.u8(*type_code);
            self.writer.utf8_u16(name);
            if let Some(signature) = signature {
                self.write_string(signature);
            }
        }
        self.writer.u8(TC_ENDBLOCKDATA);
        match spec.super_class {
            Some(parent) => self.write_class_desc(parent),
            None => self.writer.u8(TC_NULL),
        }
    }

    fn write_string(&mut self, text: &str) {
        if let Some(handle) = self.strings.get(text).copied() {
            self.write_reference(handle);
            return;
        }
        self.writer.u8(TC_STRING);
        self.writer.utf8_u16(text);
        let handle = self.new_handle();
        self.strings.insert(text.to_owned(), handle);
    }

    fn write_value(&mut self, value: &EncodeValue) {
        match value {
            EncodeValue::Text(text) => self.write_string(text),
            EncodeValue::Null => self.writer.u8(TC_NULL),
            EncodeValue::List(items) => self.write_array_list(items),
        }
    }

    fn write_hash_map(&mut self, entries: &[(&str, EncodeValue)]) {
        let mut buckets: i32 = 16;
        while buckets / 4 * 3 < entries.len() as i32 {
            buckets *= 2;
        }
        self.writer.u8(TC_OBJECT);
        self.write_class_desc(&HASH_MAP);
        self.new_handle();
        self.writer.f32(0.75);
        self.writer.i32(buckets / 4 * 3);
        self.writer.u8(TC_BLOCKDATA);
        self.writer.u8(8);
        self.writer.i32(buckets);
        self.writer.i32(entries.len() as i32);
        for (key, value) in entries {
            self.write_string(key);
            self.write_value(value);
        }
        self.writer.u8(TC_ENDBLOCKDATA);
    }

    fn write_array_list(&mut self, items: &[String]) {
        self.writer.u8(TC_OBJECT);
        self.write_class_desc(&ARRAY_LIST);
        self.new_handle();
        self.writer.i32(items.len() as i32);
        self.writer.u8(TC_BLOCKDATA);
        self.writer.u8(4);
        self.writer.i32(items.len() as i32);
        for item in items {
            self.write_string(item);
        }
        self.writer.u8(TC_ENDBLOCKDATA);
    }

    fn write_job_data_map(&mut self, entries: &[(&str, EncodeValue)]) {
        self.writer.u8(TC_OBJECT);
        self.write_class_desc(&JOB_DATA_MAP);
        self.new_handle();
        // DirtyFlagMap: dirty, map
        self.writer.u8(1);
        self.write_hash_map(entries);
        // StringKeyDirtyFlagMap: allowsTransientData
        self.writer.u8(0);
    }
}
