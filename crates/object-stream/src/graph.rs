//! General object-graph decoder.
//!
//! Walks the stream grammar (class descriptors, new objects, strings,
//! block data, back-references) far enough to stay in sync with arbitrary
//! producer output, and records every hashed-map annotation it passes. The
//! graph is never fully materialized: objects keep their field values and
//! annotations, arrays are walked and dropped.
//!
//! A structural violation stops the walk. Everything recorded up to that
//! point stays available on the returned [`ObjectGraph`] together with the
//! error, so callers can decide between partial and failed extraction.

use lstasko_buffers::Reader;
use tracing::{debug, trace};

use crate::constants::*;
use crate::error::ObjectStreamError;
use crate::handles::HandleTable;
use crate::types::{
    ClassDesc, Content, EntryValue, FieldSpec, Handle, MapEntry, MapRecord, ObjectInstance, Value,
};

/// Resource limits applied to a single decode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum nesting depth of contents.
    pub max_depth: usize,
    /// Maximum number of handles a stream may assign.
    pub max_handles: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_handles: 4096,
        }
    }
}

/// Object-graph decoder.
#[derive(Debug, Default, Clone)]
pub struct GraphDecoder {
    limits: DecodeLimits,
}

impl GraphDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: DecodeLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> DecodeLimits {
        self.limits
    }

    /// Decodes a stream.
    ///
    /// Fails only when the stream header is missing or wrong; violations
    /// after the header are reported through [`ObjectGraph::interruption`].
    pub fn decode(&self, data: &[u8]) -> Result<ObjectGraph, ObjectStreamError> {
        let mut walker = Walker::new(data, self.limits);
        walker.read_header()?;
        let interruption = walker.read_all().err();
        if let Some(err) = &interruption {
            debug!(
                error = %err,
                offset = walker.reader.position(),
                maps = walker.maps.len(),
                "object stream walk interrupted"
            );
        }
        Ok(ObjectGraph {
            handles: walker.handles,
            contents: walker.contents,
            maps: walker.maps,
            interruption,
            max_depth: self.limits.max_depth,
        })
    }
}

/// Result of walking one stream. Owns the handle table for that stream.
#[derive(Debug)]
pub struct ObjectGraph {
    handles: HandleTable,
    contents: Vec<Value>,
    maps: Vec<MapRecord>,
    interruption: Option<ObjectStreamError>,
    max_depth: usize,
}

impl ObjectGraph {
    /// Top-level contents that were read completely.
    pub fn contents(&self) -> &[Value] {
        &self.contents
    }

    /// Hashed maps in the order their annotations began.
    pub fn maps(&self) -> &[MapRecord] {
        &self.maps
    }

    /// The structural violation that stopped the walk, if any.
    pub fn interruption(&self) -> Option<&ObjectStreamError> {
        self.interruption.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.interruption.is_none()
    }

    pub fn handles(&self) -> &HandleTable {
        &self.handles
    }

    /// Text of a map key. Keys may be new strings or back-references to one.
    pub fn entry_key(&self, entry: &MapEntry) -> Result<&str, ObjectStreamError> {
        match entry.key.handle() {
            Some(handle) => self.handles.string(handle),
            None => Err(ObjectStreamError::Unsupported("non-object map key")),
        }
    }

    /// Decoded value of a map entry. Back-references are kept as such.
    pub fn entry_value(&self, entry: &MapEntry) -> Result<EntryValue, ObjectStreamError> {
        self.value_of(&entry.value, 0)
    }

    /// Dereferences a handle into an entry value.
    pub fn resolve(&self, handle: Handle) -> Result<EntryValue, ObjectStreamError> {
        self.content_value(handle, 0)
    }

    fn value_of(&self, value: &Value, depth: usize) -> Result<EntryValue, ObjectStreamError> {
        match value {
            Value::Null => Ok(EntryValue::Null),
            Value::BackReference(handle) => Ok(EntryValue::BackReference(*handle)),
            Value::New(handle) => self.content_value(*handle, depth),
            other => Ok(EntryValue::Opaque {
                class_name: primitive_name(other).to_owned(),
            }),
        }
    }

    fn content_value(&self, handle: Handle, depth: usize) -> Result<EntryValue, ObjectStreamError> {
        if depth > self.max_depth {
            return Err(ObjectStreamError::DepthExceeded(self.max_depth));
        }
        match self.handles.get(handle)? {
            Content::Str(text) => Ok(EntryValue::ScalarText(text.clone())),
            Content::Object(object) => {
                let class_name = &self.handles.class_desc(object.class)?.name;
                if is_collection_class(class_name) {
                    let items = object
                        .annotations
                        .iter()
                        .map(|item| self.value_of(item, depth + 1))
                        .collect::<Result<Vec<_>, _>>()?;
                    return Ok(EntryValue::NestedCollection(items));
                }
                if is_boxed_class(class_name) {
                    if let Some(text) = object.field("value").and_then(primitive_text) {
                        return Ok(EntryValue::ScalarText(text));
                    }
                }
                Ok(EntryValue::Opaque {
                    class_name: class_name.clone(),
                })
            }
            Content::ClassDesc(desc) => Ok(EntryValue::Opaque {
                class_name: desc.name.clone(),
            }),
            Content::Class(class) | Content::Array { class } | Content::Enum { class, .. } => {
                Ok(EntryValue::Opaque {
                    class_name: self.handles.class_desc(*class)?.name.clone(),
                })
            }
        }
    }
}

fn primitive_name(value: &Value) -> &'static str {
    match value {
        Value::Byte(_) => "byte",
        Value::Char(_) => "char",
        Value::Double(_) => "double",
        Value::Float(_) => "float",
        Value::Int(_) => "int",
        Value::Long(_) => "long",
        Value::Short(_) => "short",
        Value::Boolean(_) => "boolean",
        Value::BlockData(_) => "block data",
        Value::Null | Value::New(_) | Value::BackReference(_) => "object",
    }
}

fn primitive_text(value: &Value) -> Option<String> {
    match value {
        Value::Boolean(b) => Some(b.to_string()),
        Value::Byte(n) => Some(n.to_string()),
        Value::Short(n) => Some(n.to_string()),
        Value::Int(n) => Some(n.to_string()),
        Value::Long(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Key half of a map entry awaiting its value.
enum PendingKey {
    None,
    Key(Value),
    Dropped,
}

struct Walker<'a> {
    reader: Reader<'a>,
    handles: HandleTable,
    contents: Vec<Value>,
    maps: Vec<MapRecord>,
    max_depth: usize,
    depth: usize,
}

impl<'a> Walker<'a> {
    fn new(data: &'a [u8], limits: DecodeLimits) -> Self {
        Self {
            reader: Reader::new(data),
            handles: HandleTable::with_limit(limits.max_handles),
            contents: Vec::new(),
            maps: Vec::new(),
            max_depth: limits.max_depth,
            depth: 0,
        }
    }

    fn read_header(&mut self) -> Result<(), ObjectStreamError> {
        let magic = self.reader.u16()?;
        if magic != STREAM_MAGIC {
            return Err(ObjectStreamError::BadMagic(magic));
        }
        let version = self.reader.u16()?;
        if version != STREAM_VERSION {
            return Err(ObjectStreamError::UnsupportedVersion(version));
        }
        Ok(())
    }

    fn read_all(&mut self) -> Result<(), ObjectStreamError> {
        while !self.reader.is_eof() {
            let value = self.read_content()?;
            self.contents.push(value);
        }
        Ok(())
    }

    /// Enters one nesting level. Every recursive production passes through
    /// here.
    fn enter(&mut self) -> Result<(), ObjectStreamError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ObjectStreamError::DepthExceeded(self.max_depth));
        }
        Ok(())
    }

    fn read_content(&mut self) -> Result<Value, ObjectStreamError> {
        self.enter()?;
        let value = self.read_content_inner();
        self.depth -= 1;
        value
    }

    fn read_content_inner(&mut self) -> Result<Value, ObjectStreamError> {
        loop {
            let offset = self.reader.position();
            let tag = self.reader.u8()?;
            return match tag {
                TC_NULL => Ok(Value::Null),
                TC_REFERENCE => self.read_reference().map(Value::BackReference),
                TC_STRING => {
                    let len = self.reader.u16()? as usize;
                    self.read_new_string(len).map(Value::New)
                }
                TC_LONGSTRING => {
                    let len = self.reader.u64()?;
                    let remaining = self.reader.remaining();
                    if len > remaining as u64 {
                        return Err(ObjectStreamError::UnexpectedEndOfStream {
                            needed: usize::try_from(len).unwrap_or(usize::MAX),
                            remaining,
                        });
                    }
                    self.read_new_string(len as usize).map(Value::New)
                }
                TC_CLASSDESC => self.read_new_class_desc().map(Value::New),
                TC_CLASS => {
                    let class = self.read_required_class_desc()?;
                    self.handles.assign(Content::Class(class)).map(Value::New)
                }
                TC_OBJECT => self.read_new_object().map(Value::New),
                TC_ARRAY => self.read_new_array().map(Value::New),
                TC_ENUM => self.read_new_enum().map(Value::New),
                TC_BLOCKDATA => {
                    let len = self.reader.u8()? as usize;
                    Ok(Value::BlockData(self.reader.buf(len)?.to_vec()))
                }
                TC_BLOCKDATALONG => {
                    let len = self.reader.u32()? as usize;
                    Ok(Value::BlockData(self.reader.buf(len)?.to_vec()))
                }
                TC_RESET => {
                    self.handles.reset();
                    continue;
                }
                TC_PROXYCLASSDESC => Err(ObjectStreamError::Unsupported("proxy class descriptor")),
                TC_EXCEPTION => Err(ObjectStreamError::Unsupported("exception record")),
                _ => Err(ObjectStreamError::UnexpectedTag { tag, offset }),
            };
        }
    }

    fn read_reference(&mut self) -> Result<Handle, ObjectStreamError> {
        let handle = Handle(self.reader.u32()?);
        if !self.handles.contains(handle) {
            return Err(ObjectStreamError::UnresolvedHandle(handle));
        }
        Ok(handle)
    }

    fn read_new_string(&mut self, len: usize) -> Result<Handle, ObjectStreamError> {
        let text = self.reader.utf8(len)?.to_owned();
        self.handles.assign(Content::Str(text))
    }

    /// Reads the `classDesc` production: a new descriptor, a reference to
    /// one, or null.
    fn read_class_desc(&mut self) -> Result<Option<Handle>, ObjectStreamError> {
        let offset = self.reader.position();
        let tag = self.reader.u8()?;
        match tag {
            TC_NULL => Ok(None),
            TC_CLASSDESC => {
                // Superclass descriptors nest without passing through content.
                self.enter()?;
                let handle = self.read_new_class_desc();
                self.depth -= 1;
                handle.map(Some)
            }
            TC_REFERENCE => {
                let handle = self.read_reference()?;
                self.handles.class_desc(handle)?;
                Ok(Some(handle))
            }
            TC_PROXYCLASSDESC => Err(ObjectStreamError::Unsupported("proxy class descriptor")),
            _ => Err(ObjectStreamError::UnexpectedTag { tag, offset }),
        }
    }

    fn read_required_class_desc(&mut self) -> Result<Handle, ObjectStreamError> {
        let offset = self.reader.position();
        self.read_class_desc()?
            .ok_or(ObjectStreamError::UnexpectedTag {
                tag: TC_NULL,
                offset,
            })
    }

    fn read_new_class_desc(&mut self) -> Result<Handle, ObjectStreamError> {
        let name = self.reader.utf8_u16()?.to_owned();
        let serial_version_uid = self.reader.u64()?;
        let handle = self.handles.reserve()?;
        let flags = self.reader.u8()?;
        let count = self.reader.u16()?;
        let mut fields = Vec::new();
        for _ in 0..count {
            let type_code = self.reader.u8()?;
            let field_name = self.reader.utf8_u16()?.to_owned();
            let class_name = match type_code {
                b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' => None,
                b'L' | b'[' => Some(self.read_type_name()?),
                other => return Err(ObjectStreamError::InvalidFieldType(other)),
            };
            fields.push(FieldSpec {
                type_code,
                name: field_name,
                class_name,
            });
        }
        // Class annotations carry nothing this decoder needs.
        self.read_annotation()?;
        let super_class = self.read_class_desc()?;
        trace!(class = %name, handle = %handle, "class descriptor");
        self.handles.fill(
            handle,
            Content::ClassDesc(ClassDesc {
                name,
                serial_version_uid,
                flags,
                fields,
                super_class,
            }),
        )?;
        Ok(handle)
    }

    fn read_type_name(&mut self) -> Result<String, ObjectStreamError> {
        let offset = self.reader.position();
        let tag = self.reader.peek()?;
        let value = self.read_content()?;
        let handle = value
            .handle()
            .ok_or(ObjectStreamError::UnexpectedTag { tag, offset })?;
        Ok(self.handles.string(handle)?.to_owned())
    }

    /// Classes of `class` and its ancestors, superclass first.
    fn hierarchy(&self, class: Handle) -> Result<Vec<ClassDesc>, ObjectStreamError> {
        let mut chain = Vec::new();
        let mut next = Some(class);
        while let Some(handle) = next {
            if chain.len() > self.handles.len() {
                return Err(ObjectStreamError::Unsupported("cyclic class hierarchy"));
            }
            let desc = self.handles.class_desc(handle)?;
            next = desc.super_class;
            chain.push(desc.clone());
        }
        chain.reverse();
        Ok(chain)
    }

    fn read_new_object(&mut self) -> Result<Handle, ObjectStreamError> {
        let class = self.read_required_class_desc()?;
        let handle = self.handles.reserve()?;
        let hierarchy = self.hierarchy(class)?;
        let mut fields = Vec::new();
        let mut annotations = Vec::new();
        for desc in &hierarchy {
            if desc.flags & SC_EXTERNALIZABLE != 0 {
                return Err(ObjectStreamError::Unsupported("externalizable object"));
            }
            if !is_map_class(&desc.name) && !is_collection_class(&desc.name) {
                trace!(class = %desc.name, "walking past non-container class data");
            }
            for field in &desc.fields {
                let value = self.read_field_value(field.type_code)?;
                fields.push((field.name.clone(), value));
            }
            if desc.flags & SC_WRITE_METHOD == 0 {
                continue;
            }
            if is_map_class(&desc.name) {
                self.read_map_annotation(&desc.name)?;
            } else {
                annotations.extend(
                    self.read_annotation()?
                        .into_iter()
                        .filter(|value| !matches!(value, Value::BlockData(_))),
                );
            }
        }
        self.handles.fill(
            handle,
            Content::Object(ObjectInstance {
                class,
                fields,
                annotations,
            }),
        )?;
        Ok(handle)
    }

    fn read_field_value(&mut self, type_code: u8) -> Result<Value, ObjectStreamError> {
        let value = match type_code {
            b'B' => Value::Byte(self.reader.i8()?),
            b'C' => Value::Char(self.reader.u16()?),
            b'D' => Value::Double(self.reader.f64()?),
            b'F' => Value::Float(self.reader.f32()?),
            b'I' => Value::Int(self.reader.i32()?),
            b'J' => Value::Long(self.reader.i64()?),
            b'S' => Value::Short(self.reader.i16()?),
            b'Z' => Value::Boolean(self.reader.u8()? != 0),
            b'L' | b'[' => {
                let offset = self.reader.position();
                let tag = self.reader.peek()?;
                let value = self.read_content()?;
                if let Value::BlockData(_) = value {
                    return Err(ObjectStreamError::UnexpectedTag { tag, offset });
                }
                value
            }
            other => return Err(ObjectStreamError::InvalidFieldType(other)),
        };
        Ok(value)
    }

    /// Reads contents up to and including the end-of-block marker.
    fn read_annotation(&mut self) -> Result<Vec<Value>, ObjectStreamError> {
        let mut values = Vec::new();
        while self.reader.peek()? != TC_ENDBLOCKDATA {
            values.push(self.read_content()?);
        }
        self.reader.u8()?;
        Ok(values)
    }

    /// Reads a hashed-map annotation: a block-data prelude (capacity, size)
    /// followed by alternating key and value objects.
    ///
    /// Entries are recorded as soon as both halves are read, so a violation
    /// later in the block keeps the ones before it. A dangling back-reference
    /// written directly as a key or value leaves the reader in sync; only
    /// that entry is dropped and counted in [`MapRecord::skipped`].
    fn read_map_annotation(&mut self, class_name: &str) -> Result<(), ObjectStreamError> {
        let index = self.maps.len();
        self.maps.push(MapRecord {
            class_name: class_name.to_owned(),
            entries: Vec::new(),
            skipped: 0,
        });
        let mut pending = PendingKey::None;
        loop {
            let offset = self.reader.position();
            let tag = self.reader.peek()?;
            if tag == TC_ENDBLOCKDATA {
                if !matches!(pending, PendingKey::None) {
                    return Err(ObjectStreamError::UnexpectedTag {
                        tag: TC_ENDBLOCKDATA,
                        offset,
                    });
                }
                self.reader.u8()?;
                break;
            }
            let value = match self.read_content() {
                Ok(Value::BlockData(_)) => continue,
                Ok(value) => Some(value),
                Err(ObjectStreamError::UnresolvedHandle(handle)) if tag == TC_REFERENCE => {
                    debug!(handle = %handle, offset, "dropping map entry with dangling reference");
                    None
                }
                Err(err) => return Err(err),
            };
            pending = match (pending, value) {
                (PendingKey::None, Some(key)) => PendingKey::Key(key),
                (PendingKey::None, None) => PendingKey::Dropped,
                (PendingKey::Key(key), Some(value)) => {
                    self.maps[index].entries.push(MapEntry { key, value });
                    PendingKey::None
                }
                (PendingKey::Key(_), None) | (PendingKey::Dropped, _) => {
                    self.maps[index].skipped += 1;
                    PendingKey::None
                }
            };
        }
        trace!(
            class = class_name,
            entries = self.maps[index].entries.len(),
            skipped = self.maps[index].skipped,
            "hashed map"
        );
        Ok(())
    }

    fn read_new_array(&mut self) -> Result<Handle, ObjectStreamError> {
        let class = self.read_required_class_desc()?;
        let handle = self.handles.reserve()?;
        // Array class names look like `[I` or `[Ljava.lang.String;`.
        let element = self
            .handles
            .class_desc(class)?
            .name
            .as_bytes()
            .get(1)
            .copied()
            .ok_or(ObjectStreamError::InvalidFieldType(0))?;
        let size = self.reader.i32()?;
        if size < 0 {
            return Err(ObjectStreamError::Unsupported("negative array length"));
        }
        for _ in 0..size {
            self.read_field_value(element)?;
        }
        self.handles.fill(handle, Content::Array { class })?;
        Ok(handle)
    }

    fn read_new_enum(&mut self) -> Result<Handle, ObjectStreamError> {
        let class = self.read_required_class_desc()?;
        let handle = self.handles.reserve()?;
        let offset = self.reader.position();
        let tag = self.reader.peek()?;
        let constant = self
            .read_content()?
            .handle()
            .ok_or(ObjectStreamError::UnexpectedTag { tag, offset })?;
        self.handles.string(constant)?;
        self.handles.fill(handle, Content::Enum { class, constant })?;
        Ok(handle)
    }
}
