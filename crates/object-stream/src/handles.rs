//! Per-stream handle table.
//!
//! An arena indexed by `handle - BASE_WIRE_HANDLE`. Slots are reserved at
//! the point the wire format assigns the handle and filled once the content
//! is complete, so self-references made while an object is still being read
//! resolve to a known (if pending) slot.

use crate::constants::BASE_WIRE_HANDLE;
use crate::error::ObjectStreamError;
use crate::types::{ClassDesc, Content, Handle, ObjectInstance};

#[derive(Debug, Default)]
pub struct HandleTable {
    slots: Vec<Option<Content>>,
    limit: Option<usize>,
}

impl HandleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table that refuses to assign more than `limit` handles.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            slots: Vec::new(),
            limit: Some(limit),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Assigns the next handle without content.
    pub fn reserve(&mut self) -> Result<Handle, ObjectStreamError> {
        if let Some(limit) = self.limit {
            if self.slots.len() >= limit {
                return Err(ObjectStreamError::TooManyHandles(limit));
            }
        }
        let handle = Handle(BASE_WIRE_HANDLE + self.slots.len() as u32);
        self.slots.push(None);
        Ok(handle)
    }

    /// Assigns the next handle to completed content.
    pub fn assign(&mut self, content: Content) -> Result<Handle, ObjectStreamError> {
        let handle = self.reserve()?;
        self.fill(handle, content)?;
        Ok(handle)
    }

    pub fn fill(&mut self, handle: Handle, content: Content) -> Result<(), ObjectStreamError> {
        let index = self.index(handle)?;
        self.slots[index] = Some(content);
        Ok(())
    }

    /// Whether `handle` was assigned earlier in the stream.
    pub fn contains(&self, handle: Handle) -> bool {
        self.index(handle).is_ok()
    }

    /// Forgets every assignment (`TC_RESET`).
    pub fn reset(&mut self) {
        self.slots.clear();
    }

    fn index(&self, handle: Handle) -> Result<usize, ObjectStreamError> {
        handle
            .0
            .checked_sub(BASE_WIRE_HANDLE)
            .map(|index| index as usize)
            .filter(|index| *index < self.slots.len())
            .ok_or(ObjectStreamError::UnresolvedHandle(handle))
    }

    /// Content registered under `handle`; pending slots are unresolved.
    pub fn get(&self, handle: Handle) -> Result<&Content, ObjectStreamError> {
        let index = self.index(handle)?;
        self.slots[index]
            .as_ref()
            .ok_or(ObjectStreamError::UnresolvedHandle(handle))
    }

    pub fn class_desc(&self, handle: Handle) -> Result<&ClassDesc, ObjectStreamError> {
        match self.get(handle)? {
            Content::ClassDesc(desc) => Ok(desc),
            _ => Err(ObjectStreamError::HandleKind {
                handle,
                expected: "class descriptor",
            }),
        }
    }

    pub fn string(&self, handle: Handle) -> Result<&str, ObjectStreamError> {
        match self.get(handle)? {
            Content::Str(s) => Ok(s),
            _ => Err(ObjectStreamError::HandleKind {
                handle,
                expected: "string",
            }),
        }
    }

    pub fn object(&self, handle: Handle) -> Result<&ObjectInstance, ObjectStreamError> {
        match self.get(handle)? {
            Content::Object(object) => Ok(object),
            _ => Err(ObjectStreamError::HandleKind {
                handle,
                expected: "object",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_start_at_base() {
        let mut table = HandleTable::new();
        let first = table.assign(Content::Str("a".into())).unwrap();
        let second = table.assign(Content::Str("b".into())).unwrap();
        assert_eq!(first, Handle(0x7e0000));
        assert_eq!(second, Handle(0x7e0001));
        assert_eq!(table.string(second), Ok("b"));
    }

    #[test]
    fn unknown_handle_is_unresolved() {
        let table = HandleTable::new();
        assert_eq!(
            table.get(Handle(0x7e0000)),
            Err(ObjectStreamError::UnresolvedHandle(Handle(0x7e0000)))
        );
        assert!(!table.contains(Handle(0x10)));
    }

    #[test]
    fn pending_slot_is_known_but_unresolved() {
        let mut table = HandleTable::new();
        let handle = table.reserve().unwrap();
        assert!(table.contains(handle));
        assert!(table.get(handle).is_err());
        table.fill(handle, Content::Str("x".into())).unwrap();
        assert_eq!(table.string(handle), Ok("x"));
    }

    #[test]
    fn kind_mismatch_is_reported() {
        let mut table = HandleTable::new();
        let handle = table.assign(Content::Str("x".into())).unwrap();
        assert_eq!(
            table.class_desc(handle),
            Err(ObjectStreamError::HandleKind {
                handle,
                expected: "class descriptor"
            })
        );
    }

    #[test]
    fn reset_forgets_assignments() {
        let mut table = HandleTable::new();
        let handle = table.assign(Content::Str("x".into())).unwrap();
        table.reset();
        assert!(table.is_empty());
        assert!(!table.contains(handle));
        assert_eq!(table.reserve().unwrap(), handle);
    }

    #[test]
    fn limit_is_enforced() {
        let mut table = HandleTable::with_limit(1);
        table.reserve().unwrap();
        assert_eq!(table.reserve(), Err(ObjectStreamError::TooManyHandles(1)));
    }
}
