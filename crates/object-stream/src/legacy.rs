//! Fixed-layout decoder for single-channel payloads.
//!
//! Older producers only ever emit one scalar field, so instead of walking
//! the graph this decoder scans for the field name and reads the string
//! written right after it: one `TC_STRING` tag, a big-endian 16-bit length,
//! then the decimal text of the channel id.
//!
//! The scan takes the first occurrence of the literal anywhere in the
//! buffer. A payload that happens to contain the name earlier (for example
//! as a prefix of `channel_ids`) is read at that earlier position, exactly
//! as the producers' consumers always have.

use lstasko_buffers::Reader;
use tracing::debug;

use crate::constants::TC_STRING;
use crate::error::ObjectStreamError;

/// Field name the legacy layout is anchored on.
pub const LEGACY_FIELD_NAME: &[u8] = b"channel_id";

#[derive(Debug, Default, Clone, Copy)]
pub struct LegacyDecoder;

impl LegacyDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Returns the scalar text following the field name.
    ///
    /// `Ok(None)` means the buffer is not in the legacy layout: the field
    /// name is absent or is followed by something other than a string tag.
    /// Errors are reserved for a layout that starts correctly and then runs
    /// past the end of the buffer or holds invalid text.
    pub fn decode<'a>(&self, data: &'a [u8]) -> Result<Option<&'a str>, ObjectStreamError> {
        let mut reader = Reader::new(data);
        let Some(offset) = reader.find(LEGACY_FIELD_NAME) else {
            debug!("legacy field name not present");
            return Ok(None);
        };
        reader.seek(offset + LEGACY_FIELD_NAME.len())?;
        let tag = reader.u8()?;
        if tag != TC_STRING {
            debug!(offset, tag, "legacy field is not followed by a string");
            return Ok(None);
        }
        Ok(Some(reader.utf8_u16()?))
    }
}
