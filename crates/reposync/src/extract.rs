//! Schema extraction over decoded hashed maps.
//!
//! The key vocabulary is closed. Unknown keys are skipped without comment so
//! newer producers can add fields; a known key whose value has the wrong
//! shape is counted as a violation and skipped on its own.

use lstasko_object_stream::{EntryValue, MapEntry, ObjectGraph, ObjectStreamError};
use tracing::debug;

use crate::record::{SyncFlag, SyncFlags};

/// Key holding the list of channel ids.
pub const CHANNEL_IDS_KEY: &str = "channel_ids";
/// Key holding a single channel id.
pub const CHANNEL_ID_KEY: &str = "channel_id";

/// Job parameters before channel resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawExtraction {
    /// Channel ids in encounter order. Duplicates are kept.
    pub channel_ids: Vec<i64>,
    pub flags: SyncFlags,
    /// Known keys whose value had the expected shape.
    pub applied: usize,
    /// Entries or list items skipped because of a shape violation or a
    /// dangling reference.
    pub violations: usize,
}

impl RawExtraction {
    /// Extraction for the single-channel legacy layout.
    pub fn from_legacy(text: &str) -> Option<Self> {
        Some(Self {
            channel_ids: vec![parse_channel_id(text)?],
            applied: 1,
            ..Self::default()
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    ChannelIds,
    ChannelId,
    Flag(SyncFlag),
}

impl Key {
    fn parse(key: &str) -> Option<Self> {
        match key {
            CHANNEL_IDS_KEY => Some(Key::ChannelIds),
            CHANNEL_ID_KEY => Some(Key::ChannelId),
            other => SyncFlag::from_key(other).map(Key::Flag),
        }
    }
}

/// Decimal channel id, surrounding whitespace ignored.
pub fn parse_channel_id(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

/// `"true"` in any case is true; every other text is false.
pub fn parse_flag(text: &str) -> bool {
    text.eq_ignore_ascii_case("true")
}

/// Reads job parameters out of every hashed map of one graph.
pub struct SchemaExtractor<'g> {
    graph: &'g ObjectGraph,
}

impl<'g> SchemaExtractor<'g> {
    pub fn new(graph: &'g ObjectGraph) -> Self {
        Self { graph }
    }

    /// Maps are read in stream order. Ids accumulate and later flag values
    /// overwrite earlier ones.
    pub fn extract(&self) -> RawExtraction {
        let mut raw = RawExtraction::default();
        for map in self.graph.maps() {
            raw.violations += map.skipped;
            for entry in &map.entries {
                self.apply(entry, &mut raw);
            }
        }
        raw
    }

    fn apply(&self, entry: &MapEntry, raw: &mut RawExtraction) {
        let key = match self.graph.entry_key(entry) {
            Ok(key) => key,
            Err(err) => {
                debug!(error = %err, "unreadable map key");
                raw.violations += 1;
                return;
            }
        };
        let Some(known) = Key::parse(key) else {
            debug!(key, "skipping unknown key");
            return;
        };
        let value = match self.graph.entry_value(entry).and_then(|v| self.deref(v)) {
            Ok(value) => value,
            Err(err) => {
                debug!(key, error = %err, "unreadable map value");
                raw.violations += 1;
                return;
            }
        };
        match (known, value) {
            (Key::ChannelIds, EntryValue::NestedCollection(items)) => {
                raw.applied += 1;
                for item in items {
                    match self.channel_id(item) {
                        Some(id) => raw.channel_ids.push(id),
                        None => {
                            debug!(key, "skipping channel id that is not an integer");
                            raw.violations += 1;
                        }
                    }
                }
            }
            (Key::ChannelId, value) => match self.channel_id(value) {
                Some(id) => {
                    raw.channel_ids.push(id);
                    raw.applied += 1;
                }
                None => {
                    debug!(key, "channel id is not an integer");
                    raw.violations += 1;
                }
            },
            (Key::Flag(flag), EntryValue::ScalarText(text)) => {
                raw.flags.set(flag, parse_flag(&text));
                raw.applied += 1;
            }
            (Key::Flag(flag), EntryValue::Null) => {
                raw.flags.set(flag, false);
                raw.applied += 1;
            }
            (known, value) => {
                debug!(?known, ?value, "unexpected value shape");
                raw.violations += 1;
            }
        }
    }

    fn channel_id(&self, value: EntryValue) -> Option<i64> {
        match self.deref(value).ok()? {
            EntryValue::ScalarText(text) => parse_channel_id(&text),
            _ => None,
        }
    }

    /// Resolves a back-reference to the value it names.
    fn deref(&self, value: EntryValue) -> Result<EntryValue, ObjectStreamError> {
        match value {
            EntryValue::BackReference(handle) => self.graph.resolve(handle),
            other => Ok(other),
        }
    }
}
