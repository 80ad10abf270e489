//! Partial decoder for the Java object serialization stream.
//!
//! Scheduler job parameters are stored as serialized `HashMap`s produced by
//! a JVM we do not control. This crate recovers the map entries without
//! materializing the full object graph:
//!
//! - [`GraphDecoder`] walks the stream grammar and collects every hashed-map
//!   annotation it passes into an [`ObjectGraph`].
//! - [`LegacyDecoder`] reads the single scalar of older single-channel
//!   payloads by scanning for its field name.
//! - [`ObjectStreamEncoder`] writes string-keyed maps in the producer's
//!   layout, mainly for fixtures.
//!
//! # Example
//!
//! ```
//! use lstasko_object_stream::{EntryValue, GraphDecoder, ObjectStreamEncoder};
//!
//! let data = ObjectStreamEncoder::new().encode_map(&[("channel_id", "123".into())]);
//! let graph = GraphDecoder::new().decode(&data).unwrap();
//! let entry = &graph.maps()[0].entries[0];
//! assert_eq!(graph.entry_key(entry).unwrap(), "channel_id");
//! assert_eq!(
//!     graph.entry_value(entry).unwrap(),
//!     EntryValue::ScalarText("123".into())
//! );
//! ```

pub mod constants;
mod encoder;
mod error;
mod graph;
mod handles;
mod legacy;
mod types;

pub use encoder::{EncodeValue, ObjectStreamEncoder};
pub use error::ObjectStreamError;
pub use graph::{DecodeLimits, GraphDecoder, ObjectGraph};
pub use handles::HandleTable;
pub use legacy::{LegacyDecoder, LEGACY_FIELD_NAME};
pub use types::{
    ClassDesc, Content, EntryValue, FieldSpec, Handle, MapEntry, MapRecord, ObjectInstance, Value,
};

/// Whether `data` starts with the object stream magic and version.
pub fn has_stream_header(data: &[u8]) -> bool {
    data.starts_with(&constants::STREAM_HEADER)
}
