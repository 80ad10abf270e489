//! Repo-sync job parameter decoding.
//!
//! Scheduler task rows carry their parameters as a serialized object
//! stream. This crate classifies such a payload, extracts the target
//! channel ids and sync flags from it, and resolves the ids to channels
//! through a host-provided [`ChannelResolver`].
//!
//! # Overview
//!
//! - [`RepoSyncDecoder`] - Checks the stream header and runs the configured strategy
//! - [`SchemaExtractor`] - Reads known keys out of decoded hashed maps
//! - [`ChannelResolver`] / [`ChannelCatalog`] - Channel id and label lookup
//! - [`DecoderConfig`] - Strategy and resource limits, loadable from TOML
//!
//! # Example
//!
//! ```
//! use lstasko_object_stream::ObjectStreamEncoder;
//! use lstasko_reposync::{Channel, ChannelCatalog, DecodeOutcome, RepoSyncDecoder};
//!
//! let catalog: ChannelCatalog = [Channel::new(123, "centos7-x86_64")].into_iter().collect();
//! let data = ObjectStreamEncoder::new().encode_map(&[("channel_id", "123".into())]);
//!
//! let outcome = RepoSyncDecoder::new().decode(&data, &catalog).unwrap();
//! let DecodeOutcome::Full(details) = outcome else { panic!("expected a full record") };
//! assert_eq!(details.channels, vec![Channel::new(123, "centos7-x86_64")]);
//! assert!(!details.flags.latest);
//!
//! // Payloads of other task types are classified, not rejected.
//! let other = RepoSyncDecoder::new().decode(b"{\"org\": 1}", &catalog).unwrap();
//! assert!(other.is_not_this_format());
//! ```

mod channel;
mod config;
mod dispatch;
mod error;
mod extract;
mod outcome;
mod record;

pub use channel::{resolve_channels, Channel, ChannelCatalog, ChannelRef, ChannelResolver};
pub use config::{DecodeStrategy, DecoderConfig};
pub use dispatch::RepoSyncDecoder;
pub use error::{ConfigError, ExtractError, ResolverError};
pub use extract::{
    parse_channel_id, parse_flag, RawExtraction, SchemaExtractor, CHANNEL_IDS_KEY, CHANNEL_ID_KEY,
};
pub use outcome::DecodeOutcome;
pub use record::{RepoSyncDetails, SyncFlag, SyncFlags};
