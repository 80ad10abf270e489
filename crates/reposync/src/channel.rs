//! Channel model and the resolver seam.
//!
//! Payloads only carry channel ids. Labels come from a catalog owned by the
//! host (usually a database), reached through [`ChannelResolver`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, ExtractError, ResolverError};

/// A software channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Channel {
    pub channel_id: i64,
    pub channel_label: String,
}

impl Channel {
    pub fn new(channel_id: i64, channel_label: impl Into<String>) -> Self {
        Self {
            channel_id,
            channel_label: channel_label.into(),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.channel_id, self.channel_label)
    }
}

/// Lookup key for a channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChannelRef {
    Id(i64),
    Label(String),
}

impl fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelRef::Id(id) => write!(f, "{id}"),
            ChannelRef::Label(label) => f.write_str(label),
        }
    }
}

impl From<i64> for ChannelRef {
    fn from(id: i64) -> Self {
        ChannelRef::Id(id)
    }
}

impl From<&str> for ChannelRef {
    fn from(label: &str) -> Self {
        ChannelRef::Label(label.to_owned())
    }
}

/// Resolves channel ids or labels against an external catalog.
///
/// `Ok(None)` is a miss. `Err` is reserved for backend failures; the
/// decoder passes those through without retrying.
pub trait ChannelResolver {
    fn resolve_channel(&self, channel: &ChannelRef) -> Result<Option<Channel>, ResolverError>;
}

impl<F> ChannelResolver for F
where
    F: Fn(&ChannelRef) -> Result<Option<Channel>, ResolverError>,
{
    fn resolve_channel(&self, channel: &ChannelRef) -> Result<Option<Channel>, ResolverError> {
        self(channel)
    }
}

/// Resolves every ref in order, one resolver call each.
///
/// Misses are collected rather than returned on the first one, so the error
/// names every stale identifier in the batch.
pub fn resolve_channels<R>(resolver: &R, refs: &[ChannelRef]) -> Result<Vec<Channel>, ExtractError>
where
    R: ChannelResolver + ?Sized,
{
    let mut channels = Vec::with_capacity(refs.len());
    let mut missing = Vec::new();
    for channel in refs {
        match resolver.resolve_channel(channel)? {
            Some(found) => channels.push(found),
            None => {
                debug!(channel = %channel, "channel not found");
                missing.push(channel.clone());
            }
        }
    }
    if !missing.is_empty() {
        return Err(ExtractError::ChannelNotFound { missing });
    }
    Ok(channels)
}

/// In-memory channel catalog, searchable by id and by label.
#[derive(Debug, Clone, Default)]
pub struct ChannelCatalog {
    by_id: BTreeMap<i64, String>,
    by_label: HashMap<String, i64>,
}

impl ChannelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a channel, replacing any entry with the same id.
    pub fn insert(&mut self, channel: Channel) {
        if let Some(old) = self.by_id.insert(channel.channel_id, channel.channel_label.clone()) {
            self.by_label.remove(&old);
        }
        self.by_label.insert(channel.channel_label, channel.channel_id);
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Channels ordered by id.
    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.by_id
            .iter()
            .map(|(id, label)| Channel::new(*id, label.clone()))
    }

    /// Parses a JSON array of `{"channel_id", "channel_label"}` objects.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let channels: Vec<Channel> =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse {
                path: "<inline>".into(),
                message: e.to_string(),
            })?;
        Ok(channels.into_iter().collect())
    }

    pub fn load_json(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let channels: Vec<Channel> =
            serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(channels.into_iter().collect())
    }
}

impl FromIterator<Channel> for ChannelCatalog {
    fn from_iter<I: IntoIterator<Item = Channel>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for channel in iter {
            catalog.insert(channel);
        }
        catalog
    }
}

impl ChannelResolver for ChannelCatalog {
    fn resolve_channel(&self, channel: &ChannelRef) -> Result<Option<Channel>, ResolverError> {
        let found = match channel {
            ChannelRef::Id(id) => self
                .by_id
                .get(id)
                .map(|label| Channel::new(*id, label.clone())),
            ChannelRef::Label(label) => self
                .by_label
                .get(label)
                .map(|id| Channel::new(*id, label.clone())),
        };
        Ok(found)
    }
}
