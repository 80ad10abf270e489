//! Error types for repo-sync decoding.

use std::path::PathBuf;

use thiserror::Error;

use crate::channel::ChannelRef;

/// Conditions that escape [`RepoSyncDecoder::decode`](crate::RepoSyncDecoder::decode).
///
/// Parse-level problems never show up here; they are reported through
/// [`DecodeOutcome`](crate::DecodeOutcome).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// One or more channel identifiers had no match in the catalog.
    #[error("couldn't find channels with the following identifiers: {}", join_refs(.missing))]
    ChannelNotFound { missing: Vec<ChannelRef> },
    #[error(transparent)]
    Resolver(#[from] ResolverError),
}

fn join_refs(refs: &[ChannelRef]) -> String {
    refs.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failure reported by a [`ChannelResolver`](crate::ChannelResolver) backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("channel resolver failed: {message}")]
pub struct ResolverError {
    message: String,
}

impl ResolverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors from loading decoder configuration or a channel catalog file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
