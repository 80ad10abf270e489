//! Classification of one decode call.

use crate::record::RepoSyncDetails;

/// Result of decoding one payload. Parse problems are data, not errors.
///
/// `T` is the record type: [`RawExtraction`](crate::RawExtraction) before
/// channel resolution, [`RepoSyncDetails`] after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome<T = RepoSyncDetails> {
    /// Every entry was read.
    Full(T),
    /// Some entries were read before a structural or shape violation.
    Partial(T),
    /// Not a repo-sync payload; the host treats the column as opaque.
    NotThisFormat,
    /// A repo-sync stream from which nothing could be extracted.
    Malformed { reason: String },
}

impl<T> DecodeOutcome<T> {
    pub(crate) fn malformed(reason: impl ToString) -> Self {
        DecodeOutcome::Malformed {
            reason: reason.to_string(),
        }
    }

    /// The record for full and partial outcomes.
    pub fn details(&self) -> Option<&T> {
        match self {
            DecodeOutcome::Full(details) | DecodeOutcome::Partial(details) => Some(details),
            DecodeOutcome::NotThisFormat | DecodeOutcome::Malformed { .. } => None,
        }
    }

    pub fn into_details(self) -> Option<T> {
        match self {
            DecodeOutcome::Full(details) | DecodeOutcome::Partial(details) => Some(details),
            DecodeOutcome::NotThisFormat | DecodeOutcome::Malformed { .. } => None,
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, DecodeOutcome::Full(_))
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, DecodeOutcome::Partial(_))
    }

    pub fn is_not_this_format(&self) -> bool {
        matches!(self, DecodeOutcome::NotThisFormat)
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, DecodeOutcome::Malformed { .. })
    }

    /// Converts the record, keeping the classification.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<DecodeOutcome<U>, E> {
        Ok(match self {
            DecodeOutcome::Full(details) => DecodeOutcome::Full(f(details)?),
            DecodeOutcome::Partial(details) => DecodeOutcome::Partial(f(details)?),
            DecodeOutcome::NotThisFormat => DecodeOutcome::NotThisFormat,
            DecodeOutcome::Malformed { reason } => DecodeOutcome::Malformed { reason },
        })
    }
}
