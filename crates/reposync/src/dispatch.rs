//! Payload classification and decoder selection.

use lstasko_buffers::print_octets;
use lstasko_object_stream::constants::STREAM_HEADER;
use lstasko_object_stream::{has_stream_header, GraphDecoder, LegacyDecoder};
use tracing::{debug, trace};

use crate::channel::{resolve_channels, ChannelRef, ChannelResolver};
use crate::config::{DecodeStrategy, DecoderConfig};
use crate::error::ExtractError;
use crate::extract::{RawExtraction, SchemaExtractor};
use crate::outcome::DecodeOutcome;
use crate::record::RepoSyncDetails;

/// Leading bytes included in trace output.
const TRACE_OCTETS: usize = 32;

/// Decodes repo-sync payloads.
///
/// The strategy is fixed per decoder. A payload whose header matches is
/// handed to that strategy only; the other is never tried as a fallback.
#[derive(Debug, Clone, Default)]
pub struct RepoSyncDecoder {
    config: DecoderConfig,
}

impl RepoSyncDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decodes `data` and resolves each extracted channel id, one resolver
    /// call per id.
    ///
    /// Only resolution problems are errors. All misses of one payload are
    /// reported together.
    pub fn decode<R>(&self, data: &[u8], resolver: &R) -> Result<DecodeOutcome, ExtractError>
    where
        R: ChannelResolver + ?Sized,
    {
        self.extract(data).try_map(|raw| {
            let refs: Vec<ChannelRef> = raw.channel_ids.iter().map(|id| ChannelRef::Id(*id)).collect();
            let channels = resolve_channels(resolver, &refs)?;
            Ok(RepoSyncDetails {
                channels,
                flags: raw.flags,
            })
        })
    }

    /// Classifies `data` and extracts job parameters without resolving
    /// channels.
    pub fn extract(&self, data: &[u8]) -> DecodeOutcome<RawExtraction> {
        trace!(
            len = data.len(),
            head = %print_octets(data, TRACE_OCTETS),
            strategy = ?self.config.strategy,
            "classifying payload"
        );
        if data.is_empty() {
            debug!("empty payload");
            return DecodeOutcome::NotThisFormat;
        }
        if !has_stream_header(data) {
            if data.len() < STREAM_HEADER.len() && STREAM_HEADER.starts_with(data) {
                debug!(len = data.len(), "payload is a truncated stream header");
                return DecodeOutcome::malformed("truncated stream header");
            }
            debug!("payload is not an object stream");
            return DecodeOutcome::NotThisFormat;
        }
        let outcome = match self.config.strategy {
            DecodeStrategy::Graph => self.extract_graph(data),
            DecodeStrategy::Legacy => self.extract_legacy(data),
        };
        match &outcome {
            DecodeOutcome::Full(raw) => {
                debug!(channels = raw.channel_ids.len(), "decoded repo-sync payload")
            }
            DecodeOutcome::Partial(raw) => debug!(
                channels = raw.channel_ids.len(),
                applied = raw.applied,
                violations = raw.violations,
                "decoded partial repo-sync payload"
            ),
            DecodeOutcome::NotThisFormat => debug!("object stream is not a repo-sync payload"),
            DecodeOutcome::Malformed { reason } => {
                debug!(reason = %reason, "malformed repo-sync payload")
            }
        }
        outcome
    }

    fn extract_graph(&self, data: &[u8]) -> DecodeOutcome<RawExtraction> {
        let graph = match GraphDecoder::with_limits(self.config.limits()).decode(data) {
            Ok(graph) => graph,
            Err(err) => return DecodeOutcome::malformed(err),
        };
        if graph.maps().is_empty() {
            return match graph.interruption() {
                Some(err) => DecodeOutcome::malformed(err),
                None if graph.contents().is_empty() => {
                    DecodeOutcome::malformed("no content after stream header")
                }
                None => DecodeOutcome::NotThisFormat,
            };
        }
        let raw = SchemaExtractor::new(&graph).extract();
        if graph.is_complete() && raw.violations == 0 {
            return DecodeOutcome::Full(raw);
        }
        if raw.applied == 0 {
            return match graph.interruption() {
                Some(err) => DecodeOutcome::malformed(err),
                None => DecodeOutcome::malformed(format!(
                    "{} shape violation(s) and nothing extracted",
                    raw.violations
                )),
            };
        }
        DecodeOutcome::Partial(raw)
    }

    fn extract_legacy(&self, data: &[u8]) -> DecodeOutcome<RawExtraction> {
        match LegacyDecoder::new().decode(data) {
            Ok(Some(text)) => match RawExtraction::from_legacy(text) {
                Some(raw) => DecodeOutcome::Full(raw),
                None => DecodeOutcome::malformed(format!("channel id {text:?} is not an integer")),
            },
            Ok(None) => DecodeOutcome::NotThisFormat,
            Err(err) => DecodeOutcome::malformed(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use lstasko_object_stream::ObjectStreamEncoder;

    use super::*;

    #[test]
    fn empty_payload_is_not_this_format() {
        assert!(RepoSyncDecoder::new().extract(&[]).is_not_this_format());
    }

    #[test]
    fn magic_prefix_is_truncated_header() {
        for len in 1..STREAM_HEADER.len() {
            assert_eq!(
                RepoSyncDecoder::new().extract(&STREAM_HEADER[..len]),
                DecodeOutcome::malformed("truncated stream header")
            );
        }
    }

    #[test]
    fn short_unrelated_payload_is_not_this_format() {
        assert!(RepoSyncDecoder::new().extract(b"{}").is_not_this_format());
    }

    #[test]
    fn header_only_is_malformed() {
        assert!(RepoSyncDecoder::new().extract(&STREAM_HEADER).is_malformed());
    }

    #[test]
    fn stream_without_maps_is_not_this_format() {
        let mut data = STREAM_HEADER.to_vec();
        data.extend_from_slice(b"\x74\x00\x02hi");
        assert!(RepoSyncDecoder::new().extract(&data).is_not_this_format());
    }

    #[test]
    fn legacy_strategy_reads_single_id() {
        let data = ObjectStreamEncoder::new().encode_map(&[("channel_id", "77".into())]);
        let decoder = RepoSyncDecoder::with_config(DecoderConfig::legacy());
        assert_eq!(
            decoder.extract(&data),
            DecodeOutcome::Full(RawExtraction {
                channel_ids: vec![77],
                applied: 1,
                ..RawExtraction::default()
            })
        );
    }

    #[test]
    fn legacy_strategy_does_not_fall_back() {
        let data = ObjectStreamEncoder::new().encode_map(&[("channel_ids", vec!["1"].into())]);
        let decoder = RepoSyncDecoder::with_config(DecoderConfig::legacy());
        assert!(decoder.extract(&data).is_not_this_format());
    }

    #[test]
    fn legacy_non_integer_is_malformed() {
        let data = ObjectStreamEncoder::new().encode_map(&[("channel_id", "abc".into())]);
        let decoder = RepoSyncDecoder::with_config(DecoderConfig::legacy());
        assert!(decoder.extract(&data).is_malformed());
    }

    #[test]
    fn tight_handle_limit_yields_partial() {
        let data = ObjectStreamEncoder::new()
            .encode_map(&[("channel_id", "1".into()), ("latest", "true".into())]);
        let config = DecoderConfig {
            max_handles: 4,
            ..DecoderConfig::default()
        };
        let outcome = RepoSyncDecoder::with_config(config).extract(&data);
        assert_eq!(
            outcome,
            DecodeOutcome::Partial(RawExtraction {
                channel_ids: vec![1],
                applied: 1,
                ..RawExtraction::default()
            })
        );
    }
}
