//! Property tests for payload classification and decoding.

use proptest::prelude::*;

use lstasko_buffers::Writer;
use lstasko_object_stream::constants::{
    SC_SERIALIZABLE, STREAM_HEADER, TC_CLASSDESC, TC_ENDBLOCKDATA, TC_NULL, TC_OBJECT,
    TC_REFERENCE, TC_STRING,
};
use lstasko_object_stream::{EncodeValue, ObjectStreamEncoder};
use lstasko_reposync::{
    Channel, ChannelRef, DecodeOutcome, DecoderConfig, RepoSyncDecoder, ResolverError,
};

/// Labels every id; never misses.
fn label_all(channel: &ChannelRef) -> Result<Option<Channel>, ResolverError> {
    Ok(match channel {
        ChannelRef::Id(id) => Some(Channel::new(*id, format!("ch-{id}"))),
        ChannelRef::Label(_) => None,
    })
}

fn channel_ids() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(1i64..1_000_000, 0..8)
}

fn flag_text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("true".to_owned()),
        Just("false".to_owned()),
        Just("TRUE".to_owned()),
        "[a-z]{0,6}",
    ]
}

/// A producer-shaped payload with a channel list and two flags.
fn payload() -> impl Strategy<Value = (Vec<u8>, Vec<i64>)> {
    (channel_ids(), flag_text(), flag_text(), any::<bool>()).prop_map(
        |(ids, latest, fail, wrap)| {
            let texts: Vec<String> = ids.iter().map(ToString::to_string).collect();
            let list: Vec<&str> = texts.iter().map(String::as_str).collect();
            let entries = [
                ("channel_ids", EncodeValue::from(list)),
                ("latest", EncodeValue::from(latest.as_str())),
                ("fail", EncodeValue::from(fail.as_str())),
            ];
            let mut encoder = if wrap {
                ObjectStreamEncoder::job_data_map()
            } else {
                ObjectStreamEncoder::new()
            };
            (encoder.encode_map(&entries), ids)
        },
    )
}

/// A stream nesting `levels` deep, through superclass descriptors or
/// through object-valued fields.
fn deep_stream(levels: usize, through_fields: bool) -> Vec<u8> {
    let mut w = Writer::new();
    w.buf(&STREAM_HEADER);
    w.u8(TC_OBJECT);
    if through_fields {
        w.u8(TC_CLASSDESC);
        w.utf8_u16("Node");
        w.u64(1);
        w.u8(SC_SERIALIZABLE);
        w.u16(1);
        w.u8(b'L');
        w.utf8_u16("next");
        w.u8(TC_STRING);
        w.utf8_u16("LNode;");
        w.u8(TC_ENDBLOCKDATA);
        w.u8(TC_NULL);
        for _ in 0..levels {
            w.u8(TC_OBJECT);
            w.u8(TC_REFERENCE);
            w.u32(0x7e_0000);
        }
    } else {
        for _ in 0..levels {
            w.u8(TC_CLASSDESC);
            w.utf8_u16("X");
            w.u64(0);
            w.u8(SC_SERIALIZABLE);
            w.u16(0);
            w.u8(TC_ENDBLOCKDATA);
        }
    }
    w.flush()
}

proptest! {
    #[test]
    fn well_formed_payloads_decode_fully((data, ids) in payload()) {
        let outcome = RepoSyncDecoder::new().decode(&data, &label_all).unwrap();
        prop_assert!(outcome.is_full(), "{:?}", outcome);
        let channels: Vec<i64> = outcome
            .details()
            .map(|d| d.channels.iter().map(|c| c.channel_id).collect())
            .unwrap_or_default();
        prop_assert_eq!(channels, ids);
    }

    #[test]
    fn truncation_is_malformed_or_partial(
        (data, _ids) in payload(),
        cut in any::<prop::sample::Index>(),
    ) {
        let len = 1 + cut.index(data.len() - 1);
        let outcome = RepoSyncDecoder::new().decode(&data[..len], &label_all).unwrap();
        prop_assert!(
            matches!(outcome, DecodeOutcome::Malformed { .. } | DecodeOutcome::Partial(_)),
            "cut at {} of {}: {:?}", len, data.len(), outcome
        );
    }

    #[test]
    fn non_magic_prefix_is_not_this_format(
        head in prop::array::uniform4(any::<u8>()).prop_filter("not magic", |h| *h != STREAM_HEADER),
        tail in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let mut data = head.to_vec();
        data.extend_from_slice(&tail);
        for decoder in [RepoSyncDecoder::new(), RepoSyncDecoder::with_config(DecoderConfig::legacy())] {
            prop_assert_eq!(
                decoder.decode(&data, &label_all).unwrap(),
                DecodeOutcome::NotThisFormat
            );
        }
    }

    #[test]
    fn arbitrary_streams_are_deterministic(body in prop::collection::vec(any::<u8>(), 0..256)) {
        let mut data = STREAM_HEADER.to_vec();
        data.extend_from_slice(&body);
        for decoder in [RepoSyncDecoder::new(), RepoSyncDecoder::with_config(DecoderConfig::legacy())] {
            let first = decoder.decode(&data, &label_all).unwrap();
            let second = decoder.decode(&data, &label_all).unwrap();
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn deep_nesting_is_malformed_under_default_limits(
        levels in 65usize..3000,
        through_fields in any::<bool>(),
    ) {
        let data = deep_stream(levels, through_fields);
        let outcome = RepoSyncDecoder::new().decode(&data, &label_all).unwrap();
        prop_assert_eq!(
            outcome,
            DecodeOutcome::Malformed { reason: "content nesting deeper than 64".to_owned() }
        );
    }
}
