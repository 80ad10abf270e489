//! Legacy single-scalar layout matrix.

use lstasko_object_stream::{LegacyDecoder, ObjectStreamEncoder, ObjectStreamError};

#[test]
fn producer_single_channel_map_is_readable() {
    let data = ObjectStreamEncoder::new().encode_map(&[("channel_id", "123".into())]);
    assert_eq!(LegacyDecoder::new().decode(&data), Ok(Some("123")));
}

#[test]
fn wrapped_single_channel_map_is_readable() {
    let data = ObjectStreamEncoder::job_data_map().encode_map(&[("channel_id", "9001".into())]);
    assert_eq!(LegacyDecoder::new().decode(&data), Ok(Some("9001")));
}

#[test]
fn multi_channel_map_is_not_legacy() {
    let data = ObjectStreamEncoder::new().encode_map(&[("channel_ids", vec!["1", "2"].into())]);
    assert_eq!(LegacyDecoder::new().decode(&data), Ok(None));
}

#[test]
fn literal_bytes_from_the_field() {
    let data = b"\xac\xed\x00\x05sr\x00\x11java.util.HashMapchannel_idt\x00\x0512345x";
    assert_eq!(LegacyDecoder::new().decode(data), Ok(Some("12345")));
}

#[test]
fn invalid_text_is_an_error() {
    let data = b"\xac\xed\x00\x05channel_idt\x00\x02\xff\xfex";
    assert_eq!(
        LegacyDecoder::new().decode(data),
        Err(ObjectStreamError::InvalidUtf8)
    );
}
