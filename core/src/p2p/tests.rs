use super::*;

#[test]
fn serialize_then_parse_round_trips() {
    let envelope = NetworkEnvelope::new(b"verack", Vec::new(), false);
    let raw = envelope.serialize();
    let reparsed = NetworkEnvelope::parse(&mut &raw[..], false).unwrap();
    assert_eq!(envelope, reparsed);
}

#[test]
fn mainnet_and_testnet_use_distinct_magic_bytes() {
    let mainnet = NetworkEnvelope::new(b"ping", vec![1, 2, 3], false);
    let testnet = NetworkEnvelope::new(b"ping", vec![1, 2, 3], true);
    assert_eq!(&mainnet.serialize()[..4], &NETWORK_MAGIC);
    assert_eq!(&testnet.serialize()[..4], &TESTNET_NETWORK_MAGIC);
    assert_ne!(NETWORK_MAGIC, TESTNET_NETWORK_MAGIC);
}

#[test]
fn parse_rejects_wrong_network_magic() {
    let raw = NetworkEnvelope::new(b"ping", vec![1, 2, 3], false).serialize();
    assert!(matches!(NetworkEnvelope::parse(&mut &raw[..], true), Err(Error::BadMagic)));
}

#[test]
fn parse_rejects_corrupted_payload() {
    let mut raw = NetworkEnvelope::new(b"ping", vec![1, 2, 3, 4, 5, 6, 7, 8], false).serialize();
    let last = raw.len() - 1;
    raw[last] ^= 0xff;
    assert!(matches!(NetworkEnvelope::parse(&mut &raw[..], false), Err(Error::BadChecksum)));
}

#[test]
fn command_shorter_than_twelve_bytes_is_nul_padded() {
    let envelope = NetworkEnvelope::new(b"ping", vec![9], false);
    let raw = envelope.serialize();
    assert_eq!(&raw[4..16], b"ping\0\0\0\0\0\0\0\0");
}

#[test]
fn parse_on_empty_stream_reports_connection_reset() {
    let empty: Vec<u8> = Vec::new();
    assert!(matches!(NetworkEnvelope::parse(&mut &empty[..], false), Err(Error::ConnectionReset)));
}
