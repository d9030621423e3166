use super::*;

#[test]
fn version_message_serializes_to_the_expected_length() {
    let msg = VersionMessage::new(1_000_000, 0x1122334455667788);
    let raw = msg.serialize().unwrap();
    // 4+8+8 + 8+10+2+4+2 + 8+10+2+4+2 + 8 + (1+len(user_agent)) + 4 + 1
    let expected_len = 4 + 8 + 8 + (8 + 10 + 2 + 4 + 2) + (8 + 10 + 2 + 4 + 2) + 8 + 1 + msg.user_agent.len() + 4 + 1;
    assert_eq!(raw.len(), expected_len);
}

#[test]
fn version_message_relay_flag_always_emits_a_byte() {
    let mut msg = VersionMessage::new(0, 0);
    msg.relay = true;
    let raw_true = msg.serialize().unwrap();
    msg.relay = false;
    let raw_false = msg.serialize().unwrap();
    // the trailing relay byte must be present (and differ) either way, not
    // silently dropped when the flag is set.
    assert_eq!(raw_true.len(), raw_false.len());
    assert_eq!(*raw_true.last().unwrap(), 0x01);
    assert_eq!(*raw_false.last().unwrap(), 0x00);
}

#[test]
fn ping_and_pong_carry_the_same_nonce() {
    let ping = PingMessage { nonce: [1, 2, 3, 4, 5, 6, 7, 8] };
    let raw = ping.serialize();
    let reparsed = PingMessage::parse(&mut &raw[..]).unwrap();
    assert_eq!(ping, reparsed);

    let pong = PongMessage::for_ping(&ping);
    assert_eq!(pong.nonce, ping.nonce);
}

#[test]
fn verack_serializes_to_an_empty_payload() {
    assert_eq!(VerAckMessage.serialize(), Vec::<u8>::new());
}

#[test]
fn get_headers_message_reverses_block_hashes_for_the_wire() {
    let mut start = [0u8; 32];
    start[0] = 0xaa;
    let msg = GetHeadersMessage::new(start);
    let raw = msg.serialize().unwrap();
    // version(4) + varint(1) = byte 0x01, then the reversed start hash
    assert_eq!(raw[4], 0x01);
    let wire_start = &raw[5..37];
    assert_eq!(wire_start[31], 0xaa);
    assert_eq!(wire_start[0], 0x00);
}

#[test]
fn get_data_message_round_trips_type_and_identifier_ordering() {
    let mut msg = GetDataMessage::new();
    let mut id = [0u8; 32];
    id[0] = 0x42;
    msg.add_data(1, id);
    let raw = msg.serialize().unwrap();
    assert_eq!(raw[0], 1); // varint count
    assert_eq!(&raw[1..5], &int_to_little_endian(1, 4)[..]);
    // identifier is reversed on the wire: the first byte we set ends up last
    assert_eq!(raw[5], 0x00);
    assert_eq!(raw[36], 0x42);
}

#[test]
fn headers_message_rejects_nonzero_trailing_tx_count() {
    let header_bytes = hex::decode(
        "020000208ec39428b17323fa0ddec8e887b4a7c53b8c0a0a220cfd0000000000000000005b0750fce0a889502d40508d39576821155e9c9e3f5c3157f961db38fd8b25be1e77a759e93c0118a4ffd71d",
    )
    .unwrap();
    let mut raw = vec![1u8]; // one header
    raw.extend(&header_bytes);
    raw.push(1); // tx count must be 0
    assert!(matches!(HeadersMessage::parse(&mut &raw[..]), Err(Error::MalformedProof)));
}

#[test]
fn headers_message_parses_a_real_header_with_zero_tx_count() {
    let header_bytes = hex::decode(
        "020000208ec39428b17323fa0ddec8e887b4a7c53b8c0a0a220cfd0000000000000000005b0750fce0a889502d40508d39576821155e9c9e3f5c3157f961db38fd8b25be1e77a759e93c0118a4ffd71d",
    )
    .unwrap();
    let mut raw = vec![1u8];
    raw.extend(&header_bytes);
    raw.push(0);
    let parsed = HeadersMessage::parse(&mut &raw[..]).unwrap();
    assert_eq!(parsed.headers.len(), 1);
}
