use super::*;
use std::io::Cursor;

fn sample_header() -> BlockHeader {
    // real mainnet header bytes (block 0000000000000000007962660027c26a9d1...)
    let raw = hex::decode(
        "020000208ec39428b17323fa0ddec8e887b4a7c53b8c0a0a220cfd0000000000000000005b0750fce0a889502d40508d39576821155e9c9e3f5c3157f961db38fd8b25be1e77a759e93c0118a4ffd71d",
    )
    .unwrap();
    BlockHeader::parse(&mut Cursor::new(raw)).unwrap()
}

#[test]
fn parse_then_serialize_round_trips() {
    let header = sample_header();
    let raw = header.serialize();
    let reparsed = BlockHeader::parse(&mut Cursor::new(raw)).unwrap();
    assert_eq!(header, reparsed);
}

#[test]
fn bits_to_target_matches_known_value() {
    let header = sample_header();
    let target = header.target();
    let expected = BigUint::parse_bytes(
        b"013ce9000000000000000000000000000000000000000000",
        16,
    )
    .unwrap();
    assert_eq!(target, expected);
}

#[test]
fn real_header_satisfies_its_own_pow() {
    let header = sample_header();
    assert!(header.pow());
}

#[test]
fn difficulty_is_in_the_expected_ballpark() {
    let header = sample_header();
    let difficulty = header.difficulty();
    assert!((difficulty - 888_171_856_257.3).abs() < 1.0);
}

#[test]
fn target_to_bits_is_the_inverse_of_bits_to_target() {
    let header = sample_header();
    let target = header.target();
    let bits = target_to_bits(&target);
    assert_eq!(bits, header.bits);
}

#[test]
fn retarget_clamps_extreme_time_differentials() {
    let previous_bits = sample_header().bits;
    let too_fast = calculate_new_bits(&previous_bits, 1); // would imply a huge difficulty jump
    let too_slow = calculate_new_bits(&previous_bits, TWO_WEEKS as i64 * 100);
    let clamped_fast = calculate_new_bits(&previous_bits, TWO_WEEKS as i64 / 4);
    let clamped_slow = calculate_new_bits(&previous_bits, TWO_WEEKS as i64 * 4);
    assert_eq!(too_fast, clamped_fast);
    assert_eq!(too_slow, clamped_slow);
}

#[test]
fn bip_flags_read_distinct_version_bits() {
    let mut header = sample_header();
    header.version = 0b001 << 29;
    assert!(header.bip9());
    assert!(!header.bip91());
    assert!(!header.bip141());

    header.version = 1 << 4;
    assert!(header.bip91());
    assert!(!header.bip9());

    header.version = 1 << 1;
    assert!(header.bip141());
}
