use super::*;

#[test]
fn varint_round_trips() {
    for n in [0u64, 1, 252, 253, 255, 65535, 65536, 0xffffffff, 0xffffffff + 1] {
        let encoded = encode_varint(n).unwrap();
        let decoded = read_varint(&mut &encoded[..]).unwrap();
        assert_eq!(decoded, n, "round trip failed for {n}");
    }
}

#[test]
fn varint_matches_known_encodings() {
    assert_eq!(encode_varint(100).unwrap(), vec![100]);
    assert_eq!(encode_varint(555).unwrap(), vec![0xfd, 0x2b, 0x02]);
    assert_eq!(
        encode_varint(70015).unwrap(),
        vec![0xfe, 0x7f, 0x11, 0x01, 0x00]
    );
}

#[test]
fn little_endian_round_trips() {
    let n = 1_000_000u64;
    let bytes = int_to_little_endian(n, 4);
    assert_eq!(little_endian_to_u32(&bytes) as u64, n);
}

#[test]
fn hash256_is_double_sha256() {
    let digest = hash256(b"hello world");
    let first = Sha256::digest(b"hello world");
    let second = Sha256::digest(first);
    assert_eq!(&digest[..], &second[..]);
}

#[test]
fn hash160_hashes_the_argument_not_a_literal() {
    // regression test for the source bug: hash160 must hash the caller's bytes.
    let a = hash160(b"alpha");
    let b = hash160(b"beta");
    assert_ne!(a, b);
}

#[test]
fn encode_num_zero_is_empty() {
    assert_eq!(encode_num(0), Vec::<u8>::new());
    assert_eq!(decode_num(&[]), 0);
}

#[test]
fn encode_decode_num_round_trips() {
    for n in [1i64, -1, 127, -127, 128, -128, 255, -255, 1000, -1000] {
        let encoded = encode_num(n);
        assert_eq!(decode_num(&encoded), n, "round trip failed for {n}");
    }
}

#[test]
fn base58_checksum_round_trips() {
    let payload = vec![0x00u8; 21];
    let encoded = encode_base58_checksum(&payload);
    let decoded = decode_base58_check(&encoded).unwrap();
    assert_eq!(decoded, payload);
}

#[test]
fn base58_checksum_rejects_corruption() {
    let payload = hash160(b"some pubkey");
    let mut full = vec![0x00u8];
    full.extend_from_slice(&payload);
    let encoded = encode_base58_checksum(&full);
    let mut bytes = encoded.into_bytes();
    // flip the last character, which lands in the checksum's base58 digits
    let last = bytes.len() - 1;
    bytes[last] = if bytes[last] == b'1' { b'2' } else { b'1' };
    let corrupted = String::from_utf8(bytes).unwrap();
    assert!(matches!(decode_base58_check(&corrupted), Err(Error::BadChecksum) | Err(Error::BadBase58)));
}

#[test]
fn p2pkh_and_p2sh_addresses_use_distinct_prefixes() {
    let h160 = hash160(b"some script or pubkey");
    let p2pkh_main = h160_to_p2pkh_address(&h160, false);
    let p2sh_main = h160_to_p2sh_address(&h160, false);
    assert_ne!(p2pkh_main, p2sh_main);
    assert!(p2pkh_main.starts_with('1'));
    assert!(p2sh_main.starts_with('3'));
}

#[test]
fn testnet_addresses_decode_back_to_the_same_hash160() {
    let h160 = hash160(b"testnet script");
    let address = h160_to_p2sh_address(&h160, true);
    let decoded = decode_base58(&address).unwrap();
    assert_eq!(decoded, h160);
}
