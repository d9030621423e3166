use super::*;

#[test]
fn der_round_trips() {
    let sig = Signature::new(BigUint::from(12345u64), BigUint::from(67890u64));
    let der = sig.der();
    let parsed = Signature::parse(&der).unwrap();
    assert_eq!(sig, parsed);
}

#[test]
fn der_prepends_zero_when_high_bit_set() {
    // 0x80 has its high bit set, so DER must prepend a 0x00 byte.
    let sig = Signature::new(BigUint::from(0x80u64), BigUint::from(1u64));
    let der = sig.der();
    // 30 len 02 02 00 80 02 01 01
    assert_eq!(der, vec![0x30, 0x08, 0x02, 0x02, 0x00, 0x80, 0x02, 0x01, 0x01]);
}

#[test]
fn der_strips_leading_zero_bytes() {
    let r = BigUint::from_bytes_be(&[0x00, 0x01, 0x02]);
    let sig = Signature::new(r, BigUint::from(1u64));
    let der = sig.der();
    // the r integer should serialize as just 01 02, not 00 01 02
    assert_eq!(&der[2..6], &[0x02, 0x02, 0x01, 0x02]);
}

#[test]
fn parse_rejects_bad_tag() {
    let der = vec![0x31, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x01];
    assert!(matches!(Signature::parse(&der), Err(Error::BadDer)));
}

#[test]
fn parse_rejects_truncated_input() {
    let der = vec![0x30, 0x06, 0x02, 0x01, 0x01];
    assert!(matches!(Signature::parse(&der), Err(Error::BadDer)));
}
