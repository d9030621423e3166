use super::*;
use num_bigint::BigUint;

fn fe(num: u64, prime: u64) -> FieldElement {
    FieldElement::new(BigUint::from(num), BigUint::from(prime)).unwrap()
}

#[test]
fn out_of_range_is_rejected() {
    assert!(FieldElement::new(BigUint::from(13u64), BigUint::from(13u64)).is_err());
}

#[test]
fn add_wraps_modulo_prime() {
    let a = fe(7, 13);
    let b = fe(12, 13);
    let sum = a.add(&b).unwrap();
    assert_eq!(sum, fe(6, 13));
}

#[test]
fn sub_never_goes_negative() {
    let a = fe(6, 13);
    let b = fe(9, 13);
    let diff = a.sub(&b).unwrap();
    assert_eq!(diff, fe(10, 13));
}

#[test]
fn mul_matches_known_value() {
    let a = fe(3, 13);
    let b = fe(12, 13);
    assert_eq!(a.mul(&b).unwrap(), fe(10, 13));
}

#[test]
fn mismatched_fields_error() {
    let a = fe(1, 7);
    let b = fe(1, 11);
    assert!(a.add(&b).is_err());
    assert!(a.mul(&b).is_err());
}

#[test]
fn pow_reduces_exponent_modulo_prime_minus_one() {
    let a = fe(3, 13);
    // 3^12 == 3^0 == 1 (mod 13) by Fermat's little theorem
    let direct = a.pow(&BigUint::from(12u64));
    assert_eq!(direct, fe(1, 13));
}

#[test]
fn div_is_mul_by_inverse() {
    let a = fe(7, 19);
    let b = fe(5, 19);
    let quotient = a.div(&b).unwrap();
    assert_eq!(quotient.mul(&b).unwrap(), a);
}

#[test]
fn inverse_round_trips() {
    let a = fe(8, 23);
    let inv = a.inverse();
    assert_eq!(a.mul(&inv).unwrap(), fe(1, 23));
}

#[test]
fn secp256k1_prime_matches_literal() {
    let p = secp256k1_prime();
    let expected = BigUint::parse_bytes(
        b"fffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f",
        16,
    )
    .unwrap();
    assert_eq!(p, expected);
}
