use super::*;
use num_bigint::BigUint;

fn f223(num: i64) -> FieldElement {
    let prime = BigUint::from(223u32);
    let n = if num < 0 {
        (BigUint::from(223u32) - BigUint::from((-num) as u32)) % &prime
    } else {
        BigUint::from(num as u32) % &prime
    };
    FieldElement::new(n, prime).unwrap()
}

fn point223(x: i64, y: i64) -> Result<Point> {
    Point::new(f223(x), f223(y), f223(0), f223(7))
}

#[test]
fn valid_points_on_f223_curve() {
    for (x, y) in [(192, 105), (17, 56), (1, 193)] {
        assert!(point223(x, y).is_ok(), "({x},{y}) should be on the curve");
    }
}

#[test]
fn invalid_points_on_f223_curve() {
    for (x, y) in [(200, 119), (42, 99)] {
        assert!(
            matches!(point223(x, y), Err(Error::NotOnCurve)),
            "({x},{y}) should not be on the curve"
        );
    }
}

#[test]
fn infinity_is_identity() {
    let p = point223(192, 105).unwrap();
    let inf = Point::infinity(f223(0), f223(7));
    assert_eq!(p.add(&inf).unwrap(), p);
    assert_eq!(inf.add(&p).unwrap(), p);
}

#[test]
fn point_plus_negation_is_infinity() {
    let p = point223(192, 105).unwrap();
    let neg = Point::new(p.x().unwrap().clone(), f223(223 - 105), f223(0), f223(7)).unwrap();
    let sum = p.add(&neg).unwrap();
    assert!(sum.is_infinity());
}

#[test]
fn scalar_mul_matches_repeated_addition() {
    let p = point223(47, 71).unwrap();
    let mut doubled = Point::infinity(f223(0), f223(7));
    for _ in 0..5 {
        doubled = doubled.add(&p).unwrap();
    }
    assert_eq!(p.mul_scalar(&BigUint::from(5u32)), doubled);
}

#[test]
fn secp256k1_generator_has_order_n() {
    let g = SECP256K1_G.clone();
    let result = s256_mul(&g, &SECP256K1_N);
    assert!(result.is_infinity());
}

#[test]
fn secp256k1_scalar_mod_n_matches_direct() {
    let g = SECP256K1_G.clone();
    let k = BigUint::from(12345u64);
    let a = s256_mul(&g, &k);
    let b = s256_mul(&g, &(&k + &*SECP256K1_N));
    assert_eq!(a, b);
}
