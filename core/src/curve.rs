//! Affine points on a short Weierstrass curve `y^2 = x^3 + ax + b`, and the
//! secp256k1 constants (`a = 0`, `b = 7`, generator `G`, order `n`).
use num_bigint::BigUint;
use num_traits::Zero;
use once_cell::sync::Lazy;

use crate::error::{Error, Result};
use crate::field::{s256_field, secp256k1_prime, FieldElement};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Coords {
    Infinity,
    Affine(FieldElement, FieldElement),
}

/// A point on `y^2 = x^3 + ax + b`, or the point at infinity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Point {
    coords: Coords,
    a: FieldElement,
    b: FieldElement,
}

impl Point {
    pub fn infinity(a: FieldElement, b: FieldElement) -> Point {
        Point { coords: Coords::Infinity, a, b }
    }

    pub fn new(x: FieldElement, y: FieldElement, a: FieldElement, b: FieldElement) -> Result<Point> {
        let lhs = y.mul(&y)?;
        let rhs = x.mul(&x)?.mul(&x)?.add(&a.mul(&x)?)?.add(&b)?;
        if lhs != rhs {
            return Err(Error::NotOnCurve);
        }
        Ok(Point { coords: Coords::Affine(x, y), a, b })
    }

    pub fn is_infinity(&self) -> bool {
        matches!(self.coords, Coords::Infinity)
    }

    pub fn x(&self) -> Option<&FieldElement> {
        match &self.coords {
            Coords::Infinity => None,
            Coords::Affine(x, _) => Some(x),
        }
    }

    pub fn y(&self) -> Option<&FieldElement> {
        match &self.coords {
            Coords::Infinity => None,
            Coords::Affine(_, y) => Some(y),
        }
    }

    /// Point addition, following the five-case group law.
    pub fn add(&self, other: &Point) -> Result<Point> {
        if self.a != other.a || self.b != other.b {
            return Err(Error::InvalidPoint);
        }
        // Case 1: either operand is the point at infinity.
        if self.is_infinity() {
            return Ok(other.clone());
        }
        if other.is_infinity() {
            return Ok(self.clone());
        }

        let (x1, y1) = (self.x().unwrap(), self.y().unwrap());
        let (x2, y2) = (other.x().unwrap(), other.y().unwrap());

        // Case 2: same x, different y -> vertical line, result is infinity.
        if x1 == x2 && y1 != y2 {
            return Ok(Point::infinity(self.a.clone(), self.b.clone()));
        }

        // Case 3: different x -> chord.
        if x1 != x2 {
            let slope = y2.sub(y1)?.div(&x2.sub(x1)?)?;
            let x3 = slope.mul(&slope)?.sub(x1)?.sub(x2)?;
            let y3 = slope.mul(&x1.sub(&x3)?)?.sub(y1)?;
            return Point::new(x3, y3, self.a.clone(), self.b.clone());
        }

        // Case 5: same point, y == 0 -> tangent is vertical, result is infinity.
        if y1.is_zero() {
            return Ok(Point::infinity(self.a.clone(), self.b.clone()));
        }

        // Case 4: same point, y != 0 -> tangent.
        let three = FieldElement::new(BigUint::from(3u32) % y1.prime(), y1.prime().clone())?;
        let two = FieldElement::new(BigUint::from(2u32) % y1.prime(), y1.prime().clone())?;
        let slope = three
            .mul(x1)?
            .mul(x1)?
            .add(&self.a)?
            .div(&two.mul(y1)?)?;
        let x3 = slope.mul(&slope)?.sub(x1)?.sub(x1)?;
        let y3 = slope.mul(&x1.sub(&x3)?)?.sub(y1)?;
        Point::new(x3, y3, self.a.clone(), self.b.clone())
    }

    /// Left-to-right double-and-add scalar multiplication.
    pub fn mul_scalar(&self, coefficient: &BigUint) -> Point {
        let mut coef = coefficient.clone();
        let mut current = self.clone();
        let mut result = Point::infinity(self.a.clone(), self.b.clone());
        while coef > BigUint::zero() {
            if &coef & BigUint::from(1u32) == BigUint::from(1u32) {
                result = result.add(&current).expect("points share a curve");
            }
            current = current.add(&current).expect("points share a curve");
            coef >>= 1;
        }
        result
    }
}

pub const SECP256K1_A: u32 = 0;
pub const SECP256K1_B: u32 = 7;

pub static SECP256K1_N: Lazy<BigUint> = Lazy::new(|| {
    BigUint::parse_bytes(
        b"fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141",
        16,
    )
    .unwrap()
});

pub static SECP256K1_G: Lazy<Point> = Lazy::new(|| {
    let x = BigUint::parse_bytes(
        b"79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
        16,
    )
    .unwrap();
    let y = BigUint::parse_bytes(
        b"483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8",
        16,
    )
    .unwrap();
    s256_point(x, y).expect("the secp256k1 generator is on the curve")
});

fn secp256k1_a() -> FieldElement {
    s256_field(BigUint::from(SECP256K1_A))
}

fn secp256k1_b() -> FieldElement {
    s256_field(BigUint::from(SECP256K1_B))
}

/// Constructs a point on secp256k1 from raw coordinates, validating the curve equation.
pub fn s256_point(x: BigUint, y: BigUint) -> Result<Point> {
    Point::new(s256_field(x), s256_field(y), secp256k1_a(), secp256k1_b())
}

/// Scalar multiplication on secp256k1, with the coefficient first reduced modulo `n`.
pub fn s256_mul(point: &Point, coefficient: &BigUint) -> Point {
    let reduced = coefficient % &*SECP256K1_N;
    point.mul_scalar(&reduced)
}

/// `x^3 + 7` over `F_p`, used by SEC point decompression to recover `y`.
pub fn secp256k1_rhs(x: &FieldElement) -> Result<FieldElement> {
    x.mul(x)?.mul(x)?.add(&secp256k1_b())
}

pub fn secp256k1_field_prime() -> BigUint {
    secp256k1_prime()
}

#[cfg(test)]
mod tests;
