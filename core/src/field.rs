//! A finite field element and the secp256k1 specialization `F_p`.
use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::fmt;

use crate::error::{Error, Result};

/// An element of `Z/primeZ`. Immutable: every operation returns a new value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldElement {
    num: BigUint,
    prime: BigUint,
}

impl FieldElement {
    pub fn new(num: BigUint, prime: BigUint) -> Result<Self> {
        if num >= prime {
            return Err(Error::FieldOutOfRange {
                num: num.to_str_radix(10),
                prime: prime.to_str_radix(10),
            });
        }
        Ok(FieldElement { num, prime })
    }

    pub fn num(&self) -> &BigUint {
        &self.num
    }

    pub fn prime(&self) -> &BigUint {
        &self.prime
    }

    fn same_field(&self, other: &FieldElement) -> Result<()> {
        if self.prime != other.prime {
            Err(Error::MixedField)
        } else {
            Ok(())
        }
    }

    pub fn add(&self, other: &FieldElement) -> Result<FieldElement> {
        self.same_field(other)?;
        let num = (&self.num + &other.num) % &self.prime;
        Ok(FieldElement { num, prime: self.prime.clone() })
    }

    pub fn sub(&self, other: &FieldElement) -> Result<FieldElement> {
        self.same_field(other)?;
        let num = (&self.prime + &self.num - &other.num) % &self.prime;
        Ok(FieldElement { num, prime: self.prime.clone() })
    }

    pub fn mul(&self, other: &FieldElement) -> Result<FieldElement> {
        self.same_field(other)?;
        let num = (&self.num * &other.num) % &self.prime;
        Ok(FieldElement { num, prime: self.prime.clone() })
    }

    pub fn scale(&self, coefficient: &BigUint) -> FieldElement {
        let num = (&self.num * coefficient) % &self.prime;
        FieldElement { num, prime: self.prime.clone() }
    }

    /// Square-and-multiply exponentiation, with the exponent reduced modulo `p - 1`.
    pub fn pow(&self, exponent: &BigUint) -> FieldElement {
        let order_minus_one = &self.prime - BigUint::one();
        let reduced = exponent % &order_minus_one;
        let num = self.num.modpow(&reduced, &self.prime);
        FieldElement { num, prime: self.prime.clone() }
    }

    /// Modular inverse via Fermat's little theorem: `a^(p-2) mod p`.
    pub fn inverse(&self) -> FieldElement {
        let exponent = &self.prime - BigUint::from(2u32);
        let num = self.num.modpow(&exponent, &self.prime);
        FieldElement { num, prime: self.prime.clone() }
    }

    pub fn div(&self, other: &FieldElement) -> Result<FieldElement> {
        self.same_field(other)?;
        Ok(self.mul(&other.inverse())?)
    }

    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement_{}({})", self.prime, self.num)
    }
}

/// `p = 2^256 - 2^32 - 977`, the prime secp256k1's field is built over.
pub fn secp256k1_prime() -> BigUint {
    BigUint::from(2u32).pow(256) - BigUint::from(2u32).pow(32) - BigUint::from(977u32)
}

/// A `FieldElement` over the secp256k1 prime.
pub fn s256_field(num: BigUint) -> FieldElement {
    FieldElement::new(num, secp256k1_prime()).expect("secp256k1 field elements are always reduced")
}

impl FieldElement {
    /// Square root in `F_p`, valid because `p ≡ 3 (mod 4)` for secp256k1: `a^((p+1)/4)`.
    pub fn sqrt(&self) -> FieldElement {
        let exponent = (&self.prime + BigUint::one()) / BigUint::from(4u32);
        self.pow(&exponent)
    }
}

#[cfg(test)]
mod tests;
