//! ECDSA key pairs: SEC/WIF/address encodings, RFC 6979 deterministic signing,
//! and verification.
use hmac::{Hmac, Mac};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use sha2::Sha256;

use crate::codec::{decode_base58_check, encode_base58_checksum, hash160};
use crate::curve::{s256_mul, s256_point, secp256k1_rhs, Point, SECP256K1_G, SECP256K1_N};
use crate::error::{Error, Result};
use crate::field::FieldElement;
use crate::signature::Signature;

type HmacSha256 = Hmac<Sha256>;

fn pad32(bytes: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let start = 32 - bytes.len().min(32);
    out[start..].copy_from_slice(&bytes[bytes.len().saturating_sub(32)..]);
    out
}

fn mod_n(x: &BigUint) -> FieldElement {
    FieldElement::new(x % &*SECP256K1_N, SECP256K1_N.clone())
        .expect("reduction modulo n always fits")
}

/// A public key: a point known to lie on secp256k1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey(Point);

impl PublicKey {
    pub fn from_point(point: Point) -> PublicKey {
        PublicKey(point)
    }

    pub fn point(&self) -> &Point {
        &self.0
    }

    /// Verifies `(r, s)` against the message hash `z`.
    pub fn verify(&self, z: &BigUint, sig: &Signature) -> bool {
        let n = &*SECP256K1_N;
        if sig.r.is_zero() || sig.r >= *n || sig.s.is_zero() || sig.s >= *n {
            return false;
        }
        let s_inv = mod_n(&sig.s).inverse();
        let u = mod_n(z).mul(&s_inv).expect("same field");
        let v = mod_n(&sig.r).mul(&s_inv).expect("same field");
        let total = s256_mul(&SECP256K1_G, u.num())
            .add(&s256_mul(&self.0, v.num()))
            .expect("points share secp256k1");
        if total.is_infinity() {
            return false;
        }
        (total.x().unwrap().num() % n) == sig.r
    }

    /// SEC encoding: `04 || X || Y` uncompressed, `02/03 || X` compressed.
    pub fn sec(&self, compressed: bool) -> Vec<u8> {
        let x = self.0.x().expect("public keys are never infinity");
        let y = self.0.y().expect("public keys are never infinity");
        let mut x_bytes = x.num().to_bytes_be();
        while x_bytes.len() < 32 {
            x_bytes.insert(0, 0);
        }
        if compressed {
            let prefix = if y.num() % BigUint::from(2u32) == BigUint::zero() {
                0x02
            } else {
                0x03
            };
            let mut out = vec![prefix];
            out.extend(x_bytes);
            out
        } else {
            let mut y_bytes = y.num().to_bytes_be();
            while y_bytes.len() < 32 {
                y_bytes.insert(0, 0);
            }
            let mut out = vec![0x04];
            out.extend(x_bytes);
            out.extend(y_bytes);
            out
        }
    }

    /// Parses a SEC-encoded public key, recovering `y` for the compressed form.
    pub fn parse(sec_bin: &[u8]) -> Result<PublicKey> {
        if sec_bin.is_empty() {
            return Err(Error::BadSec);
        }
        if sec_bin[0] == 0x04 {
            if sec_bin.len() != 65 {
                return Err(Error::BadSec);
            }
            let x = BigUint::from_bytes_be(&sec_bin[1..33]);
            let y = BigUint::from_bytes_be(&sec_bin[33..65]);
            return Ok(PublicKey(s256_point(x, y)?));
        }
        if sec_bin.len() != 33 || (sec_bin[0] != 0x02 && sec_bin[0] != 0x03) {
            return Err(Error::BadSec);
        }
        let is_even = sec_bin[0] == 0x02;
        let x_num = BigUint::from_bytes_be(&sec_bin[1..]);
        let x = FieldElement::new(x_num.clone(), crate::field::secp256k1_prime())
            .map_err(|_| Error::BadSec)?;
        let alpha = secp256k1_rhs(&x)?;
        let beta = alpha.sqrt();
        let prime = crate::field::secp256k1_prime();
        let (even_beta, odd_beta) = if beta.num() % BigUint::from(2u32) == BigUint::zero() {
            (beta.num().clone(), &prime - beta.num())
        } else {
            (&prime - beta.num(), beta.num().clone())
        };
        let y = if is_even { even_beta } else { odd_beta };
        Ok(PublicKey(s256_point(x_num, y)?))
    }

    pub fn hash160(&self, compressed: bool) -> [u8; 20] {
        hash160(&self.sec(compressed))
    }

    pub fn address(&self, compressed: bool, testnet: bool) -> String {
        crate::codec::h160_to_p2pkh_address(&self.hash160(compressed), testnet)
    }
}

/// A private key: the secret scalar, plus its cached public point `secret * G`.
#[derive(Clone, Debug)]
pub struct PrivateKey {
    secret: BigUint,
    point: PublicKey,
}

impl PrivateKey {
    pub fn new(secret: BigUint) -> PrivateKey {
        let point = PublicKey::from_point(s256_mul(&SECP256K1_G, &secret));
        PrivateKey { secret, point }
    }

    pub fn secret(&self) -> &BigUint {
        &self.secret
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.point
    }

    /// RFC 6979 deterministic nonce derivation (HMAC-SHA256 based).
    fn deterministic_k(&self, z: &BigUint) -> BigUint {
        let n = &*SECP256K1_N;
        let z = if z > n { z - n } else { z.clone() };
        let z_bytes = pad32(&z.to_bytes_be());
        let secret_bytes = pad32(&self.secret.to_bytes_be());

        let mut k = [0u8; 32];
        let mut v = [1u8; 32];

        let mut mac = HmacSha256::new_from_slice(&k).unwrap();
        mac.update(&v);
        mac.update(&[0x00]);
        mac.update(&secret_bytes);
        mac.update(&z_bytes);
        k = mac.finalize().into_bytes().into();

        let mut mac = HmacSha256::new_from_slice(&k).unwrap();
        mac.update(&v);
        v = mac.finalize().into_bytes().into();

        let mut mac = HmacSha256::new_from_slice(&k).unwrap();
        mac.update(&v);
        mac.update(&[0x01]);
        mac.update(&secret_bytes);
        mac.update(&z_bytes);
        k = mac.finalize().into_bytes().into();

        let mut mac = HmacSha256::new_from_slice(&k).unwrap();
        mac.update(&v);
        v = mac.finalize().into_bytes().into();

        loop {
            let mut mac = HmacSha256::new_from_slice(&k).unwrap();
            mac.update(&v);
            v = mac.finalize().into_bytes().into();

            let candidate = BigUint::from_bytes_be(&v);
            if candidate >= BigUint::one() && candidate < *n {
                return candidate;
            }

            let mut mac = HmacSha256::new_from_slice(&k).unwrap();
            mac.update(&v);
            mac.update(&[0x00]);
            k = mac.finalize().into_bytes().into();

            let mut mac = HmacSha256::new_from_slice(&k).unwrap();
            mac.update(&v);
            v = mac.finalize().into_bytes().into();
        }
    }

    /// Signs the message hash `z`, retrying `k` if `r` or the final `s` land
    /// on zero, and normalizing to low-`S` form.
    pub fn sign(&self, z: &BigUint) -> Signature {
        let n = &*SECP256K1_N;
        loop {
            let k = self.deterministic_k(z);
            let kg = s256_mul(&SECP256K1_G, &k);
            let r = kg.x().unwrap().num() % n;
            if r.is_zero() {
                continue;
            }
            let k_inv = mod_n(&k).inverse();
            let s = mod_n(z)
                .add(&mod_n(&r).mul(&mod_n(&self.secret)).unwrap())
                .unwrap()
                .mul(&k_inv)
                .unwrap();
            let mut s_num = s.num().clone();
            if s_num.is_zero() {
                continue;
            }
            let half_n = n / BigUint::from(2u32);
            if s_num > half_n {
                s_num = n - s_num;
            }
            return Signature::new(r, s_num);
        }
    }

    /// WIF encoding: `prefix || secret(32) || (0x01 if compressed)`, Base58Check.
    pub fn wif(&self, compressed: bool, testnet: bool) -> String {
        let prefix: u8 = if testnet { 0xef } else { 0x80 };
        let mut secret_bytes = self.secret.to_bytes_be();
        while secret_bytes.len() < 32 {
            secret_bytes.insert(0, 0);
        }
        let mut payload = vec![prefix];
        payload.extend(secret_bytes);
        if compressed {
            payload.push(0x01);
        }
        encode_base58_checksum(&payload)
    }

    /// The structural inverse of [`PrivateKey::wif`]: returns the key and
    /// whether its SEC/address form should be compressed.
    pub fn from_wif(wif: &str) -> Result<(PrivateKey, bool)> {
        let payload = decode_base58_check(wif)?;
        let compressed = match payload.len() {
            34 if *payload.last().unwrap() == 0x01 => true,
            33 => false,
            _ => return Err(Error::BadBase58),
        };
        let secret = BigUint::from_bytes_be(&payload[1..33]);
        Ok((PrivateKey::new(secret), compressed))
    }
}
