//! ECDSA signatures and their canonical DER encoding.
use num_bigint::BigUint;

use crate::error::{Error, Result};

/// An ECDSA signature `(r, s)`, both integers in `[1, n)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub r: BigUint,
    pub s: BigUint,
}

impl Signature {
    pub fn new(r: BigUint, s: BigUint) -> Signature {
        Signature { r, s }
    }

    /// Strips leading zero bytes, then prepends `0x00` iff the high bit of the
    /// leading byte would otherwise be set.
    fn der_integer(n: &BigUint) -> Vec<u8> {
        let mut bytes = n.to_bytes_be();
        if bytes.is_empty() {
            bytes.push(0);
        }
        // strip leading null bytes (but keep at least one byte)
        while bytes.len() > 1 && bytes[0] == 0 {
            bytes.remove(0);
        }
        if bytes[0] & 0x80 != 0 {
            bytes.insert(0, 0x00);
        }
        bytes
    }

    /// Returns the canonical DER encoding: `30 <len> 02 <rlen> <r> 02 <slen> <s>`.
    pub fn der(&self) -> Vec<u8> {
        let rbin = Self::der_integer(&self.r);
        let sbin = Self::der_integer(&self.s);

        let mut result = Vec::new();
        result.push(0x02);
        result.push(rbin.len() as u8);
        result.extend_from_slice(&rbin);
        result.push(0x02);
        result.push(sbin.len() as u8);
        result.extend_from_slice(&sbin);

        let mut out = Vec::new();
        out.push(0x30);
        out.push(result.len() as u8);
        out.extend(result);
        out
    }

    /// Parses a DER-encoded signature: the structural inverse of [`Signature::der`].
    pub fn parse(der: &[u8]) -> Result<Signature> {
        if der.len() < 6 || der[0] != 0x30 {
            return Err(Error::BadDer);
        }
        let total_len = der[1] as usize;
        if der.len() != total_len + 2 {
            return Err(Error::BadDer);
        }
        if der[2] != 0x02 {
            return Err(Error::BadDer);
        }
        let rlen = der[3] as usize;
        let r_start = 4;
        let r_end = r_start + rlen;
        if der.len() < r_end + 2 {
            return Err(Error::BadDer);
        }
        let r = BigUint::from_bytes_be(&der[r_start..r_end]);

        if der[r_end] != 0x02 {
            return Err(Error::BadDer);
        }
        let slen = der[r_end + 1] as usize;
        let s_start = r_end + 2;
        let s_end = s_start + slen;
        if der.len() != s_end {
            return Err(Error::BadDer);
        }
        let s = BigUint::from_bytes_be(&der[s_start..s_end]);

        Ok(Signature { r, s })
    }
}

#[cfg(test)]
mod tests;
