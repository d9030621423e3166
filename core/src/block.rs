//! Block headers: parsing, proof-of-work, difficulty retargeting, and the
//! BIP9/91/141 version-bit signals.
use std::io::Read;

use num_bigint::BigUint;
use num_traits::Zero;

use crate::codec::{hash256, int_to_little_endian, TWO_WEEKS};
use crate::error::{Error, Result};
use crate::merkle::merkle_root;

/// An 80-byte Bitcoin block header, plus the transaction hashes needed to
/// check its Merkle root (not part of the wire header itself).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockHeader {
    pub version: u32,
    pub prev_block: [u8; 32],
    pub merkle_root: [u8; 32],
    pub timestamp: u32,
    pub bits: [u8; 4],
    pub nonce: [u8; 4],
    pub tx_hashes: Option<Vec<[u8; 32]>>,
}

impl BlockHeader {
    pub fn parse<R: Read>(r: &mut R) -> Result<BlockHeader> {
        let mut version_buf = [0u8; 4];
        r.read_exact(&mut version_buf)?;
        let version = u32::from_le_bytes(version_buf);

        let mut prev_block = [0u8; 32];
        r.read_exact(&mut prev_block)?;
        prev_block.reverse();

        let mut merkle_root = [0u8; 32];
        r.read_exact(&mut merkle_root)?;
        merkle_root.reverse();

        let mut timestamp_buf = [0u8; 4];
        r.read_exact(&mut timestamp_buf)?;
        let timestamp = u32::from_le_bytes(timestamp_buf);

        let mut bits = [0u8; 4];
        r.read_exact(&mut bits)?;
        let mut nonce = [0u8; 4];
        r.read_exact(&mut nonce)?;

        Ok(BlockHeader { version, prev_block, merkle_root, timestamp, bits, nonce, tx_hashes: None })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut result = int_to_little_endian(self.version as u64, 4);
        let mut prev_block = self.prev_block;
        prev_block.reverse();
        result.extend(prev_block);
        let mut merkle_root = self.merkle_root;
        merkle_root.reverse();
        result.extend(merkle_root);
        result.extend(int_to_little_endian(self.timestamp as u64, 4));
        result.extend(self.bits);
        result.extend(self.nonce);
        result
    }

    /// Double-SHA256 of the 80-byte header, reversed to the conventional
    /// display byte order.
    pub fn hash(&self) -> [u8; 32] {
        let mut h = hash256(&self.serialize());
        h.reverse();
        h
    }

    /// Recomputes the Merkle root from `tx_hashes` and compares against the header.
    pub fn validate_merkle_root(&self) -> Result<bool> {
        let hashes = self.tx_hashes.as_ref().ok_or(Error::MalformedProof)?;
        let reversed: Vec<[u8; 32]> = hashes
            .iter()
            .map(|h| {
                let mut r = *h;
                r.reverse();
                r
            })
            .collect();
        let mut root = merkle_root(&reversed)?;
        root.reverse();
        Ok(root == self.merkle_root)
    }

    /// BIP9: top three version bits are `001`.
    pub fn bip9(&self) -> bool {
        self.version >> 29 == 0b001
    }

    /// BIP91: bit 4 is set.
    pub fn bip91(&self) -> bool {
        (self.version >> 4) & 1 == 1
    }

    /// BIP141 (segwit): bit 1 is set.
    pub fn bip141(&self) -> bool {
        (self.version >> 1) & 1 == 1
    }

    pub fn target(&self) -> BigUint {
        bits_to_target(&self.bits)
    }

    /// `0xffff * 256^(0x1d - 3) / target`, as an approximate floating-point ratio.
    pub fn difficulty(&self) -> f64 {
        let lowest = BigUint::from(0xffffu32) * BigUint::from(256u32).pow(0x1d - 3);
        let target = self.target();
        if target.is_zero() {
            return f64::INFINITY;
        }
        let lowest = num_traits::ToPrimitive::to_f64(&lowest).unwrap_or(f64::INFINITY);
        let target = num_traits::ToPrimitive::to_f64(&target).unwrap_or(f64::INFINITY);
        lowest / target
    }

    pub fn pow(&self) -> bool {
        let proof = BigUint::from_bytes_le(&hash256(&self.serialize()));
        proof < self.target()
    }
}

/// `bits` (the compact target encoding): last byte is the exponent, the
/// other three are the little-endian coefficient.
pub fn bits_to_target(bits: &[u8; 4]) -> BigUint {
    let exponent = bits[3] as i64;
    let coefficient = BigUint::from_bytes_le(&bits[..3]);
    coefficient * BigUint::from(256u32).pow((exponent - 3) as u32)
}

/// The structural inverse of [`bits_to_target`].
pub fn target_to_bits(target: &BigUint) -> [u8; 4] {
    let mut raw_bytes = target.to_bytes_be();
    while raw_bytes.first() == Some(&0) && raw_bytes.len() > 1 {
        raw_bytes.remove(0);
    }
    let (exponent, coefficient): (u8, Vec<u8>) = if raw_bytes.is_empty() {
        (0, vec![0, 0, 0])
    } else if raw_bytes[0] > 0x7f {
        let mut c = vec![0u8];
        c.extend(raw_bytes.iter().take(2));
        ((raw_bytes.len() + 1) as u8, c)
    } else {
        let mut c = raw_bytes.clone();
        c.truncate(3);
        while c.len() < 3 {
            c.push(0);
        }
        (raw_bytes.len() as u8, c)
    };
    let mut result = [0u8; 4];
    result[0] = coefficient[2];
    result[1] = coefficient[1];
    result[2] = coefficient[0];
    result[3] = exponent;
    result
}

/// Retargets `previous_bits` given the observed `time_differential` (seconds),
/// clamped to `[TWO_WEEKS/4, TWO_WEEKS*4]`.
pub fn calculate_new_bits(previous_bits: &[u8; 4], time_differential: i64) -> [u8; 4] {
    let two_weeks = TWO_WEEKS as i64;
    let clamped = time_differential.clamp(two_weeks / 4, two_weeks * 4);
    let new_target = bits_to_target(previous_bits) * BigUint::from(clamped as u64) / BigUint::from(two_weeks as u64);
    target_to_bits(&new_target)
}

#[cfg(test)]
mod tests;
