//! Wire-format primitives shared by every other module: varints, little/big-endian
//! integer encoding, Base58(Check), and the double-SHA256 / HASH160 digests.
use std::io::Read;

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

pub const BASE58_ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
pub const SIGHASH_ALL: u32 = 1;
pub const TWO_WEEKS: u32 = 60 * 60 * 24 * 14;

/// Two rounds of SHA-256.
pub fn hash256(s: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(s);
    let second = Sha256::digest(first);
    second.into()
}

/// SHA-256 followed by RIPEMD-160. Hashes the argument bytes, not a literal.
pub fn hash160(s: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(s);
    let rip = Ripemd160::digest(sha);
    rip.into()
}

pub fn little_endian_to_u64(b: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf[..b.len()].copy_from_slice(b);
    u64::from_le_bytes(buf)
}

pub fn little_endian_to_u32(b: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf[..b.len()].copy_from_slice(b);
    u32::from_le_bytes(buf)
}

pub fn int_to_little_endian(n: u64, length: usize) -> Vec<u8> {
    let bytes = n.to_le_bytes();
    bytes[..length].to_vec()
}

/// Reads a varint (1/3/5/9-byte compact unsigned integer) from a reader.
pub fn read_varint<R: Read>(r: &mut R) -> Result<u64> {
    let mut one = [0u8; 1];
    r.read_exact(&mut one)?;
    match one[0] {
        0xfd => {
            let mut b = [0u8; 2];
            r.read_exact(&mut b)?;
            Ok(little_endian_to_u64(&b))
        }
        0xfe => {
            let mut b = [0u8; 4];
            r.read_exact(&mut b)?;
            Ok(little_endian_to_u64(&b))
        }
        0xff => {
            let mut b = [0u8; 8];
            r.read_exact(&mut b)?;
            Ok(little_endian_to_u64(&b))
        }
        i => Ok(i as u64),
    }
}

/// Encodes an integer as a varint.
pub fn encode_varint(i: u64) -> Result<Vec<u8>> {
    if i < 0xfd {
        Ok(vec![i as u8])
    } else if i < 0x10000 {
        let mut out = vec![0xfd];
        out.extend(int_to_little_endian(i, 2));
        Ok(out)
    } else if i < 0x100000000 {
        let mut out = vec![0xfe];
        out.extend(int_to_little_endian(i, 4));
        Ok(out)
    } else {
        let mut out = vec![0xff];
        out.extend(int_to_little_endian(i, 8));
        Ok(out)
    }
}

/// Encodes an integer in minimal signed little-endian form (the Script numeric
/// encoding): zero is the empty string, the sign occupies the 0x80 bit of the
/// top byte.
pub fn encode_num(num: i64) -> Vec<u8> {
    if num == 0 {
        return Vec::new();
    }
    let negative = num < 0;
    let mut abs_num = num.unsigned_abs();
    let mut result = Vec::new();
    while abs_num != 0 {
        result.push((abs_num & 0xff) as u8);
        abs_num >>= 8;
    }
    let last = *result.last().unwrap();
    if last & 0x80 != 0 {
        result.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        let idx = result.len() - 1;
        result[idx] |= 0x80;
    }
    result
}

/// Decodes the Script numeric encoding back into a signed integer.
pub fn decode_num(element: &[u8]) -> i64 {
    if element.is_empty() {
        return 0;
    }
    let mut big_endian: Vec<u8> = element.iter().rev().copied().collect();
    let negative = big_endian[0] & 0x80 != 0;
    if negative {
        big_endian[0] &= 0x7f;
    }
    let mut result: i64 = 0;
    for &b in &big_endian {
        result = (result << 8) + b as i64;
    }
    if negative {
        -result
    } else {
        result
    }
}

/// Encodes bytes to Base58.
pub fn encode_base58(s: &[u8]) -> String {
    let count = s.iter().take_while(|&&c| c == 0).count();
    let mut num = num_bigint::BigUint::from_bytes_be(s);
    let fifty_eight = num_bigint::BigUint::from(58u32);
    let zero = num_bigint::BigUint::from(0u32);
    let mut result = Vec::new();
    while num > zero {
        let (q, r) = num_integer::Integer::div_mod_floor(&num, &fifty_eight);
        num = q;
        let digit: u32 = num_traits::ToPrimitive::to_u32(&r).unwrap();
        result.push(BASE58_ALPHABET[digit as usize]);
    }
    result.reverse();
    let prefix = vec![b'1'; count];
    String::from_utf8([prefix, result].concat()).unwrap()
}

/// Base58Check: payload followed by the first 4 bytes of hash256(payload).
pub fn encode_base58_checksum(payload: &[u8]) -> String {
    let checksum = hash256(payload);
    let mut full = payload.to_vec();
    full.extend_from_slice(&checksum[..4]);
    encode_base58(&full)
}

/// Decodes a Base58Check string, validating the checksum. Returns the full
/// payload (version byte included, checksum stripped).
pub fn decode_base58_check(s: &str) -> Result<Vec<u8>> {
    let leading_ones = s.bytes().take_while(|&c| c == b'1').count();
    let mut num = num_bigint::BigUint::from(0u32);
    let fifty_eight = num_bigint::BigUint::from(58u32);
    for c in s.bytes() {
        let digit = BASE58_ALPHABET
            .iter()
            .position(|&a| a == c)
            .ok_or(Error::BadBase58)?;
        num = &num * &fifty_eight + num_bigint::BigUint::from(digit as u32);
    }
    let mut combined = vec![0u8; leading_ones];
    combined.extend(num.to_bytes_be());
    if combined.len() < 4 {
        return Err(Error::BadBase58);
    }
    let (payload, checksum) = combined.split_at(combined.len() - 4);
    if &hash256(payload)[..4] != checksum {
        return Err(Error::BadChecksum);
    }
    Ok(payload.to_vec())
}

/// Decodes a Base58Check-encoded address, stripping the leading version byte
/// to return the 20-byte hash160.
pub fn decode_base58(s: &str) -> Result<Vec<u8>> {
    let payload = decode_base58_check(s)?;
    Ok(payload[1..].to_vec())
}

/// Encodes a 20-byte hash160 as a P2PKH address.
pub fn h160_to_p2pkh_address(h160: &[u8], testnet: bool) -> String {
    let prefix: u8 = if testnet { 0x6f } else { 0x00 };
    let mut payload = vec![prefix];
    payload.extend_from_slice(h160);
    encode_base58_checksum(&payload)
}

/// Encodes a 20-byte hash160 as a P2SH address.
pub fn h160_to_p2sh_address(h160: &[u8], testnet: bool) -> String {
    let prefix: u8 = if testnet { 0xc4 } else { 0x05 };
    let mut payload = vec![prefix];
    payload.extend_from_slice(h160);
    encode_base58_checksum(&payload)
}

#[cfg(test)]
mod tests;
