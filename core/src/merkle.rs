//! Merkle tree construction and SPV proof reconstruction.
use std::collections::VecDeque;
use std::io::Read;

use crate::codec::{hash256, int_to_little_endian, read_varint};
use crate::error::{Error, Result};

pub fn merkle_parent(hash1: &[u8; 32], hash2: &[u8; 32]) -> [u8; 32] {
    let mut combined = hash1.to_vec();
    combined.extend(hash2);
    hash256(&combined)
}

/// Pairs adjacent hashes into their parents, duplicating the last hash if
/// the level has odd length. Errors on a single-element level (nothing to pair).
pub fn merkle_parent_level(hashes: &[[u8; 32]]) -> Result<Vec<[u8; 32]>> {
    if hashes.len() == 1 {
        return Err(Error::MalformedProof);
    }
    let mut level = hashes.to_vec();
    if level.len() % 2 == 1 {
        level.push(*level.last().unwrap());
    }
    Ok(level.chunks(2).map(|pair| merkle_parent(&pair[0], &pair[1])).collect())
}

pub fn merkle_root(hashes: &[[u8; 32]]) -> Result<[u8; 32]> {
    if hashes.is_empty() {
        return Err(Error::MalformedProof);
    }
    let mut current = hashes.to_vec();
    while current.len() > 1 {
        current = merkle_parent_level(&current)?;
    }
    Ok(current[0])
}

fn ceil_log2(n: u32) -> u32 {
    if n <= 1 {
        return 0;
    }
    32 - (n - 1).leading_zeros()
}

/// A binary tree of hash slots, navigated by `(current_depth, current_index)`,
/// used to reconstruct a Merkle root from a partial SPV proof.
pub struct MerkleTree {
    max_depth: u32,
    nodes: Vec<Vec<Option<[u8; 32]>>>,
    current_depth: usize,
    current_index: usize,
}

impl MerkleTree {
    pub fn new(total: u32) -> MerkleTree {
        let max_depth = ceil_log2(total);
        let mut nodes = Vec::with_capacity(max_depth as usize + 1);
        for depth in 0..=max_depth {
            let step = 1u32 << (max_depth - depth);
            let num_items = (total + step - 1) / step;
            nodes.push(vec![None; num_items.max(1) as usize]);
        }
        MerkleTree { max_depth, nodes, current_depth: 0, current_index: 0 }
    }

    pub fn root(&self) -> Option<[u8; 32]> {
        self.nodes[0][0]
    }

    fn up(&mut self) {
        // depth 0 can reach here on the final merge into the root; the cursor
        // is never read again once the root is set, so just stop descending.
        if self.current_depth > 0 {
            self.current_depth -= 1;
        }
        self.current_index /= 2;
    }

    fn left(&mut self) {
        self.current_depth += 1;
        self.current_index *= 2;
    }

    fn right(&mut self) {
        self.current_depth += 1;
        self.current_index = self.current_index * 2 + 1;
    }

    fn set_current_node(&mut self, value: [u8; 32]) {
        self.nodes[self.current_depth][self.current_index] = Some(value);
    }

    fn get_left_node(&self) -> Option<[u8; 32]> {
        self.nodes[self.current_depth + 1][self.current_index * 2]
    }

    fn get_right_node(&self) -> Option<[u8; 32]> {
        self.nodes[self.current_depth + 1][self.current_index * 2 + 1]
    }

    fn is_leaf(&self) -> bool {
        self.current_depth as u32 == self.max_depth
    }

    fn right_exists(&self) -> bool {
        self.nodes[self.current_depth + 1].len() > self.current_index * 2 + 1
    }

    /// Walks the tree, consuming one flag bit per internal decision and one
    /// hash per leaf/provided-subtree, until the root is known.
    pub fn populate_tree(&mut self, flag_bits: &mut VecDeque<u8>, hashes: &mut VecDeque<[u8; 32]>) -> Result<()> {
        while self.root().is_none() {
            if self.is_leaf() {
                flag_bits.pop_front().ok_or(Error::MalformedProof)?;
                let h = hashes.pop_front().ok_or(Error::MalformedProof)?;
                self.set_current_node(h);
                self.up();
            } else {
                let left_hash = self.get_left_node();
                match left_hash {
                    None => {
                        let bit = flag_bits.pop_front().ok_or(Error::MalformedProof)?;
                        if bit == 0 {
                            let h = hashes.pop_front().ok_or(Error::MalformedProof)?;
                            self.set_current_node(h);
                            self.up();
                        } else {
                            self.left();
                        }
                    }
                    Some(left_hash) => {
                        if self.right_exists() {
                            match self.get_right_node() {
                                None => self.right(),
                                Some(right_hash) => {
                                    self.set_current_node(merkle_parent(&left_hash, &right_hash));
                                    self.up();
                                }
                            }
                        } else {
                            self.set_current_node(merkle_parent(&left_hash, &left_hash));
                            self.up();
                        }
                    }
                }
            }
        }

        if !hashes.is_empty() {
            return Err(Error::MalformedProof);
        }
        if flag_bits.iter().any(|&b| b != 0) {
            return Err(Error::MalformedProof);
        }
        Ok(())
    }
}

/// Unpacks a byte string into its individual bits, LSB first within each byte.
pub fn bytes_to_bit_field(bytes: &[u8]) -> Vec<u8> {
    let mut flag_bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        let mut b = byte;
        for _ in 0..8 {
            flag_bits.push(b & 1);
            b >>= 1;
        }
    }
    flag_bits
}

/// A `merkleblock` message: a block header plus a partial Merkle proof for
/// a filtered set of transactions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleBlock {
    pub version: u32,
    pub prev_block: [u8; 32],
    pub merkle_root: [u8; 32],
    pub timestamp: u32,
    pub bits: [u8; 4],
    pub nonce: [u8; 4],
    pub total: u32,
    pub hashes: Vec<[u8; 32]>,
    pub flags: Vec<u8>,
}

impl MerkleBlock {
    pub fn parse<R: Read>(r: &mut R) -> Result<MerkleBlock> {
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

        let mut total_buf = [0u8; 4];
        r.read_exact(&mut total_buf)?;
        let total = u32::from_le_bytes(total_buf);

        let num_hashes = read_varint(r)?;
        let mut hashes = Vec::with_capacity(num_hashes as usize);
        for _ in 0..num_hashes {
            let mut h = [0u8; 32];
            r.read_exact(&mut h)?;
            h.reverse();
            hashes.push(h);
        }

        let flags_length = read_varint(r)?;
        let mut flags = vec![0u8; flags_length as usize];
        r.read_exact(&mut flags)?;

        Ok(MerkleBlock { version, prev_block, merkle_root, timestamp, bits, nonce, total, hashes, flags })
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
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
        result.extend(int_to_little_endian(self.total as u64, 4));
        result.extend(crate::codec::encode_varint(self.hashes.len() as u64)?);
        for h in &self.hashes {
            let mut reversed = *h;
            reversed.reverse();
            result.extend(reversed);
        }
        result.extend(crate::codec::encode_varint(self.flags.len() as u64)?);
        result.extend(&self.flags);
        Ok(result)
    }

    /// Reconstructs the Merkle root from `hashes`/`flags` and compares it
    /// against `merkle_root`.
    pub fn is_valid(&self) -> Result<bool> {
        let mut flag_bits: VecDeque<u8> = bytes_to_bit_field(&self.flags).into();
        let mut hashes: VecDeque<[u8; 32]> = self
            .hashes
            .iter()
            .map(|h| {
                let mut r = *h;
                r.reverse();
                r
            })
            .collect();
        let mut tree = MerkleTree::new(self.total);
        tree.populate_tree(&mut flag_bits, &mut hashes)?;
        let mut root = tree.root().ok_or(Error::MalformedProof)?;
        root.reverse();
        Ok(root == self.merkle_root)
    }
}

#[cfg(test)]
mod tests;
