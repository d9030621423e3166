use super::*;

fn leaf(n: u8) -> [u8; 32] {
    let mut h = [0u8; 32];
    h[31] = n;
    hash256(&h)
}

#[test]
fn merkle_root_of_single_hash_is_itself() {
    let h = leaf(1);
    assert_eq!(merkle_root(&[h]).unwrap(), h);
}

#[test]
fn merkle_root_duplicates_the_last_hash_on_odd_levels() {
    let hashes = [leaf(1), leaf(2), leaf(3)];
    let root = merkle_root(&hashes).unwrap();
    let padded = [leaf(1), leaf(2), leaf(3), leaf(3)];
    let expected = merkle_root(&padded).unwrap();
    assert_eq!(root, expected);
}

#[test]
fn merkle_parent_level_rejects_singleton() {
    assert!(matches!(merkle_parent_level(&[leaf(1)]), Err(Error::MalformedProof)));
}

#[test]
fn merkle_tree_populate_matches_direct_root_for_full_proof() {
    // two leaves: the root asks to descend left (1), then each leaf position
    // consumes a flag bit (its value is irrelevant at a leaf) before the hash.
    let h0 = leaf(0);
    let h1 = leaf(1);
    let expected_root = merkle_root(&[h0, h1]).unwrap();

    let mut tree = MerkleTree::new(2);
    let mut flag_bits: VecDeque<u8> = VecDeque::from([1, 0, 0]);
    let mut hashes: VecDeque<[u8; 32]> = VecDeque::from([h0, h1]);
    tree.populate_tree(&mut flag_bits, &mut hashes).unwrap();
    assert_eq!(tree.root().unwrap(), expected_root);
}

#[test]
fn bytes_to_bit_field_is_lsb_first() {
    assert_eq!(bytes_to_bit_field(&[0b0000_0001]), vec![1, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(bytes_to_bit_field(&[0b1000_0000]), vec![0, 0, 0, 0, 0, 0, 0, 1]);
}

/// A five-leaf tree, reconstructed from a genuinely partial proof: the left
/// subtree (L0, L1) is given as individual leaves, the right sibling subtree
/// (L2, L3) is given as its already-combined hash, and so is the final
/// odd-leaf-out subtree (L4 duplicated). Flags, in pop order:
/// root(descend)=1, left-internal(descend)=1, left-leaf-pair(descend)=1,
/// L0(leaf)=1, L1(leaf)=1, right-internal(direct hash)=0, root's-right(direct
/// hash)=0 — packed LSB-first into a single byte, 0x1F.
fn five_leaf_partial_proof() -> (MerkleBlock, [u8; 32]) {
    let leaves: Vec<[u8; 32]> = (0..5).map(leaf).collect();
    let expected_root = merkle_root(&leaves).unwrap();

    let p1 = merkle_parent(&leaves[2], &leaves[3]);
    let p2 = merkle_parent(&leaves[4], &leaves[4]);
    let q1 = merkle_parent(&p2, &p2);

    let hashes: Vec<[u8; 32]> = [leaves[0], leaves[1], p1, q1]
        .iter()
        .map(|h| {
            let mut r = *h;
            r.reverse();
            r
        })
        .collect();
    let mut merkle_root_field = expected_root;
    merkle_root_field.reverse();

    let block = MerkleBlock {
        version: 0,
        prev_block: [0u8; 32],
        merkle_root: merkle_root_field,
        timestamp: 0,
        bits: [0u8; 4],
        nonce: [0u8; 4],
        total: 5,
        hashes,
        flags: vec![0x1f],
    };
    (block, expected_root)
}

#[test]
fn merkle_block_is_valid_reconstructs_the_real_root_from_a_partial_proof() {
    let (block, _expected_root) = five_leaf_partial_proof();
    assert!(block.is_valid().unwrap());
}

#[test]
fn merkle_block_is_valid_rejects_leftover_hashes() {
    let (mut block, _) = five_leaf_partial_proof();
    block.hashes.push(leaf(9)); // one hash too many
    assert!(matches!(block.is_valid(), Err(Error::MalformedProof)));
}

#[test]
fn merkle_block_is_valid_rejects_leftover_nonzero_flag_bits() {
    let (mut block, _) = five_leaf_partial_proof();
    block.flags = vec![0x9f]; // sets the unused 8th (padding) bit to 1
    assert!(matches!(block.is_valid(), Err(Error::MalformedProof)));
}
