use super::*;

#[test]
fn dup_duplicates_top() {
    let mut stack = vec![vec![1u8]];
    assert!(op_dup(&mut stack));
    assert_eq!(stack, vec![vec![1u8], vec![1u8]]);
}

#[test]
fn dup_fails_on_empty_stack() {
    let mut stack: Stack = vec![];
    assert!(!op_dup(&mut stack));
}

#[test]
fn equal_pushes_true_or_false() {
    let mut stack = vec![vec![1u8], vec![1u8]];
    assert!(op_equal(&mut stack));
    assert_eq!(decode_num(stack.last().unwrap()), 1);

    let mut stack = vec![vec![1u8], vec![2u8]];
    assert!(op_equal(&mut stack));
    assert_eq!(decode_num(stack.last().unwrap()), 0);
}

#[test]
fn add_sums_numeric_stack_values() {
    let mut stack = vec![encode_num(4), encode_num(5)];
    assert!(op_add(&mut stack));
    assert_eq!(decode_num(stack.last().unwrap()), 9);
}

#[test]
fn hash160_then_hash256_chain() {
    let mut stack = vec![b"hello".to_vec()];
    assert!(op_hash160(&mut stack));
    assert_eq!(stack.last().unwrap().len(), 20);

    let mut stack = vec![b"hello".to_vec()];
    assert!(op_hash256(&mut stack));
    assert_eq!(stack.last().unwrap().len(), 32);
}

#[test]
fn checksig_rejects_invalid_sec_bytes() {
    let mut stack = vec![vec![0u8; 10], vec![0u8; 10]];
    let z = BigUint::from(1u32);
    assert!(!op_checksig(&mut stack, &z));
}

#[test]
fn checksig_verifies_real_signature() {
    use crate::keys::PrivateKey;

    let pk = PrivateKey::new(BigUint::from(9999u64));
    let z = BigUint::from(123456u64);
    let sig = pk.sign(&z);
    let mut der = sig.der();
    der.push(1); // SIGHASH_ALL marker the opcode strips

    let mut stack = vec![der, pk.public_key().sec(true)];
    assert!(op_checksig(&mut stack, &z));
    assert_eq!(decode_num(stack.last().unwrap()), 1);
}

#[test]
fn op_if_selects_true_branch() {
    let mut stack = vec![encode_num(1)];
    let mut cmds: VecDeque<Cmd> = VecDeque::from(vec![
        Cmd::Data(b"yes".to_vec()),
        Cmd::Op(103), // OP_ELSE
        Cmd::Data(b"no".to_vec()),
        Cmd::Op(104), // OP_ENDIF
    ]);
    assert!(op_if(&mut stack, &mut cmds, false));
    assert_eq!(cmds.pop_front(), Some(Cmd::Data(b"yes".to_vec())));
    assert!(cmds.is_empty());
}

#[test]
fn op_notif_inverts_condition() {
    let mut stack = vec![encode_num(0)];
    let mut cmds: VecDeque<Cmd> = VecDeque::from(vec![
        Cmd::Data(b"yes".to_vec()),
        Cmd::Op(104), // OP_ENDIF
    ]);
    assert!(op_if(&mut stack, &mut cmds, true));
    assert_eq!(cmds.pop_front(), Some(Cmd::Data(b"yes".to_vec())));
}

#[test]
fn op_if_fails_without_matching_endif() {
    let mut stack = vec![encode_num(1)];
    let mut cmds: VecDeque<Cmd> = VecDeque::from(vec![Cmd::Data(b"yes".to_vec())]);
    assert!(!op_if(&mut stack, &mut cmds, false));
}

#[test]
fn checkmultisig_accepts_valid_2_of_3() {
    use crate::keys::PrivateKey;

    let z = BigUint::from(555u64);
    let signers: Vec<PrivateKey> = [1u64, 2, 3].iter().map(|s| PrivateKey::new(BigUint::from(*s))).collect();

    let mut stack = Vec::new();
    stack.push(encode_num(0)); // dummy consumed by the off-by-one
    let mut sig1 = signers[0].sign(&z).der();
    sig1.push(1);
    let mut sig2 = signers[1].sign(&z).der();
    sig2.push(1);
    stack.push(sig2);
    stack.push(sig1);
    stack.push(encode_num(2)); // m
    stack.push(signers[2].public_key().sec(true));
    stack.push(signers[1].public_key().sec(true));
    stack.push(signers[0].public_key().sec(true));
    stack.push(encode_num(3)); // n

    assert!(op_checkmultisig(&mut stack, &z));
    assert_eq!(decode_num(stack.last().unwrap()), 1);
}
