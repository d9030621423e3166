//! Opcode handlers and the dispatch table `evaluate` pulls from.
use std::collections::VecDeque;

use num_bigint::BigUint;
use ripemd::Ripemd160;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::codec::{decode_num, encode_num, hash160, hash256};
use crate::keys::PublicKey;
use crate::signature::Signature;

use super::Cmd;

type Stack = Vec<Vec<u8>>;

/// The class of opcode handler, matching the four shapes the interpreter needs:
/// plain stack ops, altstack ops, ops that need the signature hash, and flow
/// control ops that splice the remaining command stream.
pub enum OpHandler {
    Unary(fn(&mut Stack) -> bool),
    WithAltstack(fn(&mut Stack, &mut Stack) -> bool),
    WithZ(fn(&mut Stack, &BigUint) -> bool),
    Flow(fn(&mut Stack, &mut VecDeque<Cmd>) -> bool),
}

pub fn lookup(op: u8) -> Option<OpHandler> {
    use OpHandler::*;
    Some(match op {
        0 => Unary(op_0),
        79 => Unary(op_1negate),
        81..=96 => Unary(op_n(op)),
        97 | 176 | 179..=185 => Unary(op_nop),
        99 => Flow(|s, c| op_if(s, c, false)),
        100 => Flow(|s, c| op_if(s, c, true)),
        105 => Unary(op_verify),
        106 => Unary(op_return),
        107 => WithAltstack(op_toaltstack),
        108 => WithAltstack(op_fromaltstack),
        109 => Unary(op_2drop),
        110 => Unary(op_2dup),
        111 => Unary(op_3dup),
        112 => Unary(op_2over),
        113 => Unary(op_2rot),
        114 => Unary(op_2swap),
        115 => Unary(op_ifdup),
        116 => Unary(op_depth),
        117 => Unary(op_drop),
        118 => Unary(op_dup),
        119 => Unary(op_nip),
        120 => Unary(op_over),
        121 => Unary(op_pick),
        122 => Unary(op_roll),
        123 => Unary(op_rot),
        124 => Unary(op_swap),
        125 => Unary(op_tuck),
        130 => Unary(op_size),
        135 => Unary(op_equal),
        136 => Unary(op_equalverify),
        139 => Unary(op_1add),
        140 => Unary(op_1sub),
        143 => Unary(op_negate),
        144 => Unary(op_abs),
        145 => Unary(op_not),
        146 => Unary(op_0notequal),
        147 => Unary(op_add),
        148 => Unary(op_sub),
        149 => Unary(op_mul),
        154 => Unary(op_booland),
        155 => Unary(op_boolor),
        156 => Unary(op_numequal),
        157 => Unary(op_numequalverify),
        158 => Unary(op_numnotequal),
        159 => Unary(op_lessthan),
        160 => Unary(op_greaterthan),
        161 => Unary(op_lessthanorequal),
        162 => Unary(op_greaterthanorequal),
        163 => Unary(op_min),
        164 => Unary(op_max),
        165 => Unary(op_within),
        166 => Unary(op_ripemd160),
        167 => Unary(op_sha1),
        168 => Unary(op_sha256),
        169 => Unary(op_hash160),
        170 => Unary(op_hash256),
        172 => WithZ(op_checksig),
        173 => WithZ(op_checksigverify),
        174 => WithZ(op_checkmultisig),
        175 => WithZ(op_checkmultisigverify),
        _ => return None,
    })
}

fn op_n(op: u8) -> fn(&mut Stack) -> bool {
    // OP_1 (0x51) through OP_16 (0x60) each push their own numeric value.
    // Rust has no per-call closures-as-fn-pointers here, so dispatch through
    // a small const table of the 16 distinct pushers.
    const PUSHERS: [fn(&mut Stack) -> bool; 16] = [
        |s| push_num(s, 1),
        |s| push_num(s, 2),
        |s| push_num(s, 3),
        |s| push_num(s, 4),
        |s| push_num(s, 5),
        |s| push_num(s, 6),
        |s| push_num(s, 7),
        |s| push_num(s, 8),
        |s| push_num(s, 9),
        |s| push_num(s, 10),
        |s| push_num(s, 11),
        |s| push_num(s, 12),
        |s| push_num(s, 13),
        |s| push_num(s, 14),
        |s| push_num(s, 15),
        |s| push_num(s, 16),
    ];
    PUSHERS[(op - 81) as usize]
}

fn push_num(stack: &mut Stack, n: i64) -> bool {
    stack.push(encode_num(n));
    true
}

fn op_0(stack: &mut Stack) -> bool {
    stack.push(encode_num(0));
    true
}

fn op_1negate(stack: &mut Stack) -> bool {
    stack.push(encode_num(-1));
    true
}

fn op_nop(_stack: &mut Stack) -> bool {
    true
}

fn op_verify(stack: &mut Stack) -> bool {
    match stack.pop() {
        Some(element) => decode_num(&element) != 0,
        None => false,
    }
}

fn op_return(_stack: &mut Stack) -> bool {
    false
}

fn op_toaltstack(stack: &mut Stack, altstack: &mut Stack) -> bool {
    match stack.pop() {
        Some(e) => {
            altstack.push(e);
            true
        }
        None => false,
    }
}

fn op_fromaltstack(stack: &mut Stack, altstack: &mut Stack) -> bool {
    match altstack.pop() {
        Some(e) => {
            stack.push(e);
            true
        }
        None => false,
    }
}

fn op_2drop(stack: &mut Stack) -> bool {
    if stack.len() < 2 {
        return false;
    }
    stack.pop();
    stack.pop();
    true
}

fn op_2dup(stack: &mut Stack) -> bool {
    if stack.len() < 2 {
        return false;
    }
    let a = stack[stack.len() - 2].clone();
    let b = stack[stack.len() - 1].clone();
    stack.push(a);
    stack.push(b);
    true
}

fn op_3dup(stack: &mut Stack) -> bool {
    if stack.len() < 3 {
        return false;
    }
    let n = stack.len();
    let items: Vec<Vec<u8>> = stack[n - 3..].to_vec();
    stack.extend(items);
    true
}

fn op_2over(stack: &mut Stack) -> bool {
    if stack.len() < 4 {
        return false;
    }
    let n = stack.len();
    let items: Vec<Vec<u8>> = stack[n - 4..n - 2].to_vec();
    stack.extend(items);
    true
}

fn op_2rot(stack: &mut Stack) -> bool {
    if stack.len() < 6 {
        return false;
    }
    let n = stack.len();
    let items: Vec<Vec<u8>> = stack.drain(n - 6..n - 4).collect();
    stack.extend(items);
    true
}

fn op_2swap(stack: &mut Stack) -> bool {
    if stack.len() < 4 {
        return false;
    }
    let n = stack.len();
    stack.swap(n - 4, n - 2);
    stack.swap(n - 3, n - 1);
    true
}

fn op_ifdup(stack: &mut Stack) -> bool {
    match stack.last() {
        Some(top) => {
            if decode_num(top) != 0 {
                stack.push(top.clone());
            }
            true
        }
        None => false,
    }
}

fn op_depth(stack: &mut Stack) -> bool {
    let depth = stack.len() as i64;
    stack.push(encode_num(depth));
    true
}

fn op_drop(stack: &mut Stack) -> bool {
    stack.pop().is_some()
}

fn op_dup(stack: &mut Stack) -> bool {
    match stack.last() {
        Some(top) => {
            stack.push(top.clone());
            true
        }
        None => false,
    }
}

fn op_nip(stack: &mut Stack) -> bool {
    if stack.len() < 2 {
        return false;
    }
    let top = stack.pop().unwrap();
    stack.pop();
    stack.push(top);
    true
}

fn op_over(stack: &mut Stack) -> bool {
    if stack.len() < 2 {
        return false;
    }
    let item = stack[stack.len() - 2].clone();
    stack.push(item);
    true
}

fn op_pick(stack: &mut Stack) -> bool {
    let n = match stack.pop() {
        Some(e) => decode_num(&e),
        None => return false,
    };
    if n < 0 || (n as usize) >= stack.len() {
        return false;
    }
    let idx = stack.len() - 1 - n as usize;
    stack.push(stack[idx].clone());
    true
}

fn op_roll(stack: &mut Stack) -> bool {
    let n = match stack.pop() {
        Some(e) => decode_num(&e),
        None => return false,
    };
    if n < 0 || (n as usize) >= stack.len() {
        return false;
    }
    let idx = stack.len() - 1 - n as usize;
    let item = stack.remove(idx);
    stack.push(item);
    true
}

fn op_rot(stack: &mut Stack) -> bool {
    if stack.len() < 3 {
        return false;
    }
    let n = stack.len();
    let item = stack.remove(n - 3);
    stack.push(item);
    true
}

fn op_swap(stack: &mut Stack) -> bool {
    if stack.len() < 2 {
        return false;
    }
    let n = stack.len();
    stack.swap(n - 2, n - 1);
    true
}

fn op_tuck(stack: &mut Stack) -> bool {
    if stack.len() < 2 {
        return false;
    }
    let top = stack.last().unwrap().clone();
    let idx = stack.len() - 2;
    stack.insert(idx, top);
    true
}

fn op_size(stack: &mut Stack) -> bool {
    match stack.last() {
        Some(top) => {
            stack.push(encode_num(top.len() as i64));
            true
        }
        None => false,
    }
}

fn op_equal(stack: &mut Stack) -> bool {
    if stack.len() < 2 {
        return false;
    }
    let a = stack.pop().unwrap();
    let b = stack.pop().unwrap();
    stack.push(encode_num(if a == b { 1 } else { 0 }));
    true
}

fn op_equalverify(stack: &mut Stack) -> bool {
    op_equal(stack) && op_verify(stack)
}

fn unary_numeric(stack: &mut Stack, f: impl Fn(i64) -> i64) -> bool {
    match stack.pop() {
        Some(e) => {
            stack.push(encode_num(f(decode_num(&e))));
            true
        }
        None => false,
    }
}

fn binary_numeric(stack: &mut Stack, f: impl Fn(i64, i64) -> i64) -> bool {
    if stack.len() < 2 {
        return false;
    }
    let b = decode_num(&stack.pop().unwrap());
    let a = decode_num(&stack.pop().unwrap());
    stack.push(encode_num(f(a, b)));
    true
}

fn binary_bool(stack: &mut Stack, f: impl Fn(i64, i64) -> bool) -> bool {
    if stack.len() < 2 {
        return false;
    }
    let b = decode_num(&stack.pop().unwrap());
    let a = decode_num(&stack.pop().unwrap());
    stack.push(encode_num(if f(a, b) { 1 } else { 0 }));
    true
}

fn op_1add(stack: &mut Stack) -> bool {
    unary_numeric(stack, |a| a + 1)
}

fn op_1sub(stack: &mut Stack) -> bool {
    unary_numeric(stack, |a| a - 1)
}

fn op_negate(stack: &mut Stack) -> bool {
    unary_numeric(stack, |a| -a)
}

fn op_abs(stack: &mut Stack) -> bool {
    unary_numeric(stack, |a| a.abs())
}

fn op_not(stack: &mut Stack) -> bool {
    unary_numeric(stack, |a| if a == 0 { 1 } else { 0 })
}

fn op_0notequal(stack: &mut Stack) -> bool {
    unary_numeric(stack, |a| if a == 0 { 0 } else { 1 })
}

fn op_add(stack: &mut Stack) -> bool {
    binary_numeric(stack, |a, b| a + b)
}

fn op_sub(stack: &mut Stack) -> bool {
    binary_numeric(stack, |a, b| a - b)
}

fn op_mul(stack: &mut Stack) -> bool {
    binary_numeric(stack, |a, b| a * b)
}

fn op_booland(stack: &mut Stack) -> bool {
    binary_bool(stack, |a, b| a != 0 && b != 0)
}

fn op_boolor(stack: &mut Stack) -> bool {
    binary_bool(stack, |a, b| a != 0 || b != 0)
}

fn op_numequal(stack: &mut Stack) -> bool {
    binary_bool(stack, |a, b| a == b)
}

fn op_numequalverify(stack: &mut Stack) -> bool {
    op_numequal(stack) && op_verify(stack)
}

fn op_numnotequal(stack: &mut Stack) -> bool {
    binary_bool(stack, |a, b| a != b)
}

fn op_lessthan(stack: &mut Stack) -> bool {
    binary_bool(stack, |a, b| a < b)
}

fn op_greaterthan(stack: &mut Stack) -> bool {
    binary_bool(stack, |a, b| a > b)
}

fn op_lessthanorequal(stack: &mut Stack) -> bool {
    binary_bool(stack, |a, b| a <= b)
}

fn op_greaterthanorequal(stack: &mut Stack) -> bool {
    binary_bool(stack, |a, b| a >= b)
}

fn op_min(stack: &mut Stack) -> bool {
    binary_numeric(stack, |a, b| a.min(b))
}

fn op_max(stack: &mut Stack) -> bool {
    binary_numeric(stack, |a, b| a.max(b))
}

fn op_within(stack: &mut Stack) -> bool {
    if stack.len() < 3 {
        return false;
    }
    let max = decode_num(&stack.pop().unwrap());
    let min = decode_num(&stack.pop().unwrap());
    let x = decode_num(&stack.pop().unwrap());
    stack.push(encode_num(if x >= min && x < max { 1 } else { 0 }));
    true
}

fn op_ripemd160(stack: &mut Stack) -> bool {
    match stack.pop() {
        Some(e) => {
            stack.push(Ripemd160::digest(e).to_vec());
            true
        }
        None => false,
    }
}

fn op_sha1(stack: &mut Stack) -> bool {
    match stack.pop() {
        Some(e) => {
            stack.push(Sha1::digest(e).to_vec());
            true
        }
        None => false,
    }
}

fn op_sha256(stack: &mut Stack) -> bool {
    match stack.pop() {
        Some(e) => {
            stack.push(Sha256::digest(e).to_vec());
            true
        }
        None => false,
    }
}

fn op_hash160(stack: &mut Stack) -> bool {
    match stack.pop() {
        Some(e) => {
            stack.push(hash160(&e).to_vec());
            true
        }
        None => false,
    }
}

fn op_hash256(stack: &mut Stack) -> bool {
    match stack.pop() {
        Some(e) => {
            stack.push(hash256(&e).to_vec());
            true
        }
        None => false,
    }
}

fn op_checksig(stack: &mut Stack, z: &BigUint) -> bool {
    if stack.len() < 2 {
        return false;
    }
    let sec_pubkey = stack.pop().unwrap();
    let mut der_signature = stack.pop().unwrap();
    der_signature.pop(); // drop the trailing sighash-type byte

    let point = match PublicKey::parse(&sec_pubkey) {
        Ok(p) => p,
        Err(_) => return false,
    };
    let sig = match Signature::parse(&der_signature) {
        Ok(s) => s,
        Err(_) => return false,
    };
    stack.push(encode_num(if point.verify(z, &sig) { 1 } else { 0 }));
    true
}

fn op_checksigverify(stack: &mut Stack, z: &BigUint) -> bool {
    op_checksig(stack, z) && op_verify(stack)
}

fn op_checkmultisig(stack: &mut Stack, z: &BigUint) -> bool {
    if stack.is_empty() {
        return false;
    }
    let n = decode_num(&stack.pop().unwrap());
    if n < 0 || stack.len() < n as usize + 1 {
        return false;
    }
    let mut sec_pubkeys = Vec::with_capacity(n as usize);
    for _ in 0..n {
        sec_pubkeys.push(stack.pop().unwrap());
    }
    let m = decode_num(&stack.pop().unwrap());
    if m < 0 || stack.len() < m as usize + 1 {
        return false;
    }
    let mut der_signatures = Vec::with_capacity(m as usize);
    for _ in 0..m {
        let mut der = stack.pop().unwrap();
        der.pop();
        der_signatures.push(der);
    }
    stack.pop(); // off-by-one in the original CHECKMULTISIG, preserved for consensus compatibility

    let mut points: VecDeque<PublicKey> = VecDeque::new();
    for sec in &sec_pubkeys {
        match PublicKey::parse(sec) {
            Ok(p) => points.push_back(p),
            Err(_) => return false,
        }
    }
    let mut sigs = Vec::with_capacity(der_signatures.len());
    for der in &der_signatures {
        match Signature::parse(der) {
            Ok(s) => sigs.push(s),
            Err(_) => return false,
        }
    }

    for sig in &sigs {
        let mut matched = false;
        while let Some(point) = points.pop_front() {
            if point.verify(z, sig) {
                matched = true;
                break;
            }
        }
        if !matched {
            stack.push(encode_num(0));
            return true;
        }
    }
    stack.push(encode_num(1));
    true
}

fn op_checkmultisigverify(stack: &mut Stack, z: &BigUint) -> bool {
    op_checkmultisig(stack, z) && op_verify(stack)
}

fn op_if(stack: &mut Stack, cmds: &mut VecDeque<Cmd>, is_notif: bool) -> bool {
    if stack.is_empty() {
        return false;
    }
    let mut true_items = Vec::new();
    let mut false_items = Vec::new();
    let mut current_is_true = true;
    let mut found_endif = false;
    let mut depth = 1;

    while let Some(cmd) = cmds.pop_front() {
        match &cmd {
            Cmd::Op(99) | Cmd::Op(100) => {
                depth += 1;
                if current_is_true {
                    true_items.push(cmd);
                } else {
                    false_items.push(cmd);
                }
            }
            Cmd::Op(104) => {
                depth -= 1;
                if depth == 0 {
                    found_endif = true;
                    break;
                }
                if current_is_true {
                    true_items.push(cmd);
                } else {
                    false_items.push(cmd);
                }
            }
            Cmd::Op(103) if depth == 1 => {
                current_is_true = false;
            }
            _ => {
                if current_is_true {
                    true_items.push(cmd);
                } else {
                    false_items.push(cmd);
                }
            }
        }
    }
    if !found_endif {
        return false;
    }

    let element = stack.pop().unwrap();
    let mut condition = decode_num(&element) != 0;
    if is_notif {
        condition = !condition;
    }
    let items = if condition { true_items } else { false_items };
    for item in items.into_iter().rev() {
        cmds.push_front(item);
    }
    true
}

#[cfg(test)]
mod tests;
