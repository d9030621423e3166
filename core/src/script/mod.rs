//! Bitcoin Script: parsing, serialization, and stack-machine evaluation.
mod opcodes;

use std::collections::VecDeque;
use std::io::Read;

use num_bigint::BigUint;

use crate::codec::{encode_varint, int_to_little_endian, read_varint};
use crate::error::{Error, Result};
use opcodes::OpHandler;

/// A single Script command: either an opcode or a data push.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cmd {
    Op(u8),
    Data(Vec<u8>),
}

/// An ordered sequence of `Cmd`s. Concatenation (via [`Script::combine`]) joins
/// a `ScriptSig` and `ScriptPubKey` into the script actually evaluated.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Script {
    pub cmds: Vec<Cmd>,
}

/// Builds the standard P2PKH `ScriptPubKey`: `OP_DUP OP_HASH160 <h160> OP_EQUALVERIFY OP_CHECKSIG`.
pub fn p2pkh_script(h160: &[u8]) -> Script {
    Script {
        cmds: vec![
            Cmd::Op(0x76),
            Cmd::Op(0xa9),
            Cmd::Data(h160.to_vec()),
            Cmd::Op(0x88),
            Cmd::Op(0xac),
        ],
    }
}

impl Script {
    pub fn new(cmds: Vec<Cmd>) -> Script {
        Script { cmds }
    }

    pub fn combine(self, other: Script) -> Script {
        let mut cmds = self.cmds;
        cmds.extend(other.cmds);
        Script { cmds }
    }

    pub fn parse<R: Read>(r: &mut R) -> Result<Script> {
        let length = read_varint(r)?;
        let mut cmds = Vec::new();
        let mut count: u64 = 0;
        while count < length {
            let mut one = [0u8; 1];
            r.read_exact(&mut one)?;
            count += 1;
            let current_byte = one[0];

            if (1..=75).contains(&current_byte) {
                let n = current_byte as usize;
                let mut buf = vec![0u8; n];
                r.read_exact(&mut buf)?;
                cmds.push(Cmd::Data(buf));
                count += n as u64;
            } else if current_byte == 76 {
                let mut len_byte = [0u8; 1];
                r.read_exact(&mut len_byte)?;
                let data_length = len_byte[0] as usize;
                let mut buf = vec![0u8; data_length];
                r.read_exact(&mut buf)?;
                cmds.push(Cmd::Data(buf));
                count += data_length as u64 + 1;
            } else if current_byte == 77 {
                let mut len_bytes = [0u8; 2];
                r.read_exact(&mut len_bytes)?;
                let data_length = u16::from_le_bytes(len_bytes) as usize;
                let mut buf = vec![0u8; data_length];
                r.read_exact(&mut buf)?;
                cmds.push(Cmd::Data(buf));
                count += data_length as u64 + 2;
            } else if current_byte == 78 {
                let mut len_bytes = [0u8; 4];
                r.read_exact(&mut len_bytes)?;
                let data_length = u32::from_le_bytes(len_bytes) as usize;
                let mut buf = vec![0u8; data_length];
                r.read_exact(&mut buf)?;
                cmds.push(Cmd::Data(buf));
                count += data_length as u64 + 4;
            } else {
                cmds.push(Cmd::Op(current_byte));
            }
        }
        if count != length {
            return Err(Error::ScriptParse);
        }
        Ok(Script { cmds })
    }

    pub fn raw_serialize(&self) -> Result<Vec<u8>> {
        let mut result = Vec::new();
        for cmd in &self.cmds {
            match cmd {
                Cmd::Op(op) => result.push(*op),
                Cmd::Data(data) => {
                    let length = data.len();
                    if length < 76 {
                        result.push(length as u8);
                    } else if length < 0x100 {
                        result.push(76);
                        result.push(length as u8);
                    } else if length <= 520 {
                        result.push(77);
                        result.extend(int_to_little_endian(length as u64, 2));
                    } else {
                        return Err(Error::ScriptParse);
                    }
                    result.extend(data);
                }
            }
        }
        Ok(result)
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        let raw = self.raw_serialize()?;
        let mut out = encode_varint(raw.len() as u64)?;
        out.extend(raw);
        Ok(out)
    }

    /// Returns `true` iff this is a P2SH `ScriptPubKey`:
    /// `OP_HASH160 <20-byte hash> OP_EQUAL`.
    fn is_p2sh(cmds: &VecDeque<Cmd>) -> bool {
        cmds.len() == 3
            && cmds[0] == Cmd::Op(0xa9)
            && matches!(&cmds[1], Cmd::Data(d) if d.len() == 20)
            && cmds[2] == Cmd::Op(0x87)
    }

    /// Runs the combined script against signature hash `z`. Returns `false`
    /// on any opcode failure, an unbalanced `OP_IF`/`OP_ENDIF`, or a falsy
    /// (empty) top-of-stack result.
    pub fn evaluate(&self, z: &BigUint) -> bool {
        let mut cmds: VecDeque<Cmd> = self.cmds.clone().into();
        let mut stack: Vec<Vec<u8>> = Vec::new();
        let mut altstack: Vec<Vec<u8>> = Vec::new();

        while let Some(cmd) = cmds.pop_front() {
            match cmd {
                Cmd::Op(op) => {
                    let handler = match opcodes::lookup(op) {
                        Some(h) => h,
                        None => {
                            tracing::debug!(opcode = op, "unrecognized opcode");
                            return false;
                        }
                    };
                    let ok = match handler {
                        OpHandler::Unary(f) => f(&mut stack),
                        OpHandler::WithAltstack(f) => f(&mut stack, &mut altstack),
                        OpHandler::WithZ(f) => f(&mut stack, z),
                        OpHandler::Flow(f) => f(&mut stack, &mut cmds),
                    };
                    if !ok {
                        tracing::debug!(opcode = op, "bad op");
                        return false;
                    }
                }
                Cmd::Data(data) => {
                    stack.push(data.clone());
                    if Self::is_p2sh(&cmds) {
                        cmds.pop_front();
                        let h160 = match cmds.pop_front() {
                            Some(Cmd::Data(d)) => d,
                            _ => return false,
                        };
                        cmds.pop_front();

                        if !opcodes::lookup(0xa9)
                            .map(|h| matches!(h, OpHandler::Unary(f) if f(&mut stack)))
                            .unwrap_or(false)
                        {
                            return false;
                        }
                        stack.push(h160);
                        if !opcodes::lookup(0x87)
                            .map(|h| matches!(h, OpHandler::Unary(f) if f(&mut stack)))
                            .unwrap_or(false)
                        {
                            return false;
                        }
                        if !opcodes::lookup(0x69)
                            .map(|h| matches!(h, OpHandler::Unary(f) if f(&mut stack)))
                            .unwrap_or(false)
                        {
                            tracing::debug!("bad p2sh h160");
                            return false;
                        }

                        let redeem_script = match encode_varint(data.len() as u64) {
                            Ok(mut v) => {
                                v.extend(data);
                                v
                            }
                            Err(_) => return false,
                        };
                        let mut reader = std::io::Cursor::new(redeem_script);
                        match Script::parse(&mut reader) {
                            Ok(inner) => {
                                for c in inner.cmds.into_iter().rev() {
                                    cmds.push_front(c);
                                }
                            }
                            Err(_) => return false,
                        }
                    }
                }
            }
        }

        match stack.pop() {
            None => false,
            Some(top) => !top.is_empty(),
        }
    }
}
