//! The handful of P2P message payloads the CLI and tests exercise directly.
use std::io::Read;

use rand::Rng;

use crate::block::BlockHeader;
use crate::codec::{encode_varint, int_to_little_endian, read_varint};
use crate::error::{Error, Result};

/// A `version` handshake payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionMessage {
    pub version: u32,
    pub services: u64,
    pub timestamp: u64,
    pub receiver_services: u64,
    pub receiver_ip: [u8; 4],
    pub receiver_port: u16,
    pub sender_services: u64,
    pub sender_ip: [u8; 4],
    pub sender_port: u16,
    pub nonce: u64,
    pub user_agent: Vec<u8>,
    pub latest_block: u32,
    pub relay: bool,
}

pub const COMMAND_VERSION: &[u8] = b"version";

impl VersionMessage {
    pub fn new(timestamp: u64, nonce: u64) -> VersionMessage {
        VersionMessage {
            version: 70015,
            services: 0,
            timestamp,
            receiver_services: 0,
            receiver_ip: [0, 0, 0, 0],
            receiver_port: 8333,
            sender_services: 0,
            sender_ip: [0, 0, 0, 0],
            sender_port: 8333,
            nonce,
            user_agent: b"/btc-core:0.1/".to_vec(),
            latest_block: 0,
            relay: false,
        }
    }

    pub fn with_random_nonce(timestamp: u64) -> VersionMessage {
        let nonce: u64 = rand::thread_rng().gen();
        VersionMessage::new(timestamp, nonce)
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut result = int_to_little_endian(self.version as u64, 4);
        result.extend(int_to_little_endian(self.services, 8));
        result.extend(int_to_little_endian(self.timestamp, 8));
        result.extend(int_to_little_endian(self.receiver_services, 8));
        result.extend([0u8; 10]);
        result.extend([0xff, 0xff]);
        result.extend(self.receiver_ip);
        result.extend(int_to_little_endian(self.receiver_port as u64, 2));
        result.extend(int_to_little_endian(self.sender_services, 8));
        result.extend([0u8; 10]);
        result.extend([0xff, 0xff]);
        result.extend(self.sender_ip);
        result.extend(int_to_little_endian(self.sender_port as u64, 2));
        result.extend(int_to_little_endian(self.nonce, 8));
        result.extend(encode_varint(self.user_agent.len() as u64)?);
        result.extend(&self.user_agent);
        result.extend(int_to_little_endian(self.latest_block as u64, 4));
        result.push(if self.relay { 0x01 } else { 0x00 });
        Ok(result)
    }
}

/// An empty `verack` payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VerAckMessage;

pub const COMMAND_VERACK: &[u8] = b"verack";

impl VerAckMessage {
    pub fn parse<R: Read>(_r: &mut R) -> Result<VerAckMessage> {
        Ok(VerAckMessage)
    }

    pub fn serialize(&self) -> Vec<u8> {
        Vec::new()
    }
}

/// `ping`/`pong` carry an opaque 8-byte nonce; a pong must echo its ping's.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PingMessage {
    pub nonce: [u8; 8],
}

pub const COMMAND_PING: &[u8] = b"ping";

impl PingMessage {
    pub fn parse<R: Read>(r: &mut R) -> Result<PingMessage> {
        let mut nonce = [0u8; 8];
        r.read_exact(&mut nonce)?;
        Ok(PingMessage { nonce })
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.nonce.to_vec()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PongMessage {
    pub nonce: [u8; 8],
}

pub const COMMAND_PONG: &[u8] = b"pong";

impl PongMessage {
    pub fn for_ping(ping: &PingMessage) -> PongMessage {
        PongMessage { nonce: ping.nonce }
    }

    pub fn parse<R: Read>(r: &mut R) -> Result<PongMessage> {
        let mut nonce = [0u8; 8];
        r.read_exact(&mut nonce)?;
        Ok(PongMessage { nonce })
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.nonce.to_vec()
    }
}

/// Requests headers starting after `start_block` up to (inclusive of) `end_block`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetHeadersMessage {
    pub version: u32,
    pub num_hashes: u64,
    pub start_block: [u8; 32],
    pub end_block: [u8; 32],
}

pub const COMMAND_GETHEADERS: &[u8] = b"getheaders";

impl GetHeadersMessage {
    pub fn new(start_block: [u8; 32]) -> GetHeadersMessage {
        GetHeadersMessage { version: 70015, num_hashes: 1, start_block, end_block: [0u8; 32] }
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut result = int_to_little_endian(self.version as u64, 4);
        result.extend(encode_varint(self.num_hashes)?);
        let mut start = self.start_block;
        start.reverse();
        result.extend(start);
        let mut end = self.end_block;
        end.reverse();
        result.extend(end);
        Ok(result)
    }
}

/// A `headers` response: a batch of block headers, each followed by a
/// transaction count that must be zero (headers never carry bodies).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadersMessage {
    pub headers: Vec<BlockHeader>,
}

pub const COMMAND_HEADERS: &[u8] = b"headers";

impl HeadersMessage {
    pub fn parse<R: Read>(r: &mut R) -> Result<HeadersMessage> {
        let num_headers = read_varint(r)?;
        let mut headers = Vec::with_capacity(num_headers as usize);
        for _ in 0..num_headers {
            headers.push(BlockHeader::parse(r)?);
            let num_txs = read_varint(r)?;
            if num_txs != 0 {
                return Err(Error::MalformedProof);
            }
        }
        Ok(HeadersMessage { headers })
    }
}

/// An inventory request: a list of (type, identifier) pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GetDataMessage {
    pub data: Vec<(u32, [u8; 32])>,
}

pub const COMMAND_GETDATA: &[u8] = b"getdata";

impl GetDataMessage {
    pub fn new() -> GetDataMessage {
        GetDataMessage::default()
    }

    pub fn add_data(&mut self, data_type: u32, identifier: [u8; 32]) {
        self.data.push((data_type, identifier));
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut result = encode_varint(self.data.len() as u64)?;
        for (data_type, identifier) in &self.data {
            result.extend(int_to_little_endian(*data_type as u64, 4));
            let mut reversed = *identifier;
            reversed.reverse();
            result.extend(reversed);
        }
        Ok(result)
    }
}

/// A message whose command/payload are known at runtime rather than compile time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericMessage {
    pub command: Vec<u8>,
    pub payload: Vec<u8>,
}

impl GenericMessage {
    pub fn new(command: Vec<u8>, payload: Vec<u8>) -> GenericMessage {
        GenericMessage { command, payload }
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.payload.clone()
    }
}

#[cfg(test)]
mod tests;
