//! The network envelope that frames every P2P message: magic ‖ command ‖
//! length ‖ checksum ‖ payload.
pub mod messages;

use std::io::Read;

use crate::codec::{hash256, int_to_little_endian, little_endian_to_u32};
use crate::error::{Error, Result};

pub const NETWORK_MAGIC: [u8; 4] = [0xf9, 0xbe, 0xb4, 0xd9];
pub const TESTNET_NETWORK_MAGIC: [u8; 4] = [0x0b, 0x11, 0x09, 0x07];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkEnvelope {
    pub command: Vec<u8>,
    pub payload: Vec<u8>,
    pub testnet: bool,
}

impl NetworkEnvelope {
    pub fn new(command: &[u8], payload: Vec<u8>, testnet: bool) -> NetworkEnvelope {
        NetworkEnvelope { command: command.to_vec(), payload, testnet }
    }

    fn magic(&self) -> [u8; 4] {
        if self.testnet {
            TESTNET_NETWORK_MAGIC
        } else {
            NETWORK_MAGIC
        }
    }

    pub fn parse<R: Read>(r: &mut R, testnet: bool) -> Result<NetworkEnvelope> {
        let mut magic = [0u8; 4];
        if let Err(e) = r.read_exact(&mut magic) {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                return Err(Error::ConnectionReset);
            }
            return Err(Error::Io(e));
        }

        let expected_magic = if testnet { TESTNET_NETWORK_MAGIC } else { NETWORK_MAGIC };
        if magic != expected_magic {
            return Err(Error::BadMagic);
        }

        let mut command_buf = [0u8; 12];
        r.read_exact(&mut command_buf)?;
        let command: Vec<u8> = command_buf.into_iter().take_while(|&b| b != 0).collect();

        let mut length_buf = [0u8; 4];
        r.read_exact(&mut length_buf)?;
        let payload_length = little_endian_to_u32(&length_buf) as usize;

        let mut checksum = [0u8; 4];
        r.read_exact(&mut checksum)?;

        let mut payload = vec![0u8; payload_length];
        r.read_exact(&mut payload)?;

        if hash256(&payload)[..4] != checksum {
            return Err(Error::BadChecksum);
        }

        Ok(NetworkEnvelope { command, payload, testnet })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut result = self.magic().to_vec();
        result.extend(&self.command);
        result.extend(std::iter::repeat(0u8).take(12 - self.command.len()));
        result.extend(int_to_little_endian(self.payload.len() as u64, 4));
        result.extend(&hash256(&self.payload)[..4]);
        result.extend(&self.payload);
        result
    }

    pub fn stream(&self) -> std::io::Cursor<Vec<u8>> {
        std::io::Cursor::new(self.payload.clone())
    }
}

impl std::fmt::Display for NetworkEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", String::from_utf8_lossy(&self.command), hex::encode(&self.payload))
    }
}

#[cfg(test)]
mod tests;
