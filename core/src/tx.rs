//! Transaction structure, legacy serialization, signature hashing, and verification.
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::sync::Mutex;

use num_bigint::BigUint;

use crate::codec::{encode_varint, hash256, int_to_little_endian, read_varint, SIGHASH_ALL};
use crate::error::{Error, Result};
use crate::keys::PrivateKey;
use crate::script::Script;

/// A source of previous transactions, looked up by txid hex string. Lets
/// `Tx::fee`/`verify`/`sign_input` resolve prevout values and scriptPubKeys
/// without this crate owning any network I/O policy.
pub trait TxSource {
    fn fetch(&self, tx_id: &str, testnet: bool) -> Result<Tx>;
}

/// Wraps a `TxSource`, caching every fetched transaction by txid. Never evicts.
pub struct TxCache<S> {
    inner: S,
    cache: Mutex<HashMap<String, Tx>>,
}

impl<S: TxSource> TxCache<S> {
    pub fn new(inner: S) -> TxCache<S> {
        TxCache { inner, cache: Mutex::new(HashMap::new()) }
    }
}

impl<S: TxSource> TxSource for TxCache<S> {
    fn fetch(&self, tx_id: &str, testnet: bool) -> Result<Tx> {
        {
            let cache = self.cache.lock().expect("tx cache poisoned");
            if let Some(tx) = cache.get(tx_id) {
                return Ok(tx.clone());
            }
        }
        let tx = self.inner.fetch(tx_id, testnet)?;
        if tx.id() != tx_id {
            return Err(Error::TxParse);
        }
        self.cache
            .lock()
            .expect("tx cache poisoned")
            .insert(tx_id.to_string(), tx.clone());
        Ok(tx)
    }
}

/// Fetches raw transactions over HTTP from `{mainnet,testnet}.programmingbitcoin.com`.
pub struct HttpTxSource {
    client: reqwest::blocking::Client,
}

impl HttpTxSource {
    pub fn new() -> HttpTxSource {
        HttpTxSource { client: reqwest::blocking::Client::new() }
    }

    fn base_url(testnet: bool) -> &'static str {
        if testnet {
            "http://testnet.programmingbitcoin.com"
        } else {
            "http://mainnet.programmingbitcoin.com"
        }
    }
}

impl Default for HttpTxSource {
    fn default() -> HttpTxSource {
        HttpTxSource::new()
    }
}

impl TxSource for HttpTxSource {
    fn fetch(&self, tx_id: &str, testnet: bool) -> Result<Tx> {
        let url = format!("{}/tx/{}.hex", Self::base_url(testnet), tx_id);
        let body = self
            .client
            .get(&url)
            .send()
            .map_err(|e| Error::Http(e.to_string()))?
            .text()
            .map_err(|e| Error::Http(e.to_string()))?;
        let mut raw = hex::decode(body.trim()).map_err(|_| Error::Http(format!("unexpected response: {body}")))?;

        let tx = if raw.len() > 4 && raw[4] == 0 {
            // segwit marker+flag: strip them, parse the legacy body, then
            // recover locktime from the last four bytes.
            let mut legacy = raw[..4].to_vec();
            legacy.extend_from_slice(&raw[6..]);
            let mut cursor = std::io::Cursor::new(legacy);
            let mut tx = Tx::parse(&mut cursor, testnet)?;
            let locktime_bytes = &raw[raw.len() - 4..];
            tx.locktime = crate::codec::little_endian_to_u32(locktime_bytes);
            tx
        } else {
            let mut cursor = std::io::Cursor::new(std::mem::take(&mut raw));
            Tx::parse(&mut cursor, testnet)?
        };

        if tx.id() != tx_id {
            return Err(Error::TxParse);
        }
        Ok(tx)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxIn {
    pub prev_tx: [u8; 32],
    pub prev_index: u32,
    pub script_sig: Script,
    pub sequence: u32,
}

impl TxIn {
    pub fn new(prev_tx: [u8; 32], prev_index: u32) -> TxIn {
        TxIn { prev_tx, prev_index, script_sig: Script::default(), sequence: 0xffffffff }
    }

    pub fn parse<R: Read>(r: &mut R) -> Result<TxIn> {
        let mut prev_tx = [0u8; 32];
        r.read_exact(&mut prev_tx)?;
        prev_tx.reverse();
        let mut idx_buf = [0u8; 4];
        r.read_exact(&mut idx_buf)?;
        let prev_index = u32::from_le_bytes(idx_buf);
        let script_sig = Script::parse(r)?;
        let mut seq_buf = [0u8; 4];
        r.read_exact(&mut seq_buf)?;
        let sequence = u32::from_le_bytes(seq_buf);
        Ok(TxIn { prev_tx, prev_index, script_sig, sequence })
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut result = self.prev_tx;
        result.reverse();
        let mut out = result.to_vec();
        out.extend(int_to_little_endian(self.prev_index as u64, 4));
        out.extend(self.script_sig.serialize()?);
        out.extend(int_to_little_endian(self.sequence as u64, 4));
        Ok(out)
    }

    pub fn value(&self, source: &dyn TxSource, testnet: bool) -> Result<u64> {
        let tx = source.fetch(&hex::encode(self.prev_tx), testnet)?;
        tx.tx_outs
            .get(self.prev_index as usize)
            .map(|out| out.amount)
            .ok_or(Error::TxParse)
    }

    pub fn script_pubkey(&self, source: &dyn TxSource, testnet: bool) -> Result<Script> {
        let tx = source.fetch(&hex::encode(self.prev_tx), testnet)?;
        tx.tx_outs
            .get(self.prev_index as usize)
            .map(|out| out.script_pubkey.clone())
            .ok_or(Error::TxParse)
    }
}

impl fmt::Display for TxIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", hex::encode(self.prev_tx), self.prev_index)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOut {
    pub amount: u64,
    pub script_pubkey: Script,
}

impl TxOut {
    pub fn parse<R: Read>(r: &mut R) -> Result<TxOut> {
        let mut amount_buf = [0u8; 8];
        r.read_exact(&mut amount_buf)?;
        let amount = u64::from_le_bytes(amount_buf);
        let script_pubkey = Script::parse(r)?;
        Ok(TxOut { amount, script_pubkey })
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut out = int_to_little_endian(self.amount, 8);
        out.extend(self.script_pubkey.serialize()?);
        Ok(out)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tx {
    pub version: u32,
    pub tx_ins: Vec<TxIn>,
    pub tx_outs: Vec<TxOut>,
    pub locktime: u32,
    pub testnet: bool,
}

impl Tx {
    pub fn new(version: u32, tx_ins: Vec<TxIn>, tx_outs: Vec<TxOut>, locktime: u32, testnet: bool) -> Tx {
        Tx { version, tx_ins, tx_outs, locktime, testnet }
    }

    /// Double-SHA256 of the legacy serialization, reversed to the conventional
    /// display byte order.
    pub fn hash(&self) -> Result<[u8; 32]> {
        let mut h = hash256(&self.serialize()?);
        h.reverse();
        Ok(h)
    }

    pub fn id(&self) -> String {
        match self.hash() {
            Ok(h) => hex::encode(h),
            Err(_) => String::new(),
        }
    }

    pub fn parse<R: Read>(r: &mut R, testnet: bool) -> Result<Tx> {
        let mut version_buf = [0u8; 4];
        r.read_exact(&mut version_buf)?;
        let version = u32::from_le_bytes(version_buf);

        let num_inputs = read_varint(r)?;
        let mut tx_ins = Vec::with_capacity(num_inputs as usize);
        for _ in 0..num_inputs {
            tx_ins.push(TxIn::parse(r)?);
        }

        let num_outputs = read_varint(r)?;
        let mut tx_outs = Vec::with_capacity(num_outputs as usize);
        for _ in 0..num_outputs {
            tx_outs.push(TxOut::parse(r)?);
        }

        let mut locktime_buf = [0u8; 4];
        r.read_exact(&mut locktime_buf)?;
        let locktime = u32::from_le_bytes(locktime_buf);

        Ok(Tx { version, tx_ins, tx_outs, locktime, testnet })
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut result = int_to_little_endian(self.version as u64, 4);
        result.extend(encode_varint(self.tx_ins.len() as u64)?);
        for tx_in in &self.tx_ins {
            result.extend(tx_in.serialize()?);
        }
        result.extend(encode_varint(self.tx_outs.len() as u64)?);
        for tx_out in &self.tx_outs {
            result.extend(tx_out.serialize()?);
        }
        result.extend(int_to_little_endian(self.locktime as u64, 4));
        Ok(result)
    }

    pub fn fee(&self, source: &dyn TxSource) -> Result<i64> {
        let mut input_sum: i64 = 0;
        for tx_in in &self.tx_ins {
            input_sum += tx_in.value(source, self.testnet)? as i64;
        }
        let output_sum: i64 = self.tx_outs.iter().map(|o| o.amount as i64).sum();
        Ok(input_sum - output_sum)
    }

    /// Computes the SIGHASH_ALL signature hash for input `input_index`: the
    /// transaction with that input's scriptSig replaced by its prevout's
    /// scriptPubKey and every other input's scriptSig blanked.
    pub fn sig_hash(&self, input_index: usize, source: &dyn TxSource) -> Result<BigUint> {
        if input_index >= self.tx_ins.len() {
            return Err(Error::TxParse);
        }

        let mut s = int_to_little_endian(self.version as u64, 4);
        s.extend(encode_varint(self.tx_ins.len() as u64)?);
        for (i, input) in self.tx_ins.iter().enumerate() {
            let script_sig = if i == input_index {
                input.script_pubkey(source, self.testnet)?
            } else {
                Script::default()
            };
            let replaced = TxIn {
                prev_tx: input.prev_tx,
                prev_index: input.prev_index,
                script_sig,
                sequence: input.sequence,
            };
            s.extend(replaced.serialize()?);
        }

        s.extend(encode_varint(self.tx_outs.len() as u64)?);
        for tx_out in &self.tx_outs {
            s.extend(tx_out.serialize()?);
        }
        s.extend(int_to_little_endian(self.locktime as u64, 4));
        s.extend(int_to_little_endian(SIGHASH_ALL as u64, 4));

        Ok(BigUint::from_bytes_be(&hash256(&s)))
    }

    pub fn verify_input(&self, input_index: usize, source: &dyn TxSource) -> Result<bool> {
        let tx_in = self.tx_ins.get(input_index).ok_or(Error::TxParse)?;
        let script_pubkey = tx_in.script_pubkey(source, self.testnet)?;
        let z = self.sig_hash(input_index, source)?;
        let combined = tx_in.script_sig.clone().combine(script_pubkey);
        Ok(combined.evaluate(&z))
    }

    pub fn verify(&self, source: &dyn TxSource) -> Result<bool> {
        if self.fee(source)? < 0 {
            return Ok(false);
        }
        for i in 0..self.tx_ins.len() {
            if !self.verify_input(i, source)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn sign_input(&mut self, input_index: usize, private_key: &PrivateKey, source: &dyn TxSource) -> Result<bool> {
        let z = self.sig_hash(input_index, source)?;
        let mut der = private_key.sign(&z).der();
        der.push(SIGHASH_ALL as u8);
        let sec = private_key.public_key().sec(true);
        let tx_in = self.tx_ins.get_mut(input_index).ok_or(Error::TxParse)?;
        tx_in.script_sig = Script::new(vec![
            crate::script::Cmd::Data(der),
            crate::script::Cmd::Data(sec),
        ]);
        self.verify_input(input_index, source)
    }
}

impl fmt::Display for Tx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "tx: {}", self.id())?;
        writeln!(f, "version: {}", self.version)?;
        writeln!(f, "tx_ins:")?;
        for tx_in in &self.tx_ins {
            writeln!(f, "{tx_in}")?;
        }
        writeln!(f, "tx_outs:")?;
        for tx_out in &self.tx_outs {
            writeln!(f, "{}:{:?}", tx_out.amount, tx_out.script_pubkey)?;
        }
        write!(f, "locktime: {}", self.locktime)
    }
}
