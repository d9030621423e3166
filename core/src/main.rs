use clap::Parser;
use num_bigint::BigUint;

use btc_core::cli::{Cli, Command};
use btc_core::codec::hash256;
use btc_core::keys::{PrivateKey, PublicKey};
use btc_core::merkle::MerkleBlock;
use btc_core::signature::Signature;
use btc_core::tx::Tx;
use btc_core::{block::BlockHeader, BtcError};

fn digest_from_hex(hex_str: &str) -> Result<BigUint, BtcError> {
    let bytes = hex::decode(hex_str).map_err(|_| BtcError::BadSec)?;
    Ok(BigUint::from_bytes_be(&bytes))
}

fn run(cli: Cli) -> Result<(), BtcError> {
    match cli.command {
        Command::GenerateKey { passphrase, compressed } => {
            let secret = BigUint::from_bytes_be(&hash256(passphrase.as_bytes()));
            let pk = PrivateKey::new(secret);
            println!("wif: {}", pk.wif(compressed, cli.testnet));
            println!("address: {}", pk.public_key().address(compressed, cli.testnet));
        }
        Command::Address { wif } => {
            let (pk, compressed) = PrivateKey::from_wif(&wif)?;
            println!("{}", pk.public_key().address(compressed, cli.testnet));
        }
        Command::Sign { wif, digest } => {
            let (pk, _compressed) = PrivateKey::from_wif(&wif)?;
            let z = digest_from_hex(&digest)?;
            let sig = pk.sign(&z);
            println!("{}", hex::encode(sig.der()));
        }
        Command::Verify { sec, digest, signature } => {
            let public_key = PublicKey::parse(&hex::decode(&sec).map_err(|_| BtcError::BadSec)?)?;
            let z = digest_from_hex(&digest)?;
            let sig = Signature::parse(&hex::decode(&signature).map_err(|_| BtcError::BadDer)?)?;
            println!("{}", public_key.verify(&z, &sig));
        }
        Command::ParseTx { raw } => {
            let bytes = hex::decode(&raw).map_err(|_| BtcError::TxParse)?;
            let tx = Tx::parse(&mut &bytes[..], cli.testnet)?;
            println!("{tx}");
        }
        Command::ParseHeader { raw } => {
            let bytes = hex::decode(&raw).map_err(|_| BtcError::TxParse)?;
            let header = BlockHeader::parse(&mut &bytes[..])?;
            println!("hash: {}", hex::encode(header.hash()));
            println!("pow valid: {}", header.pow());
            println!("difficulty: {}", header.difficulty());
            println!("bip9: {}", header.bip9());
            println!("bip91: {}", header.bip91());
            println!("bip141: {}", header.bip141());
        }
        Command::ValidateMerkleProof { raw } => {
            let bytes = hex::decode(&raw).map_err(|_| BtcError::MalformedProof)?;
            let merkle_block = MerkleBlock::parse(&mut &bytes[..])?;
            println!("{}", merkle_block.is_valid()?);
        }
    }
    Ok(())
}

fn main() -> Result<(), BtcError> {
    btc_core::setup_tracing()?;
    let cli = Cli::parse();
    run(cli)
}
