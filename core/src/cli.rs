use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "btc-core-cli", about = "Bitcoin consensus primitives CLI")]
pub struct Cli {
    /// Use testnet address/magic-byte conventions instead of mainnet
    #[arg(long, global = true)]
    pub testnet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate a new private key from a passphrase and print its WIF
    GenerateKey {
        /// Passphrase hashed (via hash256) into the secret exponent
        passphrase: String,
        /// Emit the compressed SEC public key form
        #[arg(long, default_value_t = true)]
        compressed: bool,
    },
    /// Derive the P2PKH address for a WIF-encoded private key
    Address {
        /// WIF-encoded private key
        wif: String,
    },
    /// Sign a hex-encoded 32-byte digest with a WIF-encoded private key
    Sign {
        /// WIF-encoded private key
        wif: String,
        /// Hex-encoded 32-byte message digest
        digest: String,
    },
    /// Verify a DER signature (hex) against a SEC public key (hex) and digest (hex)
    Verify {
        /// Hex-encoded SEC public key
        sec: String,
        /// Hex-encoded 32-byte message digest
        digest: String,
        /// Hex-encoded DER signature
        signature: String,
    },
    /// Parse a raw legacy transaction (hex) and print a summary
    ParseTx {
        /// Hex-encoded raw transaction
        raw: String,
    },
    /// Parse an 80-byte block header (hex) and report PoW/BIP9/91/141 flags
    ParseHeader {
        /// Hex-encoded 80-byte block header
        raw: String,
    },
    /// Validate a Merkle proof (merkleblock payload, hex)
    ValidateMerkleProof {
        /// Hex-encoded merkleblock message payload
        raw: String,
    },
}
