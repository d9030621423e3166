//! `btc_core`: secp256k1 field/curve arithmetic, ECDSA, Script, transactions,
//! block headers, Merkle proofs, and the P2P wire envelope.
pub mod block;
pub mod cli;
pub mod codec;
pub mod curve;
pub mod error;
pub mod field;
pub mod keys;
pub mod merkle;
pub mod p2p;
pub mod script;
pub mod signature;
pub mod tx;

pub use error::{Error as BtcError, Result};

/// Initializes the global `tracing` subscriber from `RUST_LOG`, defaulting to `info`.
pub fn setup_tracing() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("info".parse().expect("\"info\" is always a valid directive"));

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(filter)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| BtcError::Http(e.to_string()))?;

    Ok(())
}
