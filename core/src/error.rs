// All crate-wide errors are defined here
use std::fmt;

#[derive(Debug)]
//Custom error type covering every parse/decode/consensus failure mode in this crate
pub enum Error {
    FieldOutOfRange { num: String, prime: String },
    MixedField,
    NotOnCurve,
    InvalidScalar,
    InvalidPoint,
    BadBase58,
    BadChecksum,
    BadDer,
    BadSec,
    ScriptParse,
    TxParse,
    BadMagic,
    ConnectionReset,
    MalformedProof,
    IntegerTooLarge,
    Io(std::io::Error),
    Http(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::FieldOutOfRange { num, prime } => {
                write!(f, "num {num} not in field range 0 to {prime} - 1")
            }
            Error::MixedField => write!(f, "cannot operate on elements from different fields"),
            Error::NotOnCurve => write!(f, "point is not on the curve"),
            Error::InvalidScalar => write!(f, "scalar is not in the range [1, n)"),
            Error::InvalidPoint => write!(f, "point does not satisfy the curve equation"),
            Error::BadBase58 => write!(f, "invalid base58 input"),
            Error::BadChecksum => write!(f, "base58check checksum mismatch"),
            Error::BadDer => write!(f, "malformed DER signature"),
            Error::BadSec => write!(f, "malformed SEC public key"),
            Error::ScriptParse => write!(f, "malformed script"),
            Error::TxParse => write!(f, "malformed transaction"),
            Error::BadMagic => write!(f, "network envelope magic mismatch"),
            Error::ConnectionReset => write!(f, "connection reset"),
            Error::MalformedProof => write!(f, "malformed merkle proof"),
            Error::IntegerTooLarge => write!(f, "integer too large to encode"),
            Error::Io(e) => write!(f, "io error: {e}"),
            Error::Http(msg) => write!(f, "http error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
