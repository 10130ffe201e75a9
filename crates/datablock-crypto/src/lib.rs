pub mod hash;

use thiserror::Error;

/// Errors produced by the hashing primitives.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CryptoError {
    #[error("invalid digest length: expected {expected}, got {got}")]
    InvalidDigestLength { expected: usize, got: usize },
    #[error("invalid hex encoding: {0}")]
    InvalidHex(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;

// re-export commonly used types
pub use hash::{sha256, Hash256, StateDigest};
