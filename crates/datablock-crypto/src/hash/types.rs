use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CryptoError, Result};

/// 256-bit digest value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hash256([u8; 32]);

impl Hash256 {
    /// Create a digest from 32 bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create a digest from a byte slice
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let bytes: [u8; 32] = slice
            .try_into()
            .map_err(|_| CryptoError::InvalidDigestLength {
                expected: 32,
                got: slice.len(),
            })?;
        Ok(Self(bytes))
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Create a zero digest
    pub fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Check if the digest is zero
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl Default for Hash256 {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// 64-byte application state digest: the registry digest followed by the
/// ledger digest. The zero value is the sentinel for "no committed state".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateDigest([u8; 64]);

impl StateDigest {
    /// Build a state digest from its two child digests.
    pub fn from_parts(registry: Hash256, ledger: Hash256) -> Self {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(registry.as_bytes());
        bytes[32..].copy_from_slice(ledger.as_bytes());
        Self(bytes)
    }

    /// The sentinel digest: 64 zero bytes.
    pub fn zero() -> Self {
        Self([0u8; 64])
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl Default for StateDigest {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for StateDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for StateDigest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
