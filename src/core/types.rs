// Basic types for the PoW benchmark

use serde::{Deserialize, Serialize};
use std::fmt;

/// Search variable walked upward from zero
pub type Nonce = u64;

/// 256-bit digest (32 bytes)
/// Used both as the evolving seed and as the hash of a candidate nonce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest(pub [u8; 32]);

impl Digest {
    /// Create a new Digest from a byte array
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create a Digest from a slice
    pub fn from_slice(slice: &[u8]) -> Result<Self, String> {
        if slice.len() != 32 {
            return Err(format!("Invalid digest length: expected 32, got {}", slice.len()));
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    /// Get the digest as a byte array
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// All-zero digest
    pub fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Leading 8 bytes read as a big-endian integer.
    /// This is the value compared against a difficulty target.
    pub fn leading_u64(&self) -> u64 {
        let mut head = [0u8; 8];
        head.copy_from_slice(&self.0[..8]);
        u64::from_be_bytes(head)
    }

    /// Convert to hex string (natural byte order)
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Create from hex string, optional `0x` prefix allowed
    pub fn from_hex(hex_str: &str) -> Result<Self, String> {
        let trimmed = hex_str.trim();
        let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(trimmed)
            .map_err(|e| format!("Invalid hex string: {}", e))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl TryFrom<String> for Digest {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Digest> for String {
    fn from(digest: Digest) -> Self {
        digest.to_hex()
    }
}
