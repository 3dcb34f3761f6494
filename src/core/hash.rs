// Hashing utilities and the seed hash-chain

use sha2::{Digest as Sha2Digest, Sha256};
use crate::core::Digest;

/// Seed the reference sweep starts from, before the first advance
pub const INITIAL_SEED: [u8; 32] = {
    let mut seed = [0u8; 32];
    seed[0] = 1;
    seed[1] = 2;
    seed[2] = 3;
    seed
};

/// Single SHA256 hash
pub fn sha256(data: &[u8]) -> Digest {
    let hash = Sha256::digest(data);
    let mut result = [0u8; 32];
    result.copy_from_slice(&hash);
    Digest::new(result)
}

/// Hash-chain cursor: each seed is the SHA256 of the one before it.
///
/// Owned by whoever drives the sampling. Seeds are handed out by value, so
/// nothing downstream can mutate the chain.
#[derive(Debug, Clone)]
pub struct SeedChain {
    current: Digest,
    position: u64,
}

impl SeedChain {
    /// Start a chain at `start`; the first `next_seed` returns `sha256(start)`
    pub fn new(start: Digest) -> Self {
        Self {
            current: start,
            position: 0,
        }
    }

    /// Advance the chain and return the new seed
    pub fn next_seed(&mut self) -> Digest {
        self.current = sha256(self.current.as_bytes());
        self.position += 1;
        self.current
    }

    /// Most recently produced seed (the start value before any advance)
    pub fn current(&self) -> Digest {
        self.current
    }

    /// Number of seeds produced so far
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl Default for SeedChain {
    fn default() -> Self {
        Self::new(Digest::new(INITIAL_SEED))
    }
}

impl Iterator for SeedChain {
    type Item = Digest;

    fn next(&mut self) -> Option<Digest> {
        Some(self.next_seed())
    }
}
