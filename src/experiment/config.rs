// Sweep parameters

use crate::consensus::{Target, BASE_DIFFICULTY};
use crate::core::{Digest, INITIAL_SEED};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Targets below this need over 2^24 (~16.7M) hashes per solution,
/// seconds of SHA256 work for every sample
const SUSPICIOUSLY_HARD: u64 = 1 << 40;

/// Experiment configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Upper bound of the doubling sweep 1, 2, 4, ...
    pub max_solutions: u64,
    /// Trials per row
    pub samples: u64,
    /// Per-solution target for one required solution; scaled linearly
    pub base_difficulty: u64,
    /// Value the seed chain starts from (first seed is its hash)
    pub initial_seed: Digest,
    /// Opt-in ceiling on hashes per search. `None` searches without bound.
    pub max_attempts: Option<u64>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            max_solutions: 512,
            samples: 1000,
            base_difficulty: BASE_DIFFICULTY,
            initial_seed: Digest::new(INITIAL_SEED),
            max_attempts: None,
        }
    }
}

impl ExperimentConfig {
    /// Load configuration from a JSON file; missing fields take defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let json = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        serde_json::from_str(&json)
            .map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Save configuration to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(path, json)
            .map_err(|e| format!("Failed to write config file: {}", e))?;

        Ok(())
    }

    /// Reject parameters that cannot produce a finite sweep
    pub fn validate(&self) -> Result<(), String> {
        if self.samples == 0 {
            return Err("samples must be at least 1".to_string());
        }
        if self.max_solutions == 0 {
            return Err("max_solutions must be at least 1".to_string());
        }
        if self.base_difficulty == 0 {
            return Err("base_difficulty must be non-zero; no hash can fall below 0".to_string());
        }
        if self.max_attempts == Some(0) {
            return Err("max_attempts must be at least 1 when set".to_string());
        }

        let largest = self.solution_counts().last().copied().unwrap_or(1);
        if Target::scaled(self.base_difficulty, largest).is_none() {
            return Err(format!(
                "base_difficulty {:#x} scaled by {} overflows 64 bits",
                self.base_difficulty, largest
            ));
        }

        if self.base_difficulty < SUSPICIOUSLY_HARD {
            log::warn!(
                "base_difficulty {:#x} expects ~{:.0} hashes per solution",
                self.base_difficulty,
                Target::new(self.base_difficulty).expected_attempts(1)
            );
        }

        Ok(())
    }

    /// Solutions-required values of the sweep: 1, 2, 4, ... up to `max_solutions`
    pub fn solution_counts(&self) -> Vec<u64> {
        let mut counts = Vec::new();
        let mut i = 1u64;
        while i <= self.max_solutions {
            counts.push(i);
            match i.checked_mul(2) {
                Some(next) => i = next,
                None => break,
            }
        }
        counts
    }

    /// Target for `solutions` required solutions: `base_difficulty * solutions`
    pub fn difficulty_for(&self, solutions: u64) -> Result<Target, String> {
        Target::scaled(self.base_difficulty, solutions).ok_or_else(|| {
            format!(
                "difficulty for {} solutions overflows 64 bits",
                solutions
            )
        })
    }
}
