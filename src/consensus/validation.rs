// Solution set validation

use crate::consensus::pow::{candidate_hash, Target};
use crate::core::{Digest, Nonce};

/// Validation error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolutionError {
    /// Solution set has the wrong number of nonces
    WrongCount { expected: usize, actual: usize },
    /// Nonces are not strictly increasing
    NotIncreasing { index: usize },
    /// Nonce hash does not meet the target
    AboveTarget { nonce: Nonce },
    /// A qualifying nonce was left out of the set
    SkippedSolution { nonce: Nonce },
}

impl std::fmt::Display for SolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SolutionError::WrongCount { expected, actual } => {
                write!(f, "Expected {} solutions, got {}", expected, actual)
            }
            SolutionError::NotIncreasing { index } => {
                write!(f, "Nonce at position {} is not greater than its predecessor", index)
            }
            SolutionError::AboveTarget { nonce } => {
                write!(f, "Nonce {} does not meet the target", nonce)
            }
            SolutionError::SkippedSolution { nonce } => {
                write!(f, "Qualifying nonce {} missing from solution set", nonce)
            }
        }
    }
}

impl std::error::Error for SolutionError {}

/// Solution set validator
pub struct SolutionValidator {
    target: Target,
    required: usize,
}

impl SolutionValidator {
    pub fn new(target: Target, required: usize) -> Self {
        Self { target, required }
    }

    /// Check count, ordering and the target predicate
    pub fn validate(&self, seed: &Digest, nonces: &[Nonce]) -> Result<(), SolutionError> {
        if nonces.len() != self.required {
            return Err(SolutionError::WrongCount {
                expected: self.required,
                actual: nonces.len(),
            });
        }

        for (index, pair) in nonces.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(SolutionError::NotIncreasing { index: index + 1 });
            }
        }

        for &nonce in nonces {
            if !self.target.is_met_by(&candidate_hash(seed, nonce)) {
                return Err(SolutionError::AboveTarget { nonce });
            }
        }

        Ok(())
    }

    /// [`SolutionValidator::validate`] plus a rescan proving no qualifying
    /// nonce below the last one was skipped. Costs as much as the search.
    pub fn validate_complete(&self, seed: &Digest, nonces: &[Nonce]) -> Result<(), SolutionError> {
        self.validate(seed, nonces)?;

        let Some(&last) = nonces.last() else {
            return Ok(());
        };

        let mut listed = nonces.iter().peekable();
        for nonce in 0..last {
            if listed.peek() == Some(&&nonce) {
                listed.next();
                continue;
            }
            if self.target.is_met_by(&candidate_hash(seed, nonce)) {
                return Err(SolutionError::SkippedSolution { nonce });
            }
        }

        Ok(())
    }
}

/// Check that `nonces` holds exactly `required` solutions for `difficulty`,
/// optionally rescanning for skipped solutions
pub fn verify_solutions(
    seed: &Digest,
    difficulty: u64,
    required: usize,
    nonces: &[Nonce],
    complete: bool,
) -> Result<(), SolutionError> {
    let validator = SolutionValidator::new(Target::new(difficulty), required);
    if complete {
        validator.validate_complete(seed, nonces)
    } else {
        validator.validate(seed, nonces)
    }
}
