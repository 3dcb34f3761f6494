// Multi-solution proof of work search

use crate::core::{sha256, Digest, Nonce};

/// Reference per-solution target for a single required solution.
/// Roughly one hash in 1024 qualifies.
pub const BASE_DIFFICULTY: u64 = 0x003F_FFFF_FFFF_FFFF;

/// Attempts between progress lines while searching
const PROGRESS_INTERVAL: u64 = 1 << 24;

/// Difficulty target: a hash qualifies when its leading 8 bytes,
/// read big-endian, are strictly below this value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Target(pub u64);

impl Target {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Linear scaling used by the sweep: `base * factor`.
    /// Returns `None` if the product does not fit in 64 bits.
    pub fn scaled(base: u64, factor: u64) -> Option<Self> {
        base.checked_mul(factor).map(Self)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Check if a hash meets this target (leading u64 < target)
    #[inline]
    pub fn is_met_by(&self, hash: &Digest) -> bool {
        hash.leading_u64() < self.0
    }

    /// Probability that a single hash qualifies
    pub fn hit_probability(&self) -> f64 {
        self.0 as f64 / 2f64.powi(64)
    }

    /// Expected number of hashes to collect `count` solutions.
    /// Infinite for a zero target.
    pub fn expected_attempts(&self, count: usize) -> f64 {
        count as f64 / self.hit_probability()
    }
}

/// Search error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    /// Opt-in attempt ceiling hit before enough solutions were found
    AttemptLimitReached {
        /// Ceiling that was configured
        limit: u64,
        /// Solutions found before giving up
        found: usize,
        /// Solutions requested
        required: usize,
    },
}

impl std::fmt::Display for SolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SolveError::AttemptLimitReached { limit, found, required } => write!(
                f,
                "Attempt limit of {} reached with {} of {} solutions found",
                limit, found, required
            ),
        }
    }
}

impl std::error::Error for SolveError {}

/// Fixed 40-byte layout hashed for every candidate:
/// nonce (8 bytes, big-endian) followed by the seed (32 bytes)
struct CandidateBuffer([u8; 40]);

impl CandidateBuffer {
    fn new(seed: &Digest) -> Self {
        let mut buf = [0u8; 40];
        buf[8..].copy_from_slice(seed.as_bytes());
        Self(buf)
    }

    #[inline]
    fn hash_with(&mut self, nonce: Nonce) -> Digest {
        self.0[..8].copy_from_slice(&nonce.to_be_bytes());
        sha256(&self.0)
    }
}

/// Hash of `nonce ‖ seed`, the value tested against a target
pub fn candidate_hash(seed: &Digest, nonce: Nonce) -> Digest {
    CandidateBuffer::new(seed).hash_with(nonce)
}

/// Result of one search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Qualifying nonces in increasing order
    pub nonces: Vec<Nonce>,
    /// Number of hashes computed
    pub attempts: u64,
}

/// Multi-solution solver with a fixed target and solution count
#[derive(Debug, Clone, Copy)]
pub struct Solver {
    pub target: Target,
    pub required: usize,
}

impl Solver {
    pub fn new(target: Target, required: usize) -> Self {
        Self { target, required }
    }

    /// Allocate everything a search over `seed` needs, without hashing.
    /// Lets callers keep setup out of a timed interval.
    pub fn prepare(&self, seed: &Digest) -> Search {
        Search {
            target: self.target,
            required: self.required,
            buf: CandidateBuffer::new(seed),
            nonces: Vec::with_capacity(self.required),
        }
    }

    /// Walk nonces upward from zero until `required` solutions are found.
    ///
    /// There is no ceiling: with a zero target, or one so small that
    /// solutions are vanishingly rare, this never returns. Callers must
    /// pick a target with a tractable expected search length.
    pub fn search(&self, seed: Digest) -> SearchOutcome {
        self.prepare(&seed).run()
    }

    /// Same walk as [`Solver::search`], but gives up after `max_attempts`
    /// hashes instead of looping forever
    pub fn search_bounded(&self, seed: Digest, max_attempts: u64) -> Result<SearchOutcome, SolveError> {
        self.prepare(&seed).run_bounded(max_attempts)
    }
}

/// A search with its buffer and result storage already allocated
pub struct Search {
    target: Target,
    required: usize,
    buf: CandidateBuffer,
    nonces: Vec<Nonce>,
}

impl Search {
    /// Unbounded walk; see [`Solver::search`]
    pub fn run(mut self) -> SearchOutcome {
        let mut nonce: Nonce = 0;

        while self.nonces.len() < self.required {
            let hash = self.buf.hash_with(nonce);
            if self.target.is_met_by(&hash) {
                self.nonces.push(nonce);
            }
            nonce += 1;

            if nonce % PROGRESS_INTERVAL == 0 {
                log::trace!("Searched {} nonces, {} solutions", nonce, self.nonces.len());
            }
        }

        SearchOutcome {
            nonces: self.nonces,
            attempts: nonce,
        }
    }

    /// Walk that stops with an error after `max_attempts` hashes
    pub fn run_bounded(mut self, max_attempts: u64) -> Result<SearchOutcome, SolveError> {
        let mut nonce: Nonce = 0;

        while self.nonces.len() < self.required {
            if nonce >= max_attempts {
                return Err(SolveError::AttemptLimitReached {
                    limit: max_attempts,
                    found: self.nonces.len(),
                    required: self.required,
                });
            }

            let hash = self.buf.hash_with(nonce);
            if self.target.is_met_by(&hash) {
                self.nonces.push(nonce);
            }
            nonce += 1;
        }

        Ok(SearchOutcome {
            nonces: self.nonces,
            attempts: nonce,
        })
    }
}

/// Find the first `required` nonces whose candidate hash is below `difficulty`.
///
/// Precondition: `difficulty > 0` and large enough for the search to finish.
/// A zero difficulty loops forever. `required == 0` returns immediately.
pub fn solve(seed: Digest, difficulty: u64, required: usize) -> Vec<Nonce> {
    Solver::new(Target::new(difficulty), required).search(seed).nonces
}

/// [`solve`] with an explicit attempt ceiling, for use outside benchmarking
pub fn solve_bounded(
    seed: Digest,
    difficulty: u64,
    required: usize,
    max_attempts: u64,
) -> Result<Vec<Nonce>, SolveError> {
    Solver::new(Target::new(difficulty), required)
        .search_bounded(seed, max_attempts)
        .map(|outcome| outcome.nonces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{SeedChain, INITIAL_SEED};

    /// One hash in 16 qualifies
    const EASY: u64 = 1 << 60;

    fn reference_seed() -> Digest {
        sha256(&INITIAL_SEED)
    }

    #[test]
    fn test_target_validation() {
        let target = Target::new(BASE_DIFFICULTY);
        assert!(target.is_met_by(&Digest::zero()));
        assert!(!target.is_met_by(&Digest::new([0xff; 32])));

        // Strict less-than
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&BASE_DIFFICULTY.to_be_bytes());
        assert!(!target.is_met_by(&Digest::new(bytes)));
    }

    #[test]
    fn test_zero_target_rejects_everything() {
        assert!(!Target::new(0).is_met_by(&Digest::zero()));
        assert!(Target::new(0).expected_attempts(1).is_infinite());
    }

    #[test]
    fn test_target_scaling() {
        assert_eq!(Target::scaled(BASE_DIFFICULTY, 1), Some(Target(BASE_DIFFICULTY)));
        assert_eq!(Target::scaled(BASE_DIFFICULTY, 512), Some(Target(BASE_DIFFICULTY * 512)));
        assert_eq!(Target::scaled(u64::MAX, 2), None);
    }

    #[test]
    fn test_expected_attempts() {
        let target = Target::new(EASY);
        assert!((target.expected_attempts(1) - 16.0).abs() < 1e-9);
        assert!((target.expected_attempts(4) - 64.0).abs() < 1e-9);
    }

    #[test]
    fn test_candidate_hash_layout() {
        let seed = Digest::new([9u8; 32]);
        let mut data = Vec::with_capacity(40);
        data.extend_from_slice(&42u64.to_be_bytes());
        data.extend_from_slice(seed.as_bytes());
        assert_eq!(candidate_hash(&seed, 42), sha256(&data));
    }

    #[test]
    fn test_reference_scenario() {
        let seed = reference_seed();
        let nonces = solve(seed, BASE_DIFFICULTY, 1);
        assert_eq!(nonces.len(), 1);
        assert!(Target::new(BASE_DIFFICULTY).is_met_by(&candidate_hash(&seed, nonces[0])));

        // Deterministic
        assert_eq!(solve(seed, BASE_DIFFICULTY, 1), nonces);
    }

    #[test]
    fn test_exact_length_and_order() {
        for (k, seed) in SeedChain::default().take(20).enumerate() {
            let required = k + 1;
            let nonces = solve(seed, EASY, required);
            assert_eq!(nonces.len(), required);
            assert!(nonces.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_no_qualifying_nonce_skipped() {
        let target = Target::new(EASY);
        for seed in SeedChain::default().take(10) {
            let outcome = Solver::new(target, 8).search(seed);
            let last = *outcome.nonces.last().unwrap();
            assert_eq!(outcome.attempts, last + 1);

            let expected: Vec<Nonce> = (0..=last)
                .filter(|n| target.is_met_by(&candidate_hash(&seed, *n)))
                .collect();
            assert_eq!(outcome.nonces, expected);
        }
    }

    #[test]
    fn test_prepared_search_matches_search() {
        let seed = reference_seed();
        let solver = Solver::new(Target::new(EASY), 4);

        let prepared = solver.prepare(&seed);
        assert_eq!(prepared.nonces.capacity(), 4);
        assert!(prepared.nonces.is_empty());
        assert_eq!(prepared.run(), solver.search(seed));

        let bounded = solver.prepare(&seed).run_bounded(1_000_000).unwrap();
        assert_eq!(bounded, solver.search(seed));
    }

    #[test]
    fn test_zero_required_returns_empty() {
        let outcome = Solver::new(Target::new(EASY), 0).search(reference_seed());
        assert!(outcome.nonces.is_empty());
        assert_eq!(outcome.attempts, 0);
    }

    #[test]
    fn test_harder_target_never_finds_earlier() {
        // Qualifying set at D/2 is a subset of the set at D
        for seed in SeedChain::default().take(50) {
            let easy = solve(seed, EASY, 3);
            let hard = solve(seed, EASY / 2, 3);
            for (e, h) in easy.iter().zip(&hard) {
                assert!(h >= e);
            }
        }
    }

    #[test]
    fn test_halving_difficulty_doubles_median() {
        fn median(mut values: Vec<Nonce>) -> f64 {
            values.sort_unstable();
            values[values.len() / 2] as f64
        }

        let seeds: Vec<Digest> = SeedChain::default().take(400).collect();
        let full = median(seeds.iter().map(|s| solve(*s, EASY, 1)[0]).collect());
        let half = median(seeds.iter().map(|s| solve(*s, EASY / 2, 1)[0]).collect());

        let ratio = (half + 1.0) / (full + 1.0);
        assert!(ratio > 1.4 && ratio < 3.0, "median ratio {}", ratio);
    }

    #[test]
    fn test_bounded_matches_unbounded() {
        let seed = reference_seed();
        let bounded = solve_bounded(seed, EASY, 5, 1_000_000).unwrap();
        assert_eq!(bounded, solve(seed, EASY, 5));
    }

    #[test]
    fn test_bounded_gives_up() {
        let err = solve_bounded(reference_seed(), 0, 2, 1000).unwrap_err();
        assert_eq!(
            err,
            SolveError::AttemptLimitReached { limit: 1000, found: 0, required: 2 }
        );
        assert!(err.to_string().contains("0 of 2"));
    }

    #[test]
    #[ignore] // Slow in debug builds
    fn test_reference_scenario_many_solutions() {
        let nonces = solve(reference_seed(), BASE_DIFFICULTY * 64, 64);
        assert_eq!(nonces.len(), 64);
    }
}
