// Experiment driver: difficulty sweep, timing and aggregation

use crate::consensus::{SearchOutcome, Solver};
use crate::core::{Digest, SeedChain};
use crate::experiment::config::ExperimentConfig;
use crate::experiment::stats::{AggregateRow, SampleStats};
use std::time::{Duration, Instant};

/// Runs the sweep sequentially on the calling thread.
///
/// The seed chain is continuous across the whole sweep and never reset
/// between rows. Only the search call itself is timed.
pub struct Driver {
    config: ExperimentConfig,
    chain: SeedChain,
}

impl Driver {
    /// Create a driver; the configuration is validated first
    pub fn new(config: ExperimentConfig) -> Result<Self, String> {
        config.validate()?;
        let chain = SeedChain::new(config.initial_seed);
        Ok(Self { config, chain })
    }

    /// Seed chain cursor, positioned after the last sample taken
    pub fn seed_chain(&self) -> &SeedChain {
        &self.chain
    }

    /// Time `samples` searches requiring `solutions` solutions each
    pub fn run_row(&mut self, solutions: u64) -> Result<AggregateRow, String> {
        let target = self.config.difficulty_for(solutions)?;
        let required = usize::try_from(solutions)
            .map_err(|e| format!("Invalid solution count {}: {}", solutions, e))?;
        let solver = Solver::new(target, required);

        log::info!(
            "Row {}: target {:#018x}, {} samples, ~{:.0} hashes each",
            solutions,
            target.value(),
            self.config.samples,
            target.expected_attempts(required)
        );

        let mut stats = SampleStats::new();
        for sample in 0..self.config.samples {
            let seed = self.chain.next_seed();

            let (outcome, elapsed) = self.timed_search(&solver, seed)?;
            stats.record(elapsed, outcome.attempts);

            log::debug!(
                "Sample {} seed {}: {} hashes in {:?}",
                sample,
                seed,
                outcome.attempts,
                elapsed
            );
        }

        let row = stats
            .summarize(solutions)
            .ok_or_else(|| format!("No samples recorded for {} solutions", solutions))?;

        log::info!(
            "Row {} done: avg {} ns, {:.0} H/s",
            solutions,
            row.avg_ns,
            row.hash_rate
        );

        Ok(row)
    }

    fn timed_search(
        &self,
        solver: &Solver,
        seed: Digest,
    ) -> Result<(SearchOutcome, Duration), String> {
        let search = solver.prepare(&seed);
        match self.config.max_attempts {
            None => {
                let start = Instant::now();
                let outcome = search.run();
                let elapsed = start.elapsed();
                Ok((outcome, elapsed))
            }
            Some(limit) => {
                let start = Instant::now();
                let result = search.run_bounded(limit);
                let elapsed = start.elapsed();
                let outcome = result.map_err(|e| format!("Search for seed {} failed: {}", seed, e))?;
                Ok((outcome, elapsed))
            }
        }
    }

    /// Run every row of the sweep, handing each to `on_row` as soon as it is
    /// complete
    pub fn run<F>(&mut self, mut on_row: F) -> Result<Vec<AggregateRow>, String>
    where
        F: FnMut(&AggregateRow) -> Result<(), String>,
    {
        let counts = self.config.solution_counts();
        log::info!(
            "Starting sweep over {:?} solutions, {} samples per row",
            counts,
            self.config.samples
        );

        let mut rows = Vec::with_capacity(counts.len());
        for solutions in counts {
            let row = self.run_row(solutions)?;
            on_row(&row)?;
            rows.push(row);
        }

        log::info!("Sweep finished after {} seeds", self.chain.position());
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> ExperimentConfig {
        ExperimentConfig {
            max_solutions: 4,
            samples: 5,
            base_difficulty: 1 << 58,
            ..Default::default()
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = ExperimentConfig { samples: 0, ..quick_config() };
        assert!(Driver::new(config).is_err());
    }

    #[test]
    fn test_one_row_per_count() {
        let mut driver = Driver::new(quick_config()).unwrap();
        let mut streamed = Vec::new();
        let rows = driver
            .run(|row| {
                streamed.push(row.solutions);
                Ok(())
            })
            .unwrap();

        assert_eq!(streamed, vec![1, 2, 4]);
        assert_eq!(rows.len(), 3);
        for row in &rows {
            assert_eq!(row.samples, 5);
            assert!(row.min_ns <= row.avg_ns && row.avg_ns <= row.max_ns);
            assert!(row.min_percent <= 100.0 && row.max_percent >= 100.0);
            assert!(row.hashes >= 5 * row.solutions);
        }
    }

    #[test]
    fn test_chain_continues_across_rows() {
        let mut driver = Driver::new(quick_config()).unwrap();
        driver.run(|_| Ok(())).unwrap();

        // 3 rows x 5 samples
        assert_eq!(driver.seed_chain().position(), 15);
        let expected = SeedChain::new(quick_config().initial_seed).nth(14).unwrap();
        assert_eq!(driver.seed_chain().current(), expected);
    }

    #[test]
    fn test_sweep_seeds_are_reproducible() {
        let mut a = Driver::new(quick_config()).unwrap();
        let mut b = Driver::new(quick_config()).unwrap();
        let rows_a = a.run(|_| Ok(())).unwrap();
        let rows_b = b.run(|_| Ok(())).unwrap();

        assert_eq!(a.seed_chain().current(), b.seed_chain().current());
        // Hash counts depend only on the seeds, not on timing
        let hashes_a: Vec<u64> = rows_a.iter().map(|r| r.hashes).collect();
        let hashes_b: Vec<u64> = rows_b.iter().map(|r| r.hashes).collect();
        assert_eq!(hashes_a, hashes_b);
    }

    #[test]
    fn test_different_start_changes_work() {
        let mut a = Driver::new(quick_config()).unwrap();
        let other = ExperimentConfig { initial_seed: Digest::new([9u8; 32]), ..quick_config() };
        let mut b = Driver::new(other).unwrap();
        a.run(|_| Ok(())).unwrap();
        b.run(|_| Ok(())).unwrap();
        assert_ne!(a.seed_chain().current(), b.seed_chain().current());
    }

    #[test]
    fn test_attempt_ceiling_surfaces_error() {
        let config = ExperimentConfig {
            base_difficulty: 1,
            max_attempts: Some(100),
            ..quick_config()
        };
        let mut driver = Driver::new(config).unwrap();
        let err = driver.run_row(1).unwrap_err();
        assert!(err.contains("Attempt limit of 100 reached"));
    }

    #[test]
    fn test_row_hashes_match_untimed_searches() {
        let config = quick_config();
        let mut driver = Driver::new(config.clone()).unwrap();
        let row = driver.run_row(2).unwrap();

        let solver = Solver::new(config.difficulty_for(2).unwrap(), 2);
        let expected: u64 = SeedChain::new(config.initial_seed)
            .take(5)
            .map(|seed| solver.search(seed).attempts)
            .sum();
        assert_eq!(row.hashes, expected);
    }

    #[test]
    fn test_sink_error_stops_sweep() {
        let mut driver = Driver::new(quick_config()).unwrap();
        let err = driver.run(|_| Err("sink closed".to_string())).unwrap_err();
        assert_eq!(err, "sink closed");
        assert_eq!(driver.seed_chain().position(), 5);
    }
}
