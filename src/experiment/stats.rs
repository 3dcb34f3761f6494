// Per-row timing aggregation

use serde::Serialize;
use std::time::Duration;

/// Running min/max/sum over the samples of one row
#[derive(Debug, Clone, Default)]
pub struct SampleStats {
    min: Option<Duration>,
    max: Option<Duration>,
    sum: Duration,
    count: u64,
    hashes: u64,
}

impl SampleStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one timed search and the hashes it computed
    pub fn record(&mut self, elapsed: Duration, attempts: u64) {
        self.min = Some(self.min.map_or(elapsed, |m| m.min(elapsed)));
        self.max = Some(self.max.map_or(elapsed, |m| m.max(elapsed)));
        self.sum += elapsed;
        self.count += 1;
        self.hashes += attempts;
    }

    /// Build the summary row. `None` if nothing was recorded.
    pub fn summarize(&self, solutions: u64) -> Option<AggregateRow> {
        let (min, max) = (self.min?, self.max?);
        let min_ns = min.as_nanos();
        let max_ns = max.as_nanos();
        let sum_ns = self.sum.as_nanos();
        let avg_ns = sum_ns / u128::from(self.count);

        Some(AggregateRow {
            solutions,
            samples: self.count,
            min_ns,
            max_ns,
            avg_ns,
            min_percent: percent_of(min_ns, avg_ns),
            max_percent: percent_of(max_ns, avg_ns),
            hashes: self.hashes,
            hash_rate: hash_rate(self.hashes, self.sum),
        })
    }
}

/// `100 * value / avg`; a zero average (sub-nanosecond samples) reads as 100%
fn percent_of(value: u128, avg: u128) -> f64 {
    if avg == 0 {
        return 100.0;
    }
    value as f64 / avg as f64 * 100.0
}

/// Hashes per second; zero when no time was measured
pub fn hash_rate(hashes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs == 0.0 {
        return 0.0;
    }
    hashes as f64 / secs
}

/// Summary of one solutions-required value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub solutions: u64,
    pub samples: u64,
    pub min_ns: u128,
    pub max_ns: u128,
    pub avg_ns: u128,
    pub min_percent: f64,
    pub max_percent: f64,
    /// Total hashes computed across all samples
    pub hashes: u64,
    /// Hashes per second over the timed searches
    pub hash_rate: f64,
}
