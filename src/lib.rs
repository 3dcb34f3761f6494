// Multi-solution proof of work: how requiring several solutions
// narrows the spread of discovery time around its mean

pub mod cli;
pub mod consensus;
pub mod core;
pub mod experiment;

// Re-exports for convenience
pub use crate::cli::{Cli, CliHandler};
pub use crate::consensus::{solve, solve_bounded, verify_solutions, SolveError, SolutionError, Solver, Target};
pub use crate::core::{Digest, Nonce, SeedChain};
pub use crate::experiment::{AggregateRow, Driver, ExperimentConfig, OutputFormat, Reporter};
