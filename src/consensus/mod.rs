// Proof of work search and solution validation

pub mod pow;
pub mod validation;

pub use pow::{
    candidate_hash, solve, solve_bounded, Search, SearchOutcome, SolveError, Solver, Target,
    BASE_DIFFICULTY,
};
pub use validation::{verify_solutions, SolutionError, SolutionValidator};
