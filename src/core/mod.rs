// Core data types and hashing

mod types;
mod hash;

pub use types::*;
pub use hash::*;
