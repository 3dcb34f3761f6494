// Timing experiment over solutions-required values

pub mod config;
pub mod driver;
pub mod report;
pub mod stats;

pub use config::ExperimentConfig;
pub use driver::Driver;
pub use report::{group_thousands, OutputFormat, Reporter};
pub use stats::{hash_rate, AggregateRow, SampleStats};
