// CLI commands

use clap::{Args, Parser, Subcommand};
use rand::rngs::OsRng;
use rand::RngCore;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use crate::consensus::{verify_solutions, Solver, Target};
use crate::core::{Digest, Nonce, SeedChain, INITIAL_SEED};
use crate::experiment::{hash_rate, Driver, ExperimentConfig, OutputFormat, Reporter};

#[derive(Parser)]
#[command(name = "multi-pow")]
#[command(about = "Measure how requiring several PoW solutions narrows solve-time spread", long_about = None)]
pub struct Cli {
    /// Defaults to `sweep` with the reference parameters
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Time searches for 1, 2, 4, ... required solutions and print a summary table
    Sweep(SweepArgs),

    /// Run a single search and print the nonces found
    Solve {
        /// Seed digest (64 hex chars); defaults to the first seed of the reference chain
        #[arg(long)]
        seed: Option<String>,
        /// Difficulty target (decimal or 0x-prefixed hex)
        #[arg(short, long, value_parser = parse_u64, default_value = "0x003FFFFFFFFFFFFF")]
        difficulty: u64,
        /// Number of solutions to find
        #[arg(short, long, default_value = "1")]
        count: usize,
        /// Give up after this many hashes
        #[arg(long)]
        max_attempts: Option<u64>,
    },

    /// Check a solution set against a seed and difficulty
    Verify {
        /// Seed digest (64 hex chars)
        #[arg(long)]
        seed: String,
        /// Difficulty target (decimal or 0x-prefixed hex)
        #[arg(short, long, value_parser = parse_u64)]
        difficulty: u64,
        /// Number of solutions the set must hold
        #[arg(short, long)]
        count: usize,
        /// Comma-separated nonces
        #[arg(short, long, value_delimiter = ',', required = true)]
        nonces: Vec<Nonce>,
        /// Also rescan for qualifying nonces missing from the set
        #[arg(long)]
        complete: bool,
    },

    /// Print successive seeds of the hash chain
    Chain {
        /// Starting value (64 hex chars); defaults to the reference start
        #[arg(long)]
        start: Option<String>,
        /// Number of seeds to print
        #[arg(short, long, default_value = "10")]
        count: u64,
    },
}

#[derive(Args, Default)]
pub struct SweepArgs {
    /// JSON config file; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Upper bound of the doubling sweep
    #[arg(long)]
    pub max_solutions: Option<u64>,
    /// Trials per row
    #[arg(long)]
    pub samples: Option<u64>,
    /// Per-solution target for one required solution (decimal or 0x-prefixed hex)
    #[arg(long, value_parser = parse_u64)]
    pub base_difficulty: Option<u64>,
    /// Starting value of the seed chain (64 hex chars)
    #[arg(long, conflicts_with = "random_seed")]
    pub seed: Option<String>,
    /// Start the seed chain from OS randomness
    #[arg(long)]
    pub random_seed: bool,
    /// Give up on a search after this many hashes
    #[arg(long)]
    pub max_attempts: Option<u64>,
    /// Write the effective config to this path before running
    #[arg(long)]
    pub dump_config: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl SweepArgs {
    /// Defaults, then the config file, then flags
    pub fn to_config(&self) -> Result<ExperimentConfig, String> {
        let mut config = match &self.config {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                ExperimentConfig::load(path)?
            }
            None => ExperimentConfig::default(),
        };

        if let Some(max) = self.max_solutions {
            config.max_solutions = max;
        }
        if let Some(samples) = self.samples {
            config.samples = samples;
        }
        if let Some(base) = self.base_difficulty {
            config.base_difficulty = base;
        }
        if let Some(seed) = &self.seed {
            config.initial_seed = Digest::from_hex(seed)?;
        }
        if self.random_seed {
            let mut bytes = [0u8; 32];
            OsRng.fill_bytes(&mut bytes);
            config.initial_seed = Digest::new(bytes);
            log::info!("Random seed chain start: {}", config.initial_seed);
        }
        if self.max_attempts.is_some() {
            config.max_attempts = self.max_attempts;
        }

        Ok(config)
    }
}

/// Parse an integer given in decimal or with a `0x` prefix
pub fn parse_u64(s: &str) -> Result<u64, String> {
    let s = s.trim().replace('_', "");
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    };
    parsed.map_err(|e| format!("Invalid integer '{}': {}", s, e))
}

/// CLI handler
pub struct CliHandler<W: Write> {
    out: W,
}

impl<W: Write> CliHandler<W> {
    /// Create a new CLI handler writing results to `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Handle CLI command
    pub fn handle(&mut self, cli: Cli) -> Result<(), String> {
        match cli.command {
            None => self.sweep(&SweepArgs::default()),
            Some(Commands::Sweep(args)) => self.sweep(&args),
            Some(Commands::Solve { seed, difficulty, count, max_attempts }) => {
                self.solve(seed.as_deref(), difficulty, count, max_attempts)
            }
            Some(Commands::Verify { seed, difficulty, count, nonces, complete }) => {
                self.verify(&seed, difficulty, count, &nonces, complete)
            }
            Some(Commands::Chain { start, count }) => self.chain(start.as_deref(), count),
        }
    }

    /// Run the full sweep, streaming rows as they complete
    fn sweep(&mut self, args: &SweepArgs) -> Result<(), String> {
        let config = args.to_config()?;
        if let Some(path) = &args.dump_config {
            config.save(path)?;
            log::info!("Wrote effective config to {}", path.display());
        }

        let mut driver = Driver::new(config)?;
        let mut reporter = Reporter::new(&mut self.out, args.format);
        reporter.write_header()?;
        driver.run(|row| reporter.write_row(row))?;

        Ok(())
    }

    /// Single search with optional attempt ceiling
    fn solve(
        &mut self,
        seed: Option<&str>,
        difficulty: u64,
        count: usize,
        max_attempts: Option<u64>,
    ) -> Result<(), String> {
        let seed = match seed {
            Some(hex) => Digest::from_hex(hex)?,
            None => SeedChain::default().next_seed(),
        };
        if difficulty == 0 && max_attempts.is_none() {
            return Err("Difficulty 0 can never be met; pass --max-attempts to try anyway".to_string());
        }

        let target = Target::new(difficulty);
        let solver = Solver::new(target, count);
        log::info!(
            "Searching for {} solutions below {:#018x} (~{:.0} hashes)",
            count,
            difficulty,
            target.expected_attempts(count)
        );

        let search = solver.prepare(&seed);
        let start = Instant::now();
        let outcome = match max_attempts {
            Some(limit) => search.run_bounded(limit).map_err(|e| e.to_string())?,
            None => search.run(),
        };
        let elapsed = start.elapsed();

        verify_solutions(&seed, difficulty, count, &outcome.nonces, false).map_err(|e| e.to_string())?;

        let rate = hash_rate(outcome.attempts, elapsed);
        let nonces: Vec<String> = outcome.nonces.iter().map(|n| n.to_string()).collect();
        writeln!(self.out, "Seed: {}", seed)
            .and_then(|_| writeln!(self.out, "Difficulty: {:#018x}", difficulty))
            .and_then(|_| writeln!(self.out, "Nonces: {}", nonces.join(",")))
            .and_then(|_| writeln!(self.out, "Attempts: {}", outcome.attempts))
            .and_then(|_| writeln!(self.out, "Duration: {:?}", elapsed))
            .and_then(|_| writeln!(self.out, "Hash rate: {:.2} H/s", rate))
            .map_err(|e| format!("Failed to write output: {}", e))
    }

    /// Verify a solution set
    fn verify(
        &mut self,
        seed: &str,
        difficulty: u64,
        count: usize,
        nonces: &[Nonce],
        complete: bool,
    ) -> Result<(), String> {
        let seed = Digest::from_hex(seed)?;
        verify_solutions(&seed, difficulty, count, nonces, complete).map_err(|e| e.to_string())?;

        writeln!(
            self.out,
            "✓ {} solutions valid{}",
            nonces.len(),
            if complete { " and complete" } else { "" }
        )
        .map_err(|e| format!("Failed to write output: {}", e))
    }

    /// Print the hash chain
    fn chain(&mut self, start: Option<&str>, count: u64) -> Result<(), String> {
        let start = match start {
            Some(hex) => Digest::from_hex(hex)?,
            None => Digest::new(INITIAL_SEED),
        };

        let mut chain = SeedChain::new(start);
        for _ in 0..count {
            let seed = chain.next_seed();
            writeln!(self.out, "{:>6} {}", chain.position(), seed)
                .map_err(|e| format!("Failed to write output: {}", e))?;
        }
        Ok(())
    }
}
