// Multi-solution PoW variance benchmark - CLI

use clap::Parser;
use multi_pow::{Cli, CliHandler};

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let stdout = std::io::stdout();
    let mut handler = CliHandler::new(stdout.lock());

    if let Err(e) = handler.handle(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
