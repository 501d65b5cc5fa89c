//! wavsource CLI - recording inspector
//!
//! Command-line interface for the wavsource sample source.

use clap::Parser;
use env_logger::Env;
use log::info;

use wavsource::cli::{commands, Cli, Commands};
use wavsource::Result;

fn main() {
    let cli = Cli::parse();

    // Diagnostics go to stderr, data to stdout
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    info!("wavsource v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli) {
        eprintln!("ERROR: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    let options = cli.options()?;

    match cli.command {
        Commands::Info { file } => commands::info(&file, &options),
        Commands::Dump {
            file,
            start,
            count,
            scaled,
        } => commands::dump(&file, &options, start, count, scaled),
    }
}
