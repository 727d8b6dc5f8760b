//! Codelens CLI entry point.

use clap::Parser;
use codelens::cli::{self, Cli, Commands, EXIT_ERROR};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let outcome = match cli.command {
        Commands::Analyze(args) => cli::run_analyze(&args),
        Commands::Languages => cli::run_languages(),
    };

    let exit_code = match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
