//! Migrata CLI - command-line interface for the migration compiler.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use migrata_cli::cli::{Cli, Command};
use migrata_cli::commands;
use migrata_cli::config::Config;
use migrata_cli::output;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        output::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Logs go to stderr so JSON output on stdout stays parseable
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::discover(cli.config.as_deref())?;

    match cli.command {
        Command::Plan(args) => {
            let generator = config.generator_config(&args.generator);
            commands::plan::run(args, generator)
        }
        Command::Diff(args) => {
            let generator = config.generator_config(&args.generator);
            commands::diff::run(args, generator)
        }
        Command::Validate(args) => commands::validate::run(args),
    }
}
