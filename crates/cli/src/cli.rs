//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use migrata_codegen::MigrationTimestamp;
use std::path::PathBuf;

/// Migrata - compile entity schemas into ordered table migrations
#[derive(Parser, Debug)]
#[command(name = "migrata")]
#[command(version)]
#[command(about = "Migrata - compile entity schemas into ordered table migrations", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Path to a migrata.toml (defaults to ./migrata.toml when present)
    #[arg(short, long, global = true, env = "MIGRATA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Plan every table of a schema in creation order
    Plan(PlanArgs),

    /// Build update and drop migrations from a change set
    Diff(DiffArgs),

    /// Validate a schema and list its findings
    Validate(ValidateArgs),
}

// =============================================================================
// Shared Arguments
// =============================================================================

/// Output format for command results
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable listing
    #[default]
    Text,
    /// Structured JSON on stdout
    Json,
}

/// Flags overriding the `[generator]` table of the config file
#[derive(Args, Debug, Default, Clone)]
pub struct GeneratorArgs {
    /// Locale used for column comments
    #[arg(long)]
    pub locale: Option<String>,

    /// Base timestamp for the first migration (YYYY_MM_DD_HHMMSS)
    #[arg(long, value_parser = parse_timestamp)]
    pub base_timestamp: Option<MigrationTimestamp>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

fn parse_timestamp(value: &str) -> Result<MigrationTimestamp, String> {
    MigrationTimestamp::parse(value).map_err(|e| e.to_string())
}

// =============================================================================
// Plan Command
// =============================================================================

/// Arguments for the `plan` command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Schema file or directory of entity files
    pub schema: PathBuf,

    #[command(flatten)]
    pub generator: GeneratorArgs,
}

// =============================================================================
// Diff Command
// =============================================================================

/// Arguments for the `diff` command
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Change set written by the schema-diffing tool
    pub changes: PathBuf,

    /// Current schema file or directory
    #[arg(short, long)]
    pub schema: PathBuf,

    #[command(flatten)]
    pub generator: GeneratorArgs,
}

// =============================================================================
// Validate Command
// =============================================================================

/// Arguments for the `validate` command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema file or directory of entity files
    pub schema: PathBuf,
}
