//! # Migrata CLI
//!
//! Command-line surface over the migrata engines.
//!
//! ## Commands
//!
//! - `plan` - Order every table of a schema and print the migration plan
//! - `diff` - Turn a change set into timestamped update/drop migrations
//! - `validate` - Report schema findings
//!

pub mod cli;
pub mod commands;
pub mod config;
pub mod output;

// Re-export dependencies for use in main.rs
pub use migrata_codegen;
pub use migrata_core;
pub use migrata_ir;

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
