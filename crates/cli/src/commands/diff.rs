//! `migrata diff` command - incremental migrations from a change set.

use anyhow::Context;
use migrata_codegen::{DiffMigration, Generator, GeneratorConfig, Operation};

use crate::cli::{DiffArgs, OutputFormat};
use crate::output;

/// Run the diff command
pub fn run(args: DiffArgs, config: GeneratorConfig) -> anyhow::Result<()> {
    let schema = super::load_schema(&args.schema)?;
    let changes = migrata_ir::load_changes(&args.changes)
        .with_context(|| format!("Failed to load changes from '{}'", args.changes.display()))?;

    let migrations = Generator::new(config).diff_set(&schema, &changes);

    match args.generator.format {
        OutputFormat::Json => super::print_json(&migrations),
        OutputFormat::Text => {
            print_migrations(&migrations);
            Ok(())
        }
    }
}

fn print_migrations(migrations: &[DiffMigration]) {
    output::header("Diff Migrations");

    if migrations.is_empty() {
        output::success("No changes to migrate");
        return;
    }

    for migration in migrations {
        output::section(&migration.file_stem());
        for op in &migration.operations.forward {
            output::list_item(&describe(op));
        }
        output::newline();
    }
    output::success(&format!("{} migrations built", migrations.len()));
}

/// One-line summary of an operation
pub fn describe(op: &Operation) -> String {
    match op {
        Operation::CreateTable { blueprint } => format!(
            "create table {} ({} columns)",
            blueprint.table,
            blueprint.columns.len()
        ),
        Operation::DropTable { table } => format!("drop table {}", table),
        Operation::AddColumn { column } => format!("add column {}", column.name),
        Operation::AlterColumn { column } => format!("alter column {}", column.name),
        Operation::DropColumn { column } => format!("drop column {}", column),
        Operation::RenameColumn { from, to } => format!("rename column {} to {}", from, to),
        Operation::AddForeignKey { foreign_key } => format!(
            "add foreign key {} -> {}.{}",
            foreign_key.columns.join(", "),
            foreign_key.references_table,
            foreign_key.references_column
        ),
        Operation::DropForeignKey { name, .. } => format!("drop foreign key {}", name),
        Operation::AddIndex { index } => format!(
            "add {} {}",
            if index.unique { "unique" } else { "index" },
            index.columns.join(", ")
        ),
        Operation::DropIndex { name, unique, .. } => {
            format!("drop {} {}", if *unique { "unique" } else { "index" }, name)
        }
        Operation::AddTimestamps => "add timestamps".to_string(),
        Operation::DropTimestamps => "drop timestamps".to_string(),
        Operation::AddSoftDeletes => "add soft deletes".to_string(),
        Operation::DropSoftDeletes => "drop soft deletes".to_string(),
        Operation::DropPrimary { columns } => format!("drop primary ({})", columns.join(", ")),
        Operation::AddPrimary { columns } => format!("add primary ({})", columns.join(", ")),
    }
}
