//! `migrata plan` command - order every table of a schema.

use migrata_codegen::{Generator, GeneratorConfig, MigrationPlan, TableKind};

use crate::cli::{OutputFormat, PlanArgs};
use crate::output;

/// Run the plan command
pub fn run(args: PlanArgs, config: GeneratorConfig) -> anyhow::Result<()> {
    let schema = super::load_schema(&args.schema)?;
    let plan = Generator::new(config).plan(&schema);

    match args.generator.format {
        OutputFormat::Json => super::print_json(&plan),
        OutputFormat::Text => {
            print_plan(&args.schema.display().to_string(), &plan);
            Ok(())
        }
    }
}

fn print_plan(source: &str, plan: &MigrationPlan) {
    output::header("Migration Plan");
    output::kv("Schema", source);
    output::kv("Tables", &plan.tables.len().to_string());
    output::kv(
        "Pivots",
        &(plan.count(TableKind::Pivot) + plan.count(TableKind::MorphPivot)).to_string(),
    );
    output::newline();

    for (i, table) in plan.tables.iter().enumerate() {
        let suffix = match table.kind {
            TableKind::Entity => String::new(),
            TableKind::Pivot => " (pivot)".to_string(),
            TableKind::MorphPivot => " (polymorphic pivot)".to_string(),
        };
        output::numbered_item(i + 1, &format!("{}{}", table.file_stem(), suffix));
    }

    if plan.has_warnings() {
        output::newline();
        output::section("Warnings");
        for warning in &plan.warnings {
            output::warn(warning);
        }
    }
    output::newline();
    output::success(&format!("{} migrations planned", plan.tables.len()));
}
