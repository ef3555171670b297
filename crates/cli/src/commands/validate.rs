//! `migrata validate` command - list schema findings.

use migrata_core::Validatable;

use crate::cli::ValidateArgs;
use crate::output;

/// Run the validate command. Fails when the schema has findings.
pub fn run(args: ValidateArgs) -> anyhow::Result<()> {
    output::header("Validate Schema");
    output::kv("Schema", &args.schema.display().to_string());
    output::newline();

    let schema = super::load_schema(&args.schema)?;
    let findings = schema.validation_errors();

    if findings.is_empty() {
        output::success(&format!(
            "Schema is valid ({} entities)",
            schema.entity_count()
        ));
        return Ok(());
    }

    output::section("Findings");
    for finding in &findings {
        output::list_item(finding);
    }
    output::newline();
    anyhow::bail!("Schema has {} validation finding(s)", findings.len())
}
