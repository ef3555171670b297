//! Command implementations

pub mod diff;
pub mod plan;
pub mod validate;

use migrata_ir::Schema;
use std::path::Path;

/// Load a schema file or directory, naming the path on failure
pub(crate) fn load_schema(path: &Path) -> anyhow::Result<Schema> {
    migrata_ir::load_schema(path).map_err(|e| {
        let hint = if e.is_not_found() {
            " (expected a .json file or a directory of them)"
        } else {
            ""
        };
        anyhow::Error::new(e).context(format!(
            "Failed to load schema from '{}'{}",
            path.display(),
            hint
        ))
    })
}

/// Print a value as pretty JSON on stdout
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
