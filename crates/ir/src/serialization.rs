//! Loading schemas and change sets
//!
//! Schemas are JSON documents, either one file holding the whole
//! collection or a directory of per-entity files. Directory loads are
//! sorted by path so the resulting declaration order never depends on the
//! filesystem.

use crate::change::ChangeSet;
use crate::entity::EntityDefinition;
use crate::schema::{Schema, SchemaDocument};
use migrata_core::{EngineError, EngineResult, ResultExt};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// ============================================================================
// Constants
// ============================================================================

/// File extension for schema and change files
pub const SCHEMA_EXTENSION: &str = "json";

// ============================================================================
// Schema Loading
// ============================================================================

/// One file inside a schema directory
#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaFragment {
    Document(SchemaDocument),
    Entity(EntityDefinition),
}

/// Load a schema from a file or a directory of entity files
///
/// # Example
///
/// ```rust,ignore
/// use migrata_ir::load_schema;
///
/// let schema = load_schema("schema/").unwrap();
/// println!("Loaded {} entities", schema.entity_count());
/// ```
pub fn load_schema(path: impl AsRef<Path>) -> EngineResult<Schema> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(EngineError::SchemaNotFound(path.to_path_buf()));
    }
    if path.is_dir() {
        return load_schema_dir(path);
    }

    let json = read_file(path)?;
    load_schema_from_str(&json).map_err(|e| invalid_format(path, e))
}

/// Load a schema from a JSON string holding the whole collection
pub fn load_schema_from_str(json: &str) -> EngineResult<Schema> {
    let schema: Schema = serde_json::from_str(json)?;
    Ok(schema)
}

/// Load every `*.json` file under `dir` into one schema.
///
/// Each file is either a whole schema document (`{"entities": ...}`) or a
/// single entity definition. Entity files without a `name` take the file
/// stem. The same entity name appearing twice is an error.
pub fn load_schema_dir(dir: impl AsRef<Path>) -> EngineResult<Schema> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(EngineError::SchemaNotFound(dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|e| EngineError::FileRead {
            path: e.path().map_or_else(|| dir.to_path_buf(), Path::to_path_buf),
            message: e.to_string(),
        })?;
        let is_schema = entry.path().extension().is_some_and(|ext| ext == SCHEMA_EXTENSION);
        if entry.file_type().is_file() && is_schema {
            files.push(entry.into_path());
        }
    }
    files.sort();

    let mut schema = Schema::new();
    for path in &files {
        let json = read_file(path)?;
        let fragment: SchemaFragment =
            serde_json::from_str(&json).map_err(|e| invalid_format(path, e.into()))?;

        match fragment {
            SchemaFragment::Document(doc) => {
                let partial = Schema::from(doc);
                for entity in partial.entities.into_values() {
                    insert_unique(&mut schema, entity).with_context(loading(path))?;
                }
                schema.enums.extend(partial.enums);
                schema.compound_types.extend(partial.compound_types);
            }
            SchemaFragment::Entity(mut entity) => {
                if entity.name.is_empty() {
                    entity.name = path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default();
                }
                insert_unique(&mut schema, entity).with_context(loading(path))?;
            }
        }
    }

    Ok(schema)
}

fn insert_unique(schema: &mut Schema, entity: EntityDefinition) -> EngineResult<()> {
    if schema.entities.contains_key(&entity.name) {
        return Err(EngineError::DuplicateEntity(entity.name));
    }
    schema.add_entity(entity);
    Ok(())
}

// ============================================================================
// Change Loading
// ============================================================================

/// Load a change set written by the schema-diffing tool
pub fn load_changes(path: impl AsRef<Path>) -> EngineResult<ChangeSet> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(EngineError::SchemaNotFound(path.to_path_buf()));
    }
    let json = read_file(path)?;
    load_changes_from_str(&json).map_err(|e| invalid_format(path, e))
}

/// Load a change set from a JSON string
pub fn load_changes_from_str(json: &str) -> EngineResult<ChangeSet> {
    let changes: ChangeSet = serde_json::from_str(json)?;
    Ok(changes)
}

// ============================================================================
// Helpers
// ============================================================================

fn loading(path: &Path) -> String {
    format!("Loading '{}'", path.display())
}

fn read_file(path: &Path) -> EngineResult<String> {
    std::fs::read_to_string(path).map_err(|e| EngineError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn invalid_format(path: &Path, err: EngineError) -> EngineError {
    match err {
        EngineError::JsonSerialization(je) => EngineError::InvalidSchemaFormat {
            path: path.to_path_buf(),
            message: je.to_string(),
        },
        other => other,
    }
}

// ============================================================================
// Tests
// ============================================================================
