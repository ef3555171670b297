//! The entity collection
//!
//! `Schema` is the full input to a generation run: every entity keyed by
//! name, the named-enum registry and the compound-type registry. Lookups
//! tolerate missing targets, since forward and dangling references are
//! legal in authored schemas.

use crate::compound::CompoundTypeRegistry;
use crate::entity::EntityDefinition;
use crate::naming;
use crate::property::PropertyDefinition;
use indexmap::IndexMap;
use migrata_core::{EngineError, EngineResult, KeyType, RelationKind, Validatable};
use serde::{Deserialize, Serialize};

// ============================================================================
// Schema
// ============================================================================

/// Entity collection plus the registries properties refer to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SchemaDocument")]
pub struct Schema {
    pub entities: IndexMap<String, EntityDefinition>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub enums: IndexMap<String, Vec<String>>,

    pub compound_types: CompoundTypeRegistry,
}

/// On-disk shape; entity names default to their map key
#[derive(Debug, Deserialize)]
pub struct SchemaDocument {
    pub entities: IndexMap<String, EntityDefinition>,

    #[serde(default)]
    pub enums: IndexMap<String, Vec<String>>,

    #[serde(default)]
    pub compound_types: CompoundTypeRegistry,
}

impl From<SchemaDocument> for Schema {
    fn from(doc: SchemaDocument) -> Self {
        let mut schema = Schema::new();
        for (key, mut entity) in doc.entities {
            if entity.name.is_empty() {
                entity.name = key.clone();
            }
            schema.entities.insert(key, entity);
        }
        schema.enums = doc.enums;
        schema.compound_types.extend(doc.compound_types);
        schema
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

impl Schema {
    /// Empty schema with the standard compound types registered
    pub fn new() -> Self {
        Self {
            entities: IndexMap::new(),
            enums: IndexMap::new(),
            compound_types: CompoundTypeRegistry::standard(),
        }
    }

    /// Add an entity (builder style)
    pub fn with_entity(mut self, entity: EntityDefinition) -> Self {
        self.add_entity(entity);
        self
    }

    /// Register a named enum (builder style)
    pub fn with_enum<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enums
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Insert an entity keyed by its name, replacing any previous one
    pub fn add_entity(&mut self, entity: EntityDefinition) {
        self.entities.insert(entity.name.clone(), entity);
    }

    pub fn entity(&self, name: &str) -> Option<&EntityDefinition> {
        self.entities.get(name)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Declaration index of an entity, used for stable tie-breaking
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.entities.get_index_of(name)
    }

    /// Key type FK columns pointing at `entity_name` must use.
    ///
    /// Unknown entities and entities without a generated key fall back to
    /// `BigInt`.
    pub fn key_type_of(&self, entity_name: &str) -> KeyType {
        self.entity(entity_name)
            .and_then(|e| e.primary_key_strategy().key_type())
            .unwrap_or_default()
    }

    /// Table name for an entity, derived from the name string when the
    /// entity is not part of this schema
    pub fn table_name_for(&self, entity_name: &str) -> String {
        match self.entity(entity_name) {
            Some(entity) => entity.table_name(),
            None => naming::table_name(entity_name),
        }
    }

    pub fn enum_values(&self, name: &str) -> Option<&[String]> {
        self.enums.get(name).map(Vec::as_slice)
    }

    /// Explicit join entity declared for the unordered pair, if any
    pub fn explicit_pivot_for(&self, a: &str, b: &str) -> Option<&EntityDefinition> {
        self.entities.values().find(|e| e.is_pivot_for(a, b))
    }

    /// Every validation finding across the schema
    pub fn findings(&self) -> Vec<EngineError> {
        let mut findings = Vec::new();
        let mut tables: IndexMap<String, &str> = IndexMap::new();

        for (key, entity) in &self.entities {
            if key != &entity.name {
                findings.push(EngineError::entity_validation(
                    key,
                    format!("Entity is keyed as '{}' but named '{}'", key, entity.name),
                ));
            }

            findings.extend(entity.findings());

            let table = entity.table_name();
            if let Some(first) = tables.get(&table) {
                findings.push(EngineError::DuplicateTable {
                    table: table.clone(),
                    first: first.to_string(),
                    second: entity.name.clone(),
                });
            } else {
                tables.insert(table, &entity.name);
            }

            for (prop_name, prop) in &entity.properties {
                self.check_property(entity, prop_name, prop, &mut findings);
            }

            if let Some(pair) = &entity.options.pivot_for {
                for side in [&pair.0, &pair.1] {
                    if self.entity(side).is_none() {
                        findings.push(EngineError::entity_validation(
                            &entity.name,
                            format!("pivot_for references unknown entity '{}'", side),
                        ));
                    }
                }
            }

            let declared = entity
                .options
                .indexes
                .iter()
                .map(|i| &i.columns)
                .chain(entity.options.unique.iter());
            for columns in declared {
                for column in columns {
                    if entity.property(column).is_none() && !is_implicit_column(column) {
                        findings.push(EngineError::entity_validation(
                            &entity.name,
                            format!("Index references unknown property '{}'", column),
                        ));
                    }
                }
            }
        }

        findings
    }

    fn check_property(
        &self,
        entity: &EntityDefinition,
        prop_name: &str,
        prop: &PropertyDefinition,
        findings: &mut Vec<EngineError>,
    ) {
        match prop {
            PropertyDefinition::EnumRef(r) if !self.enums.contains_key(&r.enum_name) => {
                findings.push(EngineError::property_validation(
                    &entity.name,
                    prop_name,
                    format!("Unknown enum '{}'", r.enum_name),
                ));
            }
            PropertyDefinition::Compound(c) if !self.compound_types.contains(&c.type_name) => {
                findings.push(EngineError::property_validation(
                    &entity.name,
                    prop_name,
                    format!("Unknown compound type '{}'", c.type_name),
                ));
            }
            PropertyDefinition::Association(a) => {
                let targets: Vec<&str> = if a.relation == RelationKind::MorphTo {
                    a.morph_targets.iter().map(String::as_str).collect()
                } else {
                    vec![a.target.as_str()]
                };
                for target in targets {
                    if !target.is_empty() && self.entity(target).is_none() {
                        findings.push(EngineError::property_validation(
                            &entity.name,
                            prop_name,
                            format!("Association target '{}' is not defined", target),
                        ));
                    }
                }

                if let (Some(mapped_by), Some(target)) = (&a.mapped_by, self.entity(&a.target)) {
                    if target.property(mapped_by).is_none() {
                        findings.push(EngineError::property_validation(
                            &entity.name,
                            prop_name,
                            format!(
                                "mapped_by '{}' does not exist on '{}'",
                                mapped_by, target.name
                            ),
                        ));
                    }
                }
            }
            _ => {}
        }
    }
}

/// Columns the builder adds on its own and indexes may name directly
fn is_implicit_column(column: &str) -> bool {
    matches!(
        column,
        "id" | "created_at" | "updated_at" | "deleted_at"
    ) || column.ends_with("_id")
        || column.ends_with("_type")
}

impl Validatable for Schema {
    fn validate(&self) -> EngineResult<()> {
        match self.findings().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn validation_errors(&self) -> Vec<String> {
        self.findings().iter().map(ToString::to_string).collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityOptions;
    use crate::property::{Association, CompoundRef, EnumRefProperty, ScalarProperty};
    use migrata_core::PrimaryKeyStrategy;
    use pretty_assertions::assert_eq;

    fn blog() -> Schema {
        Schema::new()
            .with_entity(
                EntityDefinition::new("User")
                    .with_property("email", ScalarProperty::new("string").unique()),
            )
            .with_entity(
                EntityDefinition::new("Post")
                    .with_property("title", ScalarProperty::new("string"))
                    .with_property("author", Association::many_to_one("User")),
            )
    }

    #[test]
    fn test_schema_from_json_fills_names() {
        let schema: Schema = serde_json::from_str(
            r#"{"entities": {
                "User": {"properties": {"email": {"kind": "scalar", "type": "string"}}},
                "Post": {"options": {"primary_key": "uuid"}}
            }, "enums": {"status": ["draft", "published"]}}"#,
        )
        .unwrap();

        assert_eq!(schema.entity("User").unwrap().name, "User");
        assert_eq!(schema.position_of("Post"), Some(1));
        assert_eq!(schema.key_type_of("Post"), KeyType::Uuid);
        assert_eq!(
            schema.enum_values("status"),
            Some(&["draft".to_string(), "published".to_string()][..])
        );
        assert!(schema.compound_types.contains("money"));
    }

    #[test]
    fn test_key_type_of_unknown_defaults_to_bigint() {
        let schema = blog();
        assert_eq!(schema.key_type_of("User"), KeyType::BigInt);
        assert_eq!(schema.key_type_of("Ghost"), KeyType::BigInt);
    }

    #[test]
    fn test_table_name_for_unknown_entity() {
        let schema = blog();
        assert_eq!(schema.table_name_for("Post"), "posts");
        assert_eq!(schema.table_name_for("BlogCategory"), "blog_categories");
    }

    #[test]
    fn test_valid_schema() {
        let schema = blog();
        assert!(schema.is_valid());
        assert!(schema.validation_errors().is_empty());
    }

    #[test]
    fn test_findings_are_collected() {
        let schema = blog()
            .with_entity(
                EntityDefinition::new("Member")
                    .with_options(EntityOptions::default().with_table("users"))
                    .with_property("profile", Association::many_to_one("Profile"))
                    .with_property("status", EnumRefProperty::new("member_status"))
                    .with_property("wallet", CompoundRef::new("crypto")),
            )
            .with_entity(
                EntityDefinition::new("Comment")
                    .with_options(
                        EntityOptions::default().with_primary_key(PrimaryKeyStrategy::Uuid),
                    )
                    .with_property(
                        "post",
                        Association::many_to_one("Post").mapped_by("comments"),
                    ),
            );

        let errors = schema.validation_errors();
        assert_eq!(errors.len(), 5);
        assert!(errors[0].contains("Duplicate table name 'users'"));
        assert!(errors[1].contains("'Profile' is not defined"));
        assert!(errors[2].contains("Unknown enum 'member_status'"));
        assert!(errors[3].contains("Unknown compound type 'crypto'"));
        assert!(errors[4].contains("mapped_by 'comments'"));
    }

    #[test]
    fn test_explicit_pivot_lookup() {
        let schema = blog().with_entity(
            EntityDefinition::new("Authorship")
                .with_options(EntityOptions::default().pivot_for("Post", "User")),
        );
        assert_eq!(
            schema.explicit_pivot_for("User", "Post").map(|e| e.name.as_str()),
            Some("Authorship")
        );
        assert!(schema.explicit_pivot_for("User", "Tag").is_none());
    }
}
