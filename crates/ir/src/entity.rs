//! Entity definitions
//!
//! This module contains `EntityDefinition`, one named data structure that
//! maps to one physical table, and its table-level `EntityOptions`.

use crate::naming;
use crate::property::{Association, PropertyDefinition};
use indexmap::IndexMap;
use migrata_core::{
    EngineError, EngineResult, LocalizedText, PrimaryKeyStrategy, RelationKind, Validatable,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// EntityDefinition
// ============================================================================

/// A named entity with its properties in declaration order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDefinition {
    /// Entity name (PascalCase, e.g. "User", "BlogPost")
    #[serde(default)]
    pub name: String,

    /// Properties keyed by name; order drives column order
    #[serde(default)]
    pub properties: IndexMap<String, PropertyDefinition>,

    #[serde(default)]
    pub options: EntityOptions,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<LocalizedText>,
}

impl EntityDefinition {
    /// Create a new entity with default options
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: IndexMap::new(),
            options: EntityOptions::default(),
            display_name: None,
        }
    }

    /// Add a property (builder style)
    pub fn with_property(
        mut self,
        name: impl Into<String>,
        property: impl Into<PropertyDefinition>,
    ) -> Self {
        self.properties.insert(name.into(), property.into());
        self
    }

    /// Replace the options (builder style)
    pub fn with_options(mut self, options: EntityOptions) -> Self {
        self.options = options;
        self
    }

    /// Physical table name: explicit option, else snake plural of the name
    pub fn table_name(&self) -> String {
        match &self.options.table {
            Some(table) if !table.is_empty() => table.clone(),
            _ => naming::table_name(&self.name),
        }
    }

    pub fn primary_key_strategy(&self) -> PrimaryKeyStrategy {
        self.options.primary_key
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDefinition> {
        self.properties.get(name)
    }

    /// Iterate over association properties in declaration order
    pub fn associations(&self) -> impl Iterator<Item = (&str, &Association)> {
        self.properties
            .iter()
            .filter_map(|(name, prop)| prop.as_association().map(|a| (name.as_str(), a)))
    }

    /// Names of properties flagged as primary, in declaration order
    pub fn primary_properties(&self) -> Vec<&str> {
        self.properties
            .iter()
            .filter(|(_, prop)| prop.is_primary())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Whether this entity is an explicit join entity for the given pair
    pub fn is_pivot_for(&self, a: &str, b: &str) -> bool {
        self.options
            .pivot_for
            .as_ref()
            .is_some_and(|pair| pair.matches(a, b))
    }

    /// Every validation finding for this entity, in property order
    pub fn findings(&self) -> Vec<EngineError> {
        let mut findings = Vec::new();

        if self.name.is_empty() {
            findings.push(EngineError::entity_validation(
                &self.name,
                "Entity name cannot be empty",
            ));
            return findings;
        }
        if !is_valid_identifier(&self.name) {
            findings.push(EngineError::entity_validation(
                &self.name,
                format!("Entity name '{}' is not a valid identifier", self.name),
            ));
        }

        for (name, prop) in &self.properties {
            match prop {
                PropertyDefinition::Scalar(s) if s.type_name.is_empty() => {
                    findings.push(EngineError::property_validation(
                        &self.name,
                        name,
                        "Scalar type cannot be empty",
                    ));
                }
                PropertyDefinition::Enum(e) if e.values.is_empty() => {
                    findings.push(EngineError::property_validation(
                        &self.name,
                        name,
                        "Enum must declare at least one value",
                    ));
                }
                PropertyDefinition::Association(a)
                    if a.target.is_empty() && a.relation != RelationKind::MorphTo =>
                {
                    findings.push(EngineError::property_validation(
                        &self.name,
                        name,
                        "Association target cannot be empty",
                    ));
                }
                PropertyDefinition::Association(a) if a.mapped_by.is_some() && a.owning == Some(true) => {
                    findings.push(EngineError::property_validation(
                        &self.name,
                        name,
                        "Association cannot be both owning and mapped_by",
                    ));
                }
                _ => {}
            }
        }

        if self.options.primary_key == PrimaryKeyStrategy::None
            && self.primary_properties().is_empty()
        {
            findings.push(EngineError::entity_validation(
                &self.name,
                "Entity has no generated key and no primary properties",
            ));
        }

        findings
    }
}

impl Validatable for EntityDefinition {
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
// EntityOptions
// ============================================================================

/// Table-level options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityOptions {
    /// Explicit table name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    pub primary_key: PrimaryKeyStrategy,

    /// Add created_at/updated_at columns
    pub timestamps: bool,

    /// Add a deleted_at column
    pub soft_delete: bool,

    /// Custom indexes, declared by property name
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<IndexDefinition>,

    /// Custom unique constraints, declared by property name
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unique: Vec<Vec<String>>,

    /// Hidden from generated application surfaces; still gets a table
    pub hidden: bool,

    /// Marks this entity as the explicit join entity for a pair
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pivot_for: Option<PivotFor>,
}

impl Default for EntityOptions {
    fn default() -> Self {
        Self {
            table: None,
            primary_key: PrimaryKeyStrategy::default(),
            timestamps: true,
            soft_delete: false,
            indexes: Vec::new(),
            unique: Vec::new(),
            hidden: false,
            pivot_for: None,
        }
    }
}

impl EntityOptions {
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn with_primary_key(mut self, strategy: PrimaryKeyStrategy) -> Self {
        self.primary_key = strategy;
        self
    }

    pub fn without_timestamps(mut self) -> Self {
        self.timestamps = false;
        self
    }

    pub fn with_soft_delete(mut self) -> Self {
        self.soft_delete = true;
        self
    }

    pub fn with_index(mut self, index: IndexDefinition) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn with_unique<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unique
            .push(properties.into_iter().map(Into::into).collect());
        self
    }

    pub fn pivot_for(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.pivot_for = Some(PivotFor(left.into(), right.into()));
        self
    }
}

/// A custom index over property names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub columns: Vec<String>,

    #[serde(default)]
    pub unique: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl IndexDefinition {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
            name: None,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Entity pair an explicit join entity stands for (`["Branch", "User"]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotFor(pub String, pub String);

impl PivotFor {
    /// Unordered pair comparison
    pub fn matches(&self, a: &str, b: &str) -> bool {
        (self.0 == a && self.1 == b) || (self.0 == b && self.1 == a)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Check if a string is a valid identifier
fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

// ============================================================================
// Tests
// ============================================================================
