//! Compound type registry
//!
//! A compound type turns one logical property into several physical
//! columns named `{property}_{suffix}`. The registry is read-only input to
//! the blueprint builder.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One physical column of a compound type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundField {
    pub suffix: String,

    /// Scalar type name, mapped through the same type table as scalars
    #[serde(rename = "type")]
    pub sql_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,

    /// Field default nullability; falls back to the parent property's
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    /// Enum registry name; the column becomes an enum over its values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_ref: Option<String>,
}

impl CompoundField {
    pub fn new(suffix: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            sql_type: sql_type.into(),
            length: None,
            precision: None,
            scale: None,
            nullable: None,
            enum_ref: None,
        }
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_precision(mut self, precision: u32, scale: u32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    pub fn with_enum_ref(mut self, enum_name: impl Into<String>) -> Self {
        self.enum_ref = Some(enum_name.into());
        self
    }
}

/// Ordered field list of a compound type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundType {
    pub fields: Vec<CompoundField>,
}

impl CompoundType {
    pub fn new(fields: Vec<CompoundField>) -> Self {
        Self { fields }
    }

    pub fn field(&self, suffix: &str) -> Option<&CompoundField> {
        self.fields.iter().find(|f| f.suffix == suffix)
    }
}

/// Compound type name → expansion rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompoundTypeRegistry {
    types: IndexMap<String, CompoundType>,
}

impl CompoundTypeRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with `money` and `address`
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(
            "money",
            CompoundType::new(vec![
                CompoundField::new("amount", "decimal").with_precision(15, 2),
                CompoundField::new("currency", "char").with_length(3),
            ]),
        );
        registry.register(
            "address",
            CompoundType::new(vec![
                CompoundField::new("postal_code", "string").with_length(16),
                CompoundField::new("region", "string"),
                CompoundField::new("locality", "string"),
                CompoundField::new("street", "string"),
                CompoundField::new("building", "string").nullable(true),
            ]),
        );
        registry
    }

    /// Register a type, replacing any existing one with the same name
    pub fn register(&mut self, name: impl Into<String>, compound: CompoundType) {
        self.types.insert(name.into(), compound);
    }

    /// Merge another registry in; its entries win on conflict
    pub fn extend(&mut self, other: CompoundTypeRegistry) {
        self.types.extend(other.types);
    }

    pub fn get(&self, name: &str) -> Option<&CompoundType> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_standard_registry() {
        let registry = CompoundTypeRegistry::standard();
        assert!(registry.contains("money"));
        assert!(registry.contains("address"));

        let money = registry.get("money").unwrap();
        let amount = money.field("amount").unwrap();
        assert_eq!(amount.sql_type, "decimal");
        assert_eq!((amount.precision, amount.scale), (Some(15), Some(2)));
        assert_eq!(money.field("currency").unwrap().length, Some(3));

        let suffixes: Vec<&str> = registry
            .get("address")
            .unwrap()
            .fields
            .iter()
            .map(|f| f.suffix.as_str())
            .collect();
        assert_eq!(
            suffixes,
            vec!["postal_code", "region", "locality", "street", "building"]
        );
    }

    #[test]
    fn test_extend_overrides_standard() {
        let mut registry = CompoundTypeRegistry::standard();
        let custom: CompoundTypeRegistry = serde_json::from_str(
            r#"{"money": {"fields": [{"suffix": "cents", "type": "bigint"}]},
                "name": {"fields": [{"suffix": "first", "type": "string"},
                                    {"suffix": "last", "type": "string"}]}}"#,
        )
        .unwrap();
        registry.extend(custom);

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get("money").unwrap().fields.len(), 1);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["money", "address", "name"]);
    }
}
