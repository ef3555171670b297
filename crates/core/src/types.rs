//! Core types used throughout Migrata
//!
//! This module contains the shared vocabulary of the schema compiler: key
//! strategies, relation kinds, referential actions, default values and
//! localizable display text. The IR and code generation crates build on it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ============================================================================
// Primary Key Strategies
// ============================================================================

/// How an entity's primary key is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryKeyStrategy {
    /// Auto-incrementing 32-bit integer
    #[serde(alias = "int", alias = "increments")]
    AutoIncrementInt,
    /// Auto-incrementing 64-bit integer
    #[default]
    #[serde(alias = "bigint", alias = "big_increments")]
    AutoIncrementBigInt,
    /// UUID string key
    Uuid,
    /// Caller-assigned string key
    String,
    /// No generated key; primary properties (if any) form the key
    None,
}

impl PrimaryKeyStrategy {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            PrimaryKeyStrategy::AutoIncrementInt => "Auto-increment (32-bit)",
            PrimaryKeyStrategy::AutoIncrementBigInt => "Auto-increment (64-bit)",
            PrimaryKeyStrategy::Uuid => "UUID",
            PrimaryKeyStrategy::String => "String",
            PrimaryKeyStrategy::None => "None",
        }
    }

    /// The key type foreign keys pointing at this entity must use.
    ///
    /// Returns `None` for entities without a generated key.
    pub fn key_type(&self) -> Option<KeyType> {
        match self {
            PrimaryKeyStrategy::AutoIncrementInt => Some(KeyType::Int),
            PrimaryKeyStrategy::AutoIncrementBigInt => Some(KeyType::BigInt),
            PrimaryKeyStrategy::Uuid => Some(KeyType::Uuid),
            PrimaryKeyStrategy::String => Some(KeyType::String),
            PrimaryKeyStrategy::None => None,
        }
    }

    /// Whether the key is stored as a string (UUID or explicit string)
    pub fn is_string_family(&self) -> bool {
        matches!(self, PrimaryKeyStrategy::Uuid | PrimaryKeyStrategy::String)
    }
}

impl std::fmt::Display for PrimaryKeyStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Key Types
// ============================================================================

/// Storage family of a referenced primary key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KeyType {
    Int,
    #[default]
    BigInt,
    Uuid,
    String,
}

impl KeyType {
    /// Whether values of this key are strings
    pub fn is_string_family(&self) -> bool {
        matches!(self, KeyType::Uuid | KeyType::String)
    }
}

// ============================================================================
// Relation Kinds
// ============================================================================

/// Association kinds an entity property can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    ManyToOne,
    OneToOne,
    OneToMany,
    ManyToMany,
    MorphTo,
    MorphOne,
    MorphMany,
    MorphToMany,
}

impl RelationKind {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            RelationKind::ManyToOne => "Many to One",
            RelationKind::OneToOne => "One to One",
            RelationKind::OneToMany => "One to Many",
            RelationKind::ManyToMany => "Many to Many",
            RelationKind::MorphTo => "Morph To",
            RelationKind::MorphOne => "Morph One",
            RelationKind::MorphMany => "Morph Many",
            RelationKind::MorphToMany => "Morph to Many",
        }
    }

    /// Kinds whose owning side carries a foreign-key column
    pub fn is_to_one(&self) -> bool {
        matches!(self, RelationKind::ManyToOne | RelationKind::OneToOne)
    }

    /// Kinds that need a join table
    pub fn requires_join_table(&self) -> bool {
        matches!(self, RelationKind::ManyToMany | RelationKind::MorphToMany)
    }

    /// Kinds whose target type is decided per row
    pub fn is_polymorphic(&self) -> bool {
        matches!(
            self,
            RelationKind::MorphTo
                | RelationKind::MorphOne
                | RelationKind::MorphMany
                | RelationKind::MorphToMany
        )
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Referential Actions
// ============================================================================

/// Actions for foreign key constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReferentialAction {
    /// Delete related records when parent is deleted
    Cascade,
    /// Set foreign key to NULL when parent is deleted
    SetNull,
    /// Prevent deletion if related records exist
    #[default]
    Restrict,
    /// Do nothing (database default)
    NoAction,
    /// Set to default value
    SetDefault,
}

impl ReferentialAction {
    /// Storage-engine keyword for the action
    pub fn keyword(&self) -> &'static str {
        match self {
            ReferentialAction::Cascade => "cascade",
            ReferentialAction::SetNull => "set null",
            ReferentialAction::Restrict => "restrict",
            ReferentialAction::NoAction => "no action",
            ReferentialAction::SetDefault => "set default",
        }
    }
}

impl std::fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

// ============================================================================
// Default Values
// ============================================================================

/// Column default, kept in its native value type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl DefaultValue {
    /// Check if null
    pub fn is_null(&self) -> bool {
        matches!(self, DefaultValue::Null)
    }
}

impl std::fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefaultValue::Null => write!(f, "null"),
            DefaultValue::Bool(v) => write!(f, "{}", v),
            DefaultValue::Int(v) => write!(f, "{}", v),
            DefaultValue::Float(v) => write!(f, "{}", v),
            DefaultValue::String(v) => write!(f, "{:?}", v),
        }
    }
}

impl From<bool> for DefaultValue {
    fn from(v: bool) -> Self {
        DefaultValue::Bool(v)
    }
}

impl From<i64> for DefaultValue {
    fn from(v: i64) -> Self {
        DefaultValue::Int(v)
    }
}

impl From<f64> for DefaultValue {
    fn from(v: f64) -> Self {
        DefaultValue::Float(v)
    }
}

impl From<&str> for DefaultValue {
    fn from(v: &str) -> Self {
        DefaultValue::String(v.to_string())
    }
}

// ============================================================================
// Localized Text
// ============================================================================

/// Display text given either as a plain string or as a locale → text map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    Localized(IndexMap<String, String>),
}

impl LocalizedText {
    /// Look up the text for an exact locale
    pub fn get(&self, locale: &str) -> Option<&str> {
        match self {
            LocalizedText::Plain(_) => None,
            LocalizedText::Localized(map) => map.get(locale).map(String::as_str),
        }
    }

    /// Check if there is no usable text
    pub fn is_empty(&self) -> bool {
        match self {
            LocalizedText::Plain(s) => s.is_empty(),
            LocalizedText::Localized(map) => map.values().all(|v| v.is_empty()),
        }
    }
}

impl From<&str> for LocalizedText {
    fn from(v: &str) -> Self {
        LocalizedText::Plain(v.to_string())
    }
}

impl From<String> for LocalizedText {
    fn from(v: String) -> Self {
        LocalizedText::Plain(v)
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
    fn test_primary_key_strategy_key_type() {
        assert_eq!(
            PrimaryKeyStrategy::AutoIncrementInt.key_type(),
            Some(KeyType::Int)
        );
        assert_eq!(
            PrimaryKeyStrategy::AutoIncrementBigInt.key_type(),
            Some(KeyType::BigInt)
        );
        assert_eq!(PrimaryKeyStrategy::Uuid.key_type(), Some(KeyType::Uuid));
        assert_eq!(PrimaryKeyStrategy::None.key_type(), None);
        assert_eq!(
            PrimaryKeyStrategy::default(),
            PrimaryKeyStrategy::AutoIncrementBigInt
        );
    }

    #[test]
    fn test_primary_key_strategy_serde_aliases() {
        let strategy: PrimaryKeyStrategy = serde_json::from_str("\"bigint\"").unwrap();
        assert_eq!(strategy, PrimaryKeyStrategy::AutoIncrementBigInt);
        let strategy: PrimaryKeyStrategy = serde_json::from_str("\"uuid\"").unwrap();
        assert_eq!(strategy, PrimaryKeyStrategy::Uuid);
        assert!(strategy.is_string_family());
    }

    #[test]
    fn test_relation_kind() {
        assert!(RelationKind::ManyToOne.is_to_one());
        assert!(RelationKind::OneToOne.is_to_one());
        assert!(!RelationKind::OneToMany.is_to_one());
        assert!(RelationKind::MorphToMany.requires_join_table());
        assert!(RelationKind::MorphTo.is_polymorphic());
        assert_eq!(RelationKind::ManyToMany.display_name(), "Many to Many");

        let kind: RelationKind = serde_json::from_str("\"morph_to_many\"").unwrap();
        assert_eq!(kind, RelationKind::MorphToMany);
    }

    #[test]
    fn test_referential_action() {
        assert_eq!(ReferentialAction::default(), ReferentialAction::Restrict);
        assert_eq!(ReferentialAction::SetNull.keyword(), "set null");
        assert_eq!(ReferentialAction::Cascade.to_string(), "cascade");
    }

    #[test]
    fn test_default_value_keeps_native_type() {
        let v: DefaultValue = serde_json::from_str("0").unwrap();
        assert_eq!(v, DefaultValue::Int(0));
        let v: DefaultValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, DefaultValue::Bool(true));
        let v: DefaultValue = serde_json::from_str("1.5").unwrap();
        assert_eq!(v, DefaultValue::Float(1.5));
        let v: DefaultValue = serde_json::from_str("\"draft\"").unwrap();
        assert_eq!(v, DefaultValue::String("draft".to_string()));
        let v: DefaultValue = serde_json::from_str("null").unwrap();
        assert!(v.is_null());
    }

    #[test]
    fn test_localized_text() {
        let text: LocalizedText = serde_json::from_str(r#"{"en": "Title", "ja": "タイトル"}"#).unwrap();
        assert_eq!(text.get("ja"), Some("タイトル"));
        assert_eq!(text.get("fr"), None);

        let plain: LocalizedText = serde_json::from_str("\"Title\"").unwrap();
        assert_eq!(plain, LocalizedText::Plain("Title".to_string()));
        assert!(!plain.is_empty());
    }
}
