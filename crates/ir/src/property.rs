//! Property definitions for entities
//!
//! A property is one of five kinds: a plain scalar, an inline enum, a
//! reference to a named enum, an association to another entity, or a
//! compound type that expands into several physical columns. The kinds are
//! modelled as a tagged union so every consumer matches them exhaustively.

use indexmap::IndexMap;
use migrata_core::{DefaultValue, LocalizedText, ReferentialAction, RelationKind};
use serde::{Deserialize, Serialize};

// ============================================================================
// PropertyDefinition
// ============================================================================

/// A single entity property, tagged by `kind` in the schema document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropertyDefinition {
    Scalar(ScalarProperty),
    Enum(EnumProperty),
    EnumRef(EnumRefProperty),
    Association(Association),
    Compound(CompoundRef),
}

impl PropertyDefinition {
    /// Shorthand for a scalar of the given type
    pub fn scalar(type_name: impl Into<String>) -> Self {
        PropertyDefinition::Scalar(ScalarProperty::new(type_name))
    }

    /// Localizable display name, if declared
    pub fn display_name(&self) -> Option<&LocalizedText> {
        match self {
            PropertyDefinition::Scalar(p) => p.display_name.as_ref(),
            PropertyDefinition::Enum(p) => p.display_name.as_ref(),
            PropertyDefinition::EnumRef(p) => p.display_name.as_ref(),
            PropertyDefinition::Association(p) => p.display_name.as_ref(),
            PropertyDefinition::Compound(p) => p.display_name.as_ref(),
        }
    }

    /// Get the association payload, if this is an association
    pub fn as_association(&self) -> Option<&Association> {
        match self {
            PropertyDefinition::Association(a) => Some(a),
            _ => None,
        }
    }

    /// Check if this property is an association
    pub fn is_association(&self) -> bool {
        self.as_association().is_some()
    }

    /// Whether the property is declared as (part of) the primary key
    pub fn is_primary(&self) -> bool {
        match self {
            PropertyDefinition::Scalar(p) => p.primary,
            PropertyDefinition::Association(a) => a.primary,
            _ => false,
        }
    }
}

impl From<ScalarProperty> for PropertyDefinition {
    fn from(p: ScalarProperty) -> Self {
        PropertyDefinition::Scalar(p)
    }
}

impl From<EnumProperty> for PropertyDefinition {
    fn from(p: EnumProperty) -> Self {
        PropertyDefinition::Enum(p)
    }
}

impl From<EnumRefProperty> for PropertyDefinition {
    fn from(p: EnumRefProperty) -> Self {
        PropertyDefinition::EnumRef(p)
    }
}

impl From<Association> for PropertyDefinition {
    fn from(p: Association) -> Self {
        PropertyDefinition::Association(p)
    }
}

impl From<CompoundRef> for PropertyDefinition {
    fn from(p: CompoundRef) -> Self {
        PropertyDefinition::Compound(p)
    }
}

// ============================================================================
// Scalar
// ============================================================================

/// A plain typed value. `type_name` is an open vocabulary; unknown names
/// degrade to a string column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarProperty {
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,

    #[serde(default)]
    pub nullable: bool,

    #[serde(default)]
    pub unique: bool,

    /// Request a plain single-column index
    #[serde(default)]
    pub index: bool,

    /// Part of the primary key (used when the entity has no generated key)
    #[serde(default)]
    pub primary: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unsigned: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<LocalizedText>,
}

impl ScalarProperty {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            length: None,
            precision: None,
            scale: None,
            nullable: false,
            unique: false,
            index: false,
            primary: false,
            default: None,
            unsigned: None,
            display_name: None,
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

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn indexed(mut self) -> Self {
        self.index = true;
        self
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    pub fn unsigned(mut self) -> Self {
        self.unsigned = Some(true);
        self
    }

    pub fn with_default(mut self, default: impl Into<DefaultValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<LocalizedText>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Inline enumeration with its allowed values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumProperty {
    pub values: Vec<String>,

    #[serde(default)]
    pub nullable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<LocalizedText>,
}

impl EnumProperty {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            nullable: false,
            default: None,
            display_name: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<DefaultValue>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Reference to an enum declared in the schema's enum registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumRefProperty {
    #[serde(rename = "enum")]
    pub enum_name: String,

    #[serde(default)]
    pub nullable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<LocalizedText>,
}

impl EnumRefProperty {
    pub fn new(enum_name: impl Into<String>) -> Self {
        Self {
            enum_name: enum_name.into(),
            nullable: false,
            default: None,
            display_name: None,
        }
    }
}

// ============================================================================
// Association
// ============================================================================

/// A relationship from the declaring entity to `target`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    pub relation: RelationKind,

    /// Target entity name. Optional only for `morph_to`, whose targets are
    /// listed in `morph_targets` or discovered.
    #[serde(default)]
    pub target: String,

    /// Set on the inverse side; names the owning property on the target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_by: Option<String>,

    /// Set on the owning side; names the inverse property on the target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inversed_by: Option<String>,

    /// Explicit join table name for many-to-many relations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_table: Option<String>,

    /// Polymorphic relation name (e.g. "taggable", "commentable")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morph_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<ReferentialAction>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<ReferentialAction>,

    /// `None` means NOT NULL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    /// Explicit ownership flag; overrides every ownership heuristic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owning: Option<bool>,

    /// The FK column is part of a composite primary key
    #[serde(default)]
    pub primary: bool,

    /// Extra columns carried by a derived many-to-many join table
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub pivot_fields: IndexMap<String, PropertyDefinition>,

    /// Entity names a `morph_to` association may point at
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub morph_targets: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<LocalizedText>,
}

impl Association {
    pub fn new(relation: RelationKind, target: impl Into<String>) -> Self {
        Self {
            relation,
            target: target.into(),
            mapped_by: None,
            inversed_by: None,
            join_table: None,
            morph_name: None,
            on_delete: None,
            on_update: None,
            nullable: None,
            owning: None,
            primary: false,
            pivot_fields: IndexMap::new(),
            morph_targets: Vec::new(),
            display_name: None,
        }
    }

    pub fn many_to_one(target: impl Into<String>) -> Self {
        Self::new(RelationKind::ManyToOne, target)
    }

    pub fn one_to_many(target: impl Into<String>) -> Self {
        Self::new(RelationKind::OneToMany, target)
    }

    pub fn many_to_many(target: impl Into<String>) -> Self {
        Self::new(RelationKind::ManyToMany, target)
    }

    pub fn morph_to<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut assoc = Self::new(RelationKind::MorphTo, "");
        assoc.morph_targets = targets.into_iter().map(Into::into).collect();
        assoc
    }

    pub fn mapped_by(mut self, property: impl Into<String>) -> Self {
        self.mapped_by = Some(property.into());
        self
    }

    pub fn inversed_by(mut self, property: impl Into<String>) -> Self {
        self.inversed_by = Some(property.into());
        self
    }

    pub fn with_join_table(mut self, table: impl Into<String>) -> Self {
        self.join_table = Some(table.into());
        self
    }

    pub fn with_morph_name(mut self, name: impl Into<String>) -> Self {
        self.morph_name = Some(name.into());
        self
    }

    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = Some(action);
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    pub fn owning(mut self, owning: bool) -> Self {
        self.owning = Some(owning);
        self
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    pub fn with_pivot_field(
        mut self,
        name: impl Into<String>,
        property: impl Into<PropertyDefinition>,
    ) -> Self {
        self.pivot_fields.insert(name.into(), property.into());
        self
    }

    /// Inverse side: never materializes a column or join table
    pub fn is_inverse(&self) -> bool {
        self.mapped_by.is_some()
    }

    /// Owning to-one side that carries a FK column
    pub fn materializes_column(&self) -> bool {
        self.relation.is_to_one() && !self.is_inverse()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable.unwrap_or(false)
    }
}

// ============================================================================
// Compound
// ============================================================================

/// Reference to a compound type; expands into one column per type field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundRef {
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default)]
    pub nullable: bool,

    /// Per-field overrides keyed by field suffix
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub field_overrides: IndexMap<String, FieldOverride>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<LocalizedText>,
}

impl CompoundRef {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            nullable: false,
            field_overrides: IndexMap::new(),
            display_name: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_override(mut self, suffix: impl Into<String>, field: FieldOverride) -> Self {
        self.field_overrides.insert(suffix.into(), field);
        self
    }
}

/// Field-level override inside a compound expansion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOverride {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
}

// ============================================================================
// Tests
// ============================================================================
