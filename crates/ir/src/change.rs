//! Change records for incremental migrations
//!
//! A `SchemaChange` describes the delta between two versions of one
//! entity. It is produced by an external schema-diffing tool and consumed
//! once by the diff engine; nothing here mutates it.

use crate::entity::{EntityDefinition, IndexDefinition};
use crate::property::PropertyDefinition;
use migrata_core::PrimaryKeyStrategy;
use serde::{Deserialize, Serialize};

// ============================================================================
// SchemaChange
// ============================================================================

/// Per-entity change record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaChange {
    pub entity: String,

    /// Table the change applies to; derived from the entity when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ColumnChange>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<IndexChange>,

    #[serde(default)]
    pub options: OptionChanges,
}

impl SchemaChange {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            table: None,
            columns: Vec::new(),
            indexes: Vec::new(),
            options: OptionChanges::default(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn with_column(mut self, change: ColumnChange) -> Self {
        self.columns.push(change);
        self
    }

    pub fn with_index(mut self, change: IndexChange) -> Self {
        self.indexes.push(change);
        self
    }

    pub fn with_options(mut self, options: OptionChanges) -> Self {
        self.options = options;
        self
    }

    /// True when the record carries no column, index or option delta
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.indexes.is_empty() && !self.options.has_transition()
    }
}

// ============================================================================
// Column & Index Changes
// ============================================================================

/// One column-level delta, tagged by `change`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum ColumnChange {
    Added {
        name: String,
        current: PropertyDefinition,
    },
    Removed {
        name: String,
        previous: PropertyDefinition,
    },
    Modified {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        previous: Option<PropertyDefinition>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        current: Option<PropertyDefinition>,
    },
    Renamed {
        from: String,
        to: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        previous: Option<PropertyDefinition>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        current: Option<PropertyDefinition>,
    },
}

impl ColumnChange {
    pub fn added(name: impl Into<String>, current: impl Into<PropertyDefinition>) -> Self {
        ColumnChange::Added {
            name: name.into(),
            current: current.into(),
        }
    }

    pub fn removed(name: impl Into<String>, previous: impl Into<PropertyDefinition>) -> Self {
        ColumnChange::Removed {
            name: name.into(),
            previous: previous.into(),
        }
    }

    pub fn modified(
        name: impl Into<String>,
        previous: impl Into<PropertyDefinition>,
        current: impl Into<PropertyDefinition>,
    ) -> Self {
        ColumnChange::Modified {
            name: name.into(),
            previous: Some(previous.into()),
            current: Some(current.into()),
        }
    }

    pub fn renamed(from: impl Into<String>, to: impl Into<String>) -> Self {
        ColumnChange::Renamed {
            from: from.into(),
            to: to.into(),
            previous: None,
            current: None,
        }
    }

    /// Property name after the change
    pub fn name(&self) -> &str {
        match self {
            ColumnChange::Added { name, .. }
            | ColumnChange::Removed { name, .. }
            | ColumnChange::Modified { name, .. } => name,
            ColumnChange::Renamed { to, .. } => to,
        }
    }
}

/// Index added to or removed from the entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum IndexChange {
    Added { index: IndexDefinition },
    Removed { index: IndexDefinition },
}

// ============================================================================
// Option Changes
// ============================================================================

/// Before/after pair for a table-level option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition<T> {
    pub from: T,
    pub to: T,
}

impl<T: PartialEq> Transition<T> {
    pub fn new(from: T, to: T) -> Self {
        Self { from, to }
    }

    /// Whether the value actually changes
    pub fn is_change(&self) -> bool {
        self.from != self.to
    }
}

/// Table-level option deltas
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<Transition<bool>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_delete: Option<Transition<bool>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<Transition<PrimaryKeyStrategy>>,
}

impl OptionChanges {
    /// True when at least one option really transitions
    pub fn has_transition(&self) -> bool {
        self.timestamps.is_some_and(|t| t.is_change())
            || self.soft_delete.is_some_and(|t| t.is_change())
            || self.primary_key.is_some_and(|t| t.is_change())
    }
}

// ============================================================================
// ChangeSet
// ============================================================================

/// A batch of changes as written by the schema-diffing tool
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeSet {
    pub changes: Vec<SchemaChange>,

    /// Definitions of entities removed from the schema
    pub removed: Vec<EntityDefinition>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.removed.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
