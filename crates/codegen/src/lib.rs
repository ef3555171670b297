//! # Migrata Codegen
//!
//! The engines that turn a [`Schema`](migrata_ir::Schema) into migration
//! structure.
//!
//! ## Features
//!
//! - **Blueprint Builder**: one entity to one fully resolved table blueprint
//! - **Relationship Extractor**: derived many-to-many and polymorphic pivots
//! - **Ordering Engine**: dependency-ordered tables with synthetic timestamps
//! - **Diff Engine**: forward/backward operation lists for schema changes
//!
//! Everything here is a pure transformation. Rendering the operations to a
//! target language and writing files is left to callers.

// ============================================================================
// Modules
// ============================================================================

pub mod blueprint;
pub mod context;
pub mod diff;
pub mod generator;
pub mod ordering;
pub mod relations;

// ============================================================================
// Re-exports
// ============================================================================

pub use blueprint::{
    BlueprintBuilder, Column, ColumnArgs, ColumnMethod, ForeignKey, Index, Modifier,
    TableBlueprint,
};
pub use context::BuildContext;
pub use diff::{ChangeOperations, DiffEngine, Operation};
pub use generator::{DiffKind, DiffMigration, Generator, MigrationPlan};
pub use ordering::{
    DependencyEdge, MigrationTimestamp, OrderedTable, PlannedTable, TableKind, collect_edges,
    order_tables,
};
pub use relations::{
    OWNERSHIP_RULES, OwnershipQuery, OwnershipRule, PivotTableInfo, PolymorphicPivotInfo,
    extract_many_to_many, extract_morph_to_many, resolve_ownership,
};

use migrata_core::{EngineError, EngineResult, Validatable};
use serde::{Deserialize, Serialize};

// ============================================================================
// GeneratorConfig
// ============================================================================

/// Configuration for the generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Preferred locale for column comments
    pub locale: String,

    /// Locale tried when the preferred one is missing
    pub fallback_locale: String,

    /// Fixed base for migration timestamps; current minute when unset
    pub base_timestamp: Option<MigrationTimestamp>,

    /// Length of string columns declared without one
    pub default_string_length: u32,

    /// Whether to attach display names as column comments
    pub include_comments: bool,

    /// Whether derived many-to-many pivots carry timestamps
    pub pivot_timestamps: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            fallback_locale: "en".to_string(),
            base_timestamp: None,
            default_string_length: 255,
            include_comments: true,
            pivot_timestamps: true,
        }
    }
}

impl GeneratorConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the comment locale
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Set the fallback locale
    pub fn with_fallback_locale(mut self, locale: impl Into<String>) -> Self {
        self.fallback_locale = locale.into();
        self
    }

    /// Pin the base timestamp for reproducible output
    pub fn with_base_timestamp(mut self, timestamp: MigrationTimestamp) -> Self {
        self.base_timestamp = Some(timestamp);
        self
    }

    pub fn with_default_string_length(mut self, length: u32) -> Self {
        self.default_string_length = length;
        self
    }

    /// Disable column comments
    pub fn without_comments(mut self) -> Self {
        self.include_comments = false;
        self
    }

    /// Derived pivots without `created_at`/`updated_at`
    pub fn without_pivot_timestamps(mut self) -> Self {
        self.pivot_timestamps = false;
        self
    }
}

impl Validatable for GeneratorConfig {
    fn validate(&self) -> EngineResult<()> {
        if self.default_string_length == 0 {
            return Err(EngineError::config("default_string_length must be positive"));
        }
        if self.locale.trim().is_empty() || self.fallback_locale.trim().is_empty() {
            return Err(EngineError::config("locale cannot be empty"));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
