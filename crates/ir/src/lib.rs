//! # Migrata IR (Intermediate Representation)
//!
//! This crate provides the input model for Migrata: the authored entity
//! schema and the change records used for incremental migrations.
//!
//! ## Core Concepts
//!
//! - **Entity**: A named data structure that maps to one table (e.g. User, Post)
//! - **Property**: A scalar, enum, enum reference, association or compound type
//! - **Schema**: The entity collection plus the enum and compound-type registries
//! - **SchemaChange**: The delta between two versions of one entity
//!

// Module declarations
pub mod change;
pub mod compound;
pub mod entity;
pub mod naming;
pub mod property;
pub mod schema;
pub mod serialization;

// Re-export commonly used types at crate root
pub use change::{ChangeSet, ColumnChange, IndexChange, OptionChanges, SchemaChange, Transition};
pub use compound::{CompoundField, CompoundType, CompoundTypeRegistry};
pub use entity::{EntityDefinition, EntityOptions, IndexDefinition, PivotFor};
pub use property::{
    Association, CompoundRef, EnumProperty, EnumRefProperty, FieldOverride, PropertyDefinition,
    ScalarProperty,
};
pub use schema::{Schema, SchemaDocument};
pub use serialization::{
    load_changes, load_changes_from_str, load_schema, load_schema_dir, load_schema_from_str,
};

// Re-export core types that are commonly used with IR
pub use migrata_core::{
    DefaultValue, EngineError, EngineResult, KeyType, LocalizedText, PrimaryKeyStrategy,
    ReferentialAction, RelationKind,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for common usage
pub mod prelude {
    pub use crate::{
        Association, ColumnChange, CompoundRef, EntityDefinition, EntityOptions, EnumProperty,
        EnumRefProperty, IndexDefinition, PrimaryKeyStrategy, PropertyDefinition,
        ReferentialAction, RelationKind, ScalarProperty, Schema, SchemaChange,
    };
}
