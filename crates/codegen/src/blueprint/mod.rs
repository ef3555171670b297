//! Table blueprints: the resolved physical description of one table, the
//! scalar type table, and the builder that produces blueprints from
//! entity definitions.

pub mod builder;
pub mod model;
pub mod types;

pub use builder::{
    AssociationParts, BlueprintBuilder, UNIVERSAL_KEY_LENGTH, morph_name, soft_delete_column,
    timestamp_columns,
};
pub use model::{Column, ColumnArgs, ColumnMethod, ForeignKey, Index, Modifier, TableBlueprint};
pub use types::{DEFAULT_DECIMAL, ScalarMapping, TypeHints, map_scalar};
