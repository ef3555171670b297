//! # Migrata
//!
//! Compiles entity schemas into dependency-ordered table blueprints and
//! reversible diff migrations.
//!
//! Migrata provides:
//! - A JSON schema model for entities, properties and associations
//! - Table blueprints with derived pivot and polymorphic pivot tables
//! - Foreign-key aware ordering with deterministic migration timestamps
//! - Forward and backward operations for incremental schema changes
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use migrata::prelude::*;
//!
//! let schema = load_schema("schema/")?;
//! let plan = Generator::with_defaults().plan(&schema);
//!
//! for table in &plan.tables {
//!     println!("{}", table.file_stem());
//! }
//! ```

/// Shared vocabulary, errors and traits.
pub mod shared {
    pub use migrata_core::*;
}

/// Schema input model and loading.
pub mod schema {
    pub use migrata_ir::*;
}

/// Blueprint, relationship, ordering and diff engines.
pub mod codegen {
    pub use migrata_codegen::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use migrata_codegen::{
        ChangeOperations, DiffMigration, Generator, GeneratorConfig, MigrationPlan,
        MigrationTimestamp, Operation, OrderedTable, TableBlueprint,
    };
    pub use migrata_ir::prelude::*;
    pub use migrata_ir::{load_changes, load_schema};
}

// Re-export key types at the crate root
pub use migrata_codegen::{Generator, GeneratorConfig, MigrationPlan};
pub use migrata_core::{EngineError, EngineResult};
pub use migrata_ir::Schema;
