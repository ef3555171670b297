//! # Generator Orchestrator
//!
//! The `Generator` is the top-level entry point. It takes a [`Schema`] and
//! a [`GeneratorConfig`], builds a [`BuildContext`], and runs the engines.
//!
//! ## Pipeline
//!
//! ```text
//! Schema + GeneratorConfig
//!         │
//!         ▼
//!   validate (warnings only)
//!         │
//!         ├──► BlueprintBuilder::build()        → entity tables
//!         ├──► extract_many_to_many()           → pivot tables
//!         ├──► extract_morph_to_many()          → polymorphic pivots
//!         │
//!         ▼
//!   collect_edges() + order_tables()
//!         │
//!         ▼
//!   MigrationPlan { tables, edges, warnings }
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use migrata_codegen::{Generator, GeneratorConfig};
//! use migrata_ir::load_schema;
//!
//! let schema = load_schema("schema/")?;
//! let plan = Generator::new(GeneratorConfig::default()).plan(&schema);
//!
//! for table in &plan.tables {
//!     println!("{}", table.file_stem());
//! }
//! ```

use migrata_core::Validatable;
use migrata_ir::{ChangeSet, EntityDefinition, Schema, SchemaChange};
use serde::{Deserialize, Serialize};

use crate::GeneratorConfig;
use crate::blueprint::BlueprintBuilder;
use crate::context::BuildContext;
use crate::diff::{ChangeOperations, DiffEngine};
use crate::ordering::{
    DependencyEdge, MigrationTimestamp, OrderedTable, PlannedTable, TableKind, collect_edges,
    order_tables,
};
use crate::relations::{extract_many_to_many, extract_morph_to_many};

// ============================================================================
// Output
// ============================================================================

/// Ordered tables for a full build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationPlan {
    pub tables: Vec<OrderedTable>,
    pub edges: Vec<DependencyEdge>,

    /// Validation findings; generation continued despite them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl MigrationPlan {
    pub fn table(&self, table: &str) -> Option<&OrderedTable> {
        self.tables.iter().find(|t| t.table == table)
    }

    /// Position of a table in creation order
    pub fn position(&self, table: &str) -> Option<usize> {
        self.tables.iter().position(|t| t.table == table)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.table.as_str()).collect()
    }

    pub fn file_stems(&self) -> Vec<String> {
        self.tables.iter().map(OrderedTable::file_stem).collect()
    }

    pub fn count(&self, kind: TableKind) -> usize {
        self.tables.iter().filter(|t| t.kind == kind).count()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// What a diff migration does to its table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    Update,
    Drop,
}

impl DiffKind {
    pub fn verb(&self) -> &'static str {
        match self {
            DiffKind::Update => "update",
            DiffKind::Drop => "drop",
        }
    }
}

/// One incremental migration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffMigration {
    pub entity: String,
    pub table: String,
    pub kind: DiffKind,
    pub operations: ChangeOperations,
    pub timestamp: MigrationTimestamp,
}

impl DiffMigration {
    /// `2024_01_01_000000_update_posts_table`
    pub fn file_stem(&self) -> String {
        format!("{}_{}_{}_table", self.timestamp, self.kind.verb(), self.table)
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Runs the engines over a schema.
///
/// Stateless aside from its configuration.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(GeneratorConfig::default())
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Base for this run's timestamps
    fn base_timestamp(&self) -> MigrationTimestamp {
        self.config
            .base_timestamp
            .unwrap_or_else(MigrationTimestamp::now_minute)
    }

    /// Plan every table of the schema in creation order.
    ///
    /// Validation findings are logged and returned as warnings; they
    /// never stop generation.
    pub fn plan(&self, schema: &Schema) -> MigrationPlan {
        // ── 1. Validate ──────────────────────────────────────────────────
        let warnings: Vec<String> = schema
            .validation_errors()
            .into_iter()
            .inspect(|e| tracing::warn!("Schema validation warning: {}", e))
            .collect();

        let ctx = BuildContext::new(schema, &self.config);
        let builder = BlueprintBuilder::new(&ctx);

        // ── 2. Entity tables ─────────────────────────────────────────────
        let mut tables: Vec<PlannedTable> = Vec::new();
        for entity in schema.entities.values() {
            let mut planned = PlannedTable::entity(&entity.name, builder.build(entity));
            if let Some(pair) = &entity.options.pivot_for {
                planned = planned
                    .with_dependency(schema.table_name_for(&pair.0))
                    .with_dependency(schema.table_name_for(&pair.1));
            }
            tables.push(planned);
        }

        // ── 3. Derived pivots ────────────────────────────────────────────
        for entity in schema.entities.values() {
            let pivots = extract_many_to_many(entity, schema)
                .into_iter()
                .map(|info| PlannedTable::pivot(TableKind::Pivot, info.blueprint(&builder)));
            let morph_pivots = extract_morph_to_many(entity, schema)
                .into_iter()
                .map(|info| PlannedTable::pivot(TableKind::MorphPivot, info.blueprint(&builder)));

            for planned in pivots.chain(morph_pivots) {
                if tables.iter().any(|t| t.table == planned.table) {
                    tracing::debug!(table = %planned.table, "pivot table already planned");
                    continue;
                }
                tables.push(planned);
            }
        }

        // ── 4. Order ─────────────────────────────────────────────────────
        let edges = collect_edges(&tables);
        let ordered = order_tables(tables, &edges, self.base_timestamp());

        let plan = MigrationPlan {
            tables: ordered,
            edges,
            warnings,
        };
        tracing::info!(
            tables = plan.tables.len(),
            pivots = plan.count(TableKind::Pivot) + plan.count(TableKind::MorphPivot),
            warnings = plan.warnings.len(),
            "Migration plan ready",
        );
        plan
    }

    /// Timestamped incremental migrations for changed and removed entities.
    ///
    /// Change records describing no delta are skipped.
    pub fn diff(
        &self,
        schema: &Schema,
        changes: &[SchemaChange],
        removed: &[EntityDefinition],
    ) -> Vec<DiffMigration> {
        let ctx = BuildContext::new(schema, &self.config);
        let engine = DiffEngine::new(&ctx);
        let base = self.base_timestamp();

        let updates = changes.iter().filter_map(|change| {
            engine
                .build(change)
                .map(|operations| (change.entity.clone(), DiffKind::Update, operations))
        });
        let drops = removed
            .iter()
            .map(|entity| (entity.name.clone(), DiffKind::Drop, engine.drop_table(entity)));

        let migrations: Vec<DiffMigration> = updates
            .chain(drops)
            .enumerate()
            .map(|(k, (entity, kind, operations))| DiffMigration {
                entity,
                table: operations.table.clone(),
                kind,
                operations,
                timestamp: base.plus_seconds(k as i64),
            })
            .collect();

        tracing::info!(
            migrations = migrations.len(),
            skipped = changes.len() + removed.len() - migrations.len(),
            "Diff migrations ready",
        );
        migrations
    }

    /// [`diff`](Generator::diff) over a loaded change set
    pub fn diff_set(&self, schema: &Schema, set: &ChangeSet) -> Vec<DiffMigration> {
        self.diff(schema, &set.changes, &set.removed)
    }
}

// ============================================================================
// Tests
// ============================================================================
