//! # Diff Migration Engine
//!
//! Turns a [`SchemaChange`] into paired forward/backward operation lists.
//!
//! Each delta contributes a group of forward operations and the group that
//! undoes it. Forward runs the groups in order (primary key, columns,
//! indexes, options); backward runs the undo groups in reverse, so the
//! backward list replayed after the forward list restores the table.
//! Constraints are dropped before the columns they depend on and created
//! after them.
//!
//! Columns are synthesized through the [`BlueprintBuilder`], so a diff
//! maps types exactly as a full build does.

use migrata_core::PrimaryKeyStrategy;
use migrata_ir::{
    ColumnChange, EntityDefinition, IndexChange, IndexDefinition, PropertyDefinition,
    SchemaChange, Transition, naming,
};
use serde::{Deserialize, Serialize};

use crate::blueprint::{
    AssociationParts, BlueprintBuilder, Column, ForeignKey, Index, TableBlueprint,
    soft_delete_column, timestamp_columns,
};
use crate::context::BuildContext;

// ============================================================================
// Operation
// ============================================================================

/// One structural step of a migration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    CreateTable { blueprint: TableBlueprint },
    DropTable { table: String },

    AddColumn { column: Column },
    /// Redefine an existing column in place
    AlterColumn { column: Column },
    DropColumn { column: String },
    RenameColumn { from: String, to: String },

    AddForeignKey { foreign_key: ForeignKey },
    DropForeignKey { name: String, columns: Vec<String> },

    AddIndex { index: Index },
    DropIndex {
        name: String,
        columns: Vec<String>,
        unique: bool,
    },

    AddTimestamps,
    DropTimestamps,
    AddSoftDeletes,
    DropSoftDeletes,

    DropPrimary { columns: Vec<String> },
    AddPrimary { columns: Vec<String> },
}

impl Operation {
    fn drop_foreign_key(foreign_key: &ForeignKey) -> Self {
        Operation::DropForeignKey {
            name: foreign_key.name.clone(),
            columns: foreign_key.columns.clone(),
        }
    }

    fn drop_index(index: &Index) -> Self {
        Operation::DropIndex {
            name: index.name.clone(),
            columns: index.columns.clone(),
            unique: index.unique,
        }
    }

    /// Replay this operation on an in-memory blueprint
    pub fn apply(&self, blueprint: &mut TableBlueprint) {
        match self {
            Operation::CreateTable { blueprint: created } => *blueprint = created.clone(),
            Operation::DropTable { table } => *blueprint = TableBlueprint::new(table),
            Operation::AddColumn { column } => {
                blueprint.add_column(column.clone());
            }
            Operation::AlterColumn { column } => {
                match blueprint.columns.iter_mut().find(|c| c.name == column.name) {
                    Some(existing) => *existing = column.clone(),
                    None => blueprint.columns.push(column.clone()),
                }
            }
            Operation::DropColumn { column } => blueprint.columns.retain(|c| &c.name != column),
            Operation::RenameColumn { from, to } => {
                let rename = |name: &mut String| {
                    if name == from {
                        *name = to.clone();
                    }
                };
                for column in &mut blueprint.columns {
                    rename(&mut column.name);
                }
                for name in &mut blueprint.primary_key {
                    rename(name);
                }
                for foreign_key in &mut blueprint.foreign_keys {
                    foreign_key.columns.iter_mut().for_each(rename);
                }
                for index in &mut blueprint.indexes {
                    index.columns.iter_mut().for_each(rename);
                }
            }
            Operation::AddForeignKey { foreign_key } => {
                blueprint.add_foreign_key(foreign_key.clone())
            }
            Operation::DropForeignKey { name, .. } => {
                blueprint.foreign_keys.retain(|fk| &fk.name != name)
            }
            Operation::AddIndex { index } => {
                blueprint.add_index(index.clone());
            }
            Operation::DropIndex { columns, unique, .. } => blueprint
                .indexes
                .retain(|i| !(&i.columns == columns && i.unique == *unique)),
            Operation::AddTimestamps => {
                for column in timestamp_columns() {
                    blueprint.add_column(column);
                }
            }
            Operation::DropTimestamps => blueprint
                .columns
                .retain(|c| c.name != "created_at" && c.name != "updated_at"),
            Operation::AddSoftDeletes => {
                blueprint.add_column(soft_delete_column());
            }
            Operation::DropSoftDeletes => blueprint.columns.retain(|c| c.name != "deleted_at"),
            Operation::DropPrimary { .. } => blueprint.primary_key.clear(),
            Operation::AddPrimary { columns } => blueprint.set_primary_key(columns.clone()),
        }
    }
}

/// Forward and backward operations for one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeOperations {
    pub table: String,
    pub forward: Vec<Operation>,
    pub backward: Vec<Operation>,
}

impl ChangeOperations {
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty() && self.backward.is_empty()
    }
}

/// A delta and its undo
#[derive(Debug, Default)]
struct Group {
    forward: Vec<Operation>,
    backward: Vec<Operation>,
}

impl Group {
    fn is_empty(&self) -> bool {
        self.forward.is_empty() && self.backward.is_empty()
    }
}

// ============================================================================
// DiffEngine
// ============================================================================

/// Builds operation lists for schema changes
#[derive(Debug, Clone, Copy)]
pub struct DiffEngine<'a> {
    builder: BlueprintBuilder<'a>,
}

impl<'a> DiffEngine<'a> {
    pub fn new(ctx: &'a BuildContext<'a>) -> Self {
        Self {
            builder: BlueprintBuilder::new(ctx),
        }
    }

    /// Operations for one change record; `None` when nothing changes
    pub fn build(&self, change: &SchemaChange) -> Option<ChangeOperations> {
        let schema = self.builder.context().schema;
        let entity = schema.entity(&change.entity);
        let table = change
            .table
            .clone()
            .unwrap_or_else(|| schema.table_name_for(&change.entity));

        let mut groups: Vec<Group> = Vec::new();

        if let Some(transition) = change.options.primary_key.filter(Transition::is_change) {
            groups.push(self.primary_key_group(entity, transition));
        }
        for column_change in &change.columns {
            groups.push(self.column_group(&change.entity, entity, &table, column_change));
        }
        for index_change in &change.indexes {
            groups.push(self.index_group(entity, &table, index_change));
        }
        if let Some(transition) = change.options.timestamps.filter(Transition::is_change) {
            groups.push(toggle(
                transition.to,
                Operation::AddTimestamps,
                Operation::DropTimestamps,
            ));
        }
        if let Some(transition) = change.options.soft_delete.filter(Transition::is_change) {
            groups.push(toggle(
                transition.to,
                Operation::AddSoftDeletes,
                Operation::DropSoftDeletes,
            ));
        }

        groups.retain(|g| !g.is_empty());
        if groups.is_empty() {
            tracing::debug!(entity = %change.entity, "change record describes no delta");
            return None;
        }

        let forward = groups.iter().flat_map(|g| g.forward.clone()).collect();
        let backward = groups.into_iter().rev().flat_map(|g| g.backward).collect();
        Some(ChangeOperations {
            table,
            forward,
            backward,
        })
    }

    /// Drop a removed entity's table; backward recreates it in full
    pub fn drop_table(&self, entity: &EntityDefinition) -> ChangeOperations {
        let blueprint = self.builder.build(entity);
        ChangeOperations {
            table: blueprint.table.clone(),
            forward: vec![Operation::DropTable {
                table: blueprint.table.clone(),
            }],
            backward: vec![Operation::CreateTable { blueprint }],
        }
    }

    // ====================================================================
    // Columns
    // ====================================================================

    fn column_group(
        &self,
        entity: &str,
        definition: Option<&EntityDefinition>,
        table: &str,
        change: &ColumnChange,
    ) -> Group {
        match change {
            ColumnChange::Added { name, current } => {
                let parts = self.parts(entity, table, name, current);
                Group {
                    forward: create_ops(&parts),
                    backward: drop_ops(&parts),
                }
            }
            ColumnChange::Removed { name, previous } => {
                let parts = self.parts(entity, table, name, previous);
                Group {
                    forward: drop_ops(&parts),
                    backward: create_ops(&parts),
                }
            }
            ColumnChange::Modified {
                name,
                previous,
                current,
            } => {
                // the entity as declared now stands in for a missing current snapshot
                let declared = definition.and_then(|e| e.property(name));
                let current = current.as_ref().or(declared);
                let (Some(previous), Some(current)) = (previous.as_ref(), current) else {
                    tracing::debug!(entity, column = %name, "modified column lacks a snapshot, skipping");
                    return Group::default();
                };
                let old = self.parts(entity, table, name, previous);
                let new = self.parts(entity, table, name, current);
                Group {
                    forward: reshape_ops(&old, &new),
                    backward: reshape_ops(&new, &old),
                }
            }
            ColumnChange::Renamed {
                from,
                to,
                previous,
                current,
            } => {
                // without snapshots, map through the property as currently declared
                let declared = definition.and_then(|e| e.property(to).or_else(|| e.property(from)));
                let previous = previous.as_ref();
                let current = current.as_ref();
                let mapping = previous.or(current).or(declared);
                self.rename_group(entity, table, from, to, mapping, previous, current)
            }
        }
    }

    fn rename_group(
        &self,
        entity: &str,
        table: &str,
        from: &str,
        to: &str,
        mapping: Option<&PropertyDefinition>,
        previous: Option<&PropertyDefinition>,
        current: Option<&PropertyDefinition>,
    ) -> Group {
        let pairs: Vec<(String, String)> = match mapping {
            Some(definition) => {
                let old = self.parts(entity, table, from, definition).columns;
                let new = self.parts(entity, table, to, definition).columns;
                old.into_iter()
                    .zip(new)
                    .map(|(o, n)| (o.name, n.name))
                    .collect()
            }
            None => Vec::new(),
        };
        let pairs = if pairs.is_empty() {
            vec![(naming::snake_case(from), naming::snake_case(to))]
        } else {
            pairs
        };

        let mut group = Group {
            forward: pairs
                .iter()
                .map(|(old, new)| Operation::RenameColumn {
                    from: old.clone(),
                    to: new.clone(),
                })
                .collect(),
            backward: Vec::new(),
        };

        if let (Some(previous), Some(current)) = (previous, current) {
            if previous != current {
                // constraints keep the names they were created under
                let mut old = self.parts(entity, table, to, previous);
                let before = self.parts(entity, table, from, previous);
                old.foreign_keys = renamed_constraints(before.foreign_keys, &pairs, |fk| &mut fk.columns);
                old.indexes = renamed_constraints(before.indexes, &pairs, |i| &mut i.columns);
                let new = self.parts(entity, table, to, current);
                group.forward.extend(reshape_ops(&old, &new));
                group.backward = reshape_ops(&new, &old);
            }
        }
        group
            .backward
            .extend(pairs.iter().rev().map(|(old, new)| Operation::RenameColumn {
                from: new.clone(),
                to: old.clone(),
            }));
        group
    }

    /// Columns and constraints a property materializes on `table`
    fn parts(
        &self,
        entity: &str,
        table: &str,
        name: &str,
        definition: &PropertyDefinition,
    ) -> AssociationParts {
        match definition {
            PropertyDefinition::Association(association) => self
                .builder
                .association_parts(entity, table, name, association)
                .unwrap_or_default(),
            other => {
                let columns = self.builder.property_columns(name, other);
                let indexes = match (other, columns.as_slice()) {
                    (PropertyDefinition::Scalar(scalar), [column]) if scalar.index => {
                        vec![Index::new(table, [column.name.clone()], false)]
                    }
                    _ => Vec::new(),
                };
                AssociationParts {
                    columns,
                    foreign_keys: Vec::new(),
                    indexes,
                }
            }
        }
    }

    // ====================================================================
    // Indexes
    // ====================================================================

    fn index_group(
        &self,
        entity: Option<&EntityDefinition>,
        table: &str,
        change: &IndexChange,
    ) -> Group {
        match change {
            IndexChange::Added { index } => {
                let index = self.physical_index(entity, table, index);
                Group {
                    backward: vec![Operation::drop_index(&index)],
                    forward: vec![Operation::AddIndex { index }],
                }
            }
            IndexChange::Removed { index } => {
                let index = self.physical_index(entity, table, index);
                Group {
                    forward: vec![Operation::drop_index(&index)],
                    backward: vec![Operation::AddIndex { index }],
                }
            }
        }
    }

    /// Declared index with physical column names and, when unnamed, the
    /// conventional name for (table, columns, uniqueness)
    fn physical_index(
        &self,
        entity: Option<&EntityDefinition>,
        table: &str,
        declared: &IndexDefinition,
    ) -> Index {
        let columns: Vec<String> = declared
            .columns
            .iter()
            .map(|c| match entity {
                Some(entity) => self.builder.physical_column_name(entity, c),
                None => naming::snake_case(c),
            })
            .collect();
        let index = Index::new(table, columns, declared.unique);
        match &declared.name {
            Some(name) => index.with_name(name),
            None => index,
        }
    }

    // ====================================================================
    // Primary key
    // ====================================================================

    /// Same-family changes alter `id` in place; anything involving a
    /// string key or no generated key drops and recreates it
    fn primary_key_group(
        &self,
        entity: Option<&EntityDefinition>,
        transition: Transition<PrimaryKeyStrategy>,
    ) -> Group {
        let old = self.builder.primary_key_column(transition.from);
        let new = self.builder.primary_key_column(transition.to);

        let rebuild = transition.from.is_string_family()
            || transition.to.is_string_family()
            || transition.from == PrimaryKeyStrategy::None
            || transition.to == PrimaryKeyStrategy::None;

        if !rebuild {
            return Group {
                forward: new.map(|column| Operation::AlterColumn { column }).into_iter().collect(),
                backward: old.map(|column| Operation::AlterColumn { column }).into_iter().collect(),
            };
        }

        let old_key = self.key_columns(entity, transition.from);
        let new_key = self.key_columns(entity, transition.to);
        Group {
            forward: rebuild_key(old.as_ref(), &old_key, new.as_ref(), &new_key),
            backward: rebuild_key(new.as_ref(), &new_key, old.as_ref(), &old_key),
        }
    }

    fn key_columns(
        &self,
        entity: Option<&EntityDefinition>,
        strategy: PrimaryKeyStrategy,
    ) -> Vec<String> {
        if strategy != PrimaryKeyStrategy::None {
            return vec!["id".to_string()];
        }
        entity
            .map(|e| {
                e.primary_properties()
                    .into_iter()
                    .map(|p| self.builder.physical_column_name(e, p))
                    .collect()
            })
            .unwrap_or_default()
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn create_ops(parts: &AssociationParts) -> Vec<Operation> {
    let columns = parts
        .columns
        .iter()
        .map(|c| Operation::AddColumn { column: c.clone() });
    let foreign_keys = parts.foreign_keys.iter().map(|fk| Operation::AddForeignKey {
        foreign_key: fk.clone(),
    });
    let indexes = parts
        .indexes
        .iter()
        .map(|i| Operation::AddIndex { index: i.clone() });
    columns.chain(foreign_keys).chain(indexes).collect()
}

fn drop_ops(parts: &AssociationParts) -> Vec<Operation> {
    let indexes = parts.indexes.iter().rev().map(Operation::drop_index);
    let foreign_keys = parts.foreign_keys.iter().rev().map(Operation::drop_foreign_key);
    let columns = parts.columns.iter().rev().map(|c| Operation::DropColumn {
        column: c.name.clone(),
    });
    indexes.chain(foreign_keys).chain(columns).collect()
}

/// Move a property from `from` to `to` in place; constraints that change are rebuilt
fn reshape_ops(from: &AssociationParts, to: &AssociationParts) -> Vec<Operation> {
    let stale_indexes = from.indexes.iter().rev().filter(|i| !to.indexes.contains(i));
    let stale_keys = from
        .foreign_keys
        .iter()
        .rev()
        .filter(|fk| !to.foreign_keys.contains(fk));
    let stale_columns = from
        .columns
        .iter()
        .rev()
        .filter(|c| !to.columns.iter().any(|n| n.name == c.name));

    let mut ops: Vec<Operation> = stale_indexes.map(Operation::drop_index).collect();
    ops.extend(stale_keys.map(Operation::drop_foreign_key));
    ops.extend(stale_columns.map(|c| Operation::DropColumn {
        column: c.name.clone(),
    }));
    ops.extend(
        to.columns
            .iter()
            .map(|c| Operation::AlterColumn { column: c.clone() }),
    );
    ops.extend(
        to.foreign_keys
            .iter()
            .filter(|fk| !from.foreign_keys.contains(fk))
            .map(|fk| Operation::AddForeignKey {
                foreign_key: fk.clone(),
            }),
    );
    ops.extend(
        to.indexes
            .iter()
            .filter(|i| !from.indexes.contains(i))
            .map(|i| Operation::AddIndex { index: i.clone() }),
    );
    ops
}

/// Constraints as they read after the column renames in `pairs`
fn renamed_constraints<T>(
    mut constraints: Vec<T>,
    pairs: &[(String, String)],
    columns: impl Fn(&mut T) -> &mut Vec<String>,
) -> Vec<T> {
    for constraint in &mut constraints {
        for column in columns(constraint).iter_mut() {
            if let Some((_, new)) = pairs.iter().find(|(old, _)| *old == *column) {
                *column = new.clone();
            }
        }
    }
    constraints
}

fn toggle(enable: bool, on: Operation, off: Operation) -> Group {
    if enable {
        Group {
            forward: vec![on],
            backward: vec![off],
        }
    } else {
        Group {
            forward: vec![off],
            backward: vec![on],
        }
    }
}

fn rebuild_key(
    drop: Option<&Column>,
    drop_key: &[String],
    add: Option<&Column>,
    add_key: &[String],
) -> Vec<Operation> {
    let mut ops = Vec::new();
    if !drop_key.is_empty() {
        ops.push(Operation::DropPrimary {
            columns: drop_key.to_vec(),
        });
    }
    if let Some(column) = drop {
        ops.push(Operation::DropColumn {
            column: column.name.clone(),
        });
    }
    if let Some(column) = add {
        ops.push(Operation::AddColumn {
            column: column.clone().without_primary(),
        });
    }
    if !add_key.is_empty() {
        ops.push(Operation::AddPrimary {
            columns: add_key.to_vec(),
        });
    }
    ops
}

// ============================================================================
// Tests
// ============================================================================
