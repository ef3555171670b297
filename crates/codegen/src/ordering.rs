//! # Dependency Graph & Ordering Engine
//!
//! Orders tables so that every referenced table is created before the
//! tables pointing at it, then stamps each one with a strictly increasing
//! migration timestamp.
//!
//! Nodes are indices into the input list (declaration order). Ready nodes
//! are drained lowest index first, so repeated runs produce the same
//! order. Self-references are dropped; when a cycle stalls the pass, the
//! lowest remaining index is emitted and the pass resumes.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime, Timelike, Utc};
use migrata_core::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

use crate::blueprint::TableBlueprint;

// ============================================================================
// MigrationTimestamp
// ============================================================================

/// `YYYY_MM_DD_HHMMSS`
pub const TIMESTAMP_FORMAT: &str = "%Y_%m_%d_%H%M%S";

/// Timestamp prefix of a migration file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MigrationTimestamp(NaiveDateTime);

impl MigrationTimestamp {
    pub fn new(value: NaiveDateTime) -> Self {
        Self(value)
    }

    /// Parse `2024_01_31_235900`
    pub fn parse(value: &str) -> EngineResult<Self> {
        NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT)
            .map(Self)
            .map_err(|_| EngineError::invalid_timestamp(value))
    }

    /// Current UTC time truncated to the minute
    pub fn now_minute() -> Self {
        let now = Utc::now().naive_utc();
        let truncated = now
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(now);
        Self(truncated)
    }

    /// Later by `seconds`, carrying into minutes, hours and days
    pub fn plus_seconds(&self, seconds: i64) -> Self {
        self.0
            .checked_add_signed(Duration::seconds(seconds))
            .map(Self)
            .unwrap_or(*self)
    }

    pub fn as_datetime(&self) -> NaiveDateTime {
        self.0
    }
}

impl fmt::Display for MigrationTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl FromStr for MigrationTimestamp {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MigrationTimestamp {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MigrationTimestamp> for String {
    fn from(value: MigrationTimestamp) -> Self {
        value.to_string()
    }
}

// ============================================================================
// Graph input
// ============================================================================

/// Where a planned table comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Entity,
    Pivot,
    MorphPivot,
}

/// A table awaiting ordering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedTable {
    /// Source entity name, or the pivot table name for derived pivots
    pub identity: String,
    pub table: String,
    pub source_entity: Option<String>,
    pub kind: TableKind,
    pub blueprint: TableBlueprint,

    /// Extra tables this one must follow (explicit join entities)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl PlannedTable {
    pub fn entity(entity: impl Into<String>, blueprint: TableBlueprint) -> Self {
        let entity = entity.into();
        Self {
            identity: entity.clone(),
            table: blueprint.table.clone(),
            source_entity: Some(entity),
            kind: TableKind::Entity,
            blueprint,
            depends_on: Vec::new(),
        }
    }

    pub fn pivot(kind: TableKind, blueprint: TableBlueprint) -> Self {
        Self {
            identity: blueprint.table.clone(),
            table: blueprint.table.clone(),
            source_entity: None,
            kind,
            blueprint,
            depends_on: Vec::new(),
        }
    }

    pub fn with_dependency(mut self, table: impl Into<String>) -> Self {
        self.depends_on.push(table.into());
        self
    }
}

/// `from` must be created before `to` (tables named by physical name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub from: String,
    pub to: String,
}

impl DependencyEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn is_self_reference(&self) -> bool {
        self.from == self.to
    }
}

/// Referenced table → dependent table for every foreign key and declared
/// dependency, deduplicated in first-seen order
pub fn collect_edges(tables: &[PlannedTable]) -> Vec<DependencyEdge> {
    let mut seen = HashSet::new();
    let mut edges = Vec::new();

    for table in tables {
        let referenced = table
            .blueprint
            .foreign_keys
            .iter()
            .map(|fk| fk.references_table.as_str())
            .chain(table.depends_on.iter().map(String::as_str));

        for from in referenced {
            let edge = DependencyEdge::new(from, &table.table);
            if seen.insert(edge.clone()) {
                edges.push(edge);
            }
        }
    }

    edges
}

// ============================================================================
// Ordering
// ============================================================================

/// A table in creation order with its migration timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedTable {
    pub identity: String,
    pub table: String,
    pub source_entity: Option<String>,
    pub kind: TableKind,
    pub blueprint: TableBlueprint,
    pub timestamp: MigrationTimestamp,
}

impl OrderedTable {
    /// `2024_01_01_000000_create_users_table`
    pub fn file_stem(&self) -> String {
        format!("{}_create_{}_table", self.timestamp, self.table)
    }
}

/// Topologically order `tables` and assign `base + k` second timestamps.
///
/// Edges naming tables outside the input are ignored. Never fails: cycles
/// are broken by declaration order.
pub fn order_tables(
    tables: Vec<PlannedTable>,
    edges: &[DependencyEdge],
    base: MigrationTimestamp,
) -> Vec<OrderedTable> {
    let n = tables.len();
    let index_of: HashMap<&str, usize> = tables
        .iter()
        .enumerate()
        .rev()
        .map(|(i, t)| (t.table.as_str(), i))
        .collect();

    let mut in_degree = vec![0usize; n];
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];

    for edge in edges {
        if edge.is_self_reference() {
            tracing::debug!(table = %edge.from, "ignoring self-referencing edge");
            continue;
        }
        let (Some(&from), Some(&to)) = (
            index_of.get(edge.from.as_str()),
            index_of.get(edge.to.as_str()),
        ) else {
            tracing::debug!(from = %edge.from, to = %edge.to, "edge references an unplanned table");
            continue;
        };
        if from == to || adjacency[from].contains(&to) {
            continue;
        }
        adjacency[from].push(to);
        in_degree[to] += 1;
    }

    let mut ready: BTreeSet<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut done = vec![false; n];
    let mut order: Vec<usize> = Vec::with_capacity(n);

    while order.len() < n {
        let node = match ready.pop_first() {
            Some(node) => node,
            None => {
                let Some(stalled) = (0..n).find(|&i| !done[i]) else {
                    break;
                };
                tracing::debug!(
                    table = %tables[stalled].table,
                    "dependency cycle, emitting in declaration order",
                );
                stalled
            }
        };
        if done[node] {
            continue;
        }

        done[node] = true;
        order.push(node);
        for &next in &adjacency[node] {
            if done[next] {
                continue;
            }
            in_degree[next] = in_degree[next].saturating_sub(1);
            if in_degree[next] == 0 {
                ready.insert(next);
            }
        }
    }

    let mut slots: Vec<Option<PlannedTable>> = tables.into_iter().map(Some).collect();
    order
        .into_iter()
        .enumerate()
        .filter_map(|(k, i)| {
            let planned = slots[i].take()?;
            Some(OrderedTable {
                identity: planned.identity,
                table: planned.table,
                source_entity: planned.source_entity,
                kind: planned.kind,
                blueprint: planned.blueprint,
                timestamp: base.plus_seconds(k as i64),
            })
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
