//! Table blueprint model
//!
//! The structured, renderer-neutral description of one physical table:
//! columns with their storage method and modifiers, foreign-key
//! constraints, indexes and the primary-key column set.

use migrata_core::{DefaultValue, ReferentialAction};
use serde::{Deserialize, Serialize};

// ============================================================================
// ColumnMethod
// ============================================================================

/// Storage method a column is created with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnMethod {
    Increments,
    BigIncrements,
    Uuid,
    String,
    Char,
    Text,
    MediumText,
    LongText,
    TinyInteger,
    SmallInteger,
    Integer,
    BigInteger,
    UnsignedInteger,
    UnsignedBigInteger,
    Float,
    Double,
    Decimal,
    Boolean,
    Date,
    DateTime,
    DateTimeTz,
    Time,
    Timestamp,
    TimestampTz,
    Year,
    Json,
    Jsonb,
    Binary,
    Enum,
}

impl ColumnMethod {
    /// Whether the method stores integers
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ColumnMethod::Increments
                | ColumnMethod::BigIncrements
                | ColumnMethod::TinyInteger
                | ColumnMethod::SmallInteger
                | ColumnMethod::Integer
                | ColumnMethod::BigInteger
                | ColumnMethod::UnsignedInteger
                | ColumnMethod::UnsignedBigInteger
        )
    }

    /// Whether the method stores numbers of any kind
    pub fn is_numeric(&self) -> bool {
        self.is_integer()
            || matches!(
                self,
                ColumnMethod::Float | ColumnMethod::Double | ColumnMethod::Decimal
            )
    }
}

// ============================================================================
// Column
// ============================================================================

/// Constructor arguments beyond the column name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

/// Column modifier, kept in the order it was attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "modifier", content = "value", rename_all = "snake_case")]
pub enum Modifier {
    /// Single-column primary key; never present on composite-key columns
    Primary,
    Nullable,
    Unsigned,
    Unique,
    Default(DefaultValue),
    Comment(String),
}

/// One column of a blueprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub method: ColumnMethod,

    #[serde(default)]
    pub args: ColumnArgs,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<Modifier>,
}

impl Column {
    pub fn new(name: impl Into<String>, method: ColumnMethod) -> Self {
        Self {
            name: name.into(),
            method,
            args: ColumnArgs::default(),
            modifiers: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: ColumnArgs) -> Self {
        self.args = args;
        self
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.args.length = Some(length);
        self
    }

    pub fn with_precision(mut self, precision: u32, scale: u32) -> Self {
        self.args.precision = Some(precision);
        self.args.scale = Some(scale);
        self
    }

    pub fn with_values(mut self, values: Vec<String>) -> Self {
        self.args.values = values;
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn primary(self) -> Self {
        self.with_modifier(Modifier::Primary)
    }

    pub fn nullable(self) -> Self {
        self.with_modifier(Modifier::Nullable)
    }

    pub fn unique(self) -> Self {
        self.with_modifier(Modifier::Unique)
    }

    pub fn comment(self, text: impl Into<String>) -> Self {
        self.with_modifier(Modifier::Comment(text.into()))
    }

    /// Same column under another name
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Same column without its primary marker
    pub fn without_primary(mut self) -> Self {
        self.modifiers.retain(|m| *m != Modifier::Primary);
        self
    }

    pub fn is_primary(&self) -> bool {
        self.modifiers.contains(&Modifier::Primary)
    }

    pub fn is_nullable(&self) -> bool {
        self.modifiers.contains(&Modifier::Nullable)
    }

    pub fn is_unique(&self) -> bool {
        self.modifiers.contains(&Modifier::Unique)
    }

    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.modifiers.iter().find_map(|m| match m {
            Modifier::Default(v) => Some(v),
            _ => None,
        })
    }

    pub fn comment_text(&self) -> Option<&str> {
        self.modifiers.iter().find_map(|m| match m {
            Modifier::Comment(c) => Some(c.as_str()),
            _ => None,
        })
    }
}

// ============================================================================
// ForeignKey
// ============================================================================

/// Foreign-key constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub name: String,
    pub columns: Vec<String>,
    pub references_table: String,
    pub references_column: String,
    pub on_delete: ReferentialAction,
    pub on_update: ReferentialAction,
}

impl ForeignKey {
    /// Constraint on `column` of `table`, named `{table}_{column}_foreign`
    pub fn new(
        table: &str,
        column: impl Into<String>,
        references_table: impl Into<String>,
        references_column: impl Into<String>,
    ) -> Self {
        let columns = vec![column.into()];
        Self {
            name: constraint_name(table, &columns, "foreign"),
            columns,
            references_table: references_table.into(),
            references_column: references_column.into(),
            on_delete: ReferentialAction::Restrict,
            on_update: ReferentialAction::Cascade,
        }
    }

    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = action;
        self
    }

    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = action;
        self
    }
}

// ============================================================================
// Index
// ============================================================================

/// Plain or unique index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

impl Index {
    /// Index with the conventional name for (table, columns, uniqueness)
    pub fn new<I, S>(table: &str, columns: I, unique: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        Self {
            name: Self::conventional_name(table, &columns, unique),
            columns,
            unique,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// `{table}_{col1}_{col2}_{unique|index}`
    pub fn conventional_name(table: &str, columns: &[String], unique: bool) -> String {
        constraint_name(table, columns, if unique { "unique" } else { "index" })
    }

    /// Same column set and uniqueness, whatever the name
    pub fn same_shape(&self, other: &Index) -> bool {
        self.columns == other.columns && self.unique == other.unique
    }
}

fn constraint_name(table: &str, columns: &[String], suffix: &str) -> String {
    let mut parts = Vec::with_capacity(columns.len() + 2);
    parts.push(table);
    parts.extend(columns.iter().map(String::as_str));
    parts.push(suffix);
    parts.join("_").replace(['-', '.'], "_").to_lowercase()
}

// ============================================================================
// TableBlueprint
// ============================================================================

/// Fully resolved description of one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableBlueprint {
    pub table: String,
    pub columns: Vec<Column>,

    /// Zero, one or many columns; composite keys live only here
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary_key: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKey>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<Index>,
}

impl TableBlueprint {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Append a column; returns false if one with that name already exists
    pub fn add_column(&mut self, column: Column) -> bool {
        if self.has_column(&column.name) {
            return false;
        }
        self.columns.push(column);
        true
    }

    pub fn add_foreign_key(&mut self, foreign_key: ForeignKey) {
        if !self.foreign_keys.iter().any(|fk| fk.name == foreign_key.name) {
            self.foreign_keys.push(foreign_key);
        }
    }

    /// Append an index unless one with the same shape exists (first wins)
    pub fn add_index(&mut self, index: Index) -> bool {
        if self.indexes.iter().any(|existing| existing.same_shape(&index)) {
            return false;
        }
        self.indexes.push(index);
        true
    }

    /// Set the key and strip per-column primary markers when composite
    pub fn set_primary_key(&mut self, columns: Vec<String>) {
        self.primary_key = columns;
        self.normalize_primary_key();
    }

    pub fn normalize_primary_key(&mut self) {
        if self.primary_key.len() > 1 {
            for column in &mut self.columns {
                column.modifiers.retain(|m| *m != Modifier::Primary);
            }
        }
    }

    pub fn has_composite_key(&self) -> bool {
        self.primary_key.len() > 1
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
    fn test_column_modifiers() {
        let column = Column::new("status", ColumnMethod::String)
            .with_length(32)
            .nullable()
            .with_modifier(Modifier::Default(DefaultValue::from("draft")))
            .comment("Status");

        assert!(column.is_nullable());
        assert!(!column.is_primary());
        assert_eq!(column.args.length, Some(32));
        assert_eq!(
            column.default_value(),
            Some(&DefaultValue::String("draft".to_string()))
        );
        assert_eq!(column.comment_text(), Some("Status"));
    }

    #[test]
    fn test_conventional_names() {
        let columns = vec!["author_id".to_string()];
        assert_eq!(
            Index::conventional_name("posts", &columns, false),
            "posts_author_id_index"
        );
        assert_eq!(
            Index::new("users", ["email"], true).name,
            "users_email_unique"
        );
        assert_eq!(
            ForeignKey::new("posts", "author_id", "users", "id").name,
            "posts_author_id_foreign"
        );
    }

    #[test]
    fn test_foreign_key_defaults() {
        let fk = ForeignKey::new("posts", "author_id", "users", "id");
        assert_eq!(fk.on_delete, ReferentialAction::Restrict);
        assert_eq!(fk.on_update, ReferentialAction::Cascade);
    }

    #[test]
    fn test_index_dedup_keeps_first() {
        let mut bp = TableBlueprint::new("posts");
        assert!(bp.add_index(Index::new("posts", ["slug"], true).with_name("first")));
        assert!(!bp.add_index(Index::new("posts", ["slug"], true)));
        assert!(bp.add_index(Index::new("posts", ["slug"], false)));

        assert_eq!(bp.indexes.len(), 2);
        assert_eq!(bp.indexes[0].name, "first");
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let mut bp = TableBlueprint::new("posts");
        assert!(bp.add_column(Column::new("title", ColumnMethod::String)));
        assert!(!bp.add_column(Column::new("title", ColumnMethod::Text)));
        assert_eq!(bp.column("title").unwrap().method, ColumnMethod::String);
    }

    #[test]
    fn test_composite_key_strips_column_markers() {
        let mut bp = TableBlueprint::new("memberships");
        bp.add_column(Column::new("user_id", ColumnMethod::UnsignedBigInteger).primary());
        bp.add_column(Column::new("branch_id", ColumnMethod::UnsignedBigInteger).primary());
        bp.set_primary_key(vec!["user_id".to_string(), "branch_id".to_string()]);

        assert!(bp.has_composite_key());
        assert!(bp.columns.iter().all(|c| !c.is_primary()));
    }

    #[test]
    fn test_single_key_keeps_column_marker() {
        let mut bp = TableBlueprint::new("users");
        bp.add_column(Column::new("id", ColumnMethod::BigIncrements).primary());
        bp.set_primary_key(vec!["id".to_string()]);
        assert!(bp.column("id").unwrap().is_primary());
    }
}
