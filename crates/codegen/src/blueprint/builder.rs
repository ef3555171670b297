//! # Blueprint Builder
//!
//! Converts one entity into a [`TableBlueprint`].
//!
//! ## Pipeline
//!
//! ```text
//! EntityDefinition
//!         │
//!         ├──► primary key column (per strategy)
//!         ├──► scalar / enum / compound columns (declared order)
//!         ├──► FK and polymorphic columns (owning associations)
//!         ├──► composite-key normalization
//!         ├──► timestamps, soft delete
//!         ▼
//!   custom indexes (deduplicated)
//! ```
//!
//! Column synthesis helpers are public so the relationship extractor and
//! the diff engine map properties exactly the way full builds do.

use indexmap::IndexMap;
use migrata_core::{DefaultValue, KeyType, PrimaryKeyStrategy, ReferentialAction, RelationKind};
use migrata_ir::{
    Association, CompoundType, EntityDefinition, FieldOverride, PropertyDefinition,
    ScalarProperty, naming,
};

use super::model::{Column, ColumnMethod, ForeignKey, Index, Modifier, TableBlueprint};
use super::types::{ScalarMapping, TypeHints, map_scalar};
use crate::context::BuildContext;

/// Length of a string column able to hold any key representation
pub const UNIVERSAL_KEY_LENGTH: u32 = 36;

/// Columns, constraints and indexes one association contributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssociationParts {
    pub columns: Vec<Column>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: Vec<Index>,
}

// ============================================================================
// BlueprintBuilder
// ============================================================================

/// Builds table blueprints from entity definitions
#[derive(Debug, Clone, Copy)]
pub struct BlueprintBuilder<'a> {
    ctx: &'a BuildContext<'a>,
}

impl<'a> BlueprintBuilder<'a> {
    pub fn new(ctx: &'a BuildContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &'a BuildContext<'a> {
        self.ctx
    }

    // ====================================================================
    // Entity
    // ====================================================================

    /// Build the blueprint of an entity's own table
    pub fn build(&self, entity: &EntityDefinition) -> TableBlueprint {
        let table = entity.table_name();
        let strategy = entity.primary_key_strategy();
        let mut blueprint = TableBlueprint::new(&table);
        let mut primary_key = Vec::new();

        if let Some(column) = self.primary_key_column(strategy) {
            primary_key.push(column.name.clone());
            blueprint.add_column(column);
        }

        for (name, property) in &entity.properties {
            let columns = self.property_columns(name, property);

            if let (PropertyDefinition::Scalar(scalar), [column]) = (property, columns.as_slice()) {
                if scalar.index {
                    blueprint.add_index(Index::new(&table, [column.name.clone()], false));
                }
            }

            for column in columns {
                self.push_column(&mut blueprint, &mut primary_key, strategy, column);
            }
        }

        for (name, association) in entity.associations() {
            let Some(parts) = self.association_parts(&entity.name, &table, name, association)
            else {
                continue;
            };
            for column in parts.columns {
                self.push_column(&mut blueprint, &mut primary_key, strategy, column);
            }
            for foreign_key in parts.foreign_keys {
                blueprint.add_foreign_key(foreign_key);
            }
            for index in parts.indexes {
                blueprint.add_index(index);
            }
        }

        blueprint.set_primary_key(primary_key);

        if entity.options.timestamps {
            for column in timestamp_columns() {
                blueprint.add_column(column);
            }
        }
        if entity.options.soft_delete {
            blueprint.add_column(soft_delete_column());
        }

        for declared in &entity.options.indexes {
            let columns: Vec<String> = declared
                .columns
                .iter()
                .map(|c| self.physical_column_name(entity, c))
                .collect();
            let mut index = Index::new(&table, columns, declared.unique);
            if let Some(name) = &declared.name {
                index = index.with_name(name);
            }
            blueprint.add_index(index);
        }
        for declared in &entity.options.unique {
            let columns: Vec<String> = declared
                .iter()
                .map(|c| self.physical_column_name(entity, c))
                .collect();
            blueprint.add_index(Index::new(&table, columns, true));
        }

        blueprint
    }

    fn push_column(
        &self,
        blueprint: &mut TableBlueprint,
        primary_key: &mut Vec<String>,
        strategy: PrimaryKeyStrategy,
        column: Column,
    ) {
        let column = if column.is_primary() && strategy != PrimaryKeyStrategy::None {
            tracing::debug!(
                table = %blueprint.table,
                column = %column.name,
                "generated key takes precedence over primary property",
            );
            column.without_primary()
        } else {
            column
        };

        let name = column.name.clone();
        let primary = column.is_primary();
        if blueprint.add_column(column) {
            if primary {
                primary_key.push(name);
            }
        } else {
            tracing::debug!(
                table = %blueprint.table,
                column = %name,
                "column already declared, keeping the first definition",
            );
        }
    }

    // ====================================================================
    // Primary keys
    // ====================================================================

    /// The generated `id` column for a strategy
    pub fn primary_key_column(&self, strategy: PrimaryKeyStrategy) -> Option<Column> {
        let column = match strategy {
            PrimaryKeyStrategy::AutoIncrementInt => Column::new("id", ColumnMethod::Increments),
            PrimaryKeyStrategy::AutoIncrementBigInt => {
                Column::new("id", ColumnMethod::BigIncrements)
            }
            PrimaryKeyStrategy::Uuid => Column::new("id", ColumnMethod::Uuid),
            PrimaryKeyStrategy::String => Column::new("id", ColumnMethod::String)
                .with_length(self.ctx.default_string_length()),
            PrimaryKeyStrategy::None => return None,
        };
        Some(column.primary())
    }

    /// Column referencing a key of the given type
    pub fn key_column(&self, name: impl Into<String>, key: KeyType) -> Column {
        match key {
            KeyType::Int => Column::new(name, ColumnMethod::UnsignedInteger),
            KeyType::BigInt => Column::new(name, ColumnMethod::UnsignedBigInteger),
            KeyType::Uuid => Column::new(name, ColumnMethod::Uuid),
            KeyType::String => Column::new(name, ColumnMethod::String)
                .with_length(self.ctx.default_string_length()),
        }
    }

    /// Column FKs pointing at `entity_name` reference
    pub fn referenced_column(&self, entity_name: &str) -> String {
        let Some(entity) = self.ctx.schema.entity(entity_name) else {
            return "id".to_string();
        };
        if entity.primary_key_strategy() != PrimaryKeyStrategy::None {
            return "id".to_string();
        }
        match entity.primary_properties().as_slice() {
            [single] => self.physical_column_name(entity, single),
            _ => "id".to_string(),
        }
    }

    /// Physical column backing a property name (`author` → `author_id`)
    pub fn physical_column_name(&self, entity: &EntityDefinition, property: &str) -> String {
        match entity.property(property) {
            Some(PropertyDefinition::Association(a)) if a.materializes_column() => {
                naming::foreign_key_column(property)
            }
            Some(PropertyDefinition::Association(a)) if a.relation == RelationKind::MorphTo => {
                format!("{}_id", morph_name(property, a))
            }
            _ => naming::snake_case(property),
        }
    }

    // ====================================================================
    // Plain properties
    // ====================================================================

    /// Columns of a non-association property; empty for associations and
    /// externally stored types
    pub fn property_columns(&self, name: &str, property: &PropertyDefinition) -> Vec<Column> {
        let comment = self.ctx.comment_for(property);
        let schema = self.ctx.schema;

        match property {
            PropertyDefinition::Scalar(scalar) => {
                match schema.compound_types.get(&scalar.type_name) {
                    Some(compound) => self.compound_columns(
                        name,
                        compound,
                        scalar.nullable,
                        &IndexMap::new(),
                        comment.as_deref(),
                    ),
                    None => self
                        .scalar_column(name, scalar, comment.as_deref())
                        .into_iter()
                        .collect(),
                }
            }
            PropertyDefinition::Enum(e) => vec![self.enum_column(
                name,
                e.values.clone(),
                e.nullable,
                e.default.as_ref(),
                comment.as_deref(),
            )],
            PropertyDefinition::EnumRef(r) => match schema.enum_values(&r.enum_name) {
                Some(values) => vec![self.enum_column(
                    name,
                    values.to_vec(),
                    r.nullable,
                    r.default.as_ref(),
                    comment.as_deref(),
                )],
                None => {
                    tracing::debug!(enum_name = %r.enum_name, "unknown enum, using string column");
                    let column = Column::new(naming::snake_case(name), ColumnMethod::String)
                        .with_length(self.ctx.default_string_length());
                    vec![with_common_modifiers(
                        column,
                        r.nullable,
                        r.default.as_ref(),
                        comment.as_deref(),
                    )]
                }
            },
            PropertyDefinition::Compound(c) => match schema.compound_types.get(&c.type_name) {
                Some(compound) => self.compound_columns(
                    name,
                    compound,
                    c.nullable,
                    &c.field_overrides,
                    comment.as_deref(),
                ),
                None => {
                    tracing::debug!(type_name = %c.type_name, "unknown compound type, using string column");
                    let column = Column::new(naming::snake_case(name), ColumnMethod::String)
                        .with_length(self.ctx.default_string_length());
                    vec![with_common_modifiers(column, c.nullable, None, comment.as_deref())]
                }
            },
            PropertyDefinition::Association(_) => Vec::new(),
        }
    }

    fn scalar_column(
        &self,
        name: &str,
        scalar: &ScalarProperty,
        comment: Option<&str>,
    ) -> Option<Column> {
        let hints = TypeHints {
            length: scalar.length,
            precision: scalar.precision,
            scale: scalar.scale,
        };
        let ScalarMapping::Column(method, args) =
            map_scalar(&scalar.type_name, hints, self.ctx.default_string_length())
        else {
            return None;
        };

        let mut column = Column::new(naming::snake_case(name), method).with_args(args);
        if scalar.primary {
            column = column.primary();
        }
        if scalar.nullable {
            column = column.nullable();
        }
        if scalar.unsigned == Some(true) && method.is_numeric() {
            column = column.with_modifier(Modifier::Unsigned);
        }
        if scalar.unique {
            column = column.unique();
        }
        if let Some(default) = &scalar.default {
            column = column.with_modifier(Modifier::Default(default.clone()));
        }
        if let Some(comment) = comment {
            column = column.comment(comment);
        }
        Some(column)
    }

    fn enum_column(
        &self,
        name: &str,
        values: Vec<String>,
        nullable: bool,
        default: Option<&DefaultValue>,
        comment: Option<&str>,
    ) -> Column {
        let column = Column::new(naming::snake_case(name), ColumnMethod::Enum).with_values(values);
        with_common_modifiers(column, nullable, default, comment)
    }

    /// One column per compound field, named `{property}_{suffix}`.
    ///
    /// Nullability: field override, then field default, then the parent.
    fn compound_columns(
        &self,
        name: &str,
        compound: &CompoundType,
        parent_nullable: bool,
        overrides: &IndexMap<String, FieldOverride>,
        comment: Option<&str>,
    ) -> Vec<Column> {
        let prefix = naming::snake_case(name);
        let mut columns = Vec::with_capacity(compound.fields.len());

        for field in &compound.fields {
            let field_override = overrides.get(&field.suffix);
            let column_name = format!("{}_{}", prefix, field.suffix);
            let nullable = field_override
                .and_then(|o| o.nullable)
                .or(field.nullable)
                .unwrap_or(parent_nullable);

            let enum_values = field
                .enum_ref
                .as_deref()
                .and_then(|e| self.ctx.schema.enum_values(e));
            let column = match enum_values {
                Some(values) => {
                    Column::new(column_name, ColumnMethod::Enum).with_values(values.to_vec())
                }
                None => {
                    let type_name = field_override
                        .and_then(|o| o.type_name.as_deref())
                        .unwrap_or(&field.sql_type);
                    let hints = TypeHints {
                        length: field_override.and_then(|o| o.length).or(field.length),
                        precision: field_override.and_then(|o| o.precision).or(field.precision),
                        scale: field_override.and_then(|o| o.scale).or(field.scale),
                    };
                    match map_scalar(type_name, hints, self.ctx.default_string_length()) {
                        ScalarMapping::Column(method, args) => {
                            Column::new(column_name, method).with_args(args)
                        }
                        ScalarMapping::External => continue,
                    }
                }
            };

            let comment = comment.map(|c| format!("{} ({})", c, field.suffix));
            columns.push(with_common_modifiers(column, nullable, None, comment.as_deref()));
        }

        columns
    }

    // ====================================================================
    // Associations
    // ====================================================================

    /// Parts an association adds to its entity's table; `None` for kinds
    /// that materialize nothing here (inverse sides, to-many, morph-many)
    pub fn association_parts(
        &self,
        entity_name: &str,
        table: &str,
        name: &str,
        association: &Association,
    ) -> Option<AssociationParts> {
        match association.relation {
            RelationKind::ManyToOne | RelationKind::OneToOne if !association.is_inverse() => {
                Some(self.foreign_key_parts(table, name, association))
            }
            RelationKind::MorphTo => Some(self.morph_to_parts(entity_name, table, name, association)),
            _ => None,
        }
    }

    fn foreign_key_parts(&self, table: &str, name: &str, association: &Association) -> AssociationParts {
        let schema = self.ctx.schema;
        let target = &association.target;
        if schema.entity(target).is_none() {
            tracing::debug!(
                table,
                target = %target,
                "association target not in schema, deriving table and key from its name",
            );
        }

        let column_name = naming::foreign_key_column(name);
        let mut column = self.key_column(&column_name, schema.key_type_of(target));
        if association.primary {
            column = column.primary();
        }
        if association.is_nullable() {
            column = column.nullable();
        }
        if let Some(text) = &association.display_name {
            if self.ctx.config.include_comments {
                column = column.comment(self.ctx.resolve(text));
            }
        }

        let foreign_key = ForeignKey::new(
            table,
            &column_name,
            schema.table_name_for(target),
            self.referenced_column(target),
        )
        .on_delete(association.on_delete.unwrap_or(ReferentialAction::Restrict))
        .on_update(association.on_update.unwrap_or(ReferentialAction::Cascade));

        AssociationParts {
            indexes: vec![Index::new(table, [column_name], false)],
            columns: vec![column],
            foreign_keys: vec![foreign_key],
        }
    }

    fn morph_to_parts(
        &self,
        entity_name: &str,
        table: &str,
        name: &str,
        association: &Association,
    ) -> AssociationParts {
        let morph = morph_name(name, association);
        let targets = if association.morph_targets.is_empty() {
            self.discover_morph_targets(entity_name, &morph)
        } else {
            association.morph_targets.clone()
        };
        let nullable = association.nullable != Some(false);

        let type_name = format!("{}_type", morph);
        let type_column = if targets.is_empty() {
            tracing::debug!(table, morph = %morph, "no morph targets found, using string type column");
            Column::new(&type_name, ColumnMethod::String)
                .with_length(self.ctx.default_string_length())
        } else {
            Column::new(&type_name, ColumnMethod::Enum).with_values(targets.clone())
        };
        let id_name = format!("{}_id", morph);
        let id_column = self.polymorphic_id_column(&id_name, &targets);

        let (type_column, id_column) = if nullable {
            (type_column.nullable(), id_column.nullable())
        } else {
            (type_column, id_column)
        };

        AssociationParts {
            columns: vec![type_column, id_column],
            foreign_keys: Vec::new(),
            indexes: vec![Index::new(table, [type_name, id_name], false)],
        }
    }

    /// Id column able to reference every target: the shared key type when
    /// uniform, a 36-character string when mixed
    pub fn polymorphic_id_column(&self, name: &str, targets: &[String]) -> Column {
        let schema = self.ctx.schema;
        let mut keys = targets.iter().map(|t| schema.key_type_of(t));
        let first = keys.next().unwrap_or_default();

        if keys.all(|k| k == first) {
            match first {
                KeyType::Uuid => {
                    Column::new(name, ColumnMethod::String).with_length(UNIVERSAL_KEY_LENGTH)
                }
                KeyType::Int => Column::new(name, ColumnMethod::UnsignedInteger),
                KeyType::BigInt => Column::new(name, ColumnMethod::UnsignedBigInteger),
                KeyType::String => Column::new(name, ColumnMethod::String)
                    .with_length(self.ctx.default_string_length()),
            }
        } else {
            Column::new(name, ColumnMethod::String).with_length(UNIVERSAL_KEY_LENGTH)
        }
    }

    /// Entities declaring a morph-one/many to `owner` under `morph`
    fn discover_morph_targets(&self, owner: &str, morph: &str) -> Vec<String> {
        let mut targets: Vec<String> = Vec::new();
        for entity in self.ctx.schema.entities.values() {
            let declares = entity.associations().any(|(_, a)| {
                matches!(a.relation, RelationKind::MorphOne | RelationKind::MorphMany)
                    && a.target == owner
                    && a.morph_name
                        .as_deref()
                        .is_none_or(|m| naming::snake_case(m) == morph)
            });
            if declares && !targets.contains(&entity.name) {
                targets.push(entity.name.clone());
            }
        }
        targets
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Polymorphic relation name for a morph association
pub fn morph_name(property: &str, association: &Association) -> String {
    naming::snake_case(association.morph_name.as_deref().unwrap_or(property))
}

/// `created_at` / `updated_at`
pub fn timestamp_columns() -> [Column; 2] {
    [
        Column::new("created_at", ColumnMethod::Timestamp).nullable(),
        Column::new("updated_at", ColumnMethod::Timestamp).nullable(),
    ]
}

/// `deleted_at`
pub fn soft_delete_column() -> Column {
    Column::new("deleted_at", ColumnMethod::Timestamp).nullable()
}

fn with_common_modifiers(
    mut column: Column,
    nullable: bool,
    default: Option<&DefaultValue>,
    comment: Option<&str>,
) -> Column {
    if nullable {
        column = column.nullable();
    }
    if let Some(default) = default {
        column = column.with_modifier(Modifier::Default(default.clone()));
    }
    if let Some(comment) = comment {
        column = column.comment(comment);
    }
    column
}

// ============================================================================
// Tests
// ============================================================================
