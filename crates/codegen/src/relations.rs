//! # Relationship Extractor
//!
//! Derives the join tables implied by many-to-many and polymorphic
//! many-to-many associations.
//!
//! Only one side of a relationship may emit a pivot. Which side owns it
//! is decided by [`OWNERSHIP_RULES`], an ordered list where the first rule
//! with an opinion wins:
//!
//! | # | Rule | Decision |
//! |---|------|----------|
//! | 1 | `explicit_flag` | `owning` on this side, or the negation of the counterpart's |
//! | 2 | `inverse_side` | `mapped_by` on this side never owns |
//! | 3 | `pivot_fields` | the side declaring pivot fields owns |
//! | 4 | `counterpart_mapped_by` | counterpart maps back to this property |
//! | 5 | `alphabetical` | earlier entity name owns |
//!
//! Entities explicitly declared as the join entity for a pair suppress the
//! derived pivot; they are built like any other entity.

use indexmap::IndexMap;
use migrata_core::{ReferentialAction, RelationKind};
use migrata_ir::{Association, EntityDefinition, PropertyDefinition, Schema, naming};
use serde::{Deserialize, Serialize};

use crate::blueprint::{
    BlueprintBuilder, Column, ColumnMethod, ForeignKey, Index, TableBlueprint, timestamp_columns,
};

// ============================================================================
// Ownership
// ============================================================================

/// Inputs to an ownership decision for one many-to-many property
#[derive(Debug, Clone, Copy)]
pub struct OwnershipQuery<'a> {
    pub entity: &'a str,
    pub property: &'a str,
    pub association: &'a Association,
    /// Matching association on the target pointing back, with its name
    pub counterpart: Option<(&'a str, &'a Association)>,
}

/// One step of the ownership priority chain
#[derive(Debug, Clone, Copy)]
pub struct OwnershipRule {
    pub name: &'static str,
    pub decide: fn(&OwnershipQuery<'_>) -> Option<bool>,
}

/// Ownership rules in priority order
pub const OWNERSHIP_RULES: &[OwnershipRule] = &[
    OwnershipRule {
        name: "explicit_flag",
        decide: explicit_flag,
    },
    OwnershipRule {
        name: "inverse_side",
        decide: inverse_side,
    },
    OwnershipRule {
        name: "pivot_fields",
        decide: pivot_fields,
    },
    OwnershipRule {
        name: "counterpart_mapped_by",
        decide: counterpart_mapped_by,
    },
    OwnershipRule {
        name: "one_sided",
        decide: one_sided,
    },
    OwnershipRule {
        name: "alphabetical",
        decide: alphabetical,
    },
];

fn explicit_flag(query: &OwnershipQuery<'_>) -> Option<bool> {
    query
        .association
        .owning
        .or_else(|| query.counterpart.and_then(|(_, c)| c.owning.map(|owning| !owning)))
}

fn inverse_side(query: &OwnershipQuery<'_>) -> Option<bool> {
    query.association.is_inverse().then_some(false)
}

fn pivot_fields(query: &OwnershipQuery<'_>) -> Option<bool> {
    if !query.association.pivot_fields.is_empty() {
        return Some(true);
    }
    match query.counterpart {
        Some((_, c)) if !c.pivot_fields.is_empty() => Some(false),
        _ => None,
    }
}

fn counterpart_mapped_by(query: &OwnershipQuery<'_>) -> Option<bool> {
    let (_, counterpart) = query.counterpart?;
    (counterpart.mapped_by.as_deref() == Some(query.property)).then_some(true)
}

/// Without a reciprocal association no other side can emit the pivot
fn one_sided(query: &OwnershipQuery<'_>) -> Option<bool> {
    query.counterpart.is_none().then_some(true)
}

fn alphabetical(query: &OwnershipQuery<'_>) -> Option<bool> {
    let target = query.association.target.as_str();
    if query.entity != target {
        return Some(query.entity < target);
    }
    // self-reference: compare property names
    match query.counterpart {
        Some((other, _)) => Some(query.property <= other),
        None => Some(true),
    }
}

/// Apply [`OWNERSHIP_RULES`]; a query no rule decides is owned
pub fn resolve_ownership(query: &OwnershipQuery<'_>) -> bool {
    for rule in OWNERSHIP_RULES {
        if let Some(owning) = (rule.decide)(query) {
            tracing::debug!(
                entity = query.entity,
                property = query.property,
                rule = rule.name,
                owning,
                "ownership resolved",
            );
            return owning;
        }
    }
    true
}

/// Find the association on the target that describes the same relation
fn find_counterpart<'a>(
    entity: &EntityDefinition,
    property: &str,
    association: &Association,
    schema: &'a Schema,
) -> Option<(&'a str, &'a Association)> {
    let target = schema.entity(&association.target)?;
    let self_reference = target.name == entity.name;
    let points_back = |name: &str, a: &Association| {
        a.relation == association.relation
            && a.target == entity.name
            && !(self_reference && name == property)
    };

    if let Some(named) = association
        .mapped_by
        .as_deref()
        .or(association.inversed_by.as_deref())
    {
        if let Some(PropertyDefinition::Association(a)) = target.property(named) {
            if points_back(named, a) {
                return target
                    .properties
                    .get_key_value(named)
                    .map(|(k, _)| (k.as_str(), a));
            }
        }
    }

    let mut candidates = target
        .associations()
        .filter(|(name, a)| points_back(*name, *a));
    let referencing = target.associations().find(|(name, a)| {
        points_back(*name, *a)
            && (a.mapped_by.as_deref() == Some(property)
                || a.inversed_by.as_deref() == Some(property))
    });

    referencing.or_else(|| {
        candidates.find(|(_, a)| a.mapped_by.is_none() && a.inversed_by.is_none())
    })
}

// ============================================================================
// Many-to-many
// ============================================================================

/// A derived join table for one many-to-many relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotTableInfo {
    pub table: String,

    /// Owning entity and property
    pub owner: String,
    pub property: String,

    pub target: String,

    /// Column referencing the owner
    pub local_column: String,

    /// Column referencing the target
    pub foreign_column: String,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub pivot_fields: IndexMap<String, PropertyDefinition>,

    pub on_delete: ReferentialAction,
    pub on_update: ReferentialAction,
}

impl PivotTableInfo {
    /// Tables this pivot references
    pub fn referenced_entities(&self) -> [&str; 2] {
        [self.owner.as_str(), self.target.as_str()]
    }

    /// Two key columns, pivot fields, optional timestamps, cascading FKs,
    /// a pair-unique index and a composite primary key
    pub fn blueprint(&self, builder: &BlueprintBuilder<'_>) -> TableBlueprint {
        let ctx = builder.context();
        let schema = ctx.schema;
        let mut blueprint = TableBlueprint::new(&self.table);

        blueprint.add_column(
            builder.key_column(&self.local_column, schema.key_type_of(&self.owner)),
        );
        blueprint.add_column(
            builder.key_column(&self.foreign_column, schema.key_type_of(&self.target)),
        );

        for (name, field) in &self.pivot_fields {
            for column in builder.property_columns(name, field) {
                blueprint.add_column(column.without_primary());
            }
        }
        if ctx.config.pivot_timestamps {
            for column in timestamp_columns() {
                blueprint.add_column(column);
            }
        }

        for (column, entity) in [
            (&self.local_column, &self.owner),
            (&self.foreign_column, &self.target),
        ] {
            blueprint.add_foreign_key(
                ForeignKey::new(
                    &self.table,
                    column,
                    schema.table_name_for(entity),
                    builder.referenced_column(entity),
                )
                .on_delete(self.on_delete)
                .on_update(self.on_update),
            );
        }

        let pair = vec![self.local_column.clone(), self.foreign_column.clone()];
        blueprint.add_index(Index::new(&self.table, pair.clone(), true));
        blueprint.add_index(Index::new(&self.table, [self.local_column.clone()], false));
        blueprint.add_index(Index::new(&self.table, [self.foreign_column.clone()], false));
        blueprint.set_primary_key(pair);

        blueprint
    }
}

/// Pivots owned by `entity`, in property order
pub fn extract_many_to_many(entity: &EntityDefinition, schema: &Schema) -> Vec<PivotTableInfo> {
    let mut pivots: Vec<PivotTableInfo> = Vec::new();

    for (name, association) in entity.associations() {
        if association.relation != RelationKind::ManyToMany {
            continue;
        }

        let counterpart = find_counterpart(entity, name, association, schema);
        let query = OwnershipQuery {
            entity: &entity.name,
            property: name,
            association,
            counterpart,
        };
        if !resolve_ownership(&query) {
            continue;
        }

        if let Some(explicit) = schema.explicit_pivot_for(&entity.name, &association.target) {
            tracing::debug!(
                entity = %entity.name,
                property = name,
                pivot = %explicit.name,
                "explicit join entity declared, skipping derived pivot",
            );
            continue;
        }

        let table = association
            .join_table
            .clone()
            .or_else(|| counterpart.and_then(|(_, c)| c.join_table.clone()))
            .unwrap_or_else(|| {
                naming::pivot_table_name(
                    &entity.table_name(),
                    &schema.table_name_for(&association.target),
                )
            });

        if let Some(existing) = schema.entities.values().find(|e| e.table_name() == table) {
            tracing::debug!(
                table = %table,
                entity = %existing.name,
                "an entity already owns the pivot table name, skipping derived pivot",
            );
            continue;
        }
        if pivots.iter().any(|p| p.table == table) {
            continue;
        }

        let local_column = naming::foreign_key_column(&entity.name);
        let mut foreign_column = naming::foreign_key_column(&association.target);
        if foreign_column == local_column {
            foreign_column = naming::foreign_key_column(&naming::singularize(&naming::snake_case(name)));
            if foreign_column == local_column {
                foreign_column = format!("related_{}", local_column);
            }
        }

        pivots.push(PivotTableInfo {
            table,
            owner: entity.name.clone(),
            property: name.to_string(),
            target: association.target.clone(),
            local_column,
            foreign_column,
            pivot_fields: association.pivot_fields.clone(),
            on_delete: association.on_delete.unwrap_or(ReferentialAction::Cascade),
            on_update: association.on_update.unwrap_or(ReferentialAction::Cascade),
        });
    }

    pivots
}

// ============================================================================
// Polymorphic many-to-many
// ============================================================================

/// A derived polymorphic join table: one FK to the fixed target plus a
/// type/id pair over every declaring entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolymorphicPivotInfo {
    pub table: String,
    pub morph_name: String,

    /// Fixed side of the relation
    pub target: String,

    /// Entities declaring the relation, in schema order
    pub declarers: Vec<String>,

    pub target_column: String,

    pub on_delete: ReferentialAction,
    pub on_update: ReferentialAction,
}

impl PolymorphicPivotInfo {
    pub fn type_column(&self) -> String {
        format!("{}_type", self.morph_name)
    }

    pub fn id_column(&self) -> String {
        format!("{}_id", self.morph_name)
    }

    pub fn blueprint(&self, builder: &BlueprintBuilder<'_>) -> TableBlueprint {
        let schema = builder.context().schema;
        let mut blueprint = TableBlueprint::new(&self.table);
        let type_column = self.type_column();
        let id_column = self.id_column();

        blueprint.add_column(
            builder.key_column(&self.target_column, schema.key_type_of(&self.target)),
        );
        blueprint.add_column(
            Column::new(&type_column, ColumnMethod::Enum).with_values(self.declarers.clone()),
        );
        blueprint.add_column(builder.polymorphic_id_column(&id_column, &self.declarers));

        blueprint.add_foreign_key(
            ForeignKey::new(
                &self.table,
                &self.target_column,
                schema.table_name_for(&self.target),
                builder.referenced_column(&self.target),
            )
            .on_delete(self.on_delete)
            .on_update(self.on_update),
        );

        blueprint.add_index(Index::new(
            &self.table,
            [self.target_column.clone(), type_column.clone(), id_column.clone()],
            true,
        ));
        blueprint.add_index(Index::new(&self.table, [type_column, id_column], false));
        blueprint.add_index(Index::new(&self.table, [self.target_column.clone()], false));

        blueprint
    }
}

/// Polymorphic pivots owned by `entity`.
///
/// Declarers are discovered by scanning the schema for owning morph-to-many
/// associations with the same target and morph name; the owner is the
/// declarer flagged `owning`, else the alphabetically first one.
pub fn extract_morph_to_many(
    entity: &EntityDefinition,
    schema: &Schema,
) -> Vec<PolymorphicPivotInfo> {
    let mut pivots: Vec<PolymorphicPivotInfo> = Vec::new();

    for (name, association) in entity.associations() {
        if association.relation != RelationKind::MorphToMany || association.is_inverse() {
            continue;
        }

        let morph = morph_many_name(association);
        let mut declarers: Vec<&EntityDefinition> = Vec::new();
        let mut flagged: Option<&str> = None;
        for candidate in schema.entities.values() {
            let declared = candidate.associations().find(|(_, a)| {
                a.relation == RelationKind::MorphToMany
                    && !a.is_inverse()
                    && a.target == association.target
                    && morph_many_name(a) == morph
            });
            if let Some((_, a)) = declared {
                if a.owning == Some(true) && flagged.is_none() {
                    flagged = Some(&candidate.name);
                }
                declarers.push(candidate);
            }
        }

        let owner = flagged.or_else(|| declarers.iter().map(|e| e.name.as_str()).min());
        if owner != Some(entity.name.as_str()) {
            tracing::debug!(
                entity = %entity.name,
                property = name,
                owner = ?owner,
                "polymorphic pivot owned by another declarer",
            );
            continue;
        }

        let table = association
            .join_table
            .clone()
            .unwrap_or_else(|| naming::pluralize(&morph));
        if pivots.iter().any(|p| p.table == table) {
            continue;
        }

        pivots.push(PolymorphicPivotInfo {
            table,
            target_column: naming::foreign_key_column(&association.target),
            morph_name: morph,
            target: association.target.clone(),
            declarers: declarers.iter().map(|e| e.name.clone()).collect(),
            on_delete: association.on_delete.unwrap_or(ReferentialAction::Cascade),
            on_update: association.on_update.unwrap_or(ReferentialAction::Cascade),
        });
    }

    pivots
}

/// `tag` + `able` unless a morph name is declared
fn morph_many_name(association: &Association) -> String {
    match &association.morph_name {
        Some(name) => naming::snake_case(name),
        None => format!("{}able", naming::snake_case(&association.target)),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeneratorConfig;
    use crate::context::BuildContext;
    use migrata_core::PrimaryKeyStrategy;
    use migrata_ir::{EntityOptions, ScalarProperty};
    use pretty_assertions::assert_eq;

    fn pivots(schema: &Schema) -> Vec<PivotTableInfo> {
        schema
            .entities
            .values()
            .flat_map(|e| extract_many_to_many(e, schema))
            .collect()
    }

    fn query<'a>(entity: &'a str, property: &'a str, association: &'a Association) -> OwnershipQuery<'a> {
        OwnershipQuery {
            entity,
            property,
            association,
            counterpart: None,
        }
    }

    #[test]
    fn test_rule_order() {
        let names: Vec<&str> = OWNERSHIP_RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "explicit_flag",
                "inverse_side",
                "pivot_fields",
                "counterpart_mapped_by",
                "one_sided",
                "alphabetical"
            ]
        );
    }

    #[test]
    fn test_explicit_flag_beats_alphabetical() {
        let association = Association::many_to_many("Branch").owning(true);
        assert!(resolve_ownership(&query("User", "branches", &association)));

        let association = Association::many_to_many("User").owning(false);
        assert!(!resolve_ownership(&query("Branch", "users", &association)));
    }

    #[test]
    fn test_counterpart_flag_is_negated() {
        let counterpart = Association::many_to_many("Branch").owning(true);
        let association = Association::many_to_many("User");
        let q = OwnershipQuery {
            counterpart: Some(("branches", &counterpart)),
            ..query("Branch", "users", &association)
        };
        assert_eq!(explicit_flag(&q), Some(false));
        assert!(!resolve_ownership(&q));
    }

    #[test]
    fn test_pivot_fields_imply_ownership() {
        let association = Association::many_to_many("Branch")
            .with_pivot_field("role", ScalarProperty::new("string"));
        let q = query("User", "branches", &association);
        assert_eq!(alphabetical(&q), Some(false));
        assert!(resolve_ownership(&q));

        let plain = Association::many_to_many("User");
        let q = OwnershipQuery {
            counterpart: Some(("branches", &association)),
            ..query("Branch", "users", &plain)
        };
        assert!(!resolve_ownership(&q));
    }

    #[test]
    fn test_counterpart_mapped_by() {
        let counterpart = Association::many_to_many("Tag").mapped_by("tags");
        let association = Association::many_to_many("Post");
        let q = OwnershipQuery {
            counterpart: Some(("posts", &counterpart)),
            ..query("Tag", "tags", &association)
        };
        assert_eq!(counterpart_mapped_by(&q), Some(true));
        assert!(resolve_ownership(&q));
    }

    #[test]
    fn test_alphabetical_fallback() {
        let users = Association::many_to_many("User");
        let branches = Association::many_to_many("Branch");

        let q = OwnershipQuery {
            counterpart: Some(("branches", &branches)),
            ..query("Branch", "users", &users)
        };
        assert!(resolve_ownership(&q));

        let q = OwnershipQuery {
            counterpart: Some(("users", &users)),
            ..query("User", "branches", &branches)
        };
        assert!(!resolve_ownership(&q));
    }

    #[test]
    fn test_one_sided_relation_owns() {
        let association = Association::many_to_many("Animal");
        let q = query("Zoo", "animals", &association);
        assert_eq!(alphabetical(&q), Some(false));
        assert_eq!(one_sided(&q), Some(true));
        assert!(resolve_ownership(&q));
    }

    #[test]
    fn test_pivot_for_undeclared_target() {
        let schema = Schema::new().with_entity(
            EntityDefinition::new("Zoo")
                .with_property("animals", Association::many_to_many("Animal")),
        );

        let found = pivots(&schema);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].table, "animal_zoo");
        assert_eq!(found[0].owner, "Zoo");
        assert_eq!(found[0].local_column, "zoo_id");
        assert_eq!(found[0].foreign_column, "animal_id");
    }

    #[test]
    fn test_pivot_for_target_without_back_reference() {
        let schema = Schema::new()
            .with_entity(
                EntityDefinition::new("Zoo")
                    .with_property("animals", Association::many_to_many("Animal")),
            )
            .with_entity(EntityDefinition::new("Animal"));

        let found = pivots(&schema);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].owner, "Zoo");
    }

    #[test]
    fn test_single_pivot_for_bidirectional_relation() {
        let schema = Schema::new()
            .with_entity(
                EntityDefinition::new("User")
                    .with_property("branches", Association::many_to_many("Branch")),
            )
            .with_entity(
                EntityDefinition::new("Branch")
                    .with_property("users", Association::many_to_many("User")),
            );

        let found = pivots(&schema);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].table, "branch_user");
        assert_eq!(found[0].owner, "Branch");
        assert_eq!(found[0].local_column, "branch_id");
        assert_eq!(found[0].foreign_column, "user_id");
    }

    #[test]
    fn test_later_entity_with_pivot_fields_owns() {
        let schema = Schema::new()
            .with_entity(EntityDefinition::new("Branch").with_property(
                "users",
                Association::many_to_many("User").inversed_by("branches"),
            ))
            .with_entity(EntityDefinition::new("User").with_property(
                "branches",
                Association::many_to_many("Branch")
                    .with_pivot_field("role", ScalarProperty::new("string").nullable()),
            ));

        let found = pivots(&schema);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].owner, "User");
        assert_eq!(found[0].table, "branch_user");
        assert!(found[0].pivot_fields.contains_key("role"));
    }

    #[test]
    fn test_inverse_side_emits_nothing() {
        let schema = Schema::new()
            .with_entity(
                EntityDefinition::new("Post")
                    .with_property("tags", Association::many_to_many("Tag")),
            )
            .with_entity(
                EntityDefinition::new("Tag")
                    .with_property("posts", Association::many_to_many("Post").mapped_by("tags")),
            );

        let found = pivots(&schema);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].table, "post_tag");
        assert_eq!(found[0].owner, "Post");
    }

    #[test]
    fn test_join_table_override() {
        let schema = Schema::new().with_entity(EntityDefinition::new("Role")).with_entity(
            EntityDefinition::new("Account").with_property(
                "roles",
                Association::many_to_many("Role").with_join_table("account_role_assignments"),
            ),
        );
        assert_eq!(pivots(&schema)[0].table, "account_role_assignments");
    }

    #[test]
    fn test_explicit_pivot_entity_suppresses_derivation() {
        let schema = Schema::new()
            .with_entity(EntityDefinition::new("User").with_property(
                "branches",
                Association::many_to_many("Branch").owning(true),
            ))
            .with_entity(EntityDefinition::new("Branch"))
            .with_entity(
                EntityDefinition::new("Membership").with_options(
                    EntityOptions::default()
                        .with_table("branch_memberships")
                        .pivot_for("Branch", "User"),
                ),
            );
        assert!(pivots(&schema).is_empty());
    }

    #[test]
    fn test_entity_with_same_table_name_suppresses_derivation() {
        let schema = Schema::new()
            .with_entity(
                EntityDefinition::new("Post")
                    .with_property("tags", Association::many_to_many("Tag")),
            )
            .with_entity(EntityDefinition::new("Tag"))
            .with_entity(
                EntityDefinition::new("PostTag")
                    .with_options(EntityOptions::default().with_table("post_tag")),
            );
        assert!(pivots(&schema).is_empty());
    }

    #[test]
    fn test_self_referential_pivot_columns() {
        let schema = Schema::new().with_entity(
            EntityDefinition::new("User")
                .with_property("friends", Association::many_to_many("User")),
        );
        let found = pivots(&schema);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].table, "user_user");
        assert_eq!(found[0].local_column, "user_id");
        assert_eq!(found[0].foreign_column, "friend_id");
    }

    #[test]
    fn test_pivot_blueprint() {
        let schema = Schema::new()
            .with_entity(
                EntityDefinition::new("User").with_options(
                    EntityOptions::default().with_primary_key(PrimaryKeyStrategy::Uuid),
                ),
            )
            .with_entity(EntityDefinition::new("Branch").with_property(
                "users",
                Association::many_to_many("User")
                    .on_delete(ReferentialAction::Restrict)
                    .with_pivot_field("since", ScalarProperty::new("date")),
            ));
        let config = GeneratorConfig::default();
        let ctx = BuildContext::new(&schema, &config);
        let builder = BlueprintBuilder::new(&ctx);

        let info = &pivots(&schema)[0];
        let bp = info.blueprint(&builder);

        assert_eq!(
            bp.column_names(),
            vec!["branch_id", "user_id", "since", "created_at", "updated_at"]
        );
        assert_eq!(
            bp.column("branch_id").unwrap().method,
            ColumnMethod::UnsignedBigInteger
        );
        assert_eq!(bp.column("user_id").unwrap().method, ColumnMethod::Uuid);
        assert_eq!(bp.primary_key, vec!["branch_id", "user_id"]);

        assert_eq!(bp.foreign_keys.len(), 2);
        assert_eq!(bp.foreign_keys[0].references_table, "branches");
        assert_eq!(bp.foreign_keys[1].references_table, "users");
        assert!(bp.foreign_keys.iter().all(|fk| fk.on_delete == ReferentialAction::Restrict));
        assert!(bp.foreign_keys.iter().all(|fk| fk.on_update == ReferentialAction::Cascade));

        let indexes: Vec<(&str, bool)> =
            bp.indexes.iter().map(|i| (i.name.as_str(), i.unique)).collect();
        assert_eq!(
            indexes,
            vec![
                ("branch_user_branch_id_user_id_unique", true),
                ("branch_user_branch_id_index", false),
                ("branch_user_user_id_index", false),
            ]
        );
    }

    #[test]
    fn test_pivot_without_timestamps() {
        let schema = Schema::new().with_entity(EntityDefinition::new("Tag")).with_entity(
            EntityDefinition::new("Post").with_property("tags", Association::many_to_many("Tag")),
        );
        let config = GeneratorConfig::new().without_pivot_timestamps();
        let ctx = BuildContext::new(&schema, &config);
        let bp = pivots(&schema)[0].blueprint(&BlueprintBuilder::new(&ctx));
        assert_eq!(bp.column_names(), vec!["post_id", "tag_id"]);
    }

    fn taggable_schema() -> Schema {
        Schema::new()
            .with_entity(EntityDefinition::new("Tag"))
            .with_entity(
                EntityDefinition::new("Video").with_options(
                    EntityOptions::default().with_primary_key(PrimaryKeyStrategy::Uuid),
                )
                .with_property(
                    "tags",
                    Association::new(RelationKind::MorphToMany, "Tag").with_morph_name("taggable"),
                ),
            )
            .with_entity(EntityDefinition::new("Post").with_property(
                "tags",
                Association::new(RelationKind::MorphToMany, "Tag").with_morph_name("taggable"),
            ))
            .with_entity(EntityDefinition::new("Image").with_property(
                "labels",
                Association::new(RelationKind::MorphToMany, "Tag"),
            ))
    }

    #[test]
    fn test_morph_to_many_owner_and_declarers() {
        let schema = taggable_schema();
        let video = extract_morph_to_many(schema.entity("Video").unwrap(), &schema);
        let post = extract_morph_to_many(schema.entity("Post").unwrap(), &schema);
        let image = extract_morph_to_many(schema.entity("Image").unwrap(), &schema);

        assert!(video.is_empty());
        assert_eq!(post.len(), 1);
        assert_eq!(post[0].table, "taggables");
        assert_eq!(post[0].declarers, vec!["Video", "Post"]);
        assert_eq!(post[0].target_column, "tag_id");

        assert_eq!(image.len(), 1);
        assert_eq!(image[0].morph_name, "tagable");
        assert_eq!(image[0].declarers, vec!["Image"]);
    }

    #[test]
    fn test_morph_to_many_explicit_owner() {
        let schema = Schema::new()
            .with_entity(EntityDefinition::new("Tag"))
            .with_entity(EntityDefinition::new("Article").with_property(
                "tags",
                Association::new(RelationKind::MorphToMany, "Tag").with_morph_name("taggable"),
            ))
            .with_entity(EntityDefinition::new("Video").with_property(
                "tags",
                Association::new(RelationKind::MorphToMany, "Tag")
                    .with_morph_name("taggable")
                    .owning(true),
            ));
        assert!(extract_morph_to_many(schema.entity("Article").unwrap(), &schema).is_empty());
        assert_eq!(
            extract_morph_to_many(schema.entity("Video").unwrap(), &schema).len(),
            1
        );
    }

    #[test]
    fn test_morph_to_many_blueprint() {
        let schema = taggable_schema();
        let config = GeneratorConfig::default();
        let ctx = BuildContext::new(&schema, &config);
        let info = &extract_morph_to_many(schema.entity("Post").unwrap(), &schema)[0];
        let bp = info.blueprint(&BlueprintBuilder::new(&ctx));

        assert_eq!(bp.column_names(), vec!["tag_id", "taggable_type", "taggable_id"]);
        assert_eq!(bp.column("taggable_type").unwrap().args.values, vec!["Video", "Post"]);

        // Video has uuid keys, Post bigint
        let id = bp.column("taggable_id").unwrap();
        assert_eq!(id.method, ColumnMethod::String);
        assert_eq!(id.args.length, Some(36));

        assert!(bp.primary_key.is_empty());
        assert_eq!(bp.foreign_keys[0].references_table, "tags");
        let indexes: Vec<(Vec<&str>, bool)> = bp
            .indexes
            .iter()
            .map(|i| (i.columns.iter().map(String::as_str).collect(), i.unique))
            .collect();
        assert_eq!(
            indexes,
            vec![
                (vec!["tag_id", "taggable_type", "taggable_id"], true),
                (vec!["taggable_type", "taggable_id"], false),
                (vec!["tag_id"], false),
            ]
        );
    }
}
