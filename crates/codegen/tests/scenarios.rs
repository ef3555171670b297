//! End-to-end scenarios over the public engine API

use migrata_codegen::{
    BlueprintBuilder, BuildContext, ColumnMethod, DiffEngine, Generator, GeneratorConfig,
    MigrationPlan, MigrationTimestamp, Modifier, Operation, TableKind,
};
use migrata_ir::{
    Association, ColumnChange, EntityDefinition, EntityOptions, IndexChange, IndexDefinition,
    OptionChanges, PrimaryKeyStrategy, ScalarProperty, Schema, SchemaChange, Transition,
    load_schema_from_str, naming,
};
use pretty_assertions::assert_eq;

fn generator() -> Generator {
    Generator::new(
        GeneratorConfig::new()
            .with_base_timestamp(MigrationTimestamp::parse("2024_06_01_120000").unwrap()),
    )
}

fn assert_topologically_valid(plan: &MigrationPlan) {
    for table in &plan.tables {
        for fk in &table.blueprint.foreign_keys {
            if fk.references_table == table.table {
                continue;
            }
            if let Some(referenced) = plan.position(&fk.references_table) {
                let dependent = plan.position(&table.table).unwrap();
                assert!(
                    referenced < dependent,
                    "{} must come before {}",
                    fk.references_table,
                    table.table
                );
            }
        }
    }
}

fn shop() -> Schema {
    load_schema_from_str(
        r#"{
        "enums": {"order_status": ["pending", "paid", "shipped"]},
        "entities": {
            "OrderLine": {
                "properties": {
                    "order": {"kind": "association", "relation": "many_to_one", "target": "Order", "on_delete": "cascade"},
                    "product": {"kind": "association", "relation": "many_to_one", "target": "Product"},
                    "quantity": {"kind": "scalar", "type": "integer", "default": 1}
                }
            },
            "Order": {
                "properties": {
                    "customer": {"kind": "association", "relation": "many_to_one", "target": "Customer"},
                    "status": {"kind": "enum_ref", "enum": "order_status", "default": "pending"},
                    "total": {"kind": "compound", "type": "money"},
                    "lines": {"kind": "association", "relation": "one_to_many", "target": "OrderLine", "mapped_by": "order"}
                },
                "options": {"soft_delete": true}
            },
            "Product": {
                "properties": {
                    "sku": {"kind": "scalar", "type": "string", "length": 64, "unique": true},
                    "categories": {"kind": "association", "relation": "many_to_many", "target": "Category"}
                },
                "options": {"primary_key": "uuid"}
            },
            "Category": {
                "properties": {
                    "parent": {"kind": "association", "relation": "many_to_one", "target": "Category", "nullable": true},
                    "products": {"kind": "association", "relation": "many_to_many", "target": "Product", "mapped_by": "categories"}
                }
            },
            "Customer": {
                "properties": {
                    "email": {"kind": "scalar", "type": "email", "unique": true}
                }
            }
        }
    }"#,
    )
    .unwrap()
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_shop_plan_is_topologically_valid() {
    let plan = generator().plan(&shop());

    assert_topologically_valid(&plan);
    assert_eq!(plan.tables.len(), 6);
    assert_eq!(plan.count(TableKind::Pivot), 1);
    assert!(plan.table("category_product").is_some());
    assert!(!plan.has_warnings(), "{:?}", plan.warnings);
}

#[test]
fn test_plan_is_deterministic() {
    let first = generator().plan(&shop());
    let second = generator().plan(&shop());

    assert_eq!(first.file_stems(), second.file_stems());
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_timestamps_step_one_second_with_carry() {
    let generator = Generator::new(
        GeneratorConfig::new()
            .with_base_timestamp(MigrationTimestamp::parse("2024_12_31_235958").unwrap()),
    );
    let plan = generator.plan(&shop());
    let stamps: Vec<String> = plan.tables.iter().map(|t| t.timestamp.to_string()).collect();

    assert_eq!(stamps[0], "2024_12_31_235958");
    assert_eq!(stamps[1], "2024_12_31_235959");
    assert_eq!(stamps[2], "2025_01_01_000000");
    assert_eq!(stamps[5], "2025_01_01_000003");
}

#[test]
fn test_timestamp_successor() {
    let ts = MigrationTimestamp::parse("2024_12_31_235959").unwrap();
    assert_eq!(ts.plus_seconds(1).to_string(), "2025_01_01_000000");
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_self_reference_produces_one_table() {
    let schema = Schema::new().with_entity(
        EntityDefinition::new("Category")
            .with_property("name", ScalarProperty::new("string"))
            .with_property("parent", Association::many_to_one("Category").nullable(true)),
    );
    let plan = generator().plan(&schema);

    assert_eq!(plan.table_names(), vec!["categories"]);
    let parent = plan.tables[0].blueprint.column("parent_id").unwrap();
    assert!(parent.is_nullable());
    assert_eq!(plan.tables[0].blueprint.foreign_keys[0].references_table, "categories");
}

#[test]
fn test_mutual_cycle_produces_both_tables() {
    let schema = Schema::new()
        .with_entity(
            EntityDefinition::new("Employee")
                .with_property("department", Association::many_to_one("Department").nullable(true)),
        )
        .with_entity(
            EntityDefinition::new("Department")
                .with_property("manager", Association::many_to_one("Employee").nullable(true)),
        );

    let first = generator().plan(&schema);
    let second = generator().plan(&schema);

    assert_eq!(first.table_names(), vec!["employees", "departments"]);
    assert_eq!(first.table_names(), second.table_names());
}

#[test]
fn test_explicit_pivot_override() {
    let schema = Schema::new()
        .with_entity(
            EntityDefinition::new("User")
                .with_property("branches", Association::many_to_many("Branch")),
        )
        .with_entity(
            EntityDefinition::new("Branch")
                .with_property("users", Association::many_to_many("User").mapped_by("branches")),
        )
        .with_entity(
            EntityDefinition::new("BranchMembership")
                .with_property("user", Association::many_to_one("User").primary())
                .with_property("branch", Association::many_to_one("Branch").primary())
                .with_property("role", ScalarProperty::new("string"))
                .with_options(
                    EntityOptions::default()
                        .with_table("branch_staff")
                        .with_primary_key(PrimaryKeyStrategy::None)
                        .pivot_for("User", "Branch"),
                ),
        );
    let plan = generator().plan(&schema);

    assert_eq!(plan.table_names(), vec!["users", "branches", "branch_staff"]);
    assert!(plan.table("branch_user").is_none());

    let staff = &plan.table("branch_staff").unwrap().blueprint;
    assert_eq!(staff.primary_key, vec!["user_id", "branch_id"]);
    assert_topologically_valid(&plan);
}

#[test]
fn test_mixed_id_polymorphic_target() {
    let schema = Schema::new()
        .with_entity(EntityDefinition::new("Post"))
        .with_entity(
            EntityDefinition::new("Video").with_options(
                EntityOptions::default().with_primary_key(PrimaryKeyStrategy::Uuid),
            ),
        )
        .with_entity(EntityDefinition::new("Photo"))
        .with_entity(
            EntityDefinition::new("Comment")
                .with_property("commentable", Association::morph_to(["Post", "Video"])),
        )
        .with_entity(
            EntityDefinition::new("Like")
                .with_property("likeable", Association::morph_to(["Post", "Photo"])),
        );
    let plan = generator().plan(&schema);

    let comment = &plan.table("comments").unwrap().blueprint;
    let mixed = comment.column("commentable_id").unwrap();
    assert_eq!(mixed.method, ColumnMethod::String);
    assert_eq!(mixed.args.length, Some(36));

    let like = &plan.table("likes").unwrap().blueprint;
    let uniform = like.column("likeable_id").unwrap();
    assert_eq!(uniform.method, ColumnMethod::UnsignedBigInteger);
}

// ============================================================================
// Invariants
// ============================================================================

#[test]
fn test_pivot_naming() {
    assert_eq!(naming::pivot_table_name("branches", "users"), "branch_user");
    assert_eq!(naming::pivot_table_name("users", "branches"), "branch_user");
    assert_eq!(naming::pivot_table_name("posts", "tags"), "post_tag");
}

#[test]
fn test_composite_keys_have_no_column_primary_modifier() {
    let plan = generator().plan(&shop());
    for table in &plan.tables {
        if table.blueprint.has_composite_key() {
            assert!(
                table
                    .blueprint
                    .columns
                    .iter()
                    .all(|c| !c.modifiers.contains(&Modifier::Primary)),
                "{} carries a per-column primary modifier",
                table.table
            );
        }
    }
    // Product owns the relation; Category.products is mapped_by
    let pivot = &plan.table("category_product").unwrap().blueprint;
    assert_eq!(pivot.primary_key, vec!["product_id", "category_id"]);
}

#[test]
fn test_one_sided_many_to_many_keeps_pivot() {
    let schema = Schema::new().with_entity(
        EntityDefinition::new("Zoo").with_property("animals", Association::many_to_many("Animal")),
    );
    let plan = generator().plan(&schema);

    assert_eq!(plan.table_names(), vec!["zoos", "animal_zoo"]);
    assert_eq!(plan.count(TableKind::Pivot), 1);
}

#[test]
fn test_diff_round_trip_restores_blueprint() {
    let schema = shop();
    let config = GeneratorConfig::default();
    let ctx = BuildContext::new(&schema, &config);
    let original = BlueprintBuilder::new(&ctx).build(schema.entity("Order").unwrap());

    let change = SchemaChange::new("Order")
        .with_column(ColumnChange::added(
            "coupon",
            ScalarProperty::new("string").nullable().indexed(),
        ))
        .with_column(ColumnChange::added("reviewer", Association::many_to_one("Customer")))
        .with_column(ColumnChange::renamed("total", "grand_total"))
        .with_index(IndexChange::Added {
            index: IndexDefinition::new(["customer", "status"]),
        })
        .with_options(OptionChanges {
            soft_delete: Some(Transition::new(true, false)),
            timestamps: Some(Transition::new(true, true)),
            primary_key: None,
        });
    let ops = DiffEngine::new(&ctx).build(&change).unwrap();

    let mut replayed = original.clone();
    for op in &ops.forward {
        op.apply(&mut replayed);
    }
    assert!(replayed.has_column("grand_total_amount"));
    assert!(!replayed.has_column("deleted_at"));

    for op in &ops.backward {
        op.apply(&mut replayed);
    }
    let mut restored: Vec<&str> = replayed.column_names();
    let mut expected: Vec<&str> = original.column_names();
    restored.sort_unstable();
    expected.sort_unstable();
    assert_eq!(restored, expected);
    assert_eq!(replayed.foreign_keys, original.foreign_keys);
    assert_eq!(replayed.indexes, original.indexes);
}

#[test]
fn test_drop_then_reverse_equals_build() {
    let schema = shop();
    let config = GeneratorConfig::default();
    let ctx = BuildContext::new(&schema, &config);
    let order = schema.entity("Order").unwrap();

    let ops = DiffEngine::new(&ctx).drop_table(order);
    let [Operation::CreateTable { blueprint }] = &ops.backward[..] else {
        panic!("expected a single create_table");
    };
    assert_eq!(blueprint, &BlueprintBuilder::new(&ctx).build(order));
}

#[test]
fn test_diff_batch_stamps_in_sequence() {
    let schema = shop();
    let changes = vec![
        SchemaChange::new("Customer")
            .with_column(ColumnChange::added("phone", ScalarProperty::new("phone"))),
        SchemaChange::new("Product"),
    ];
    let removed = vec![EntityDefinition::new("Wishlist")];
    let migrations = generator().diff(&schema, &changes, &removed);

    let stems: Vec<String> = migrations.iter().map(|m| m.file_stem()).collect();
    assert_eq!(
        stems,
        vec![
            "2024_06_01_120000_update_customers_table",
            "2024_06_01_120001_drop_wishlists_table",
        ]
    );
}
