//! Integration tests for the Migrata CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const BLOG: &str = r#"{
    "entities": {
        "Post": {
            "properties": {
                "title": {"kind": "scalar", "type": "string"},
                "author": {"kind": "association", "relation": "many_to_one", "target": "User"},
                "tags": {"kind": "association", "relation": "many_to_many", "target": "Tag"}
            }
        },
        "Tag": {"properties": {}},
        "User": {"properties": {}}
    }
}"#;

const CHANGES: &str = r#"{
    "changes": [
        {
            "entity": "Post",
            "columns": [
                {"change": "added", "name": "views", "current": {"kind": "scalar", "type": "integer"}}
            ]
        }
    ],
    "removed": [
        {"name": "Draft", "properties": {}}
    ]
}"#;

/// Get the migrata binary
#[allow(deprecated)]
fn migrata_cmd() -> Command {
    Command::cargo_bin("migrata").unwrap()
}

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("schema.json"), BLOG).unwrap();
    fs::write(dir.path().join("changes.json"), CHANGES).unwrap();
    dir
}

#[test]
fn test_help_command() {
    migrata_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: migrata"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("diff"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_plan_text_output() {
    let dir = workspace();

    migrata_cmd()
        .current_dir(dir.path())
        .args(["plan", "schema.json", "--base-timestamp", "2024_01_01_000000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024_01_01_000000_create_tags_table"))
        .stdout(predicate::str::contains("2024_01_01_000003_create_post_tag_table"));
}

#[test]
fn test_plan_json_output() {
    let dir = workspace();

    let output = migrata_cmd()
        .current_dir(dir.path())
        .args([
            "plan",
            "schema.json",
            "--base-timestamp",
            "2024_01_01_000000",
            "--format",
            "json",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let tables: Vec<&str> = plan["tables"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["table"].as_str().unwrap())
        .collect();
    assert_eq!(tables, vec!["tags", "users", "posts", "post_tag"]);
}

#[test]
fn test_plan_reads_config_file() {
    let dir = workspace();
    fs::write(
        dir.path().join("migrata.toml"),
        "[generator]\nbase_timestamp = \"2023_05_05_101010\"\n",
    )
    .unwrap();

    migrata_cmd()
        .current_dir(dir.path())
        .args(["plan", "schema.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2023_05_05_101010_create_tags_table"));
}

#[test]
fn test_plan_missing_schema() {
    let dir = TempDir::new().unwrap();

    migrata_cmd()
        .current_dir(dir.path())
        .args(["plan", "missing.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load schema"))
        .stderr(predicate::str::contains("expected a .json file"));
}

#[test]
fn test_plan_rejects_bad_timestamp() {
    let dir = workspace();

    migrata_cmd()
        .current_dir(dir.path())
        .args(["plan", "schema.json", "--base-timestamp", "tomorrow"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid migration timestamp"));
}

#[test]
fn test_diff_text_output() {
    let dir = workspace();

    migrata_cmd()
        .current_dir(dir.path())
        .args([
            "diff",
            "changes.json",
            "--schema",
            "schema.json",
            "--base-timestamp",
            "2024_02_01_000000",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024_02_01_000000_update_posts_table"))
        .stdout(predicate::str::contains("add column views"))
        .stdout(predicate::str::contains("2024_02_01_000001_drop_drafts_table"));
}

#[test]
fn test_validate_reports_findings() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("schema.json"),
        r#"{"entities": {"Post": {"properties": {
            "category": {"kind": "association", "relation": "many_to_one", "target": "Category"}
        }}}}"#,
    )
    .unwrap();

    migrata_cmd()
        .current_dir(dir.path())
        .args(["validate", "schema.json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Category"));
}

#[test]
fn test_validate_clean_schema() {
    let dir = workspace();

    migrata_cmd()
        .current_dir(dir.path())
        .args(["validate", "schema.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Schema is valid"));
}
