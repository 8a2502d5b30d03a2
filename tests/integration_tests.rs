//! Integration tests for the wirekit CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const HARNESS: &str = r#"
connectors:
  X1:
    type: Molex KK 254
    pinlabels: [GND, VCC, RX, TX]
    additional_components:
      - {type: Crimp contact, qty_multiplier: populated}
  X2:
    type: Molex KK 254
    pinlabels: [GND, VCC, RX, TX]
    additional_components:
      - {type: Crimp contact, qty_multiplier: populated}
cables:
  W1:
    colors: [BK, RD, GN, YE]
    gauge: 0.25 mm2
    length: 0.2
    additional_components:
      - {type: Heat shrink, qty_multiplier: total_length, unit: m}
connections:
  - {from: [X1, [GND, VCC, RX, TX]], via: [W1, [BK, RD, GN, YE]], to: [X2, [1, 2, 4, 3]]}
additional_bom_items:
  - {type: Cable tie, qty: 3, designators: [CT1]}
"#;

/// Helper to get a wirekit command isolated from user config
fn wirekit(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("wirekit").unwrap();
    cmd.current_dir(tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join("config"))
        .env("HOME", tmp.path())
        .env_remove("WIREKIT_FORMAT")
        .env_remove("WIREKIT_LENGTH_UNIT")
        .env_remove("RUST_LOG");
    cmd
}

fn setup(contents: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("harness.yaml"), contents).unwrap();
    tmp
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    wirekit(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("bill of materials"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_version_displays() {
    let tmp = TempDir::new().unwrap();
    wirekit(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("wirekit"));
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    wirekit(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wirekit"));
}

// ============================================================================
// BOM Tests
// ============================================================================

#[test]
fn test_bom_merges_identical_connectors() {
    let tmp = setup(HARNESS);
    let output = wirekit(&tmp)
        .args(["bom", "harness.yaml", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let lines: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let lines = lines.as_array().unwrap();
    assert_eq!(lines.len(), 5);

    assert_eq!(lines[0]["description"], "Connector, Molex KK 254, 4 pins");
    assert_eq!(lines[0]["quantity"], 2.0);
    assert_eq!(lines[0]["designators"], serde_json::json!(["X1", "X2"]));

    assert_eq!(lines[1]["description"], "Crimp contact");
    assert_eq!(lines[1]["quantity"], 8.0);
    assert_eq!(lines[1]["category"], "connector/additional");

    assert_eq!(lines[2]["description"], "Cable, 4 x 0.25 mm²");
    assert_eq!(lines[2]["unit"], "m");

    assert_eq!(lines[3]["description"], "Heat shrink");
    assert_eq!(lines[3]["quantity"], 0.8);
    assert_eq!(lines[4]["category"], "additional");
}

#[test]
fn test_bom_csv_output() {
    let tmp = setup(HARNESS);
    wirekit(&tmp)
        .args(["bom", "harness.yaml", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("#,Qty,Unit,Description,Designators"))
        .stdout(predicate::str::contains("\"X1, X2\""));
}

#[test]
fn test_bom_table_is_default() {
    let tmp = setup(HARNESS);
    wirekit(&tmp)
        .args(["bom", "harness.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Description"))
        .stdout(predicate::str::contains("Cable tie"));
}

#[test]
fn test_bom_default_format_from_local_config() {
    let tmp = setup(HARNESS);
    fs::write(tmp.path().join(".wirekit.yaml"), "default_format: tsv\n").unwrap();
    wirekit(&tmp)
        .args(["bom", "harness.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("#\tQty\tUnit"));
}

#[test]
fn test_bom_length_unit_from_env() {
    let tmp = setup(HARNESS);
    wirekit(&tmp)
        .env("WIREKIT_LENGTH_UNIT", "ft")
        .args(["bom", "harness.yaml", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"unit\": \"ft\""));
}

#[test]
fn test_bom_kind_filter() {
    let tmp = setup(HARNESS);
    let output = wirekit(&tmp)
        .args(["bom", "harness.yaml", "-f", "json", "--kind", "cable"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let lines: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let categories: Vec<&str> = lines
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["category"].as_str().unwrap())
        .collect();
    assert_eq!(categories, vec!["cable", "cable/additional"]);
}

#[test]
fn test_bom_unknown_kind_fails() {
    let tmp = setup(HARNESS);
    wirekit(&tmp)
        .args(["bom", "harness.yaml", "--kind", "harness"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown type of item"));
}

#[test]
fn test_bom_to_file() {
    let tmp = setup(HARNESS);
    wirekit(&tmp)
        .args(["bom", "harness.yaml", "-f", "md", "-o", "bom.md"])
        .assert()
        .success()
        .stderr(predicate::str::contains("bom.md"));
    let content = fs::read_to_string(tmp.path().join("bom.md")).unwrap();
    assert!(content.contains("| Cable tie"));
}

#[test]
fn test_bom_missing_file() {
    let tmp = TempDir::new().unwrap();
    wirekit(&tmp)
        .args(["bom", "nope.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

// ============================================================================
// Graph Tests
// ============================================================================

#[test]
fn test_graph_json() {
    let tmp = setup(HARNESS);
    let output = wirekit(&tmp).args(["graph", "harness.yaml"]).output().unwrap();
    assert!(output.status.success());

    let graph: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let connections = graph["cables"][0]["connections"].as_array().unwrap();
    assert_eq!(connections.len(), 4);
    assert_eq!(connections[2]["from"]["label"], "RX");
    assert_eq!(connections[2]["to"]["id"], "4");
    assert_eq!(connections[2]["via"]["color"], "GN");
    assert_eq!(graph["render"]["color_padding"], 1);
}

#[test]
fn test_graph_yaml() {
    let tmp = setup(HARNESS);
    wirekit(&tmp)
        .args(["graph", "harness.yaml", "-f", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("connectors:"))
        .stdout(predicate::str::contains("designator: W1"));
}

// ============================================================================
// Validate Tests
// ============================================================================

#[test]
fn test_validate_passes() {
    let tmp = setup(HARNESS);
    wirekit(&tmp)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("All files passed validation"));
}

#[test]
fn test_validate_reports_duplicate_label() {
    let tmp = setup(
        "connectors:\n  X1: {pinlabels: [GND, GND]}\ncables:\n  W1: {wirecount: 1}\nconnections:\n  - {from: [X1, GND], via: [W1, 1]}\n",
    );
    wirekit(&tmp)
        .args(["validate", "harness.yaml"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("✗"))
        .stdout(predicate::str::contains("X1:GND is used for more than one pin"));
}

#[test]
fn test_validate_simple_connector_with_pins() {
    let tmp = setup("connectors:\n  F1: {style: simple, pincount: 2}\n");
    wirekit(&tmp)
        .args(["validate", "harness.yaml"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("simple may only have one pin"));
}

#[test]
fn test_validate_bundle_list_mismatch() {
    let tmp = setup("cables:\n  W1: {category: bundle, wirecount: 3, pn: [A, B]}\n");
    wirekit(&tmp)
        .args(["validate", "harness.yaml"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("must match wirecount"));
}

#[test]
fn test_validate_keep_going() {
    let tmp = setup(HARNESS);
    fs::write(tmp.path().join("a_broken.yaml"), "connectors: [").unwrap();
    fs::write(tmp.path().join("b_broken.yaml"), "cables:\n  W1: {length: 1}\n").unwrap();

    wirekit(&tmp)
        .args(["validate", "--summary"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Files checked:  1"));

    wirekit(&tmp)
        .args(["validate", "--summary", "--keep-going"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Files checked:  3"))
        .stderr(predicate::str::contains("2 files have errors"));
}
