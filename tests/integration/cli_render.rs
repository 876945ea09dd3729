#![allow(missing_docs)]

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use tempfile::TempDir;

const MODEL: &str = r#"
[entities.Order.attributes]
id = { kind = "singular", type = "Long" }
total = { kind = "singular", type = "Long" }
customer = { kind = "singular", type = "Customer" }
lines = { kind = "collection", collection = "list", element = "OrderLine" }

[entities.Customer.attributes]
name = { kind = "singular", type = "String" }
address = { kind = "singular", type = "Address" }

[entities.OrderLine.attributes]
qty = { kind = "singular", type = "Integer" }

[embeddables.Address.attributes]
city = { kind = "singular", type = "String" }
"#;

fn setup_model() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("model.toml");
    fs::write(&path, MODEL).expect("write metamodel");
    (dir, path)
}

#[test]
fn render_prints_projection_type_and_order() {
    let (_dir, model) = setup_model();
    let output = cargo_bin_cmd!("criteria")
        .env_remove("CRITERIA_METAMODEL")
        .arg("--metamodel")
        .arg(&model)
        .args([
            "render",
            "--root",
            "Order",
            "--alias",
            "o",
            "--path",
            "customer.address.city",
            "--type-of",
            "customer",
            "--order-by",
            "total:desc",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).expect("utf8");
    assert_eq!(
        text,
        "from Order o\n\
         select o.customer.address.city\n\
         select type(o.customer)\n\
         order by o.total desc\n"
    );
}

#[test]
fn render_emits_json_with_generated_alias() {
    let (_dir, model) = setup_model();
    let output = cargo_bin_cmd!("criteria")
        .env("CRITERIA_METAMODEL", &model)
        .args([
            "--format",
            "json",
            "render",
            "--root",
            "Order",
            "--path",
            "customer.name",
            "--path",
            "total",
            "--order-by",
            "customer.name",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(json["alias"], "generatedAlias0");
    assert_eq!(json["projections"][0]["rendered"], "generatedAlias0.customer.name");
    assert_eq!(json["projections"][1]["path"], "total");
    assert_eq!(json["order_by"], "generatedAlias0.customer.name asc");
    assert_eq!(json["types"].as_array().map(Vec::len), Some(0));
}

#[test]
fn dereferencing_a_collection_exits_with_navigation_status() {
    let (_dir, model) = setup_model();
    let output = cargo_bin_cmd!("criteria")
        .arg("--metamodel")
        .arg(&model)
        .args(["render", "--root", "Order", "--path", "lines.qty"])
        .assert()
        .code(2)
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8(output).expect("utf8");
    assert!(
        stderr.contains(
            "[IllegalDereference] Illegal attempt to dereference path source [generatedAlias0.lines]"
        ),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn unknown_attribute_exits_with_navigation_status() {
    let (_dir, model) = setup_model();
    let output = cargo_bin_cmd!("criteria")
        .arg("--metamodel")
        .arg(&model)
        .args(["render", "--root", "Order", "--alias", "o", "--path", "customer.age"])
        .assert()
        .code(2)
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8(output).expect("utf8");
    assert!(
        stderr.contains(
            "[UnknownAttribute] Unable to resolve attribute [age] against path [o.customer]"
        ),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn unknown_root_entity_fails() {
    let (_dir, model) = setup_model();
    let output = cargo_bin_cmd!("criteria")
        .arg("--metamodel")
        .arg(&model)
        .args(["render", "--root", "Address"])
        .assert()
        .code(1)
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8(output).expect("utf8");
    assert!(stderr.contains("[UnknownManagedType]"), "unexpected stderr: {stderr}");
}

#[test]
fn malformed_metamodel_is_reported() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[entities.Order.attributes]\nid = { kind = \"tuple\" }\n").unwrap();
    let output = cargo_bin_cmd!("criteria")
        .arg("--metamodel")
        .arg(&path)
        .args(["describe", "--root", "Order"])
        .assert()
        .code(1)
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8(output).expect("utf8");
    assert!(stderr.contains("[InvalidMetamodel]"), "unexpected stderr: {stderr}");
}

#[test]
fn describe_lists_attributes_as_json() {
    let (_dir, model) = setup_model();
    let output = cargo_bin_cmd!("criteria")
        .arg("--metamodel")
        .arg(&model)
        .args(["--format", "json", "describe", "--root", "Order"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(json["name"], "Order");
    assert_eq!(json["kind"], "entity");
    let kinds: Vec<_> = json["attributes"]
        .as_array()
        .expect("attributes array")
        .iter()
        .map(|attr| attr["kind"].as_str().unwrap_or_default().to_owned())
        .collect();
    assert_eq!(kinds.len(), 4);
    assert!(kinds.contains(&"plural".to_owned()));
}

#[test]
fn missing_metamodel_is_an_error() {
    cargo_bin_cmd!("criteria")
        .env_remove("CRITERIA_METAMODEL")
        .args(["describe", "--root", "Order"])
        .assert()
        .failure();
}
