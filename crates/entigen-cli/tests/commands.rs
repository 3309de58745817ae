//! End-to-end runs of the `entigen` binary over a throwaway project.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use entigen_core::hash::structural_hash;
use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::TempDir;

const HEADER: &str = "package shop;\n\
    import io.objectbox.annotation.Entity;\n\
    import io.objectbox.annotation.Id;\n\
    import io.objectbox.annotation.Relation;\n";

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    let src = dir.path().join("src/shop");
    fs::create_dir_all(&src).expect("create source dir");
    for (name, body) in files {
        fs::write(src.join(name), format!("{HEADER}{body}\n")).expect("write source file");
    }
    dir
}

fn entigen(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_entigen"))
        .args(args)
        .arg("--quiet")
        .current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .output()
        .expect("invoke entigen")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|error| {
        panic!(
            "stdout is not JSON ({error}):\n{}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

#[test]
fn inspect_prints_schemas_as_json() {
    let dir = project(&[
        ("Order.java", "@Entity class Order { @Id long id; @Relation Customer customer; }"),
        ("Customer.java", "@Entity class Customer { @Id long id; String email; }"),
        ("Money.java", "class Money { long cents; }"),
    ]);

    let output = entigen(dir.path(), &["inspect", "src"]);
    assert!(
        output.status.success(),
        "inspect failed:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let schemas = stdout_json(&output);
    let schemas = schemas.as_array().expect("array of schemas");
    assert_eq!(schemas.len(), 1);
    assert_eq!(schemas[0]["name"], "default");

    let mut names: Vec<&str> = schemas[0]["entities"]
        .as_array()
        .expect("entities")
        .iter()
        .filter_map(|entity| entity["name"].as_str())
        .collect();
    names.sort_unstable();
    assert_eq!(names, vec!["Customer", "Order"]);
}

#[test]
fn hash_reports_and_stamps_a_fragment() {
    let dir = TempDir::new().expect("create temp dir");
    fs::write(dir.path().join("ctor.java"), "public Note() {\n}\n").expect("write fragment");

    let output = entigen(dir.path(), &["hash", "ctor.java", "--stamp"]);
    assert!(output.status.success());

    let report = stdout_json(&output);
    let hash = structural_hash("public Note() {}");
    assert_eq!(report["hash"], hash);
    assert_eq!(
        report["stamped"],
        format!("@Generated(hash = {hash})\npublic Note() {{\n}}")
    );
}

#[test]
fn check_fails_when_a_source_is_broken() {
    let dir = project(&[
        ("Order.java", "@Entity class Order { @Id long id; }"),
        ("Ghost.java", "@Entity class Ghost { @Id long id; @Relation Missing missing; }"),
    ]);

    let output = entigen(dir.path(), &["check", "src"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("1 problem(s) found"));

    let report = stdout_json(&output);
    assert_eq!(report["failed"], 1);
    assert_eq!(report["files"].as_array().map(Vec::len), Some(2));
}

#[test]
fn check_passes_clean_sources() {
    let dir = project(&[("Order.java", "@Entity class Order { @Id long id; }")]);

    let output = entigen(dir.path(), &["check", "src"]);
    assert!(
        output.status.success(),
        "check failed:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(stdout_json(&output)["failed"], 0);
}
