use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn object(root: &Path, name: &str, label: &str) {
    write(
        root,
        &format!("objects/{name}/{name}.object-meta.xml"),
        &format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<CustomObject xmlns="http://soap.sforce.com/2006/04/metadata">
    <label>{label}</label>
</CustomObject>"#
        ),
    );
}

fn lookup(root: &Path, owner: &str, name: &str, kind: &str, target: &str) {
    write(
        root,
        &format!("objects/{owner}/fields/{name}.field-meta.xml"),
        &format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<CustomField xmlns="http://soap.sforce.com/2006/04/metadata">
    <fullName>{name}</fullName>
    <referenceTo>{target}</referenceTo>
    <type>{kind}</type>
</CustomField>"#
        ),
    );
}

/// Account <- Contact (lookup), Account <- Invoice__c (master-detail), Survey__c alone
fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    object(root, "Account", "Account");
    object(root, "Contact", "Contact");
    lookup(root, "Contact", "AccountId", "Lookup", "Account");
    object(root, "Invoice__c", "Invoice");
    lookup(root, "Invoice__c", "Account__c", "MasterDetail", "Account");
    object(root, "Survey__c", "Survey");
    temp
}

fn sferd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sferd").unwrap();
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

#[test]
fn generate_writes_dot_file() {
    let temp = project();

    sferd(temp.path())
        .args(["generate", "--objects-path", "objects", "--no-render"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ERD with 3 objects and 2 relationships"));

    let dot = std::fs::read_to_string(temp.path().join("output/final_erd.dot")).unwrap();
    assert!(dot.starts_with("digraph G {"));
    assert!(dot.contains("\"Invoice__c\":\"Account__c\" -> \"Account\""));
    assert!(!dot.contains("Survey__c"));
    assert!(!temp.path().join("output/images").exists());
}

#[test]
fn generate_mermaid_to_stdout() {
    let temp = project();

    sferd(temp.path())
        .args([
            "generate",
            "--objects-path",
            "objects",
            "--diagram",
            "mermaid",
            "--include-isolated",
            "--stdout",
            "--no-render",
            "--filename",
            "org",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("---\n"))
        .stdout(predicate::str::contains("Contact }o..o| Account : \"AccountId\""))
        .stdout(predicate::str::contains("Survey__c[\"Survey\"]"));

    assert!(temp.path().join("output/org.mmd").exists());
}

#[test]
fn config_file_is_overridden_by_flags() {
    let temp = project();
    write(
        temp.path(),
        "sferd.toml",
        "objects_path = \"objects\"\nfilename = \"from_config\"\n\n[diagram]\ntitle = \"Sales Cloud\"\n\n[render]\nenabled = false\n",
    );

    sferd(temp.path())
        .args(["generate", "--config", "sferd.toml", "--title", "Billing"])
        .assert()
        .success();

    let dot = std::fs::read_to_string(temp.path().join("output/from_config.dot")).unwrap();
    assert!(dot.contains("label=\"Billing\";"));
}

#[test]
fn large_diagram_logs_auto_field_limit() {
    let temp = project();
    for i in 0..20 {
        let name = format!("Item{i:02}__c");
        object(temp.path(), &name, &name);
        lookup(temp.path(), &name, "Account__c", "Lookup", "Account");
    }

    sferd(temp.path())
        .args(["generate", "--objects-path", "objects", "--max-objects", "0", "--no-render"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Auto-limiting to 8 fields per entity (23 objects)"));

    sferd(temp.path())
        .args(["generate", "--objects-path", "objects", "--max-objects", "0", "--max-fields-per-entity", "3", "--no-render"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Auto-limiting").not());
}

#[test]
fn missing_objects_path_fails() {
    let temp = TempDir::new().unwrap();

    sferd(temp.path())
        .args(["generate", "--objects-path", "nowhere", "--no-render"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Objects path not found"));
}

#[test]
fn empty_objects_directory_fails() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir(temp.path().join("objects")).unwrap();

    sferd(temp.path())
        .args(["generate", "--objects-path", "objects", "--no-render"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No objects found"));
}

#[test]
fn unconnected_objects_select_nothing() {
    let temp = TempDir::new().unwrap();
    object(temp.path(), "Survey__c", "Survey");

    sferd(temp.path())
        .args(["generate", "--objects-path", "objects", "--no-render"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No objects selected"));
}

#[test]
fn unknown_image_format_fails() {
    let temp = project();

    sferd(temp.path())
        .args(["generate", "--objects-path", "objects", "--formats", "svg,gif"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown output format: gif"));
}

#[test]
fn stats_as_json() {
    let temp = project();

    sferd(temp.path())
        .args(["stats", "--objects-path", "objects", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"object_count\": 4"))
        .stdout(predicate::str::contains("\"master_detail_count\": 1"))
        .stdout(predicate::str::contains("\"Survey__c\""));
}

#[test]
fn list_shows_category_and_degree() {
    let temp = project();

    sferd(temp.path())
        .args(["list", "--objects-path", "objects"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"Account\s+standard\s+0\s+2").unwrap())
        .stdout(predicate::str::is_match(r"Invoice__c\s+custom\s+1\s+1").unwrap());
}
