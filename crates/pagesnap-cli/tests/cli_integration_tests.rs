// CLI integration tests for site, routes and snapshot commands

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const ROUTING: &str = r#"
schema_version: 0
http_error_codes: [404]
routes:
  - name: route1
    path: /first_custom_route
  - name: route2
    path: /second_custom_route
"#;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pagesnap-cli"))
        .args(["--log", "test"])
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn setup() -> (TempDir, String, String) {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("data/pagesnap.db");
    let routes = temp_dir.path().join("routing.yml");
    std::fs::write(&routes, ROUTING).unwrap();
    (temp_dir, path_str(&db), path_str(&routes))
}

fn path_str(path: &Path) -> String {
    path.to_str().unwrap().to_string()
}

#[test]
fn test_migrate_creates_database() {
    let (_temp_dir, db, _routes) = setup();

    let output = run(&["migrate", "--db", &db]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("001_sites_and_pages"));
    assert!(out.contains("002_snapshots"));
    assert!(Path::new(&db).exists());
}

#[test]
fn test_site_add_and_list() {
    let (_temp_dir, db, _routes) = setup();

    let output = run(&[
        "site", "add", "--name", "org", "--host", "sonata-project.org", "--locale", "en", "--db",
        &db,
    ]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("id: 1"));

    let output = run(&["site", "list", "--json", "--db", &db]);
    assert!(output.status.success());
    let sites: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(sites[0]["name"], "org");
    assert_eq!(sites[0]["locale"], "en");
}

#[test]
fn test_routes_update_prints_report() {
    let (_temp_dir, db, routes) = setup();
    run(&["site", "add", "--name", "org", "--host", "sonata-project.org", "--db", &db]);

    let output = run(&["routes", "update", "--routes", &routes, "--db", &db]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("# org (sonata-project.org)"));
    assert!(out.contains("CREATE route1 /first_custom_route"));
    assert!(out.contains("CREATE route2 /second_custom_route"));
    assert!(out.contains("CREATE _page_internal_error_404"));

    // Second run has nothing left to do
    let output = run(&["routes", "update", "--routes", &routes, "--db", &db]);
    assert!(output.status.success());
    assert!(!stdout(&output).contains("CREATE"));
}

#[test]
fn test_routes_update_missing_catalog_fails() {
    let (temp_dir, db, _routes) = setup();
    let missing = path_str(&temp_dir.path().join("missing.yml"));

    let output = run(&["routes", "update", "--routes", &missing, "--db", &db]);

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn test_snapshot_create_toggle_list() {
    let (_temp_dir, db, routes) = setup();
    run(&["site", "add", "--name", "org", "--host", "sonata-project.org", "--db", &db]);
    run(&["routes", "update", "--routes", &routes, "--db", &db]);

    let output = run(&["snapshot", "create", "--db", &db]);
    assert!(output.status.success());
    // Homepage, two routes, one error page
    assert!(stdout(&output).contains("4 snapshots published"));

    let output = run(&["snapshot", "list", "--route", "route1", "--json", "--db", &db]);
    assert!(output.status.success());
    let listed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["enabled"], true);
    let id = listed[0]["id"].as_i64().unwrap().to_string();

    let output = run(&["snapshot", "toggle", &id, "--db", &db]);
    assert!(output.status.success());
    assert!(stdout(&output).contains(&format!("{}\tdisabled", id)));
}

#[test]
fn test_unknown_site_fails() {
    let (_temp_dir, db, _routes) = setup();

    let output = run(&["snapshot", "create", "--site", "42", "--db", &db]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}
