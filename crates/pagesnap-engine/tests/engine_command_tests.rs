// Test suite for engine command dispatch

use pagesnap_core::model::Site;
use pagesnap_engine::commands::engine_command::{
    apply_engine_command, EngineCommand, EngineCommandResult,
};
use pagesnap_engine::commands::reconcile::ReconcileOptions;
use pagesnap_store::parse_routing_str;
use rusqlite::Connection;
use tempfile::TempDir;

fn setup_test_db() -> (TempDir, Connection) {
    let temp_dir = TempDir::new().unwrap();
    let conn = pagesnap_store::db::open_and_migrate(temp_dir.path().join("test.db")).unwrap();
    (temp_dir, conn)
}

#[test]
fn test_site_commands() {
    let (_temp_dir, conn) = setup_test_db();

    let result = apply_engine_command(
        EngineCommand::AddSite(Site::new("org", "sonata-project.org").with_locale("en")),
        &conn,
        None,
    )
    .unwrap();
    let EngineCommandResult::Site(site) = result else {
        panic!("expected a site");
    };
    assert_eq!(site.id, Some(1));

    let EngineCommandResult::Sites(sites) =
        apply_engine_command(EngineCommand::ListSites, &conn, None).unwrap()
    else {
        panic!("expected sites");
    };
    assert_eq!(sites, vec![site]);
}

#[test]
fn test_add_site_rejects_empty_host() {
    let (_temp_dir, conn) = setup_test_db();
    let err = apply_engine_command(EngineCommand::AddSite(Site::new("org", " ")), &conn, None)
        .unwrap_err();
    assert_eq!(err.code(), "ERR_INVALID_INPUT");
}

#[test]
fn test_reconcile_requires_routing_config() {
    let (_temp_dir, conn) = setup_test_db();
    let err = apply_engine_command(
        EngineCommand::ReconcileRoutes {
            site_id: None,
            options: ReconcileOptions::default(),
        },
        &conn,
        None,
    )
    .unwrap_err();
    assert_eq!(err.code(), "ERR_INVALID_INPUT");
}

#[test]
fn test_reconcile_then_publish() {
    let (_temp_dir, conn) = setup_test_db();
    let config =
        parse_routing_str("schema_version: 0\nroutes:\n  - { name: route1, path: /first }\n")
            .unwrap();
    apply_engine_command(
        EngineCommand::AddSite(Site::new("org", "sonata-project.org")),
        &conn,
        None,
    )
    .unwrap();

    let EngineCommandResult::Reconciled(reports) = apply_engine_command(
        EngineCommand::ReconcileRoutes {
            site_id: Some(1),
            options: ReconcileOptions::default(),
        },
        &conn,
        Some(&config),
    )
    .unwrap() else {
        panic!("expected reports");
    };
    assert_eq!(reports[0].lines(), vec!["CREATE route1 /first"]);

    let EngineCommandResult::Published(summaries) =
        apply_engine_command(EngineCommand::Publish { site_id: None }, &conn, None).unwrap()
    else {
        panic!("expected publish summaries");
    };
    assert_eq!(summaries[0].snapshot_count(), 2);

    let EngineCommandResult::Snapshots(listed) = apply_engine_command(
        EngineCommand::ListSnapshots {
            site_id: Some(1),
            route_filter: Some("route1".to_string()),
        },
        &conn,
        None,
    )
    .unwrap() else {
        panic!("expected snapshots");
    };
    assert_eq!(listed.len(), 1);
}
