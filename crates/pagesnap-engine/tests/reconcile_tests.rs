// Test suite for route reconciliation orchestration
// Tests per-site units of work, all-sites runs, logging boundaries and error propagation

use pagesnap_core::core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use pagesnap_core::logging_facility::init_test_capture;
use pagesnap_core::model::Site;
use pagesnap_engine::commands::reconcile::{reconcile_all, reconcile_site, ReconcileOptions};
use pagesnap_engine::commands::site::add_site;
use pagesnap_store::{parse_routing_str, RoutingConfigV0};
use rusqlite::Connection;
use tempfile::TempDir;

const ROUTING: &str = r#"
schema_version: 0
http_error_codes: [404]
decorator:
  ignore_route_patterns: ["_"]
routes:
  - name: _profiler
    path: /_profiler
  - name: route1
    path: /first_custom_route
  - name: org_only
    path: /org
    host: sonata-project.org
"#;

fn setup_test_repo() -> (TempDir, Connection, RoutingConfigV0) {
    let temp_dir = TempDir::new().unwrap();
    let conn = pagesnap_store::db::open_and_migrate(temp_dir.path().join("test.db")).unwrap();
    let config = parse_routing_str(ROUTING).unwrap();
    (temp_dir, conn, config)
}

fn page_count(conn: &Connection, site_id: i64) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM pages WHERE site_id = ?",
        [site_id],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn test_reconcile_site_happy_path() {
    let (_temp_dir, conn, config) = setup_test_repo();
    let site = add_site(&conn, Site::new("org", "sonata-project.org")).unwrap();
    let site_id = site.id.unwrap();

    let report = reconcile_site(&conn, &config, site_id, ReconcileOptions::default()).unwrap();

    assert_eq!(
        report.lines(),
        vec![
            "CREATE route1 /first_custom_route",
            "CREATE org_only /org",
            "CREATE _page_internal_error_404",
        ]
    );
    // Homepage, two routes, one error page
    assert_eq!(page_count(&conn, site_id), 4);
}

#[test]
fn test_reconcile_all_scopes_routes_per_site() {
    let (_temp_dir, conn, config) = setup_test_repo();
    let org = add_site(&conn, Site::new("org", "sonata-project.org")).unwrap();
    let com = add_site(&conn, Site::new("com", "sonata-project.com")).unwrap();

    let reports = reconcile_all(&conn, &config, ReconcileOptions { cleanup: true }).unwrap();

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].site_id, org.id.unwrap());
    assert_eq!(reports[0].summary().created, 3);
    assert_eq!(reports[1].site_id, com.id.unwrap());
    assert_eq!(reports[1].summary().created, 2);
    assert!(!reports[1].lines().iter().any(|l| l.contains("org_only")));
}

#[test]
fn test_reconcile_unknown_site_fails() {
    let (_temp_dir, conn, config) = setup_test_repo();

    let err = reconcile_site(&conn, &config, 42, ReconcileOptions::default()).unwrap_err();

    assert_eq!(err.code(), "ERR_NOT_FOUND");
    assert!(err.run_id().is_some());
}

#[test]
fn test_failed_site_is_rolled_back() {
    let (_temp_dir, conn, config) = setup_test_repo();
    let site = add_site(&conn, Site::new("org", "sonata-project.org")).unwrap();
    let site_id = site.id.unwrap();
    conn.execute_batch(
        "CREATE TRIGGER fail_error_page BEFORE INSERT ON pages
         WHEN NEW.route_name = '_page_internal_error_404'
         BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
    )
    .unwrap();

    let err = reconcile_site(&conn, &config, site_id, ReconcileOptions::default()).unwrap_err();

    assert_eq!(err.code(), "ERR_PERSISTENCE");
    assert_eq!(page_count(&conn, site_id), 0);
}

#[test]
fn test_reconcile_logging() {
    let capture = init_test_capture();
    let (_temp_dir, conn, config) = setup_test_repo();
    let site = add_site(&conn, Site::new("org", "sonata-project.org")).unwrap();

    reconcile_site(&conn, &config, site.id.unwrap(), ReconcileOptions::default()).unwrap();
    reconcile_site(&conn, &config, 999, ReconcileOptions::default()).unwrap_err();

    capture.assert_event_exists("engine_reconcile_site", EVENT_START);
    capture.assert_event_exists("engine_reconcile_site", EVENT_END);
    capture.assert_event_exists("engine_reconcile_site", EVENT_END_ERROR);
    capture.assert_event_exists("reconcile_routes", EVENT_END);

    let missing_site = capture.events_for_site(999);
    assert!(missing_site
        .iter()
        .any(|e| e.event.as_deref() == Some(EVENT_END_ERROR) && e.field("run_id").is_some()));
}
