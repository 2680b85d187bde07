// Route reconciliation against the SQLite store

use pagesnap_core::model::{Page, Site, CMS_ROUTE_NAME};
use pagesnap_core::ops::{in_transaction, PageCriteria, PageStore, SiteStore};
use pagesnap_core::routing::RoutePageGenerator;
use pagesnap_store::catalog::RoutingConfigV0;
use pagesnap_store::{parse_routing_str, SqliteStore};
use rusqlite::Connection;
use tempfile::TempDir;

const ROUTING: &str = r#"
schema_version: 0
http_error_codes: [404, 500]
routes:
  - name: route1
    path: /first_custom_route
  - name: route2
    path: /second_custom_route
  - name: test_hybrid_page_with_good_host
    path: /third_custom_route
    host: "sonata-project.{tld}"
    requirements: { tld: "fr|org" }
  - name: test_hybrid_page_with_bad_host
    path: /fourth_custom_route
    host: sonata-project.com
"#;

fn setup_test_db() -> (TempDir, Connection) {
    let temp_dir = TempDir::new().unwrap();
    let conn = pagesnap_store::db::open_and_migrate(temp_dir.path().join("test.db")).unwrap();
    (temp_dir, conn)
}

fn generator(config: RoutingConfigV0) -> RoutePageGenerator<RoutingConfigV0> {
    let decorator = config.decorator_strategy().unwrap();
    let codes = config.http_error_codes.clone();
    RoutePageGenerator::new(config, decorator, codes)
}

fn saved_site(store: &mut SqliteStore<'_>) -> Site {
    let mut site = Site::new("sonata", "sonata-project.org");
    store.save_site(&mut site).unwrap();
    site
}

#[test]
fn test_worked_example_report() {
    let (_temp_dir, conn) = setup_test_db();
    let mut store = SqliteStore::new(&conn);
    let site = saved_site(&mut store);
    let site_id = site.id.unwrap();
    store
        .save_page(&mut Page::new(site_id, "test_hybrid_page_not_exists"))
        .unwrap();
    store
        .save_page(&mut Page::new(site_id, "test_hybrid_page_with_bad_host"))
        .unwrap();

    let gen = generator(parse_routing_str(ROUTING).unwrap());
    let report = in_transaction(&mut store, |s| gen.update(s, &site, false)).unwrap();

    assert_eq!(
        report.lines(),
        vec![
            "CREATE route1 /first_custom_route",
            "CREATE route2 /second_custom_route",
            "CREATE test_hybrid_page_with_good_host /third_custom_route",
            "DISABLE test_hybrid_page_with_bad_host /fourth_custom_route",
            "UPDATE test_hybrid_page_with_bad_host /fourth_custom_route",
            "CREATE _page_internal_error_404",
            "CREATE _page_internal_error_500",
            "ERROR test_hybrid_page_not_exists",
        ]
    );

    let bad_host = store
        .find_one_by(&PageCriteria::route(site_id, "test_hybrid_page_with_bad_host"))
        .unwrap()
        .unwrap();
    assert!(!bad_host.enabled);
    let root = store.get_page_by_url(&site, "/").unwrap().unwrap();
    assert_eq!(root.route_name, CMS_ROUTE_NAME);
    assert_eq!(bad_host.parent_id, root.id);

    // Cleanup removes the stale page and nothing else
    let report = in_transaction(&mut store, |s| gen.update(s, &site, true)).unwrap();
    assert_eq!(
        report.lines(),
        vec![
            "DISABLE test_hybrid_page_with_bad_host /fourth_custom_route",
            "REMOVED test_hybrid_page_not_exists",
        ]
    );
    assert!(store
        .find_one_by(&PageCriteria::route(site_id, "test_hybrid_page_not_exists"))
        .unwrap()
        .is_none());
}

#[test]
fn test_second_pass_is_idempotent() {
    let (_temp_dir, conn) = setup_test_db();
    let mut store = SqliteStore::new(&conn);
    let site = saved_site(&mut store);
    let gen = generator(parse_routing_str(ROUTING).unwrap());

    gen.update(&mut store, &site, true).unwrap();
    let pages_before = store.find_by(&PageCriteria::site(site.id.unwrap())).unwrap().len();
    let second = gen.update(&mut store, &site, true).unwrap();

    let summary = second.summary();
    assert_eq!(summary.created, 0);
    assert_eq!(summary.updated, 0);
    assert_eq!(summary.removed, 0);
    assert_eq!(
        store.find_by(&PageCriteria::site(site.id.unwrap())).unwrap().len(),
        pages_before
    );
}

#[test]
fn test_one_page_per_route_and_site() {
    let (_temp_dir, conn) = setup_test_db();
    let mut store = SqliteStore::new(&conn);
    let org = saved_site(&mut store);
    let mut fr = Site::new("sonata fr", "sonata-project.fr");
    store.save_site(&mut fr).unwrap();
    let gen = generator(parse_routing_str(ROUTING).unwrap());

    gen.update(&mut store, &org, false).unwrap();
    gen.update(&mut store, &fr, false).unwrap();

    for site in [&org, &fr] {
        let pages = store
            .find_by(&PageCriteria::route(
                site.id.unwrap(),
                "test_hybrid_page_with_good_host",
            ))
            .unwrap();
        assert_eq!(pages.len(), 1);
    }
}

#[test]
fn test_aborted_pass_leaves_nothing_behind() {
    let (_temp_dir, conn) = setup_test_db();
    let mut store = SqliteStore::new(&conn);
    let site = saved_site(&mut store);
    conn.execute_batch(
        "CREATE TRIGGER fail_route2 BEFORE INSERT ON pages
         WHEN NEW.route_name = 'route2'
         BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
    )
    .unwrap();

    let gen = generator(parse_routing_str(ROUTING).unwrap());
    let err = in_transaction(&mut store, |s| gen.update(s, &site, false)).unwrap_err();

    assert!(err.to_string().contains("injected failure"));
    assert!(store
        .find_by(&PageCriteria::site(site.id.unwrap()))
        .unwrap()
        .is_empty());
}
