#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{save_page, store_with_site};
use pagesnap_core::cache::{page_keys, MemoryCache};
use pagesnap_core::model::Page;
use pagesnap_core::ops::SnapshotManager;
use pagesnap_core::snapshot::{CreateSnapshotService, SnapshotAdmin};

#[test]
fn test_toggle_through_admin_invalidates_each_page() {
    let (mut store, site) = store_with_site("sonata", "sonata-project.org");
    let site_id = site.id.unwrap();
    let first = save_page(&mut store, Page::new(site_id, "route1").with_url("/first"));
    let second = save_page(&mut store, Page::new(site_id, "route2").with_url("/second"));
    let published = CreateSnapshotService::default()
        .create_by_site(&mut store, &site)
        .unwrap();

    let cache = MemoryCache::new();
    cache.put("first", page_keys(first.id.unwrap()), "1").unwrap();
    cache.put("second", page_keys(second.id.unwrap()), "2").unwrap();
    cache.put("unrelated", page_keys(999), "x").unwrap();

    let ids: Vec<_> = published.iter().filter_map(|s| s.id).collect();
    let toggled = SnapshotAdmin::with_cache(&cache)
        .batch_toggle_enabled(&mut store, &ids)
        .unwrap();

    assert_eq!(toggled.len(), 2);
    assert!(toggled.iter().all(|s| !s.enabled));
    assert!(store.find_enabled_snapshot(first.id.unwrap()).unwrap().is_none());
    assert_eq!(cache.get("first").unwrap(), None);
    assert_eq!(cache.get("second").unwrap(), None);
    assert_eq!(cache.get("unrelated").unwrap().as_deref(), Some("x"));
}

#[test]
fn test_admin_list_scopes_by_site_and_route() {
    let (mut store, site) = store_with_site("sonata", "sonata-project.org");
    let site_id = site.id.unwrap();
    save_page(&mut store, Page::new(site_id, "blog_index").with_url("/blog"));
    save_page(&mut store, Page::new(site_id, "contact").with_url("/contact"));
    CreateSnapshotService::default()
        .create_by_site(&mut store, &site)
        .unwrap();

    let admin = SnapshotAdmin::default();
    let blog = admin.list(&store, Some(site_id), Some("blog")).unwrap();
    assert_eq!(blog.len(), 1);
    assert_eq!(blog[0].route_name, "blog_index");
    assert_eq!(admin.list(&store, Some(site_id), None).unwrap().len(), 2);
    assert!(admin.list(&store, Some(site_id + 1), None).unwrap().is_empty());
}
