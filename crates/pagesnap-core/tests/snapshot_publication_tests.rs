#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{save_page, store_with_site, FailingStore};
use pagesnap_core::errors::PageSnapError;
use pagesnap_core::model::{Block, Page};
use pagesnap_core::ops::{PageStore, SnapshotManager, UnitOfWork};
use pagesnap_core::snapshot::CreateSnapshotService;
use proptest::prelude::*;
use serde_json::json;

#[test]
fn test_site_publish_snapshots_every_page() {
    let (mut store, site) = store_with_site("sonata", "sonata-project.org");
    let site_id = site.id.unwrap();
    let root = save_page(&mut store, Page::new(site_id, "page_slug").with_url("/"));
    let root_id = root.id.unwrap();
    for (name, url) in [("route1", "/first"), ("route2", "/second"), ("route3", "/third")] {
        save_page(
            &mut store,
            Page::new(site_id, name)
                .with_url(url)
                .with_parent(root_id)
                .with_block(
                    Block::new("content", "sonata.block.service.text")
                        .with_setting("content", json!("hello")),
                ),
        );
    }

    let snapshots = CreateSnapshotService::default()
        .create_by_site(&mut store, &site)
        .unwrap();

    assert_eq!(snapshots.len(), 4);
    assert_eq!(store.snapshot_count(), 4);
    assert!(store.pages().all(|p| !p.edited));
    for page in store.pages() {
        let enabled = store.find_enabled_snapshot(page.id.unwrap()).unwrap();
        assert!(enabled.is_some(), "page {} has no enabled snapshot", page.route_name);
    }

    let root_snapshot = store.find_enabled_snapshot(root_id).unwrap().unwrap();
    assert_eq!(root_snapshot.content.children.len(), 3);
    let children = store.find_enabled_children(root_id).unwrap();
    assert_eq!(children.len(), 3);
    assert_eq!(children[0].content.blocks[0].settings["content"], json!("hello"));
}

#[test]
fn test_injected_failure_rolls_back_whole_site() {
    let (mut inner, site) = store_with_site("sonata", "sonata-project.org");
    let site_id = site.id.unwrap();
    for index in 0..4 {
        save_page(
            &mut inner,
            Page::new(site_id, format!("route{}", index)).with_url(format!("/p{}", index)),
        );
    }
    let mut store = FailingStore::new(inner, 3);

    let err = CreateSnapshotService::default()
        .create_by_site(&mut store, &site)
        .unwrap_err();

    assert!(matches!(err, PageSnapError::Persistence { .. }));
    assert_eq!(store.inner.snapshot_count(), 0);
    assert!(store.inner.pages().all(|p| p.edited));
    assert_eq!(store.depth(), 0);
}

#[test]
fn test_failure_on_first_page_leaves_nothing() {
    let (mut inner, site) = store_with_site("sonata", "sonata-project.org");
    save_page(&mut inner, Page::new(site.id.unwrap(), "route1").with_url("/first"));
    let mut store = FailingStore::new(inner, 1);

    CreateSnapshotService::default()
        .create_by_site(&mut store, &site)
        .unwrap_err();

    assert_eq!(store.inner.snapshot_count(), 0);
    assert!(store.inner.pages().all(|p| p.edited));
}

#[test]
fn test_republish_closes_previous_publication_window() {
    let (mut store, site) = store_with_site("sonata", "sonata-project.org");
    let page = save_page(&mut store, Page::new(site.id.unwrap(), "route1").with_url("/first"));
    let service = CreateSnapshotService::default();

    let first = service.create_by_page(&mut store, &page).unwrap();
    let second = service.create_by_page(&mut store, &page).unwrap();

    let history = store.find_snapshots_by_page(page.id.unwrap()).unwrap();
    assert_eq!(history.len(), 2);
    let old = history.iter().find(|s| s.id == first.id).unwrap();
    assert!(!old.enabled);
    assert_eq!(old.publication_date_end, second.publication_date_start);
    assert!(second.is_published_at(second.publication_date_start.unwrap()));
}

#[test]
fn test_publish_reflects_current_page_content() {
    let (mut store, site) = store_with_site("sonata", "sonata-project.org");
    let mut page = save_page(&mut store, Page::new(site.id.unwrap(), "route1").with_url("/first"));
    let service = CreateSnapshotService::default();
    service.create_by_page(&mut store, &page).unwrap();

    page.name = "Renamed".to_string();
    page.edited = true;
    store.save_page(&mut page).unwrap();
    let snapshot = service.create_by_page(&mut store, &page).unwrap();

    assert_eq!(snapshot.content.name, "Renamed");
    assert!(!store.find_page(page.id.unwrap()).unwrap().unwrap().edited);
}

proptest! {
    #[test]
    fn prop_publish_leaves_exactly_one_enabled_snapshot(publishes in 1usize..6) {
        let (mut store, site) = store_with_site("sonata", "sonata-project.org");
        let page = save_page(&mut store, Page::new(site.id.unwrap(), "route1").with_url("/first"));
        let service = CreateSnapshotService::default();

        let mut last = None;
        for _ in 0..publishes {
            last = Some(service.create_by_page(&mut store, &page).unwrap());
        }

        let page_id = page.id.unwrap();
        let enabled: Vec<_> = store
            .find_snapshots_by_page(page_id)
            .unwrap()
            .into_iter()
            .filter(|s| s.enabled)
            .collect();
        prop_assert_eq!(enabled.len(), 1);
        prop_assert_eq!(enabled[0].id, last.unwrap().id);
        prop_assert_eq!(store.snapshot_count(), publishes);
    }
}
