//! Route reconciliation
//!
//! Aligns the hybrid pages of a site with the routing table:
//!
//! 1. Make sure the site has a homepage (`/`) to hang new pages under.
//! 2. Walk the catalog in declaration order: create missing pages, disable
//!    pages whose route does not belong to the site, realign stale pages.
//! 3. Create the internal error pages for the configured HTTP codes.
//! 4. Report (or, with cleanup, delete) hybrid pages whose route vanished.
//!
//! Store failures are propagated as-is and abort the pass; callers wrap the
//! pass in a unit of work so an aborted pass leaves nothing behind.

use std::collections::HashSet;
use std::time::Instant;

use regex::Regex;

use crate::errors::{PageSnapError, Result};
use crate::model::{Page, Route, Site, SiteId, CMS_ROUTE_NAME};
use crate::ops::ports::{PageCriteria, PageStore, RouteCatalog};
use crate::routing::decorator::DecoratorStrategy;
use crate::routing::host_pattern::route_matches_host;
use crate::routing::report::{ReconciliationAction, ReconciliationReport};
use crate::{log_op_end, log_op_error, log_op_start};

/// Generates and maintains pages for the routes of a routing table
pub struct RoutePageGenerator<C> {
    catalog: C,
    decorator: DecoratorStrategy,
    http_error_codes: Vec<u16>,
}

impl<C: RouteCatalog> RoutePageGenerator<C> {
    pub fn new(catalog: C, decorator: DecoratorStrategy, http_error_codes: Vec<u16>) -> Self {
        Self {
            catalog,
            decorator,
            http_error_codes,
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Reconcile the pages of `site` with the catalog
    ///
    /// With `cleanup`, hybrid pages whose route vanished are deleted and
    /// reported `REMOVED`; otherwise they are kept and reported `ERROR`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an unsaved site, `InvalidPattern` for a
    /// malformed route constraint, and any store failure unchanged.
    pub fn update<S>(
        &self,
        store: &mut S,
        site: &Site,
        cleanup: bool,
    ) -> Result<ReconciliationReport>
    where
        S: PageStore + ?Sized,
    {
        let site_id = site.id.ok_or_else(|| PageSnapError::InvalidInput {
            reason: format!("site '{}' has not been persisted", site.name),
        })?;

        let start = Instant::now();
        log_op_start!("reconcile_routes", site_id = site_id, cleanup = cleanup);

        match self.run(store, site, site_id, cleanup) {
            Ok(report) => {
                let summary = report.summary();
                log_op_end!(
                    "reconcile_routes",
                    duration_ms = start.elapsed().as_millis() as u64,
                    site_id = site_id,
                    created = summary.created,
                    updated = summary.updated,
                    disabled = summary.disabled,
                    removed = summary.removed,
                    errors = summary.errors
                );
                Ok(report)
            }
            Err(err) => {
                log_op_error!(
                    "reconcile_routes",
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    site_id = site_id
                );
                Err(err)
            }
        }
    }

    fn run<S>(
        &self,
        store: &mut S,
        site: &Site,
        site_id: SiteId,
        cleanup: bool,
    ) -> Result<ReconciliationReport>
    where
        S: PageStore + ?Sized,
    {
        let routes = self.catalog.route_collection()?;
        let mut report = ReconciliationReport::new(site_id, site);
        let mut known: HashSet<String> = HashSet::new();

        let root = self.ensure_root(store, site, site_id)?;

        for (raw_name, route) in routes.iter() {
            let name = raw_name.trim();
            known.insert(name.to_string());
            if name == CMS_ROUTE_NAME {
                continue;
            }

            let existing = store.find_one_by(&PageCriteria::route(site_id, name))?;
            let belongs = self.belongs_to_site(name, route, site)?;
            let path = route.path.as_str();

            let mut page = match existing {
                Some(page) => page,
                None if !belongs => continue,
                None => {
                    let mut page = store.create();
                    page.site_id = site_id;
                    page.route_name = name.to_string();
                    page.name = name.to_string();
                    page.url = Some(path.to_string());
                    page.slug = Some(path.to_string());
                    page.request_method = route.request_method().to_string();
                    page.parent_id = root.id;
                    store.save_page(&mut page)?;
                    report.push(ReconciliationAction::Created {
                        page,
                        path: path.to_string(),
                    });
                    continue;
                }
            };

            let mut dirty = false;
            if !belongs {
                if page.enabled {
                    page.enabled = false;
                    dirty = true;
                }
                report.push(ReconciliationAction::Disabled {
                    page: page.clone(),
                    path: path.to_string(),
                });
            }

            let detached = page.parent_id.is_none() && page.id != root.id;
            let stale = page.url.as_deref() != Some(path)
                || page.slug.as_deref() != Some(path)
                || page.request_method != route.request_method();

            if detached || stale {
                if detached {
                    page.parent_id = root.id;
                }
                page.url = Some(path.to_string());
                page.slug = Some(path.to_string());
                page.request_method = route.request_method().to_string();
                store.save_page(&mut page)?;
                report.push(ReconciliationAction::Updated {
                    page,
                    path: path.to_string(),
                });
            } else if dirty {
                store.save_page(&mut page)?;
            }
        }

        for status_code in &self.http_error_codes {
            let name = Page::error_route_name(*status_code);
            known.insert(name.clone());
            if store
                .find_one_by(&PageCriteria::route(site_id, name.as_str()))?
                .is_some()
            {
                continue;
            }
            let mut page = store.create();
            page.site_id = site_id;
            page.route_name = name.clone();
            page.name = name;
            page.decorate = false;
            store.save_page(&mut page)?;
            report.push(ReconciliationAction::Created {
                page,
                path: String::new(),
            });
        }

        for page in store.get_hybrid_pages(site)? {
            if !page.is_hybrid() || page.is_internal() || known.contains(&page.route_name) {
                continue;
            }
            if cleanup {
                store.delete_page(&page)?;
                report.push(ReconciliationAction::Removed { page });
            } else {
                let mismatch = PageSnapError::CatalogMismatch {
                    route_name: page.route_name.clone(),
                };
                report.push(ReconciliationAction::Error {
                    route_name: page.route_name,
                    reason: mismatch.to_string(),
                });
            }
        }

        if report.has_stale_pages() && !cleanup {
            tracing::warn!(
                site_id = site_id,
                "some hybrid pages reference routes that no longer exist; rerun with cleanup to remove them"
            );
        }

        Ok(report)
    }

    /// Homepage of the site, created when missing
    fn ensure_root<S>(&self, store: &mut S, site: &Site, site_id: SiteId) -> Result<Page>
    where
        S: PageStore + ?Sized,
    {
        if let Some(root) = store.get_page_by_url(site, "/")? {
            return Ok(root);
        }
        let mut root = store.create();
        root.site_id = site_id;
        root.route_name = CMS_ROUTE_NAME.to_string();
        root.name = "Homepage".to_string();
        root.url = Some("/".to_string());
        root.slug = Some("/".to_string());
        store.save_page(&mut root)?;
        tracing::debug!(site_id = site_id, page_id = ?root.id, "created site homepage");
        Ok(root)
    }

    /// Whether the route should be represented by a page of this site
    fn belongs_to_site(&self, name: &str, route: &Route, site: &Site) -> Result<bool> {
        if !self.decorator.is_route_name_decorable(name)
            || !self.decorator.is_route_uri_decorable(&route.path)
        {
            return Ok(false);
        }
        if !route_matches_host(route, &site.host)? {
            return Ok(false);
        }
        match (route.locale_requirement(), site.locale.as_deref()) {
            (Some(requirement), Some(locale)) => {
                let re = Regex::new(&format!("^(?:{})$", requirement)).map_err(|e| {
                    PageSnapError::InvalidPattern {
                        pattern: requirement.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                Ok(re.is_match(locale))
            }
            _ => Ok(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RouteCollection;
    use crate::ops::{MemoryStore, SiteStore};

    fn setup() -> (MemoryStore, Site) {
        let mut store = MemoryStore::new();
        let mut site = Site::new("org", "sonata-project.org");
        store.save_site(&mut site).unwrap();
        (store, site)
    }

    fn generator(routes: RouteCollection) -> RoutePageGenerator<RouteCollection> {
        RoutePageGenerator::new(routes, DecoratorStrategy::permissive(), vec![])
    }

    #[test]
    fn test_creates_root_and_pages() {
        let (mut store, site) = setup();
        let mut routes = RouteCollection::new();
        routes.add("route1", Route::new("/first"));

        let report = generator(routes).update(&mut store, &site, false).unwrap();

        assert_eq!(report.lines(), vec!["CREATE route1 /first"]);
        let root = store.get_page_by_url(&site, "/").unwrap().unwrap();
        assert_eq!(root.route_name, CMS_ROUTE_NAME);
        let page = store
            .find_one_by(&PageCriteria::route(site.id.unwrap(), "route1"))
            .unwrap()
            .unwrap();
        assert_eq!(page.parent_id, root.id);
    }

    #[test]
    fn test_locale_requirement_excludes_route() {
        let (mut store, mut site) = setup();
        site.locale = Some("fr".to_string());
        let mut routes = RouteCollection::new();
        routes.add("en_only", Route::new("/en").with_requirement("_locale", "en"));
        routes.add("fr_or_en", Route::new("/fr").with_requirement("_locale", "fr|en"));

        let report = generator(routes).update(&mut store, &site, false).unwrap();
        assert_eq!(report.lines(), vec!["CREATE fr_or_en /fr"]);
    }

    #[test]
    fn test_cms_route_is_never_bound() {
        let (mut store, site) = setup();
        let mut routes = RouteCollection::new();
        routes.add(CMS_ROUTE_NAME, Route::new("/{path}"));

        let report = generator(routes).update(&mut store, &site, false).unwrap();
        assert!(report.is_empty());
        let root = store.get_page_by_url(&site, "/").unwrap().unwrap();
        assert_eq!(root.url.as_deref(), Some("/"));
    }

    #[test]
    fn test_unsaved_site_is_rejected() {
        let mut store = MemoryStore::new();
        let site = Site::new("new", "example.org");
        let err = generator(RouteCollection::new())
            .update(&mut store, &site, false)
            .unwrap_err();
        assert!(matches!(err, PageSnapError::InvalidInput { .. }));
    }

    #[test]
    fn test_invalid_host_pattern_aborts() {
        let (mut store, site) = setup();
        let mut routes = RouteCollection::new();
        routes.add("broken", Route::new("/b").with_host("example.{tld"));

        let err = generator(routes).update(&mut store, &site, false).unwrap_err();
        assert!(matches!(err, PageSnapError::InvalidPattern { .. }));
    }
}
