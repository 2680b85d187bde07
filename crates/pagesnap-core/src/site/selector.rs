//! Site selection from request attributes
//!
//! A selector is fed the request host and path once per request and then
//! exposes the resolved site through [`SiteSelector::retrieve`].

use crate::model::{Site, ANY_HOST};

/// Provides the site resolved for the current request
pub trait SiteSelector {
    fn retrieve(&self) -> Option<&Site>;
}

/// Fixed selection, mostly useful in tests and single-site tools
impl SiteSelector for Option<Site> {
    fn retrieve(&self) -> Option<&Site> {
        self.as_ref()
    }
}

/// Result of matching a request against the configured sites
#[derive(Debug, Clone, PartialEq)]
pub struct SiteMatch {
    pub site: Site,
    /// Request path with the site's relative path stripped
    pub path_info: String,
}

/// Resolves sites by request host and path prefix
///
/// Candidates are the enabled sites whose host equals the request host or is
/// `localhost`. Among candidates whose relative path prefixes the request
/// path, a concrete host beats `localhost` and a longer prefix beats a
/// shorter one. When no prefix matches, the default candidate is selected.
#[derive(Debug, Clone, Default)]
pub struct HostPathSiteSelector {
    sites: Vec<Site>,
    current: Option<SiteMatch>,
}

impl HostPathSiteSelector {
    pub fn new(sites: Vec<Site>) -> Self {
        Self {
            sites,
            current: None,
        }
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Resolve the site for a request and remember it
    pub fn handle_request(&mut self, host: &str, path: &str) -> Option<&SiteMatch> {
        self.current = self.match_request(host, path);
        if let Some(found) = &self.current {
            tracing::debug!(
                site = %found.site.name,
                path_info = %found.path_info,
                "site selected"
            );
        }
        self.current.as_ref()
    }

    pub fn current(&self) -> Option<&SiteMatch> {
        self.current.as_ref()
    }

    /// Enabled sites answering on `host`, in registration order
    fn candidates(&self, host: &str) -> Vec<&Site> {
        self.sites
            .iter()
            .filter(|site| site.enabled && site.matches_host(host))
            .collect()
    }

    /// Best site whose relative path prefixes `path`
    pub fn match_request(&self, host: &str, path: &str) -> Option<SiteMatch> {
        let best = self
            .candidates(host)
            .into_iter()
            .filter_map(|site| strip_site_prefix(site, path).map(|rest| (site, rest)))
            .max_by_key(|(site, _)| {
                (
                    site.host != ANY_HOST,
                    site.relative_path_or_empty().len(),
                )
            });

        if let Some((site, rest)) = best {
            return Some(SiteMatch {
                site: site.clone(),
                path_info: rest,
            });
        }

        self.default_site(host).map(|site| SiteMatch {
            site: site.clone(),
            path_info: normalize_path(path),
        })
    }

    /// Default enabled site for a host
    pub fn default_site(&self, host: &str) -> Option<&Site> {
        self.candidates(host)
            .into_iter()
            .filter(|site| site.is_default)
            .max_by_key(|site| site.host != ANY_HOST)
    }
}

impl SiteSelector for HostPathSiteSelector {
    fn retrieve(&self) -> Option<&Site> {
        self.current.as_ref().map(|m| &m.site)
    }
}

/// Host/path selection with a locale fallback for unprefixed paths
///
/// When the request path carries no site prefix, the site whose locale best
/// matches the `Accept-Language` preferences is selected, falling back to
/// the default site. `redirect_to` then holds the selected site's root so
/// the caller can redirect.
#[derive(Debug, Clone, Default)]
pub struct LocaleSiteSelector {
    inner: HostPathSiteSelector,
    redirect_to: Option<String>,
}

impl LocaleSiteSelector {
    pub fn new(sites: Vec<Site>) -> Self {
        Self {
            inner: HostPathSiteSelector::new(sites),
            redirect_to: None,
        }
    }

    pub fn handle_request(
        &mut self,
        host: &str,
        path: &str,
        accept_language: Option<&str>,
    ) -> Option<&SiteMatch> {
        self.redirect_to = None;

        let prefixed = self
            .inner
            .candidates(host)
            .into_iter()
            .filter(|site| !site.relative_path_or_empty().is_empty())
            .any(|site| strip_site_prefix(site, path).is_some());
        if prefixed {
            return self.inner.handle_request(host, path);
        }

        let preferred = accept_language
            .map(parse_accept_language)
            .unwrap_or_default();
        let chosen = preferred
            .iter()
            .find_map(|lang| self.site_for_language(host, lang))
            .or_else(|| self.inner.default_site(host))
            .cloned();

        self.inner.current = chosen.map(|site| {
            self.redirect_to = Some(format!("{}/", site.relative_path_or_empty()));
            SiteMatch {
                site,
                path_info: normalize_path(path),
            }
        });
        self.inner.current.as_ref()
    }

    /// Site root to redirect to after a locale-based selection
    pub fn redirect_to(&self) -> Option<&str> {
        self.redirect_to.as_deref()
    }

    fn site_for_language(&self, host: &str, lang: &str) -> Option<&Site> {
        let primary = lang.split(['-', '_']).next().unwrap_or(lang);
        let sites: Vec<&Site> = self
            .inner
            .candidates(host)
            .into_iter()
            .filter(|s| s.locale.is_some())
            .collect();
        sites
            .iter()
            .find(|s| s.locale.as_deref().map_or(false, |l| l.eq_ignore_ascii_case(lang)))
            .or_else(|| {
                sites.iter().find(|s| {
                    s.locale
                        .as_deref()
                        .map_or(false, |l| l.eq_ignore_ascii_case(primary))
                })
            })
            .copied()
    }
}

impl SiteSelector for LocaleSiteSelector {
    fn retrieve(&self) -> Option<&Site> {
        self.inner.retrieve()
    }
}

/// Request path below the site's relative path, if the site prefixes it
fn strip_site_prefix(site: &Site, path: &str) -> Option<String> {
    let prefix = site.relative_path_or_empty().trim_end_matches('/');
    if prefix.is_empty() {
        return Some(normalize_path(path));
    }
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(normalize_path(rest))
    } else {
        None
    }
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Language tags ordered by descending quality
pub fn parse_accept_language(header: &str) -> Vec<String> {
    let mut tags: Vec<(String, f32, usize)> = header
        .split(',')
        .enumerate()
        .filter_map(|(index, part)| {
            let mut pieces = part.trim().split(';');
            let tag = pieces.next()?.trim();
            if tag.is_empty() || tag == "*" {
                return None;
            }
            let quality = pieces
                .find_map(|p| p.trim().strip_prefix("q="))
                .and_then(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            (quality > 0.0).then(|| (tag.to_string(), quality, index))
        })
        .collect();
    tags.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.2.cmp(&b.2)));
    tags.into_iter().map(|(tag, _, _)| tag).collect()
}
