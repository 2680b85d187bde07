//! Reconciliation actions and their line-oriented report
//!
//! Each action renders as one line: `CREATE <name> <path>`,
//! `UPDATE <name> <path>`, `DISABLE <name> <path>`, `REMOVED <name>` or
//! `ERROR <name>`. Downstream tooling parses these lines, so the tokens and
//! the single-space layout must not change.

use std::fmt;

use serde::Serialize;

use crate::model::{Page, Site, SiteId};

/// One outcome of a reconciliation pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReconciliationAction {
    /// A page was created for a route (path is empty for error pages)
    Created { page: Page, path: String },
    /// The stored page was realigned with its route
    Updated { page: Page, path: String },
    /// The page's route does not belong to the site; the page is disabled
    Disabled { page: Page, path: String },
    /// A hybrid page whose route vanished was deleted
    Removed { page: Page },
    /// A hybrid page's route vanished; the page was left in place
    Error { route_name: String, reason: String },
}

impl ReconciliationAction {
    pub fn token(&self) -> &'static str {
        match self {
            ReconciliationAction::Created { .. } => "CREATE",
            ReconciliationAction::Updated { .. } => "UPDATE",
            ReconciliationAction::Disabled { .. } => "DISABLE",
            ReconciliationAction::Removed { .. } => "REMOVED",
            ReconciliationAction::Error { .. } => "ERROR",
        }
    }

    pub fn route_name(&self) -> &str {
        match self {
            ReconciliationAction::Created { page, .. }
            | ReconciliationAction::Updated { page, .. }
            | ReconciliationAction::Disabled { page, .. }
            | ReconciliationAction::Removed { page } => &page.route_name,
            ReconciliationAction::Error { route_name, .. } => route_name,
        }
    }

    pub fn page(&self) -> Option<&Page> {
        match self {
            ReconciliationAction::Created { page, .. }
            | ReconciliationAction::Updated { page, .. }
            | ReconciliationAction::Disabled { page, .. }
            | ReconciliationAction::Removed { page } => Some(page),
            ReconciliationAction::Error { .. } => None,
        }
    }

    /// Report line for this action
    pub fn line(&self) -> String {
        match self {
            ReconciliationAction::Created { path, .. }
            | ReconciliationAction::Updated { path, .. }
            | ReconciliationAction::Disabled { path, .. } => {
                format!("{} {} {}", self.token(), self.route_name(), path)
                    .trim_end()
                    .to_string()
            }
            ReconciliationAction::Removed { .. } | ReconciliationAction::Error { .. } => {
                format!("{} {}", self.token(), self.route_name())
            }
        }
    }

    pub fn is_stale_page(&self) -> bool {
        matches!(
            self,
            ReconciliationAction::Removed { .. } | ReconciliationAction::Error { .. }
        )
    }
}

/// Per-token action counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActionSummary {
    pub created: usize,
    pub updated: usize,
    pub disabled: usize,
    pub removed: usize,
    pub errors: usize,
}

/// Ordered result of one reconciliation pass for one site
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationReport {
    pub site_id: SiteId,
    pub site_name: String,
    pub site_url: String,
    pub actions: Vec<ReconciliationAction>,
}

impl ReconciliationReport {
    pub fn new(site_id: SiteId, site: &Site) -> Self {
        Self {
            site_id,
            site_name: site.name.clone(),
            site_url: site.url(),
            actions: Vec::new(),
        }
    }

    pub fn push(&mut self, action: ReconciliationAction) {
        tracing::debug!(
            site_id = self.site_id,
            route_name = %action.route_name(),
            action = action.token(),
            "reconciliation action"
        );
        self.actions.push(action);
    }

    pub fn lines(&self) -> Vec<String> {
        self.actions.iter().map(ReconciliationAction::line).collect()
    }

    /// Whether some hybrid pages reference routes that no longer exist
    pub fn has_stale_pages(&self) -> bool {
        self.actions.iter().any(ReconciliationAction::is_stale_page)
    }

    pub fn summary(&self) -> ActionSummary {
        let mut summary = ActionSummary::default();
        for action in &self.actions {
            match action {
                ReconciliationAction::Created { .. } => summary.created += 1,
                ReconciliationAction::Updated { .. } => summary.updated += 1,
                ReconciliationAction::Disabled { .. } => summary.disabled += 1,
                ReconciliationAction::Removed { .. } => summary.removed += 1,
                ReconciliationAction::Error { .. } => summary.errors += 1,
            }
        }
        summary
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl fmt::Display for ReconciliationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for action in &self.actions {
            writeln!(f, "{}", action.line())?;
        }
        Ok(())
    }
}
