use pagesnap_core_types::RunId;
use thiserror::Error;

/// Result type alias using PageSnapError
pub type Result<T> = std::result::Result<T, PageSnapError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code usable by callers, tests and the
/// CLI exit message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    InvalidPattern,
    NotFound,
    AlreadyExists,
    ConstraintViolation,
    SiteMismatch,

    // Reconciliation
    /// A hybrid page references a route that vanished from the catalog
    CatalogMismatch,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    CacheInvalidation,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidPattern => "ERR_INVALID_PATTERN",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::SiteMismatch => "ERR_SITE_MISMATCH",
            ExErrorKind::CatalogMismatch => "ERR_CATALOG_MISMATCH",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::CacheInvalidation => "ERR_CACHE_INVALIDATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether an error of this kind must abort the enclosing unit of work
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ExErrorKind::CatalogMismatch | ExErrorKind::CacheInvalidation
        )
    }
}

/// Canonical structured error type
///
/// Carries a classification plus the entity context needed to debug a failed
/// reconciliation or publish run.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    site_id: Option<i64>,
    page_id: Option<i64>,
    route_name: Option<String>,
    run_id: Option<RunId>,
    message: String,
}

impl ExError {
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            site_id: None,
            page_id: None,
            route_name: None,
            run_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    pub fn with_site_id(mut self, site_id: i64) -> Self {
        self.site_id = Some(site_id);
        self
    }

    pub fn with_page_id(mut self, page_id: i64) -> Self {
        self.page_id = Some(page_id);
        self
    }

    pub fn with_route_name(mut self, route_name: impl Into<String>) -> Self {
        self.route_name = Some(route_name.into());
        self
    }

    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn site_id(&self) -> Option<i64> {
        self.site_id
    }

    pub fn page_id(&self) -> Option<i64> {
        self.page_id
    }

    pub fn route_name(&self) -> Option<&str> {
        self.route_name.as_deref()
    }

    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(site_id) = self.site_id {
            write!(f, " (site_id: {})", site_id)?;
        }
        if let Some(page_id) = self.page_id {
            write!(f, " (page_id: {})", page_id)?;
        }
        if let Some(route_name) = &self.route_name {
            write!(f, " (route: {})", route_name)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for PageSnap core operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PageSnapError {
    #[error("Page not found: {page_id}")]
    PageNotFound { page_id: i64 },

    #[error("Site not found: {site_id}")]
    SiteNotFound { site_id: i64 },

    #[error("Snapshot not found: {snapshot_id}")]
    SnapshotNotFound { snapshot_id: i64 },

    /// Page must be persisted (have an id) before this operation
    #[error("Page for route '{route_name}' has not been persisted")]
    PageNotPersisted { route_name: String },

    /// Snapshot must be persisted before it can be enabled
    #[error("Snapshot for page {page_id} has not been persisted")]
    SnapshotNotPersisted { page_id: i64 },

    /// Hybrid page route is already bound to another page in the site
    #[error("Route '{route_name}' is already bound to a page in site {site_id}")]
    DuplicateRoute { site_id: i64, route_name: String },

    /// Parent page belongs to a different site
    #[error("Page {page_id} belongs to site {page_site_id} but its parent {parent_id} belongs to site {parent_site_id}")]
    ParentSiteMismatch {
        page_id: i64,
        page_site_id: i64,
        parent_id: i64,
        parent_site_id: i64,
    },

    /// Hybrid page route vanished from the route catalog
    #[error("Route '{route_name}' no longer exists in the catalog")]
    CatalogMismatch { route_name: String },

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Store write or read failed
    #[error("Persistence failure in {op}: {message}")]
    Persistence { op: String, message: String },

    #[error("Cache invalidation failed: {message}")]
    CacheInvalidation { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// A unit of work was committed or rolled back without being started
    #[error("Unit of work misuse: {message}")]
    UnitOfWork { message: String },
}

impl PageSnapError {
    /// Shorthand for persistence failures raised by store implementations
    pub fn persistence(op: impl Into<String>, message: impl Into<String>) -> Self {
        PageSnapError::Persistence {
            op: op.into(),
            message: message.into(),
        }
    }
}

/// Conversion from PageSnapError to ExError
impl From<PageSnapError> for ExError {
    fn from(err: PageSnapError) -> Self {
        match err {
            PageSnapError::PageNotFound { page_id } => ExError::new(ExErrorKind::NotFound)
                .with_page_id(page_id)
                .with_message("Page not found"),

            PageSnapError::SiteNotFound { site_id } => ExError::new(ExErrorKind::NotFound)
                .with_site_id(site_id)
                .with_message("Site not found"),

            PageSnapError::SnapshotNotFound { snapshot_id } => {
                ExError::new(ExErrorKind::NotFound)
                    .with_message(format!("Snapshot not found: {}", snapshot_id))
            }

            PageSnapError::PageNotPersisted { route_name } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_route_name(route_name)
                    .with_message("Page has not been persisted")
            }

            PageSnapError::SnapshotNotPersisted { page_id } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_page_id(page_id)
                    .with_message("Snapshot has not been persisted")
            }

            PageSnapError::DuplicateRoute {
                site_id,
                route_name,
            } => ExError::new(ExErrorKind::AlreadyExists)
                .with_site_id(site_id)
                .with_route_name(route_name)
                .with_message("Route already bound to a page"),

            PageSnapError::ParentSiteMismatch {
                page_id,
                page_site_id,
                parent_id,
                parent_site_id,
            } => ExError::new(ExErrorKind::SiteMismatch)
                .with_page_id(page_id)
                .with_site_id(page_site_id)
                .with_message(format!(
                    "Parent {} belongs to site {}",
                    parent_id, parent_site_id
                )),

            PageSnapError::CatalogMismatch { route_name } => {
                ExError::new(ExErrorKind::CatalogMismatch)
                    .with_route_name(route_name)
                    .with_message("Route no longer exists in the catalog")
            }

            PageSnapError::InvalidPattern { pattern, reason } => {
                ExError::new(ExErrorKind::InvalidPattern)
                    .with_message(format!("{}: {}", pattern, reason))
            }

            PageSnapError::InvalidInput { reason } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(reason)
            }

            PageSnapError::Persistence { op, message } => ExError::new(ExErrorKind::Persistence)
                .with_op(op)
                .with_message(message),

            PageSnapError::CacheInvalidation { message } => {
                ExError::new(ExErrorKind::CacheInvalidation).with_message(message)
            }

            PageSnapError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            PageSnapError::UnitOfWork { message } => ExError::new(ExErrorKind::Internal)
                .with_op("unit_of_work")
                .with_message(message),
        }
    }
}

/// Store crates report their failures as ExError; core code that calls
/// through a port sees them as persistence failures.
impl From<ExError> for PageSnapError {
    fn from(err: ExError) -> Self {
        match err.kind() {
            ExErrorKind::Serialization => PageSnapError::Serialization {
                message: err.to_string(),
            },
            ExErrorKind::CacheInvalidation => PageSnapError::CacheInvalidation {
                message: err.to_string(),
            },
            _ => PageSnapError::Persistence {
                op: err.op().unwrap_or("store").to_string(),
                message: err.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for PageSnapError {
    fn from(err: serde_json::Error) -> Self {
        PageSnapError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<regex::Error> for PageSnapError {
    fn from(err: regex::Error) -> Self {
        PageSnapError::InvalidPattern {
            pattern: String::new(),
            reason: err.to_string(),
        }
    }
}
