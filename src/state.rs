//! Application state for Outreach.
//!
//! Contains the shared state that is passed to all handlers.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::Config;
use crate::db::{self, DbPool};
use crate::services::{AuthService, GalleryService, SubmissionLimiter};
use crate::Result;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: DbPool,
    /// Configuration the state was built from.
    pub config: Arc<Config>,
    /// Authentication service.
    pub auth: AuthService,
    /// Public storage scan and uploads.
    pub gallery: GalleryService,
    /// Contact form quota.
    pub contact_limiter: SubmissionLimiter,
    /// Prometheus render handle, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new application state: open the database, apply the schema,
    /// wire services and create the bootstrap admin.
    pub async fn new(config: Config) -> Result<Self> {
        let db = db::init_pool(&config.database.path).await?;
        db::initialize_schema(&db).await?;

        let state = Self::from_parts(db, config);
        state.auth.ensure_bootstrap_admin().await?;

        Ok(state)
    }

    /// Wire services over an already-initialized pool.
    pub fn from_parts(db: DbPool, config: Config) -> Self {
        let auth = AuthService::new(db.clone(), config.auth.clone());
        let gallery = GalleryService::new(config.storage.clone());
        let contact_limiter = SubmissionLimiter::per_minute(config.contact.rate_limit_per_minute);

        Self {
            db,
            config: Arc::new(config),
            auth,
            gallery,
            contact_limiter,
            metrics: None,
        }
    }

    /// Attach a Prometheus handle so `/metrics` can render.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
