//! Shared application state handed to every axum handler.

use std::sync::Arc;

use consolidation::ConsolidationCache;
use event_bus::EventBus;
use export::ExportRenderer;
use jobs::JobRegistry;
use security::ExportRateLimiter;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub bus: Arc<dyn EventBus>,
    pub job_registry: Arc<JobRegistry>,
    pub consolidation_cache: Arc<ConsolidationCache>,
    pub export_limiter: Arc<ExportRateLimiter>,
    pub renderer: Arc<dyn ExportRenderer>,
}
