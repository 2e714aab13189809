mod config;
mod idempotency;
mod job_handlers;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use event_bus::{EventBus, InMemoryBus, NatsBus};
use export::{ExportRenderer, HttpRenderer, NullRenderer};
use jobs::{JobRegistry, JobRetryPolicy, JobRuntime};
use security::{capabilities, require_capability, ExportRateLimiter};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use config::Config;
use consolidation::ConsolidationCache;
use job_handlers::{
    BoardpackGenerateHandler, ConsolidationRefreshHandler, InventoryRevaluationHandler, ReportRenderPdfHandler,
    VarianceSnapshotHandler,
};
use state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env().expect("failed to load configuration from environment");

    tracing::info!(host = %config.host, port = config.port, bus_type = %config.bus_type, storage_root = %config.storage_root, "starting engine");
    tracing::debug!("session and CSRF secrets present at start-up");

    let pool = persistence::init_pool(&config.database_url).await.expect("failed to connect to database");

    let bus: Arc<dyn EventBus> = match config.bus_type.to_lowercase().as_str() {
        "inmemory" => Arc::new(InMemoryBus::new()),
        "nats" => {
            let client = async_nats::connect(&config.nats_url).await.expect("failed to connect to NATS");
            Arc::new(NatsBus::new(client))
        }
        other => panic!("invalid BUS_TYPE: {other}. must be 'inmemory' or 'nats'"),
    };

    let renderer: Arc<dyn ExportRenderer> = if config.renderer_url.is_empty() {
        tracing::warn!("RENDERER_URL not set; PDF rendering jobs will fail with NotReady");
        Arc::new(NullRenderer)
    } else {
        Arc::new(HttpRenderer::new(config.renderer_url.clone()))
    };

    let consolidation_cache = Arc::new(ConsolidationCache::with_ttl(config.cache_ttl));

    let mut registry = JobRegistry::new();
    registry.register(Arc::new(BoardpackGenerateHandler { pool: pool.clone() }));
    registry.register(Arc::new(ConsolidationRefreshHandler { pool: pool.clone(), cache: consolidation_cache.clone() }));
    registry.register(Arc::new(VarianceSnapshotHandler { pool: pool.clone() }));
    registry.register(Arc::new(InventoryRevaluationHandler { pool: pool.clone() }));
    registry.register(Arc::new(ReportRenderPdfHandler {
        renderer: renderer.clone(),
        storage_root: std::path::PathBuf::from(&config.storage_root),
    }));
    let registry = Arc::new(registry);

    let job_runtime = Arc::new(JobRuntime::new(pool.clone(), registry.clone(), JobRetryPolicy::default()));
    let cancel = CancellationToken::new();
    tokio::spawn(job_runtime.clone().run_workers(config.job_worker_count, config.job_poll_interval, cancel.clone()));

    let state = AppState {
        pool: pool.clone(),
        bus,
        job_registry: registry,
        consolidation_cache,
        export_limiter: Arc::new(ExportRateLimiter::for_exports()),
        renderer,
    };

    let app = build_router(state, pool);

    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>().unwrap_or([0, 0, 0, 0].into()), config.port));
    tracing::info!(%addr, "engine listening");

    let listener = tokio::net::TcpListener::bind(addr).await.expect("failed to bind address");
    axum::serve(listener, app).await.expect("server failed to start");
}

/// Wraps a mutating route: capability check runs first (it populates the
/// `ActorContext` extension), idempotency replay runs second so it can
/// read the actor the capability check resolved.
fn guarded_route(
    path: &str,
    capability: &'static str,
    pool: sqlx::PgPool,
    handler: axum::routing::MethodRouter<AppState>,
) -> Router<AppState> {
    Router::new()
        .route(path, handler)
        .route_layer(from_fn_with_state(pool, idempotency::check_idempotency))
        .route_layer(from_fn_with_state(capability, require_capability))
}

fn build_router(state: AppState, pool: sqlx::PgPool) -> Router {
    let public_routes = Router::new()
        .route("/healthz", get(routes::health::health))
        .route("/api/gl/trial-balance", get(routes::trial_balance::get_trial_balance))
        .route("/api/gl/account-activity", get(routes::account_activity::get_account_activity))
        .route("/api/consolidation/view", get(routes::consolidation::get_consolidated_view));

    let job_routes = guarded_route(
        "/api/jobs/boardpack",
        capabilities::BOARDPACK_GENERATE,
        pool.clone(),
        post(routes::jobs::submit_boardpack_generate),
    )
    .merge(guarded_route(
        "/api/jobs/consolidation-refresh",
        capabilities::CONSOLIDATION_REFRESH,
        pool.clone(),
        post(routes::jobs::submit_consolidation_refresh),
    ))
    .merge(guarded_route(
        "/api/jobs/variance-snapshot",
        capabilities::VARIANCE_RUN,
        pool.clone(),
        post(routes::jobs::submit_variance_snapshot),
    ))
    .merge(guarded_route(
        "/api/jobs/inventory-revaluation",
        capabilities::INVENTORY_ADJUST,
        pool.clone(),
        post(routes::jobs::submit_inventory_revaluation),
    ))
    .merge(guarded_route(
        "/api/jobs/report-render-pdf",
        capabilities::EXPORT_PDF,
        pool.clone(),
        post(routes::jobs::submit_report_render_pdf),
    ));

    let export_routes = Router::new()
        .route("/api/export/trial-balance.csv", get(routes::export::export_trial_balance_csv))
        .route_layer(from_fn_with_state(capabilities::EXPORT_CSV, require_capability))
        .merge(
            Router::new()
                .route("/api/export/render-pdf", post(routes::export::export_render_pdf))
                .route_layer(from_fn_with_state(capabilities::EXPORT_PDF, require_capability)),
        );

    let audit_routes = Router::new()
        .route("/api/audit", get(routes::audit::get_audit_trail))
        .route_layer(from_fn_with_state(capabilities::AUDIT_READ, require_capability));

    public_routes
        .merge(job_routes)
        .merge(export_routes)
        .merge(audit_routes)
        .layer(CorsLayer::new().allow_origin(tower_http::cors::Any).allow_methods(tower_http::cors::Any).allow_headers(tower_http::cors::Any))
        .with_state(state)
}
