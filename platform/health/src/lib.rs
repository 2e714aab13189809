use axum::Json;
use serde_json::{json, Value};

/// GET /healthz — liveness probe for the engine process.
pub async fn health(service: &'static str) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": service,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
