use audit::AuditQuery;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AuditQueryParams {
    pub company_id: Option<String>,
    pub actor_id: Option<String>,
    pub entity_kind: Option<String>,
    pub entity_id: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub before_at: Option<DateTime<Utc>>,
    pub before_id: Option<Uuid>,
}

fn default_limit() -> i64 {
    100
}

pub async fn get_audit_trail(State(state): State<AppState>, Query(params): Query<AuditQueryParams>) -> Response {
    let filter = AuditQuery {
        company_id: params.company_id,
        actor_id: params.actor_id,
        entity_kind: params.entity_kind,
        entity_id: params.entity_id,
        since: params.since,
        until: params.until,
        limit: params.limit,
        before_at: params.before_at,
        before_id: params.before_id,
    };

    match audit::query(&state.pool, &filter).await {
        Ok(entries) => Json(entries).into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "audit query failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": err.to_string() }))).into_response()
        }
    }
}
