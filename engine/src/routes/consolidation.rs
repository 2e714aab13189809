use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use consolidation::{CacheKey, ConsolidationError};
use serde::Deserialize;
use serde_json::json;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConsolidatedViewQuery {
    pub group_id: String,
    pub period_end: NaiveDate,
    pub currency: String,
    pub policy: String,
}

pub async fn get_consolidated_view(
    State(state): State<AppState>,
    Query(params): Query<ConsolidatedViewQuery>,
) -> Response {
    let key = CacheKey {
        group_id: params.group_id,
        period_end: params.period_end,
        currency: params.currency,
        policy: params.policy,
    };

    match state.consolidation_cache.get_or_compute(&state.pool, key).await {
        Ok(view) => Json(view.as_ref().clone()).into_response(),
        Err(ConsolidationError::EmptyGroup(group_id)) => {
            (StatusCode::NOT_FOUND, Json(json!({ "error": format!("no companies in group {group_id}") })))
                .into_response()
        }
        Err(err) => {
            tracing::warn!(error = %err, "consolidation view computation failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": err.to_string() }))).into_response()
        }
    }
}
