use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TrialBalanceQuery {
    pub company_id: String,
    pub period_id: Uuid,
    pub currency: Option<String>,
}

pub async fn get_trial_balance(State(state): State<AppState>, Query(params): Query<TrialBalanceQuery>) -> Response {
    match gl::get_trial_balance(&state.pool, &params.company_id, params.period_id, params.currency.as_deref()).await {
        Ok(rows) => Json(rows).into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "trial balance lookup failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": err.to_string() }))).into_response()
        }
    }
}
