//! Job submission endpoints: one route per registered job type, each
//! gated by the capability that matches the work it triggers. The
//! handler only validates the payload shape loosely (as JSON) and
//! hands it to the queue — `job_handlers` does the real parsing when
//! the job runs.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use jobs::job_core::job_types;
use serde::Deserialize;
use serde_json::json;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitJob {
    pub payload: serde_json::Value,
    pub idempotency_key: Option<String>,
}

async fn enqueue(state: &AppState, job_type: &str, body: SubmitJob) -> impl IntoResponse {
    match jobs::job_repo::enqueue(&state.pool, job_type, &body.payload, body.idempotency_key.as_deref(), 5, Utc::now())
        .await
    {
        Ok(job) => (StatusCode::ACCEPTED, Json(json!({ "job_id": job.id, "job_type": job.job_type }))).into_response(),
        Err(err) => {
            tracing::error!(error = %err, job_type, "failed to enqueue job");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": err.to_string() }))).into_response()
        }
    }
}

pub async fn submit_boardpack_generate(State(state): State<AppState>, Json(body): Json<SubmitJob>) -> impl IntoResponse {
    enqueue(&state, job_types::BOARDPACK_GENERATE, body).await
}

pub async fn submit_consolidation_refresh(
    State(state): State<AppState>,
    Json(body): Json<SubmitJob>,
) -> impl IntoResponse {
    enqueue(&state, job_types::CONSOLIDATION_REFRESH, body).await
}

pub async fn submit_variance_snapshot(State(state): State<AppState>, Json(body): Json<SubmitJob>) -> impl IntoResponse {
    enqueue(&state, job_types::VARIANCE_SNAPSHOT, body).await
}

pub async fn submit_inventory_revaluation(
    State(state): State<AppState>,
    Json(body): Json<SubmitJob>,
) -> impl IntoResponse {
    enqueue(&state, job_types::INVENTORY_REVALUATION, body).await
}

pub async fn submit_report_render_pdf(State(state): State<AppState>, Json(body): Json<SubmitJob>) -> impl IntoResponse {
    enqueue(&state, job_types::REPORT_RENDER_PDF, body).await
}
