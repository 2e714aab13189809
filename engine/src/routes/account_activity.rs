use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use gl::AccountActivityError;
use gl::repos::report_query_repo::ReportQueryError;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AccountActivityQuery {
    pub company_id: String,
    pub account_code: String,
    pub period_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    100
}

pub async fn get_account_activity(
    State(state): State<AppState>,
    Query(params): Query<AccountActivityQuery>,
) -> Response {
    let result = gl::get_account_activity(
        &state.pool,
        &params.company_id,
        &params.account_code,
        params.period_id,
        params.start_date,
        params.end_date,
        params.limit,
        params.offset,
    )
    .await;

    match result {
        Ok(activity) => Json(json!({
            "company_id": activity.company_id,
            "account_code": activity.account_code,
            "period_start": activity.period_start,
            "period_end": activity.period_end,
            "lines": activity.lines,
            "total_count": activity.total_count,
            "limit": activity.limit,
            "offset": activity.offset,
        }))
        .into_response(),
        Err(err) => {
            let status = match &err {
                AccountActivityError::MissingDateFilter => StatusCode::BAD_REQUEST,
                AccountActivityError::PeriodNotFound { .. } => StatusCode::NOT_FOUND,
                AccountActivityError::ReportQuery(ReportQueryError::InvalidDateRange { .. })
                | AccountActivityError::ReportQuery(ReportQueryError::InvalidPagination { .. }) => {
                    StatusCode::BAD_REQUEST
                }
                AccountActivityError::ReportQuery(ReportQueryError::Database(_)) | AccountActivityError::Period(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            (status, Json(json!({ "error": err.to_string() }))).into_response()
        }
    }
}
