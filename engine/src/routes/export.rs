//! CSV and PDF export. Both are gated by an explicit export capability
//! and the per-actor export rate limit, per
//! `consolidation::authorize_export` (spec §6 export gating, §4.9
//! per-actor export throttling).

use axum::{
    extract::{Extension, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use export::RenderOptions;
use security::{capabilities, ActorContext};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TrialBalanceExportQuery {
    pub company_id: String,
    pub period_id: Uuid,
    pub currency: Option<String>,
}

pub async fn export_trial_balance_csv(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Query(params): Query<TrialBalanceExportQuery>,
) -> Response {
    if let Err(err) = consolidation::authorize_export(&actor, capabilities::EXPORT_CSV, &state.export_limiter) {
        return err.into_response();
    }

    let rows = match gl::get_trial_balance(&state.pool, &params.company_id, params.period_id, params.currency.as_deref())
        .await
    {
        Ok(rows) => rows,
        Err(err) => {
            tracing::warn!(error = %err, "trial balance lookup failed for export");
            return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
        }
    };

    let mut writer = export::CsvWriter::new();
    writer.write_row(["account_code", "account_name", "currency", "debit_total", "credit_total", "net_balance"]);
    for row in &rows {
        writer.write_row([
            row.account_code.clone(),
            row.account_name.clone(),
            row.currency.clone(),
            row.debit_total_minor.to_string(),
            row.credit_total_minor.to_string(),
            row.net_balance_minor.to_string(),
        ]);
    }

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"trial_balance.csv\""),
        ],
        writer.finish(),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct RenderPdfBody {
    pub html: String,
    #[serde(default)]
    pub options: RenderOptions,
}

/// Synchronous render-and-return, for callers that need the bytes inline
/// rather than via the `report:render-pdf` job queue. Returns 503 when
/// the external renderer isn't configured (spec §6: "On unavailability,
/// PDF endpoints return 503").
pub async fn export_render_pdf(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<RenderPdfBody>,
) -> Response {
    if let Err(err) = consolidation::authorize_export(&actor, capabilities::EXPORT_PDF, &state.export_limiter) {
        return err.into_response();
    }

    match state.renderer.render_html(&body.html, &body.options).await {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/pdf"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"report.pdf\""),
            ],
            bytes,
        )
            .into_response(),
        Err(export::RenderError::NotReady) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "renderer unavailable", "html_fallback": body.html })),
        )
            .into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "pdf render failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": err.to_string() }))).into_response()
        }
    }
}
