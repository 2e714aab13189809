//! Thin adapters from the typed job queue onto each module's own
//! compute entry point. Payload shape is the job submitter's contract
//! with the handler; a malformed payload is a permanent failure, not a
//! retryable one, but the runtime doesn't distinguish the two today so
//! it still goes through the normal retry/dead-letter path.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use consolidation::{CacheKey, ConsolidationCache};
use export::{ExportRenderer, RenderOptions};
use jobs::{job_core::job_types, JobHandler, JobHandlerError};
use variance::SectionKind;

fn bad_payload(err: impl std::fmt::Display) -> JobHandlerError {
    JobHandlerError::Failed(format!("bad payload: {err}"))
}

fn parse<T: for<'de> Deserialize<'de>>(payload: &serde_json::Value) -> Result<T, JobHandlerError> {
    serde_json::from_value(payload.clone()).map_err(bad_payload)
}

const DEFAULT_TEMPLATE: [SectionKind; 5] = [
    SectionKind::ExecSummary,
    SectionKind::ProfitAndLoss,
    SectionKind::BalanceSheet,
    SectionKind::CashflowSummary,
    SectionKind::TopVariances,
];

#[derive(Debug, Deserialize)]
struct BoardpackPayload {
    snapshot_id: Uuid,
    company_id: String,
    period_end: NaiveDate,
    currency: Option<String>,
    #[serde(default = "default_top_n")]
    top_n: usize,
}

fn default_top_n() -> usize {
    10
}

pub struct BoardpackGenerateHandler {
    pub pool: PgPool,
}

#[async_trait]
impl JobHandler for BoardpackGenerateHandler {
    fn job_type(&self) -> &'static str {
        job_types::BOARDPACK_GENERATE
    }

    async fn handle(&self, payload: &serde_json::Value, _cancel: &CancellationToken) -> Result<(), JobHandlerError> {
        let p: BoardpackPayload = parse(payload)?;
        variance::assemble(
            &self.pool,
            &DEFAULT_TEMPLATE,
            p.snapshot_id,
            &p.company_id,
            p.period_end,
            p.currency.as_deref(),
            p.top_n,
        )
        .await
        .map_err(|e| JobHandlerError::Failed(e.to_string()))?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ConsolidationRefreshPayload {
    group_id: String,
    period_end: NaiveDate,
    currency: String,
    policy: String,
}

pub struct ConsolidationRefreshHandler {
    pub pool: PgPool,
    pub cache: Arc<ConsolidationCache>,
}

#[async_trait]
impl JobHandler for ConsolidationRefreshHandler {
    fn job_type(&self) -> &'static str {
        job_types::CONSOLIDATION_REFRESH
    }

    async fn handle(&self, payload: &serde_json::Value, _cancel: &CancellationToken) -> Result<(), JobHandlerError> {
        let p: ConsolidationRefreshPayload = parse(payload)?;
        let key = CacheKey {
            group_id: p.group_id.clone(),
            period_end: p.period_end,
            currency: p.currency.clone(),
            policy: p.policy.clone(),
        };
        self.cache.invalidate(&key).await;
        self.cache
            .get_or_compute(&self.pool, key)
            .await
            .map_err(|e| JobHandlerError::Failed(e.to_string()))?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct VarianceSnapshotPayload {
    rule_id: Uuid,
    company_id: String,
    period_end: NaiveDate,
    currency: String,
}

pub struct VarianceSnapshotHandler {
    pub pool: PgPool,
}

#[async_trait]
impl JobHandler for VarianceSnapshotHandler {
    fn job_type(&self) -> &'static str {
        job_types::VARIANCE_SNAPSHOT
    }

    async fn handle(&self, payload: &serde_json::Value, _cancel: &CancellationToken) -> Result<(), JobHandlerError> {
        let p: VarianceSnapshotPayload = parse(payload)?;
        variance::compute(&self.pool, p.rule_id, &p.company_id, p.period_end, &p.currency)
            .await
            .map_err(|e| JobHandlerError::Failed(e.to_string()))?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct InventoryRevaluationPayload {
    company_id: String,
    warehouse_id: String,
    product_id: String,
}

pub struct InventoryRevaluationHandler {
    pub pool: PgPool,
}

#[async_trait]
impl JobHandler for InventoryRevaluationHandler {
    fn job_type(&self) -> &'static str {
        job_types::INVENTORY_REVALUATION
    }

    async fn handle(&self, payload: &serde_json::Value, _cancel: &CancellationToken) -> Result<(), JobHandlerError> {
        let p: InventoryRevaluationPayload = parse(payload)?;
        inventory::revalue_balance(&self.pool, &p.company_id, &p.warehouse_id, &p.product_id)
            .await
            .map_err(|e| JobHandlerError::Failed(e.to_string()))?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ReportRenderPdfPayload {
    html: String,
    #[serde(default)]
    options: RenderOptions,
    /// Path relative to `storage_root` the rendered PDF is written to.
    output_path: String,
}

pub struct ReportRenderPdfHandler {
    pub renderer: Arc<dyn ExportRenderer>,
    pub storage_root: std::path::PathBuf,
}

#[async_trait]
impl JobHandler for ReportRenderPdfHandler {
    fn job_type(&self) -> &'static str {
        job_types::REPORT_RENDER_PDF
    }

    async fn handle(&self, payload: &serde_json::Value, _cancel: &CancellationToken) -> Result<(), JobHandlerError> {
        let p: ReportRenderPdfPayload = parse(payload)?;
        let bytes = self
            .renderer
            .render_html(&p.html, &p.options)
            .await
            .map_err(|e| JobHandlerError::Failed(e.to_string()))?;

        let dest = self.storage_root.join(&p.output_path);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| JobHandlerError::Failed(format!("failed to create artefact directory: {e}")))?;
        }
        tokio::fs::write(&dest, &bytes)
            .await
            .map_err(|e| JobHandlerError::Failed(format!("failed to write rendered artefact: {e}")))?;

        Ok(())
    }
}
