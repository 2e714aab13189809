//! Row shapes for the typed job queue (spec §4.8).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "job_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    DeadLetter,
}

#[derive(Debug, Clone, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub job_type: String,
    pub payload: serde_json::Value,
    pub idempotency_key: Option<String>,
    pub attempt: i32,
    pub max_attempts: i32,
    pub run_after: DateTime<Utc>,
    pub status: JobStatus,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registered job type keys (spec §4.8 "Registered job types at minimum").
pub mod job_types {
    pub const BOARDPACK_GENERATE: &str = "boardpack:generate";
    pub const CONSOLIDATION_REFRESH: &str = "consolidation:refresh";
    pub const VARIANCE_SNAPSHOT: &str = "variance:snapshot";
    pub const INVENTORY_REVALUATION: &str = "inventory:revaluation";
    pub const REPORT_RENDER_PDF: &str = "report:render-pdf";
}
