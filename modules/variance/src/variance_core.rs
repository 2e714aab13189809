//! Row shapes for budget-vs-actual snapshots and the board pack
//! view-model (spec §4.7).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One (account, budget) pair a rule tests actuals against.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RuleLine {
    pub account_code: String,
    pub budget_minor: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct Rule {
    pub id: Uuid,
    pub company_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "variance_snapshot_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SnapshotStatus {
    Ready,
    Failed,
}

/// One row of the computed snapshot: `variance = actual - budget`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarianceRow {
    pub account_code: String,
    pub actual_minor: i64,
    pub budget_minor: i64,
    pub variance_minor: i64,
    /// `None` when `budget_minor` is zero — percentage variance against
    /// a zero budget is undefined, not zero or infinite.
    pub variance_pct: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub id: Uuid,
    pub rule_id: Uuid,
    pub period_end: NaiveDate,
    pub status: SnapshotStatus,
    pub rows: Vec<VarianceRow>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}
