//! Rule and Run row shapes (Data Model §3: Elimination).
//!
//! A rule names a pair of accounts held in two operating companies that
//! should be matched and eliminated for a consolidation group. A run is
//! one simulate/post attempt of a rule against a period; its accumulated
//! amounts and journal link are persisted so a Posted run can always be
//! traced back to the entry it produced.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Rule {
    pub id: Uuid,
    pub group_id: String,
    pub name: String,
    pub source_company_id: String,
    pub target_company_id: String,
    pub source_account: String,
    pub target_account: String,
    pub currency: String,
    pub match_criteria: Option<JsonValue>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "elimination_run_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Draft,
    Simulated,
    Posted,
    Failed,
}

#[derive(Debug, Clone, FromRow)]
pub struct Run {
    pub id: Uuid,
    pub rule_id: Uuid,
    pub period_end: NaiveDate,
    pub status: RunStatus,
    pub source_net_minor: Option<i64>,
    pub target_net_minor: Option<i64>,
    pub eliminated_minor: Option<i64>,
    pub journal_entry_id: Option<Uuid>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
