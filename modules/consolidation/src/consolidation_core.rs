//! View-model shapes for a consolidated P&L/Balance Sheet (spec §4.9).

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct StatementLine {
    pub account_code: String,
    pub account_name: String,
    pub amount_minor: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfitAndLoss {
    pub lines: Vec<StatementLine>,
    pub net_profit_minor: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceSheet {
    pub assets: Vec<StatementLine>,
    pub liabilities: Vec<StatementLine>,
    pub equity: Vec<StatementLine>,
}

/// `policy` is an opaque caller-supplied tag (e.g. a consolidation
/// method name a collaborator system defines) — it only participates
/// in the cache key here, since the spec doesn't define concrete
/// consolidation-method business rules for the core to enforce.
#[derive(Debug, Clone, Serialize)]
pub struct ConsolidatedViewModel {
    pub group_id: String,
    pub period_end: NaiveDate,
    pub currency: String,
    pub policy: String,
    pub profit_and_loss: ProfitAndLoss,
    pub balance_sheet: BalanceSheet,
    pub warnings: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// Cache key for the 5-minute TTL memoisation (spec §4.9: "memoised per
/// `(group, period, currency, policy)`").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub group_id: String,
    pub period_end: NaiveDate,
    pub currency: String,
    pub policy: String,
}
