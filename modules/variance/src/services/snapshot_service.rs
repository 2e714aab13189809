//! Computes a variance snapshot: for each (account, budget) pair in a
//! rule, reads the account's actual net balance for the period from
//! `gl` and records `(actual, budget, variance, variance%)` (spec §4.7).

use chrono::NaiveDate;
use gl::repos::{balance_repo, period_repo};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::repos::{rule_repo, snapshot_repo};
use crate::variance_core::{Snapshot, VarianceRow};

#[derive(Debug, Error)]
pub enum SnapshotComputeError {
    #[error("variance rule not found: {0}")]
    RuleNotFound(Uuid),

    #[error("no accounting period covers {date} for company {company_id}")]
    NoPeriod { company_id: String, date: NaiveDate },

    #[error(transparent)]
    Rule(#[from] rule_repo::RuleError),

    #[error(transparent)]
    Snapshot(#[from] snapshot_repo::SnapshotError),

    #[error(transparent)]
    Period(#[from] period_repo::PeriodError),

    #[error(transparent)]
    Balance(#[from] balance_repo::BalanceError),
}

/// Pure per-account computation, split out so the rounding/zero-budget
/// edge case is testable without a database.
pub fn compute_row(account_code: String, actual_minor: i64, budget_minor: i64) -> VarianceRow {
    let variance_minor = actual_minor - budget_minor;
    let variance_pct = if budget_minor == 0 {
        None
    } else {
        Some(variance_minor as f64 / budget_minor as f64 * 100.0)
    };

    VarianceRow {
        account_code,
        actual_minor,
        budget_minor,
        variance_minor,
        variance_pct,
    }
}

/// Computes and persists a snapshot as `Ready`, or as `Failed` with the
/// computation error recorded on it (spec §4.7: "status Ready/Failed").
pub async fn compute(
    pool: &PgPool,
    rule_id: Uuid,
    company_id: &str,
    period_end: NaiveDate,
    currency: &str,
) -> Result<Snapshot, SnapshotComputeError> {
    match compute_rows(pool, rule_id, company_id, period_end, currency).await {
        Ok(rows) => Ok(snapshot_repo::insert_ready(pool, rule_id, period_end, &rows).await?),
        Err(err) => Ok(snapshot_repo::insert_failed(pool, rule_id, period_end, &err.to_string()).await?),
    }
}

async fn compute_rows(
    pool: &PgPool,
    rule_id: Uuid,
    company_id: &str,
    period_end: NaiveDate,
    currency: &str,
) -> Result<Vec<VarianceRow>, SnapshotComputeError> {
    rule_repo::find(pool, rule_id)
        .await?
        .ok_or(SnapshotComputeError::RuleNotFound(rule_id))?;
    let lines = rule_repo::find_lines(pool, rule_id).await?;

    let period = period_repo::find_by_date(pool, company_id, period_end)
        .await?
        .ok_or_else(|| SnapshotComputeError::NoPeriod {
            company_id: company_id.to_string(),
            date: period_end,
        })?;

    let mut rows = Vec::with_capacity(lines.len());
    for line in lines {
        let actual_minor = balance_repo::find_by_grain(pool, company_id, period.id, &line.account_code, currency)
            .await?
            .map(|b| b.net_balance_minor)
            .unwrap_or(0);

        rows.push(compute_row(line.account_code, actual_minor, line.budget_minor));
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variance_is_actual_minus_budget() {
        let row = compute_row("4000".to_string(), 120_00, 100_00);
        assert_eq!(row.variance_minor, 20_00);
        assert_eq!(row.variance_pct, Some(20.0));
    }

    #[test]
    fn negative_variance_when_actual_trails_budget() {
        let row = compute_row("4000".to_string(), 80_00, 100_00);
        assert_eq!(row.variance_minor, -20_00);
        assert_eq!(row.variance_pct, Some(-20.0));
    }

    #[test]
    fn zero_budget_gives_no_percentage() {
        let row = compute_row("4000".to_string(), 50_00, 0);
        assert_eq!(row.variance_pct, None);
    }
}
