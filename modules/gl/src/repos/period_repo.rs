//! Repository for accounting period operations.
//!
//! Supports the closed/locked-period governance in the posting path and the
//! period-close service.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

/// Lifecycle state of an accounting period (spec: Open -> Locked -> Closed).
/// Locked blocks new journal postings; Closed additionally blocks elimination
/// runs and reopening without explicit authority.
#[derive(Debug, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "period_status", rename_all = "lowercase")]
pub enum PeriodStatus {
    Open,
    Locked,
    Closed,
}

#[derive(Debug, Clone, FromRow)]
pub struct AccountingPeriod {
    pub id: Uuid,
    pub company_id: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub status: PeriodStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum PeriodError {
    #[error("No accounting period found for company_id={company_id}, date={date}")]
    NoPeriodForDate { company_id: String, date: NaiveDate },

    #[error("Accounting period is not open for posting: company_id={company_id}, date={date}, period_id={period_id}, status={status:?}")]
    PeriodNotOpen {
        company_id: String,
        date: NaiveDate,
        period_id: Uuid,
        status: PeriodStatus,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Find the accounting period that contains the given date for a company.
/// `period_end` is treated as inclusive: a date equal to `period_end` belongs
/// to that period, not the next.
pub async fn find_by_date(
    pool: &PgPool,
    company_id: &str,
    date: NaiveDate,
) -> Result<Option<AccountingPeriod>, PeriodError> {
    let period = sqlx::query_as::<_, AccountingPeriod>(
        r#"
        SELECT id, company_id, period_start, period_end, status, created_at
        FROM accounting_periods
        WHERE company_id = $1
          AND period_start <= $2
          AND period_end >= $2
        LIMIT 1
        "#,
    )
    .bind(company_id)
    .bind(date)
    .fetch_optional(pool)
    .await?;

    Ok(period)
}

pub async fn find_by_date_tx(
    tx: &mut Transaction<'_, Postgres>,
    company_id: &str,
    date: NaiveDate,
) -> Result<Option<AccountingPeriod>, PeriodError> {
    let period = sqlx::query_as::<_, AccountingPeriod>(
        r#"
        SELECT id, company_id, period_start, period_end, status, created_at
        FROM accounting_periods
        WHERE company_id = $1
          AND period_start <= $2
          AND period_end >= $2
        LIMIT 1
        "#,
    )
    .bind(company_id)
    .bind(date)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(period)
}

pub async fn find_by_id(
    pool: &PgPool,
    company_id: &str,
    period_id: Uuid,
) -> Result<Option<AccountingPeriod>, PeriodError> {
    let period = sqlx::query_as::<_, AccountingPeriod>(
        r#"
        SELECT id, company_id, period_start, period_end, status, created_at
        FROM accounting_periods
        WHERE company_id = $1 AND id = $2
        "#,
    )
    .bind(company_id)
    .bind(period_id)
    .fetch_optional(pool)
    .await?;

    Ok(period)
}

pub async fn find_by_id_tx(
    tx: &mut Transaction<'_, Postgres>,
    company_id: &str,
    period_id: Uuid,
) -> Result<Option<AccountingPeriod>, PeriodError> {
    let period = sqlx::query_as::<_, AccountingPeriod>(
        r#"
        SELECT id, company_id, period_start, period_end, status, created_at
        FROM accounting_periods
        WHERE company_id = $1 AND id = $2
        "#,
    )
    .bind(company_id)
    .bind(period_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(period)
}

/// Validate that a date falls within an Open accounting period.
pub async fn validate_posting_date(
    pool: &PgPool,
    company_id: &str,
    date: NaiveDate,
) -> Result<(), PeriodError> {
    let period = find_by_date(pool, company_id, date).await?;
    assert_open(company_id, date, period)
}

pub async fn validate_posting_date_tx(
    tx: &mut Transaction<'_, Postgres>,
    company_id: &str,
    date: NaiveDate,
) -> Result<(), PeriodError> {
    let period = find_by_date_tx(tx, company_id, date).await?;
    assert_open(company_id, date, period)
}

fn assert_open(
    company_id: &str,
    date: NaiveDate,
    period: Option<AccountingPeriod>,
) -> Result<(), PeriodError> {
    match period {
        None => Err(PeriodError::NoPeriodForDate {
            company_id: company_id.to_string(),
            date,
        }),
        Some(p) if p.status != PeriodStatus::Open => Err(PeriodError::PeriodNotOpen {
            company_id: company_id.to_string(),
            date,
            period_id: p.id,
            status: p.status,
        }),
        Some(_) => Ok(()),
    }
}

/// Set a period's status within a transaction, used by lock/close/reopen
/// operations. Does not itself validate the transition's legality — callers
/// (period_close_service) enforce the state machine.
pub async fn set_status_tx(
    tx: &mut Transaction<'_, Postgres>,
    company_id: &str,
    period_id: Uuid,
    status: PeriodStatus,
) -> Result<(), PeriodError> {
    sqlx::query(
        r#"
        UPDATE accounting_periods
        SET status = $3
        WHERE company_id = $1 AND id = $2
        "#,
    )
    .bind(company_id)
    .bind(period_id)
    .bind(status)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_period_error_mentions_company_and_date() {
        let err = PeriodError::NoPeriodForDate {
            company_id: "company_123".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 2, 11).unwrap(),
        };
        assert!(err.to_string().contains("company_123"));
        assert!(err.to_string().contains("2024-02-11"));
    }

    #[test]
    fn period_not_open_error_mentions_status() {
        let err = PeriodError::PeriodNotOpen {
            company_id: "company_123".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 2, 11).unwrap(),
            period_id: Uuid::new_v4(),
            status: PeriodStatus::Locked,
        };
        assert!(err.to_string().contains("not open"));
        assert!(err.to_string().contains("company_123"));
    }
}
