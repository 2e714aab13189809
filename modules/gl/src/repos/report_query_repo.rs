//! Bounded, tenant-scoped queries for reporting reads that don't fit the
//! trial-balance shape: a single account's activity across a date range.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ReportQueryError {
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: DateTime<Utc>, end: DateTime<Utc> },

    #[error("invalid pagination: limit={limit}, offset={offset}")]
    InvalidPagination { limit: i64, offset: i64 },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AccountActivityLine {
    pub entry_id: Uuid,
    pub posted_at: DateTime<Utc>,
    pub description: Option<String>,
    pub currency: String,
    pub line_id: Uuid,
    pub debit_minor: i64,
    pub credit_minor: i64,
    pub memo: Option<String>,
}

pub async fn query_account_activity(
    pool: &PgPool,
    company_id: &str,
    account_code: &str,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    limit: i64,
    offset: i64,
) -> Result<Vec<AccountActivityLine>, ReportQueryError> {
    if start_date > end_date {
        return Err(ReportQueryError::InvalidDateRange { start: start_date, end: end_date });
    }
    if limit <= 0 || offset < 0 {
        return Err(ReportQueryError::InvalidPagination { limit, offset });
    }

    let lines = sqlx::query_as::<_, AccountActivityLine>(
        r#"
        SELECT
            je.id as entry_id,
            je.posted_at,
            je.description,
            je.currency,
            jl.id as line_id,
            jl.debit_minor,
            jl.credit_minor,
            jl.memo
        FROM journal_entries je
        INNER JOIN journal_lines jl ON jl.journal_entry_id = je.id
        WHERE je.company_id = $1
          AND jl.account_code = $2
          AND je.posted_at >= $3
          AND je.posted_at <= $4
        ORDER BY je.posted_at ASC, jl.line_no ASC
        LIMIT $5 OFFSET $6
        "#,
    )
    .bind(company_id)
    .bind(account_code)
    .bind(start_date)
    .bind(end_date)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(lines)
}

pub async fn count_account_activity(
    pool: &PgPool,
    company_id: &str,
    account_code: &str,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
) -> Result<i64, ReportQueryError> {
    if start_date > end_date {
        return Err(ReportQueryError::InvalidDateRange { start: start_date, end: end_date });
    }

    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM journal_entries je
        INNER JOIN journal_lines jl ON jl.journal_entry_id = je.id
        WHERE je.company_id = $1
          AND jl.account_code = $2
          AND je.posted_at >= $3
          AND je.posted_at <= $4
        "#,
    )
    .bind(company_id)
    .bind(account_code)
    .bind(start_date)
    .bind(end_date)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rejects_a_start_after_end() {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let err = query_account_activity_date_check(start, end);
        assert!(matches!(err, Err(ReportQueryError::InvalidDateRange { .. })));
    }

    fn query_account_activity_date_check(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(), ReportQueryError> {
        if start > end {
            return Err(ReportQueryError::InvalidDateRange { start, end });
        }
        Ok(())
    }
}
