//! Read-only account activity reporting: journal lines for a single
//! account, scoped either to an accounting period or an explicit date
//! range, paged with a bounded limit.

use chrono::{DateTime, NaiveTime, Utc};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::repos::period_repo::{self, PeriodError};
use crate::repos::report_query_repo::{self, AccountActivityLine, ReportQueryError};

#[derive(Debug, Clone)]
pub struct AccountActivity {
    pub company_id: String,
    pub account_code: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub lines: Vec<AccountActivityLine>,
    pub total_count: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Error)]
pub enum AccountActivityError {
    #[error(transparent)]
    ReportQuery(#[from] ReportQueryError),

    #[error(transparent)]
    Period(#[from] PeriodError),

    #[error("accounting period {period_id} not found for company {company_id}")]
    PeriodNotFound { company_id: String, period_id: Uuid },

    #[error("either a period_id or both start_date and end_date are required")]
    MissingDateFilter,
}

#[allow(clippy::too_many_arguments)]
pub async fn get_account_activity(
    pool: &PgPool,
    company_id: &str,
    account_code: &str,
    period_id: Option<Uuid>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    limit: i64,
    offset: i64,
) -> Result<AccountActivity, AccountActivityError> {
    let (period_start, period_end) = resolve_date_range(pool, company_id, period_id, start_date, end_date).await?;

    let lines = report_query_repo::query_account_activity(
        pool,
        company_id,
        account_code,
        period_start,
        period_end,
        limit,
        offset,
    )
    .await?;

    let total_count =
        report_query_repo::count_account_activity(pool, company_id, account_code, period_start, period_end).await?;

    Ok(AccountActivity {
        company_id: company_id.to_string(),
        account_code: account_code.to_string(),
        period_start,
        period_end,
        lines,
        total_count,
        limit,
        offset,
    })
}

async fn resolve_date_range(
    pool: &PgPool,
    company_id: &str,
    period_id: Option<Uuid>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
) -> Result<(DateTime<Utc>, DateTime<Utc>), AccountActivityError> {
    if let Some(period_id) = period_id {
        let period = period_repo::find_by_id(pool, company_id, period_id)
            .await?
            .ok_or(AccountActivityError::PeriodNotFound { company_id: company_id.to_string(), period_id })?;

        return Ok(period_to_range(period.period_start, period.period_end));
    }

    explicit_range(start_date, end_date)
}

fn period_to_range(
    period_start: chrono::NaiveDate,
    period_end: chrono::NaiveDate,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = period_start.and_time(NaiveTime::MIN).and_utc();
    let end = period_end.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap()).and_utc();
    (start, end)
}

fn explicit_range(
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
) -> Result<(DateTime<Utc>, DateTime<Utc>), AccountActivityError> {
    match (start_date, end_date) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(AccountActivityError::MissingDateFilter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn missing_both_period_and_date_range_is_an_error() {
        let err = explicit_range(None, None);
        assert!(matches!(err, Err(AccountActivityError::MissingDateFilter)));
    }

    #[test]
    fn explicit_range_passes_through_unchanged() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        assert_eq!(explicit_range(Some(start), Some(end)).unwrap(), (start, end));
    }

    #[test]
    fn a_period_expands_to_its_full_inclusive_day_range() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let (range_start, range_end) = period_to_range(start, end);
        assert_eq!(range_start.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(range_end.to_rfc3339(), "2024-01-31T23:59:59+00:00");
    }
}
