//! Document numbering: `{Prefix}-{YYMM}-{NNNNN}`, unique per
//! `(company_id, month)`. The counter is `count(*) + 1` read inside the
//! same transaction as the insert; a unique index on the generated
//! number is what actually makes concurrent issuance race-safe, not the
//! count itself — two transactions can read the same count, and one of
//! their inserts will then fail the unique constraint and must be
//! retried by the caller.

use chrono::{Datelike, NaiveDate};
use sqlx::{Postgres, Transaction};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NumberingError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub async fn next_number_tx(
    tx: &mut Transaction<'_, Postgres>,
    company_id: &str,
    prefix: &str,
    effective_date: NaiveDate,
) -> Result<String, NumberingError> {
    let yymm = format!("{:02}{:02}", effective_date.year() % 100, effective_date.month());
    let like_pattern = format!("{prefix}-{yymm}-%");

    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM documents
        WHERE company_id = $1 AND number LIKE $2
        "#,
    )
    .bind(company_id)
    .bind(&like_pattern)
    .fetch_one(&mut **tx)
    .await?;

    Ok(format!("{prefix}-{yymm}-{:05}", count + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_scopes_to_prefix_and_month() {
        let date = NaiveDate::from_ymd_opt(2026, 7, 15).unwrap();
        let yymm = format!("{:02}{:02}", date.year() % 100, date.month());
        assert_eq!(yymm, "2607");
    }
}
