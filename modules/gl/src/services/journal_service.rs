//! Journal posting business logic.
//!
//! `post_journal` is the single entry point documents, inventory movements,
//! and the elimination engine use to record a balanced entry. It always runs
//! inside the caller's transaction (hook executors call it mid-transaction;
//! top-level callers that have no transaction of their own open one here).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::contracts::posting_request::GlPostingRequest;
use crate::repos::{balance_repo, journal_repo, period_repo};
use crate::validation::{validate_accounts_against_coa, validate_gl_posting_request, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid posting date: {0}")]
    InvalidDate(String),

    #[error(transparent)]
    Period(#[from] period_repo::PeriodError),

    #[error(transparent)]
    Balance(#[from] balance_repo::BalanceError),
}

pub type JournalResult<T> = Result<T, JournalError>;

/// Post a balanced journal entry within an already-open transaction.
///
/// Idempotent on `(company_id, source_module, source_id)`: a second call with
/// the same triple returns the existing entry id without posting again.
pub async fn post_journal_tx(
    tx: &mut Transaction<'_, Postgres>,
    company_id: &str,
    request: &GlPostingRequest,
) -> JournalResult<Uuid> {
    if let Some(existing) =
        journal_repo::find_by_source_tx(tx, company_id, &request.source_module, &request.source_id)
            .await?
    {
        tracing::info!(
            company_id = %company_id,
            source_module = %request.source_module,
            source_id = %request.source_id,
            entry_id = %existing,
            "journal entry already posted for source, skipping (idempotency)"
        );
        return Ok(existing);
    }

    validate_gl_posting_request(request)?;
    validate_accounts_against_coa(tx, company_id, request).await?;

    let posting_date = NaiveDate::parse_from_str(&request.posting_date, "%Y-%m-%d")
        .map_err(|e| JournalError::InvalidDate(format!("{}: {}", request.posting_date, e)))?;
    let posted_at: DateTime<Utc> = posting_date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| JournalError::InvalidDate("invalid time".to_string()))?
        .and_utc();

    period_repo::validate_posting_date_tx(tx, company_id, posting_date).await?;
    let period = period_repo::find_by_date_tx(tx, company_id, posting_date)
        .await?
        .ok_or_else(|| {
            JournalError::Period(period_repo::PeriodError::NoPeriodForDate {
                company_id: company_id.to_string(),
                date: posting_date,
            })
        })?;

    let entry_id = Uuid::new_v4();

    journal_repo::insert_entry(
        tx,
        entry_id,
        company_id,
        &request.source_module,
        &request.source_id,
        posted_at,
        &request.currency,
        Some(&request.description),
        None,
    )
    .await?;

    let lines: Vec<journal_repo::JournalLineInsert> = request
        .lines
        .iter()
        .enumerate()
        .map(|(idx, line)| journal_repo::JournalLineInsert {
            id: Uuid::new_v4(),
            line_no: (idx + 1) as i32,
            account_code: line.account_code.clone(),
            debit_minor: line.debit_minor,
            credit_minor: line.credit_minor,
            memo: line.memo.clone(),
        })
        .collect();

    journal_repo::bulk_insert_lines(tx, entry_id, lines.clone()).await?;

    for line in &lines {
        balance_repo::tx_upsert_rollup(
            tx,
            company_id,
            period.id,
            &line.account_code,
            &request.currency,
            line.debit_minor,
            line.credit_minor,
            entry_id,
        )
        .await?;
    }

    tracing::info!(
        company_id = %company_id,
        entry_id = %entry_id,
        source_module = %request.source_module,
        source_id = %request.source_id,
        "journal entry posted"
    );

    Ok(entry_id)
}

/// Post a balanced journal entry, opening and committing its own transaction.
/// Callers that already hold a transaction (document/inventory hooks,
/// elimination runs) must use [`post_journal_tx`] instead so the posting
/// commits or rolls back together with the rest of the mutation.
pub async fn post_journal(
    pool: &PgPool,
    company_id: &str,
    request: &GlPostingRequest,
) -> JournalResult<Uuid> {
    let mut tx = pool.begin().await?;
    let entry_id = post_journal_tx(&mut tx, company_id, request).await?;
    tx.commit().await?;
    Ok(entry_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::posting_request::JournalLine;

    fn test_request() -> GlPostingRequest {
        GlPostingRequest {
            posting_date: "2024-02-11".to_string(),
            currency: "USD".to_string(),
            source_module: "documents".to_string(),
            source_id: "ar_invoice:inv_123".to_string(),
            description: "Test invoice".to_string(),
            lines: vec![
                JournalLine {
                    account_code: "1100".to_string(),
                    debit_minor: 10000,
                    credit_minor: 0,
                    memo: Some("Accounts Receivable".to_string()),
                    dimensions: None,
                },
                JournalLine {
                    account_code: "4000".to_string(),
                    debit_minor: 0,
                    credit_minor: 10000,
                    memo: Some("Revenue".to_string()),
                    dimensions: None,
                },
            ],
        }
    }

    #[test]
    fn rejects_request_with_negative_debit_before_touching_the_database() {
        let mut request = test_request();
        request.lines[0].debit_minor = -5000;

        assert!(validate_gl_posting_request(&request).is_err());
    }
}
