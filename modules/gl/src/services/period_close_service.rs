//! Period close service.
//!
//! Implements the Open -> Locked -> Closed period lifecycle (spec §4.3) with a
//! sealed, hash-verified snapshot written at close time for audit integrity.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

use crate::repos::period_repo::{self, PeriodStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodCloseSnapshot {
    pub period_id: Uuid,
    pub company_id: String,
    pub close_hash: String,
    pub total_journal_count: i64,
    pub total_debits_minor: i64,
    pub total_credits_minor: i64,
    pub balance_row_count: i64,
    pub currency_snapshots: Vec<CurrencySnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CurrencySnapshot {
    pub currency: String,
    pub journal_count: i32,
    pub line_count: i32,
    pub total_debits_minor: i64,
    pub total_credits_minor: i64,
}

#[derive(Debug, Error)]
pub enum PeriodCloseError {
    #[error("period not found: {0}")]
    PeriodNotFound(Uuid),

    #[error("period is already closed: {0}")]
    AlreadyClosed(Uuid),

    #[error("period is not locked (must be locked before closing): {0}")]
    NotLocked(Uuid),

    #[error("cannot close period {period_id}: {count} draft document(s) still have an effective date inside it")]
    DraftDocumentsRemain { period_id: Uuid, count: i64 },

    #[error("cannot close period {period_id}: debits ({total_debits_minor}) do not equal credits ({total_credits_minor})")]
    LedgerUnbalanced {
        period_id: Uuid,
        total_debits_minor: i64,
        total_credits_minor: i64,
    },

    #[error("cannot close period {period_id}: {reason}")]
    ValidationFailed { period_id: Uuid, reason: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("hash verification failed: computed={computed}, expected={expected}")]
    HashMismatch { computed: String, expected: String },
}

impl From<period_repo::PeriodError> for PeriodCloseError {
    fn from(e: period_repo::PeriodError) -> Self {
        match e {
            period_repo::PeriodError::Database(e) => PeriodCloseError::Database(e),
            other => PeriodCloseError::Database(sqlx::Error::Protocol(other.to_string())),
        }
    }
}

async fn compute_currency_snapshots(
    tx: &mut Transaction<'_, Postgres>,
    company_id: &str,
    period_id: Uuid,
) -> Result<Vec<CurrencySnapshot>, PeriodCloseError> {
    let snapshots = sqlx::query_as::<_, CurrencySnapshot>(
        r#"
        SELECT
            je.currency,
            COUNT(DISTINCT je.id)::INTEGER as journal_count,
            COUNT(jl.id)::INTEGER as line_count,
            COALESCE(SUM(jl.debit_minor), 0)::BIGINT as total_debits_minor,
            COALESCE(SUM(jl.credit_minor), 0)::BIGINT as total_credits_minor
        FROM accounting_periods ap
        INNER JOIN journal_entries je ON
            je.company_id = ap.company_id
            AND je.posted_at::DATE >= ap.period_start
            AND je.posted_at::DATE <= ap.period_end
        LEFT JOIN journal_lines jl ON jl.journal_entry_id = je.id
        WHERE ap.id = $1
          AND ap.company_id = $2
        GROUP BY je.currency
        ORDER BY je.currency
        "#,
    )
    .bind(period_id)
    .bind(company_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(snapshots)
}

async fn compute_balance_row_count(
    tx: &mut Transaction<'_, Postgres>,
    company_id: &str,
    period_id: Uuid,
) -> Result<i64, PeriodCloseError> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM account_balances
        WHERE company_id = $1 AND period_id = $2
        "#,
    )
    .bind(company_id)
    .bind(period_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(count)
}

/// Counts documents still `draft` with an effective date inside
/// `[period_start, period_end]` (spec §4.3 close validation). The
/// documents table has no separate effective-date column — its create
/// transition's `created_at` is the closest persisted stand-in, since a
/// draft by definition hasn't moved past the date it was raised on.
async fn count_draft_documents_in_period_tx(
    tx: &mut Transaction<'_, Postgres>,
    company_id: &str,
    period_start: chrono::NaiveDate,
    period_end: chrono::NaiveDate,
) -> Result<i64, PeriodCloseError> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM documents
        WHERE company_id = $1 AND status = 'draft'
          AND created_at::DATE >= $2 AND created_at::DATE <= $3
        "#,
    )
    .bind(company_id)
    .bind(period_start)
    .bind(period_end)
    .fetch_one(&mut **tx)
    .await?;

    Ok(count)
}

/// Hash inputs, in order: company_id | period_id | journal_count | debits |
/// credits | balance_row_count. Changing this breaks every previously-issued
/// close hash, so do not change the order or formatting casually.
pub fn compute_close_hash(
    company_id: &str,
    period_id: Uuid,
    total_journal_count: i64,
    total_debits_minor: i64,
    total_credits_minor: i64,
    balance_row_count: i64,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(company_id.as_bytes());
    hasher.update(b"|");
    hasher.update(period_id.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(total_journal_count.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(total_debits_minor.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(total_credits_minor.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(balance_row_count.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

async fn persist_currency_snapshots(
    tx: &mut Transaction<'_, Postgres>,
    company_id: &str,
    period_id: Uuid,
    snapshots: &[CurrencySnapshot],
) -> Result<(), PeriodCloseError> {
    for snapshot in snapshots {
        sqlx::query(
            r#"
            INSERT INTO period_summary_snapshots
                (company_id, period_id, currency, journal_count, line_count,
                 total_debits_minor, total_credits_minor, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            ON CONFLICT (company_id, period_id, currency)
            DO UPDATE SET
                journal_count = EXCLUDED.journal_count,
                line_count = EXCLUDED.line_count,
                total_debits_minor = EXCLUDED.total_debits_minor,
                total_credits_minor = EXCLUDED.total_credits_minor
            "#,
        )
        .bind(company_id)
        .bind(period_id)
        .bind(&snapshot.currency)
        .bind(snapshot.journal_count)
        .bind(snapshot.line_count)
        .bind(snapshot.total_debits_minor)
        .bind(snapshot.total_credits_minor)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

pub async fn create_close_snapshot(
    tx: &mut Transaction<'_, Postgres>,
    company_id: &str,
    period_id: Uuid,
) -> Result<PeriodCloseSnapshot, PeriodCloseError> {
    let currency_snapshots = compute_currency_snapshots(tx, company_id, period_id).await?;
    let balance_row_count = compute_balance_row_count(tx, company_id, period_id).await?;

    let total_journal_count = currency_snapshots.iter().map(|s| s.journal_count as i64).sum();
    let total_debits_minor = currency_snapshots.iter().map(|s| s.total_debits_minor).sum();
    let total_credits_minor = currency_snapshots.iter().map(|s| s.total_credits_minor).sum();

    let close_hash = compute_close_hash(
        company_id,
        period_id,
        total_journal_count,
        total_debits_minor,
        total_credits_minor,
        balance_row_count,
    );

    persist_currency_snapshots(tx, company_id, period_id, &currency_snapshots).await?;

    Ok(PeriodCloseSnapshot {
        period_id,
        company_id: company_id.to_string(),
        close_hash,
        total_journal_count,
        total_debits_minor,
        total_credits_minor,
        balance_row_count,
        currency_snapshots,
    })
}

/// Lock a period: blocks new journal postings but does not yet seal the
/// audit snapshot. A period must be Open to be locked.
pub async fn lock_period(
    pool: &PgPool,
    company_id: &str,
    period_id: Uuid,
) -> Result<(), PeriodCloseError> {
    let mut tx = pool.begin().await?;
    let period = period_repo::find_by_id_tx(&mut tx, company_id, period_id)
        .await?
        .ok_or(PeriodCloseError::PeriodNotFound(period_id))?;

    if period.status == PeriodStatus::Closed {
        return Err(PeriodCloseError::AlreadyClosed(period_id));
    }

    period_repo::set_status_tx(&mut tx, company_id, period_id, PeriodStatus::Locked).await?;
    tx.commit().await?;
    Ok(())
}

/// Close a Locked period: seals a snapshot with a deterministic hash and
/// transitions the period to Closed. Idempotent — closing an already-closed
/// period returns `AlreadyClosed` rather than re-sealing. Rejects the close
/// if draft documents still fall inside the period, or if the period's
/// total debits and credits (summed across every account type) don't
/// agree — a belt-and-suspenders check on top of each journal already
/// being balanced at post time.
pub async fn close_period(
    pool: &PgPool,
    company_id: &str,
    period_id: Uuid,
) -> Result<PeriodCloseSnapshot, PeriodCloseError> {
    let mut tx = pool.begin().await?;

    let period = period_repo::find_by_id_tx(&mut tx, company_id, period_id)
        .await?
        .ok_or(PeriodCloseError::PeriodNotFound(period_id))?;

    match period.status {
        PeriodStatus::Closed => return Err(PeriodCloseError::AlreadyClosed(period_id)),
        PeriodStatus::Open => return Err(PeriodCloseError::NotLocked(period_id)),
        PeriodStatus::Locked => {}
    }

    let draft_count =
        count_draft_documents_in_period_tx(&mut tx, company_id, period.period_start, period.period_end).await?;
    if draft_count > 0 {
        return Err(PeriodCloseError::DraftDocumentsRemain { period_id, count: draft_count });
    }

    let snapshot = create_close_snapshot(&mut tx, company_id, period_id).await?;
    if snapshot.total_debits_minor != snapshot.total_credits_minor {
        return Err(PeriodCloseError::LedgerUnbalanced {
            period_id,
            total_debits_minor: snapshot.total_debits_minor,
            total_credits_minor: snapshot.total_credits_minor,
        });
    }

    period_repo::set_status_tx(&mut tx, company_id, period_id, PeriodStatus::Closed).await?;

    tx.commit().await?;

    tracing::info!(
        company_id = %company_id,
        period_id = %period_id,
        close_hash = %snapshot.close_hash,
        "accounting period closed"
    );

    Ok(snapshot)
}

/// Recompute the close hash from current data and compare it to the hash
/// recorded at close time. A mismatch means ledger data changed after close
/// without going through the close/reopen flow.
pub async fn verify_close_hash(
    pool: &PgPool,
    company_id: &str,
    period_id: Uuid,
    expected_hash: &str,
) -> Result<(), PeriodCloseError> {
    let mut tx = pool.begin().await?;

    let currency_snapshots = compute_currency_snapshots(&mut tx, company_id, period_id).await?;
    let balance_row_count = compute_balance_row_count(&mut tx, company_id, period_id).await?;

    let total_journal_count = currency_snapshots.iter().map(|s| s.journal_count as i64).sum();
    let total_debits_minor = currency_snapshots.iter().map(|s| s.total_debits_minor).sum();
    let total_credits_minor = currency_snapshots.iter().map(|s| s.total_credits_minor).sum();

    let computed_hash = compute_close_hash(
        company_id,
        period_id,
        total_journal_count,
        total_debits_minor,
        total_credits_minor,
        balance_row_count,
    );

    tx.commit().await?;

    if computed_hash != expected_hash {
        return Err(PeriodCloseError::HashMismatch {
            computed: computed_hash,
            expected: expected_hash.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_hash_is_deterministic() {
        let company_id = "company_123";
        let period_id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();

        let hash1 = compute_close_hash(company_id, period_id, 10, 100000, 100000, 5);
        let hash2 = compute_close_hash(company_id, period_id, 10, 100000, 100000, 5);

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn close_hash_changes_with_inputs() {
        let company_id = "company_123";
        let period_id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();

        let hash1 = compute_close_hash(company_id, period_id, 10, 100000, 100000, 5);
        let hash2 = compute_close_hash(company_id, period_id, 11, 100000, 100000, 5);

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn snapshot_carries_company_and_totals() {
        let snapshot = PeriodCloseSnapshot {
            period_id: Uuid::new_v4(),
            company_id: "company_123".to_string(),
            close_hash: "abc123".to_string(),
            total_journal_count: 10,
            total_debits_minor: 100000,
            total_credits_minor: 100000,
            balance_row_count: 5,
            currency_snapshots: vec![CurrencySnapshot {
                currency: "USD".to_string(),
                journal_count: 10,
                line_count: 20,
                total_debits_minor: 100000,
                total_credits_minor: 100000,
            }],
        };

        assert_eq!(snapshot.company_id, "company_123");
        assert_eq!(snapshot.currency_snapshots.len(), 1);
    }
}
