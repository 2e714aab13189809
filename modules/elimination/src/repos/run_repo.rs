//! Repository for elimination runs.

use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

use crate::elimination_core::Run;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("elimination run not found: {0}")]
    NotFound(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub async fn insert_draft(pool: &PgPool, rule_id: Uuid, period_end: NaiveDate) -> Result<Run, RunError> {
    let run = sqlx::query_as::<_, Run>(
        r#"
        INSERT INTO elimination_runs
            (id, rule_id, period_end, status, created_at, updated_at)
        VALUES ($1, $2, $3, 'draft', NOW(), NOW())
        RETURNING id, rule_id, period_end, status, source_net_minor, target_net_minor,
                  eliminated_minor, journal_entry_id, error, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(rule_id)
    .bind(period_end)
    .fetch_one(pool)
    .await?;

    Ok(run)
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Run>, RunError> {
    let run = sqlx::query_as::<_, Run>(
        r#"
        SELECT id, rule_id, period_end, status, source_net_minor, target_net_minor,
               eliminated_minor, journal_entry_id, error, created_at, updated_at
        FROM elimination_runs
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(run)
}

/// Locks the run row for the posting step, where a concurrent retry
/// must not post the same run twice.
pub async fn lock_tx(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Option<Run>, RunError> {
    let run = sqlx::query_as::<_, Run>(
        r#"
        SELECT id, rule_id, period_end, status, source_net_minor, target_net_minor,
               eliminated_minor, journal_entry_id, error, created_at, updated_at
        FROM elimination_runs
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(run)
}

#[allow(clippy::too_many_arguments)]
pub async fn mark_simulated(
    pool: &PgPool,
    id: Uuid,
    source_net_minor: i64,
    target_net_minor: i64,
    eliminated_minor: i64,
) -> Result<Run, RunError> {
    let run = sqlx::query_as::<_, Run>(
        r#"
        UPDATE elimination_runs
        SET status = 'simulated',
            source_net_minor = $2,
            target_net_minor = $3,
            eliminated_minor = $4,
            error = NULL,
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, rule_id, period_end, status, source_net_minor, target_net_minor,
                  eliminated_minor, journal_entry_id, error, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(source_net_minor)
    .bind(target_net_minor)
    .bind(eliminated_minor)
    .fetch_one(pool)
    .await?;

    Ok(run)
}

pub async fn mark_failed(pool: &PgPool, id: Uuid, error: &str) -> Result<Run, RunError> {
    let run = sqlx::query_as::<_, Run>(
        r#"
        UPDATE elimination_runs
        SET status = 'failed', error = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING id, rule_id, period_end, status, source_net_minor, target_net_minor,
                  eliminated_minor, journal_entry_id, error, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(error)
    .fetch_one(pool)
    .await?;

    Ok(run)
}

pub async fn mark_posted_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    journal_entry_id: Uuid,
) -> Result<Run, RunError> {
    let run = sqlx::query_as::<_, Run>(
        r#"
        UPDATE elimination_runs
        SET status = 'posted', journal_entry_id = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING id, rule_id, period_end, status, source_net_minor, target_net_minor,
                  eliminated_minor, journal_entry_id, error, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(journal_entry_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(run)
}
