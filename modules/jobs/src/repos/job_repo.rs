//! Repository for queued jobs. `claim_next` uses `FOR UPDATE SKIP LOCKED`
//! so N worker tasks can poll the same table without contending on rows
//! another worker already has in flight.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

use crate::job_core::Job;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("job not found: {0}")]
    NotFound(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub async fn enqueue(
    pool: &PgPool,
    job_type: &str,
    payload: &serde_json::Value,
    idempotency_key: Option<&str>,
    max_attempts: i32,
    run_after: DateTime<Utc>,
) -> Result<Job, JobError> {
    let job = sqlx::query_as::<_, Job>(
        r#"
        INSERT INTO jobs
            (id, job_type, payload, idempotency_key, attempt, max_attempts, run_after, status, last_error, created_at, updated_at)
        VALUES ($1, $2, $3, $4, 0, $5, $6, 'pending', NULL, NOW(), NOW())
        RETURNING id, job_type, payload, idempotency_key, attempt, max_attempts, run_after, status, last_error, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(job_type)
    .bind(payload)
    .bind(idempotency_key)
    .bind(max_attempts)
    .bind(run_after)
    .fetch_one(pool)
    .await?;

    Ok(job)
}

/// Claims the oldest due `Pending` job, moving it to `Running` in the
/// same transaction. Returns `None` when nothing is due.
pub async fn claim_next(tx: &mut Transaction<'_, Postgres>) -> Result<Option<Job>, JobError> {
    let job = sqlx::query_as::<_, Job>(
        r#"
        SELECT id, job_type, payload, idempotency_key, attempt, max_attempts, run_after, status, last_error, created_at, updated_at
        FROM jobs
        WHERE status = 'pending' AND run_after <= NOW()
        ORDER BY run_after
        FOR UPDATE SKIP LOCKED
        LIMIT 1
        "#,
    )
    .fetch_optional(&mut **tx)
    .await?;

    let Some(job) = job else { return Ok(None) };

    sqlx::query(
        r#"UPDATE jobs SET status = 'running', attempt = attempt + 1, updated_at = NOW() WHERE id = $1"#,
    )
    .bind(job.id)
    .execute(&mut **tx)
    .await?;

    find_tx(tx, job.id).await
}

async fn find_tx(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Option<Job>, JobError> {
    let job = sqlx::query_as::<_, Job>(
        r#"
        SELECT id, job_type, payload, idempotency_key, attempt, max_attempts, run_after, status, last_error, created_at, updated_at
        FROM jobs WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(job)
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Job>, JobError> {
    let job = sqlx::query_as::<_, Job>(
        r#"
        SELECT id, job_type, payload, idempotency_key, attempt, max_attempts, run_after, status, last_error, created_at, updated_at
        FROM jobs WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(job)
}

pub async fn mark_succeeded(pool: &PgPool, id: Uuid) -> Result<(), JobError> {
    sqlx::query(r#"UPDATE jobs SET status = 'succeeded', last_error = NULL, updated_at = NOW() WHERE id = $1"#)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Returns the job to `Pending` with a delayed `run_after`, for another
/// worker to pick up once the backoff elapses.
pub async fn mark_for_retry(pool: &PgPool, id: Uuid, error: &str, run_after: DateTime<Utc>) -> Result<(), JobError> {
    sqlx::query(
        r#"
        UPDATE jobs
        SET status = 'pending', last_error = $2, run_after = $3, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(error)
    .bind(run_after)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn mark_dead_letter(pool: &PgPool, id: Uuid, error: &str) -> Result<(), JobError> {
    sqlx::query(r#"UPDATE jobs SET status = 'dead_letter', last_error = $2, updated_at = NOW() WHERE id = $1"#)
        .bind(id)
        .bind(error)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn list_dead_letter(pool: &PgPool) -> Result<Vec<Job>, JobError> {
    let jobs = sqlx::query_as::<_, Job>(
        r#"
        SELECT id, job_type, payload, idempotency_key, attempt, max_attempts, run_after, status, last_error, created_at, updated_at
        FROM jobs WHERE status = 'dead_letter' ORDER BY updated_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(jobs)
}

/// Whether this job type has already run-to-success under this
/// idempotency key (spec §4.5: "at-most-once-succeeded").
pub async fn has_succeeded_with_key(pool: &PgPool, job_type: &str, idempotency_key: &str) -> Result<bool, JobError> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        SELECT id FROM jobs
        WHERE job_type = $1 AND idempotency_key = $2 AND status = 'succeeded'
        LIMIT 1
        "#,
    )
    .bind(job_type)
    .bind(idempotency_key)
    .fetch_optional(pool)
    .await?;

    Ok(row.is_some())
}
