//! Repository for variance snapshots. `rows` persists as JSON — a
//! snapshot is a read-only computed artefact, never queried row by row
//! the way `gl`'s balances are, so there's no benefit to a child table.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use thiserror::Error;
use uuid::Uuid;

use crate::variance_core::{Snapshot, SnapshotStatus, VarianceRow};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("variance snapshot not found: {0}")]
    NotFound(Uuid),

    #[error("serialisation error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(FromRow)]
struct SnapshotRecord {
    id: Uuid,
    rule_id: Uuid,
    period_end: NaiveDate,
    status: SnapshotStatus,
    rows: serde_json::Value,
    error: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<SnapshotRecord> for Snapshot {
    type Error = serde_json::Error;

    fn try_from(record: SnapshotRecord) -> Result<Self, Self::Error> {
        let rows: Vec<VarianceRow> = serde_json::from_value(record.rows)?;
        Ok(Snapshot {
            id: record.id,
            rule_id: record.rule_id,
            period_end: record.period_end,
            status: record.status,
            rows,
            error: record.error,
            created_at: record.created_at,
        })
    }
}

pub async fn insert_ready(
    pool: &PgPool,
    rule_id: Uuid,
    period_end: NaiveDate,
    rows: &[VarianceRow],
) -> Result<Snapshot, SnapshotError> {
    let record = sqlx::query_as::<_, SnapshotRecord>(
        r#"
        INSERT INTO variance_snapshots (id, rule_id, period_end, status, rows, error, created_at)
        VALUES ($1, $2, $3, 'ready', $4, NULL, NOW())
        RETURNING id, rule_id, period_end, status, rows, error, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(rule_id)
    .bind(period_end)
    .bind(serde_json::to_value(rows)?)
    .fetch_one(pool)
    .await?;

    Ok(record.try_into()?)
}

pub async fn insert_failed(
    pool: &PgPool,
    rule_id: Uuid,
    period_end: NaiveDate,
    error: &str,
) -> Result<Snapshot, SnapshotError> {
    let record = sqlx::query_as::<_, SnapshotRecord>(
        r#"
        INSERT INTO variance_snapshots (id, rule_id, period_end, status, rows, error, created_at)
        VALUES ($1, $2, $3, 'failed', '[]'::jsonb, $4, NOW())
        RETURNING id, rule_id, period_end, status, rows, error, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(rule_id)
    .bind(period_end)
    .bind(error)
    .fetch_one(pool)
    .await?;

    Ok(record.try_into()?)
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Snapshot>, SnapshotError> {
    let record = sqlx::query_as::<_, SnapshotRecord>(
        r#"SELECT id, rule_id, period_end, status, rows, error, created_at FROM variance_snapshots WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    record.map(TryInto::try_into).transpose().map_err(Into::into)
}
