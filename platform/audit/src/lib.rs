//! Append-only audit trail.
//!
//! One [`AuditEntry`] is written per successful mutation across the core
//! (document transitions, journal postings, stock movements, period close,
//! elimination runs). Nothing is written on a rolled-back mutation, because
//! callers write the entry from inside the same transaction as the mutation
//! itself. There is no update or delete function on this API — that omission
//! is deliberate, not an oversight.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use sqlx::{FromRow, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub company_id: String,
    pub at: DateTime<Utc>,
    pub actor_id: String,
    pub verb: String,
    pub entity_kind: String,
    pub entity_id: String,
    pub delta: JsonValue,
}

/// Write one audit entry inside the caller's transaction.
pub async fn record(
    tx: &mut Transaction<'_, Postgres>,
    company_id: &str,
    actor_id: &str,
    verb: &str,
    entity_kind: &str,
    entity_id: &str,
    delta: JsonValue,
) -> Result<Uuid, AuditError> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO audit_entries
            (id, company_id, at, actor_id, verb, entity_kind, entity_id, delta)
        VALUES ($1, $2, NOW(), $3, $4, $5, $6, $7)
        "#,
    )
    .bind(id)
    .bind(company_id)
    .bind(actor_id)
    .bind(verb)
    .bind(entity_kind)
    .bind(entity_id)
    .bind(&delta)
    .execute(&mut **tx)
    .await?;

    tracing::info!(
        company_id = %company_id,
        actor_id = %actor_id,
        verb = %verb,
        entity_kind = %entity_kind,
        entity_id = %entity_id,
        "audit entry recorded"
    );

    Ok(id)
}

/// Query filter for audit reads. All fields optional; `None` means
/// unfiltered on that dimension.
#[derive(Debug, Default, Clone)]
pub struct AuditQuery {
    pub company_id: Option<String>,
    pub actor_id: Option<String>,
    pub entity_kind: Option<String>,
    pub entity_id: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: i64,
    /// Keyset cursor: only return entries strictly before this id was seen.
    /// Paired with `before_at`, the (at, id) timestamp of that same entry.
    pub before_at: Option<DateTime<Utc>>,
    pub before_id: Option<Uuid>,
}

impl AuditQuery {
    pub fn new() -> Self {
        Self {
            limit: 100,
            ..Default::default()
        }
    }
}

/// Keyset-paged read of the audit trail. Ordered by `(at, id)` descending so
/// paging through a high-volume company's trail stays O(limit) per page.
pub async fn query(
    pool: &sqlx::PgPool,
    filter: &AuditQuery,
) -> Result<Vec<AuditEntry>, AuditError> {
    let rows = sqlx::query_as::<_, AuditEntry>(
        r#"
        SELECT id, company_id, at, actor_id, verb, entity_kind, entity_id, delta
        FROM audit_entries
        WHERE ($1::text IS NULL OR company_id = $1)
          AND ($2::text IS NULL OR actor_id = $2)
          AND ($3::text IS NULL OR entity_kind = $3)
          AND ($4::text IS NULL OR entity_id = $4)
          AND ($5::timestamptz IS NULL OR at >= $5)
          AND ($6::timestamptz IS NULL OR at <= $6)
          AND ($7::timestamptz IS NULL OR $8::uuid IS NULL OR (at, id) < ($7, $8))
        ORDER BY at DESC, id DESC
        LIMIT $9
        "#,
    )
    .bind(&filter.company_id)
    .bind(&filter.actor_id)
    .bind(&filter.entity_kind)
    .bind(&filter.entity_id)
    .bind(filter.since)
    .bind(filter.until)
    .bind(filter.before_at)
    .bind(filter.before_id)
    .bind(filter.limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_query_has_a_bounded_page_size() {
        let q = AuditQuery::new();
        assert_eq!(q.limit, 100);
        assert!(q.company_id.is_none());
    }
}
