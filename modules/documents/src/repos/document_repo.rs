use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

use crate::document_core::{Document, DocumentKind, DocumentStatus};

#[derive(Debug, Error)]
#[error(transparent)]
pub struct DocumentRepoError(#[from] sqlx::Error);

#[derive(Debug, Clone)]
pub struct NewDocument<'a> {
    pub id: Uuid,
    pub company_id: &'a str,
    pub kind: DocumentKind,
    pub number: &'a str,
    pub status: DocumentStatus,
    pub counterparty_id: Option<&'a str>,
    pub warehouse_id: Option<&'a str>,
    pub reference_document_id: Option<Uuid>,
    pub currency: &'a str,
    pub subtotal_minor: i64,
    pub tax_minor: i64,
    pub total_minor: i64,
    pub created_by: &'a str,
}

pub async fn insert_tx(
    tx: &mut Transaction<'_, Postgres>,
    doc: &NewDocument<'_>,
) -> Result<Document, DocumentRepoError> {
    let row = sqlx::query_as::<_, Document>(
        r#"
        INSERT INTO documents (
            id, company_id, kind, number, status, counterparty_id, warehouse_id,
            reference_document_id, currency, subtotal_minor, tax_minor, total_minor,
            cancellation_reason, created_by, created_at, last_transition_by, last_transition_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, NULL, $13, now(), $13, now())
        RETURNING *
        "#,
    )
    .bind(doc.id)
    .bind(doc.company_id)
    .bind(doc.kind)
    .bind(doc.number)
    .bind(doc.status)
    .bind(doc.counterparty_id)
    .bind(doc.warehouse_id)
    .bind(doc.reference_document_id)
    .bind(doc.currency)
    .bind(doc.subtotal_minor)
    .bind(doc.tax_minor)
    .bind(doc.total_minor)
    .bind(doc.created_by)
    .fetch_one(&mut **tx)
    .await?;

    Ok(row)
}

/// Locks the document row for update within `tx`. Every transition and
/// every hook-triggering mutation reads the document this way first —
/// never via a plain `SELECT` — so two concurrent transitions on the
/// same document serialize instead of racing.
pub async fn lock_tx(
    tx: &mut Transaction<'_, Postgres>,
    company_id: &str,
    id: Uuid,
) -> Result<Option<Document>, DocumentRepoError> {
    let row = sqlx::query_as::<_, Document>(
        r#"
        SELECT * FROM documents
        WHERE company_id = $1 AND id = $2
        FOR UPDATE
        "#,
    )
    .bind(company_id)
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row)
}

pub async fn find(
    pool: &PgPool,
    company_id: &str,
    id: Uuid,
) -> Result<Option<Document>, DocumentRepoError> {
    let row = sqlx::query_as::<_, Document>(
        r#"SELECT * FROM documents WHERE company_id = $1 AND id = $2"#,
    )
    .bind(company_id)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn list(
    pool: &PgPool,
    company_id: &str,
    kind: DocumentKind,
) -> Result<Vec<Document>, DocumentRepoError> {
    let rows = sqlx::query_as::<_, Document>(
        r#"
        SELECT * FROM documents
        WHERE company_id = $1 AND kind = $2
        ORDER BY created_at DESC
        "#,
    )
    .bind(company_id)
    .bind(kind)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[allow(clippy::too_many_arguments)]
pub async fn transition_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    status: DocumentStatus,
    actor_id: &str,
    subtotal_minor: i64,
    tax_minor: i64,
    total_minor: i64,
    cancellation_reason: Option<&str>,
) -> Result<Document, DocumentRepoError> {
    let row = sqlx::query_as::<_, Document>(
        r#"
        UPDATE documents
        SET status = $2, last_transition_by = $3, last_transition_at = now(),
            subtotal_minor = $4, tax_minor = $5, total_minor = $6,
            cancellation_reason = COALESCE($7, cancellation_reason)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(status)
    .bind(actor_id)
    .bind(subtotal_minor)
    .bind(tax_minor)
    .bind(total_minor)
    .bind(cancellation_reason)
    .fetch_one(&mut **tx)
    .await?;

    Ok(row)
}

/// Whether a non-cancelled document of `kind` already references
/// `reference_document_id` — used to reject a second AP invoice against
/// the same goods receipt (spec §4.1 `AlreadyInvoiced`).
pub async fn exists_non_cancelled_by_reference(
    pool: &PgPool,
    company_id: &str,
    kind: DocumentKind,
    reference_document_id: Uuid,
) -> Result<bool, DocumentRepoError> {
    let (exists,): (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM documents
            WHERE company_id = $1 AND kind = $2 AND reference_document_id = $3
              AND status != 'cancelled'
        )
        "#,
    )
    .bind(company_id)
    .bind(kind)
    .bind(reference_document_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// All documents of `kind` that reference `reference_document_id` —
/// used to check every GRN against a PO is `Posted` before `close`.
pub async fn find_by_reference_tx(
    tx: &mut Transaction<'_, Postgres>,
    company_id: &str,
    kind: DocumentKind,
    reference_document_id: Uuid,
) -> Result<Vec<Document>, DocumentRepoError> {
    let rows = sqlx::query_as::<_, Document>(
        r#"SELECT * FROM documents WHERE company_id = $1 AND kind = $2 AND reference_document_id = $3"#,
    )
    .bind(company_id)
    .bind(kind)
    .bind(reference_document_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows)
}

/// Sums `total_minor` across documents of `kind` with status `status`
/// that reference `reference_document_id` — used to test an invoice's
/// cumulative payments against its total (Data Model: "Paid when Σ
/// payments >= total").
pub async fn sum_total_minor_by_reference_tx(
    tx: &mut Transaction<'_, Postgres>,
    company_id: &str,
    kind: DocumentKind,
    status: DocumentStatus,
    reference_document_id: Uuid,
) -> Result<i64, DocumentRepoError> {
    let (sum,): (Option<i64>,) = sqlx::query_as(
        r#"
        SELECT SUM(total_minor) FROM documents
        WHERE company_id = $1 AND kind = $2 AND status = $3 AND reference_document_id = $4
        "#,
    )
    .bind(company_id)
    .bind(kind)
    .bind(status)
    .bind(reference_document_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(sum.unwrap_or(0))
}

/// Rewrites totals without touching status or transition audit fields.
/// Used by `edit`, which changes a draft's lines but isn't a transition.
pub async fn update_totals_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    subtotal_minor: i64,
    tax_minor: i64,
    total_minor: i64,
) -> Result<Document, DocumentRepoError> {
    let row = sqlx::query_as::<_, Document>(
        r#"
        UPDATE documents
        SET subtotal_minor = $2, tax_minor = $3, total_minor = $4
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(subtotal_minor)
    .bind(tax_minor)
    .bind(total_minor)
    .fetch_one(&mut **tx)
    .await?;

    Ok(row)
}
