use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

use crate::document_core::{DocumentKind, DocumentLine, NewLine};

#[derive(Debug, Error)]
#[error(transparent)]
pub struct DocumentLineRepoError(#[from] sqlx::Error);

pub async fn insert_all_tx(
    tx: &mut Transaction<'_, Postgres>,
    document_id: Uuid,
    lines: &[NewLine],
) -> Result<Vec<DocumentLine>, DocumentLineRepoError> {
    let mut inserted = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        let row = sqlx::query_as::<_, DocumentLine>(
            r#"
            INSERT INTO document_lines (
                id, document_id, line_no, product_id, qty, unit_price,
                discount_pct, tax_pct, qty_delivered
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(document_id)
        .bind((idx + 1) as i32)
        .bind(&line.product_id)
        .bind(line.qty)
        .bind(line.unit_price)
        .bind(line.discount_pct)
        .bind(line.tax_pct)
        .fetch_one(&mut **tx)
        .await?;

        inserted.push(row);
    }

    Ok(inserted)
}

pub async fn delete_by_document_tx(
    tx: &mut Transaction<'_, Postgres>,
    document_id: Uuid,
) -> Result<(), DocumentLineRepoError> {
    sqlx::query(r#"DELETE FROM document_lines WHERE document_id = $1"#)
        .bind(document_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

pub async fn find_by_document_tx(
    tx: &mut Transaction<'_, Postgres>,
    document_id: Uuid,
) -> Result<Vec<DocumentLine>, DocumentLineRepoError> {
    let rows = sqlx::query_as::<_, DocumentLine>(
        r#"SELECT * FROM document_lines WHERE document_id = $1 ORDER BY line_no"#,
    )
    .bind(document_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows)
}

pub async fn find_by_document(
    pool: &PgPool,
    document_id: Uuid,
) -> Result<Vec<DocumentLine>, DocumentLineRepoError> {
    let rows = sqlx::query_as::<_, DocumentLine>(
        r#"SELECT * FROM document_lines WHERE document_id = $1 ORDER BY line_no"#,
    )
    .bind(document_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Sums allocated amounts across posted AR payment lines that pay down
/// `invoice_id` — payments overload `product_id` with the invoice id
/// they allocate to. Used to compute an AR invoice's remaining balance.
pub async fn sum_allocated_to_invoice_tx(
    tx: &mut Transaction<'_, Postgres>,
    company_id: &str,
    invoice_id: Uuid,
) -> Result<Decimal, DocumentLineRepoError> {
    let (sum,): (Option<Decimal>,) = sqlx::query_as(
        r#"
        SELECT SUM(dl.unit_price) FROM document_lines dl
        JOIN documents d ON d.id = dl.document_id
        WHERE d.company_id = $1 AND d.kind = $2 AND d.status = 'posted'
          AND dl.product_id = $3
        "#,
    )
    .bind(company_id)
    .bind(DocumentKind::ArPayment)
    .bind(invoice_id.to_string())
    .fetch_one(&mut **tx)
    .await?;

    Ok(sum.unwrap_or(Decimal::ZERO))
}

/// Advances `qty_delivered` on a sales-order line as delivery orders
/// confirm against it. Rejects (by returning the pre-update row
/// unchanged — callers compare) when the new total would exceed `qty`.
pub async fn add_qty_delivered_tx(
    tx: &mut Transaction<'_, Postgres>,
    line_id: Uuid,
    delta: Decimal,
) -> Result<DocumentLine, DocumentLineRepoError> {
    let row = sqlx::query_as::<_, DocumentLine>(
        r#"
        UPDATE document_lines
        SET qty_delivered = qty_delivered + $2
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(line_id)
    .bind(delta)
    .fetch_one(&mut **tx)
    .await?;

    Ok(row)
}
