use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

use crate::contracts::StockTxType;

#[derive(Debug, Error)]
pub enum StockTransactionError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, FromRow)]
pub struct StockTransaction {
    pub id: Uuid,
    pub company_id: String,
    pub warehouse_id: String,
    pub product_id: String,
    pub qty: Decimal,
    pub unit_cost: Decimal,
    pub tx_type: StockTxType,
    pub reference_module: String,
    pub reference_id: String,
    pub idempotency_key: String,
    pub posted_at: DateTime<Utc>,
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_tx(
    tx: &mut Transaction<'_, Postgres>,
    company_id: &str,
    warehouse_id: &str,
    product_id: &str,
    qty: Decimal,
    unit_cost: Decimal,
    tx_type: StockTxType,
    reference_module: &str,
    reference_id: &str,
    idempotency_key: &str,
) -> Result<Uuid, StockTransactionError> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO stock_transactions
            (id, company_id, warehouse_id, product_id, qty, unit_cost, tx_type,
             reference_module, reference_id, idempotency_key, posted_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW())
        "#,
    )
    .bind(id)
    .bind(company_id)
    .bind(warehouse_id)
    .bind(product_id)
    .bind(qty)
    .bind(unit_cost)
    .bind(tx_type)
    .bind(reference_module)
    .bind(reference_id)
    .bind(idempotency_key)
    .execute(&mut **tx)
    .await?;

    Ok(id)
}

/// All transactions for a balance, in posting order, for the
/// revaluation job to replay from a checkpoint.
pub async fn find_since(
    pool: &sqlx::PgPool,
    company_id: &str,
    warehouse_id: &str,
    product_id: &str,
    since: Option<DateTime<Utc>>,
) -> Result<Vec<StockTransaction>, StockTransactionError> {
    let rows = sqlx::query_as::<_, StockTransaction>(
        r#"
        SELECT id, company_id, warehouse_id, product_id, qty, unit_cost, tx_type,
               reference_module, reference_id, idempotency_key, posted_at
        FROM stock_transactions
        WHERE company_id = $1 AND warehouse_id = $2 AND product_id = $3
          AND ($4::timestamptz IS NULL OR posted_at >= $4)
        ORDER BY posted_at ASC, id ASC
        "#,
    )
    .bind(company_id)
    .bind(warehouse_id)
    .bind(product_id)
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
