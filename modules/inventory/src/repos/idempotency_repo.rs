use rust_decimal::Decimal;
use sqlx::{FromRow, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum IdempotencyError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, FromRow)]
pub struct IdempotencyRecord {
    pub idempotency_key: String,
    pub stock_transaction_id: Uuid,
    pub qty_on_hand: Decimal,
    pub avg_cost: Decimal,
}

pub async fn find_tx(
    tx: &mut Transaction<'_, Postgres>,
    idempotency_key: &str,
) -> Result<Option<IdempotencyRecord>, IdempotencyError> {
    let row = sqlx::query_as::<_, IdempotencyRecord>(
        r#"
        SELECT idempotency_key, stock_transaction_id, qty_on_hand, avg_cost
        FROM stock_movement_idempotency
        WHERE idempotency_key = $1
        "#,
    )
    .bind(idempotency_key)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row)
}

pub async fn record_tx(
    tx: &mut Transaction<'_, Postgres>,
    idempotency_key: &str,
    stock_transaction_id: Uuid,
    qty_on_hand: Decimal,
    avg_cost: Decimal,
) -> Result<(), IdempotencyError> {
    sqlx::query(
        r#"
        INSERT INTO stock_movement_idempotency
            (idempotency_key, stock_transaction_id, qty_on_hand, avg_cost, recorded_at)
        VALUES ($1, $2, $3, $4, NOW())
        "#,
    )
    .bind(idempotency_key)
    .bind(stock_transaction_id)
    .bind(qty_on_hand)
    .bind(avg_cost)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
