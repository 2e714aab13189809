use rust_decimal::Decimal;
use sqlx::{FromRow, Postgres, Transaction};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BalanceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, FromRow)]
pub struct StockBalance {
    pub company_id: String,
    pub warehouse_id: String,
    pub product_id: String,
    pub qty_on_hand: Decimal,
    pub avg_cost: Decimal,
    pub allow_negative: bool,
}

/// Locks the `(warehouse_id, product_id)` balance row for the duration
/// of the caller's transaction, creating a zeroed row first if none
/// exists yet. Must be called before reading `qty_on_hand`/`avg_cost`
/// for a movement, since moving-average cost needs a consistent read of
/// the pre-move state.
pub async fn lock_or_init_tx(
    tx: &mut Transaction<'_, Postgres>,
    company_id: &str,
    warehouse_id: &str,
    product_id: &str,
) -> Result<StockBalance, BalanceError> {
    sqlx::query(
        r#"
        INSERT INTO stock_balances (company_id, warehouse_id, product_id, qty_on_hand, avg_cost, allow_negative)
        VALUES ($1, $2, $3, 0, 0, false)
        ON CONFLICT (company_id, warehouse_id, product_id) DO NOTHING
        "#,
    )
    .bind(company_id)
    .bind(warehouse_id)
    .bind(product_id)
    .execute(&mut **tx)
    .await?;

    let balance = sqlx::query_as::<_, StockBalance>(
        r#"
        SELECT company_id, warehouse_id, product_id, qty_on_hand, avg_cost, allow_negative
        FROM stock_balances
        WHERE company_id = $1 AND warehouse_id = $2 AND product_id = $3
        FOR UPDATE
        "#,
    )
    .bind(company_id)
    .bind(warehouse_id)
    .bind(product_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(balance)
}

pub async fn write_back_tx(
    tx: &mut Transaction<'_, Postgres>,
    company_id: &str,
    warehouse_id: &str,
    product_id: &str,
    qty_on_hand: Decimal,
    avg_cost: Decimal,
) -> Result<(), BalanceError> {
    sqlx::query(
        r#"
        UPDATE stock_balances
        SET qty_on_hand = $4, avg_cost = $5
        WHERE company_id = $1 AND warehouse_id = $2 AND product_id = $3
        "#,
    )
    .bind(company_id)
    .bind(warehouse_id)
    .bind(product_id)
    .bind(qty_on_hand)
    .bind(avg_cost)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
