use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use crate::repos::{stock_balance_repo, stock_transaction_repo};
use crate::services::movement_service::apply_movement;

#[derive(Debug, Error)]
pub enum RevaluationError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<stock_balance_repo::BalanceError> for RevaluationError {
    fn from(e: stock_balance_repo::BalanceError) -> Self {
        match e {
            stock_balance_repo::BalanceError::Database(e) => RevaluationError::Database(e),
        }
    }
}

impl From<stock_transaction_repo::StockTransactionError> for RevaluationError {
    fn from(e: stock_transaction_repo::StockTransactionError) -> Self {
        match e {
            stock_transaction_repo::StockTransactionError::Database(e) => {
                RevaluationError::Database(e)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevaluationOutcome {
    pub corrected: bool,
    pub qty_on_hand: Decimal,
    pub avg_cost: Decimal,
}

/// Pure replay of a transaction history into a `(qty_on_hand, avg_cost)`
/// pair, starting from zero. The invariant this enforces — `Σ qty ==
/// qty_on_hand` — is exactly what a drifted balance violates, which is
/// what this job exists to correct.
///
/// `allow_negative` is always treated as true during replay: the history
/// is already-committed fact, not a new movement subject to the
/// insufficient-stock policy check.
pub fn recompute_balance(
    transactions: &[stock_transaction_repo::StockTransaction],
) -> (Decimal, Decimal) {
    let mut qty_on_hand = Decimal::ZERO;
    let mut avg_cost = Decimal::ZERO;

    for t in transactions {
        let (new_qty, new_avg) = apply_movement(
            qty_on_hand,
            avg_cost,
            t.qty,
            t.unit_cost,
            t.tx_type,
            true,
            &t.warehouse_id,
            &t.product_id,
        )
        .expect("replay of committed history never trips the allow_negative guard");
        qty_on_hand = new_qty;
        avg_cost = new_avg;
    }

    (qty_on_hand, avg_cost)
}

/// Recomputes one balance from its full transaction history and
/// corrects the stored row if it has drifted. Runs as the
/// `inventory:revaluation` job handler.
pub async fn revalue_balance(
    pool: &PgPool,
    company_id: &str,
    warehouse_id: &str,
    product_id: &str,
) -> Result<RevaluationOutcome, RevaluationError> {
    let transactions =
        stock_transaction_repo::find_since(pool, company_id, warehouse_id, product_id, None)
            .await?;
    let (qty_on_hand, avg_cost) = recompute_balance(&transactions);

    let mut tx = pool.begin().await?;
    let current =
        stock_balance_repo::lock_or_init_tx(&mut tx, company_id, warehouse_id, product_id).await?;

    let corrected = current.qty_on_hand != qty_on_hand || current.avg_cost != avg_cost;
    if corrected {
        stock_balance_repo::write_back_tx(
            &mut tx,
            company_id,
            warehouse_id,
            product_id,
            qty_on_hand,
            avg_cost,
        )
        .await?;
        tracing::warn!(
            company_id = %company_id,
            warehouse_id = %warehouse_id,
            product_id = %product_id,
            stored_qty = %current.qty_on_hand,
            recomputed_qty = %qty_on_hand,
            "stock balance drift corrected by revaluation"
        );
    }
    tx.commit().await?;

    Ok(RevaluationOutcome {
        corrected,
        qty_on_hand,
        avg_cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::StockTxType;
    use chrono::Utc;
    use uuid::Uuid;

    fn txn(qty: Decimal, unit_cost: Decimal, tx_type: StockTxType) -> stock_transaction_repo::StockTransaction {
        stock_transaction_repo::StockTransaction {
            id: Uuid::new_v4(),
            company_id: "co-1".to_string(),
            warehouse_id: "wh-1".to_string(),
            product_id: "prod-1".to_string(),
            qty,
            unit_cost,
            tx_type,
            reference_module: "grn".to_string(),
            reference_id: "ref-1".to_string(),
            idempotency_key: Uuid::new_v4().to_string(),
            posted_at: Utc::now(),
        }
    }

    #[test]
    fn replaying_an_empty_history_yields_zero_balance() {
        let (qty, avg) = recompute_balance(&[]);
        assert_eq!(qty, Decimal::ZERO);
        assert_eq!(avg, Decimal::ZERO);
    }

    #[test]
    fn replay_matches_incremental_application_for_inbound_then_outbound() {
        let transactions = vec![
            txn(Decimal::new(10, 0), Decimal::new(200, 2), StockTxType::Inbound),
            txn(Decimal::new(-4, 0), Decimal::ZERO, StockTxType::Outbound),
        ];

        let (qty, avg) = recompute_balance(&transactions);
        assert_eq!(qty, Decimal::new(6, 0));
        assert_eq!(avg, Decimal::new(200, 2));
    }
}
