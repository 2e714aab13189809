use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;

use crate::contracts::{MovementOutcome, MovementRequest, StockTxType};
use crate::repos::{idempotency_repo, stock_balance_repo, stock_transaction_repo};

#[derive(Debug, Error)]
pub enum MovementError {
    #[error("insufficient stock: {warehouse_id}/{product_id} would go to {new_qty}")]
    InsufficientStock {
        warehouse_id: String,
        product_id: String,
        new_qty: Decimal,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<stock_balance_repo::BalanceError> for MovementError {
    fn from(e: stock_balance_repo::BalanceError) -> Self {
        match e {
            stock_balance_repo::BalanceError::Database(e) => MovementError::Database(e),
        }
    }
}

impl From<stock_transaction_repo::StockTransactionError> for MovementError {
    fn from(e: stock_transaction_repo::StockTransactionError) -> Self {
        match e {
            stock_transaction_repo::StockTransactionError::Database(e) => {
                MovementError::Database(e)
            }
        }
    }
}

impl From<idempotency_repo::IdempotencyError> for MovementError {
    fn from(e: idempotency_repo::IdempotencyError) -> Self {
        match e {
            idempotency_repo::IdempotencyError::Database(e) => MovementError::Database(e),
        }
    }
}

pub type MovementResult<T> = Result<T, MovementError>;

/// Folds one movement onto a balance. Pure function, no I/O — this is
/// also the step `recompute_balance` replays for the revaluation job,
/// so any change here must stay consistent with that replay.
pub fn apply_movement(
    qty_on_hand: Decimal,
    avg_cost: Decimal,
    qty: Decimal,
    unit_cost: Decimal,
    tx_type: StockTxType,
    allow_negative: bool,
    warehouse_id: &str,
    product_id: &str,
) -> MovementResult<(Decimal, Decimal)> {
    let new_qty = qty_on_hand + qty;

    let recompute_average = match tx_type {
        StockTxType::Inbound | StockTxType::TransferIn => true,
        StockTxType::Adjust => qty >= Decimal::ZERO,
        StockTxType::Outbound | StockTxType::TransferOut => false,
    };

    if matches!(tx_type, StockTxType::Outbound | StockTxType::TransferOut)
        && new_qty < Decimal::ZERO
        && !allow_negative
    {
        return Err(MovementError::InsufficientStock {
            warehouse_id: warehouse_id.to_string(),
            product_id: product_id.to_string(),
            new_qty,
        });
    }

    let new_avg = if recompute_average {
        if new_qty > Decimal::ZERO {
            (qty_on_hand * avg_cost + qty * unit_cost) / new_qty
        } else {
            avg_cost
        }
    } else {
        avg_cost
    };

    Ok((new_qty, new_avg))
}

pub async fn post_movement_tx(
    tx: &mut Transaction<'_, Postgres>,
    request: &MovementRequest,
) -> MovementResult<MovementOutcome> {
    if let Some(existing) = idempotency_repo::find_tx(tx, &request.idempotency_key).await? {
        return Ok(MovementOutcome {
            stock_transaction_id: existing.stock_transaction_id,
            qty_on_hand: existing.qty_on_hand,
            avg_cost: existing.avg_cost,
        });
    }

    let balance = stock_balance_repo::lock_or_init_tx(
        tx,
        &request.company_id,
        &request.warehouse_id,
        &request.product_id,
    )
    .await?;

    let (new_qty, new_avg) = apply_movement(
        balance.qty_on_hand,
        balance.avg_cost,
        request.qty,
        request.unit_cost,
        request.tx_type,
        balance.allow_negative,
        &request.warehouse_id,
        &request.product_id,
    )?;

    let stock_transaction_id = stock_transaction_repo::insert_tx(
        tx,
        &request.company_id,
        &request.warehouse_id,
        &request.product_id,
        request.qty,
        request.unit_cost,
        request.tx_type,
        &request.reference_module,
        &request.reference_id,
        &request.idempotency_key,
    )
    .await?;

    stock_balance_repo::write_back_tx(
        tx,
        &request.company_id,
        &request.warehouse_id,
        &request.product_id,
        new_qty,
        new_avg,
    )
    .await?;

    idempotency_repo::record_tx(tx, &request.idempotency_key, stock_transaction_id, new_qty, new_avg)
        .await?;

    tracing::info!(
        company_id = %request.company_id,
        warehouse_id = %request.warehouse_id,
        product_id = %request.product_id,
        tx_type = ?request.tx_type,
        "stock movement posted"
    );

    Ok(MovementOutcome {
        stock_transaction_id,
        qty_on_hand: new_qty,
        avg_cost: new_avg,
    })
}

pub async fn post_movement(pool: &PgPool, request: &MovementRequest) -> MovementResult<MovementOutcome> {
    let mut tx = pool.begin().await?;
    let outcome = post_movement_tx(&mut tx, request).await?;
    tx.commit().await?;
    Ok(outcome)
}

/// A transfer is one Outbound from `source_warehouse_id` and one Inbound
/// into `destination_warehouse_id`, in the same transaction. The
/// destination's `unit_cost` is the source balance's pre-move `avg_cost`,
/// not a caller-supplied price.
pub async fn post_transfer_tx(
    tx: &mut Transaction<'_, Postgres>,
    company_id: &str,
    source_warehouse_id: &str,
    destination_warehouse_id: &str,
    product_id: &str,
    qty: Decimal,
    reference_module: &str,
    reference_id: &str,
    idempotency_key: &str,
) -> MovementResult<(MovementOutcome, MovementOutcome)> {
    let source_balance =
        stock_balance_repo::lock_or_init_tx(tx, company_id, source_warehouse_id, product_id).await?;

    let out_request = MovementRequest {
        company_id: company_id.to_string(),
        warehouse_id: source_warehouse_id.to_string(),
        product_id: product_id.to_string(),
        qty: -qty.abs(),
        unit_cost: source_balance.avg_cost,
        tx_type: StockTxType::TransferOut,
        reference_module: reference_module.to_string(),
        reference_id: reference_id.to_string(),
        idempotency_key: format!("{idempotency_key}:out"),
    };
    let out_outcome = post_movement_tx(tx, &out_request).await?;

    let in_request = MovementRequest {
        company_id: company_id.to_string(),
        warehouse_id: destination_warehouse_id.to_string(),
        product_id: product_id.to_string(),
        qty: qty.abs(),
        unit_cost: source_balance.avg_cost,
        tx_type: StockTxType::TransferIn,
        reference_module: reference_module.to_string(),
        reference_id: reference_id.to_string(),
        idempotency_key: format!("{idempotency_key}:in"),
    };
    let in_outcome = post_movement_tx(tx, &in_request).await?;

    Ok((out_outcome, in_outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_recomputes_weighted_average() {
        let (qty, avg) = apply_movement(
            Decimal::new(10, 0),
            Decimal::new(200, 2),
            Decimal::new(10, 0),
            Decimal::new(300, 2),
            StockTxType::Inbound,
            false,
            "wh-1",
            "prod-1",
        )
        .unwrap();

        assert_eq!(qty, Decimal::new(20, 0));
        assert_eq!(avg, Decimal::new(250, 2));
    }

    #[test]
    fn outbound_leaves_average_cost_unchanged() {
        let (qty, avg) = apply_movement(
            Decimal::new(10, 0),
            Decimal::new(200, 2),
            Decimal::new(-4, 0),
            Decimal::ZERO,
            StockTxType::Outbound,
            false,
            "wh-1",
            "prod-1",
        )
        .unwrap();

        assert_eq!(qty, Decimal::new(6, 0));
        assert_eq!(avg, Decimal::new(200, 2));
    }

    #[test]
    fn outbound_past_zero_is_rejected_without_allow_negative() {
        let err = apply_movement(
            Decimal::new(3, 0),
            Decimal::new(200, 2),
            Decimal::new(-4, 0),
            Decimal::ZERO,
            StockTxType::Outbound,
            false,
            "wh-1",
            "prod-1",
        )
        .unwrap_err();

        assert!(matches!(err, MovementError::InsufficientStock { .. }));
    }

    #[test]
    fn outbound_past_zero_is_allowed_when_the_policy_flag_is_set() {
        let (qty, _avg) = apply_movement(
            Decimal::new(3, 0),
            Decimal::new(200, 2),
            Decimal::new(-4, 0),
            Decimal::ZERO,
            StockTxType::Outbound,
            true,
            "wh-1",
            "prod-1",
        )
        .unwrap();

        assert_eq!(qty, Decimal::new(-1, 0));
    }

    #[test]
    fn negative_adjustment_does_not_touch_average_cost() {
        let (qty, avg) = apply_movement(
            Decimal::new(10, 0),
            Decimal::new(200, 2),
            Decimal::new(-2, 0),
            Decimal::ZERO,
            StockTxType::Adjust,
            false,
            "wh-1",
            "prod-1",
        )
        .unwrap();

        assert_eq!(qty, Decimal::new(8, 0));
        assert_eq!(avg, Decimal::new(200, 2));
    }

    #[test]
    fn positive_adjustment_recomputes_average_like_an_inbound() {
        let (qty, avg) = apply_movement(
            Decimal::new(10, 0),
            Decimal::new(200, 2),
            Decimal::new(10, 0),
            Decimal::new(400, 2),
            StockTxType::Adjust,
            false,
            "wh-1",
            "prod-1",
        )
        .unwrap();

        assert_eq!(qty, Decimal::new(20, 0));
        assert_eq!(avg, Decimal::new(300, 2));
    }
}
