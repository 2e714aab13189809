//! Inventory adjustments: unlike the ten document kinds, an adjustment
//! has no draft/lifecycle of its own (it isn't in the Data Model's
//! document-kind list) — posting it is a single call straight into the
//! hooks executor, over its own transaction.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::hooks::{DocumentEvent, HookError};

#[derive(Debug, Error)]
pub enum InventoryAdjustmentError {
    #[error(transparent)]
    Hook(#[from] HookError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// `adjustment_id` is caller-supplied and must stay stable across
/// retries of the same adjustment — it's what the hooks executor's
/// UUIDv5 derivation keys dedupe on, there being no document row of
/// its own to key against.
#[allow(clippy::too_many_arguments)]
pub async fn post(
    pool: &PgPool,
    company_id: &str,
    adjustment_id: Uuid,
    warehouse_id: &str,
    product_id: &str,
    qty: Decimal,
    unit_cost: Decimal,
    posting_date: NaiveDate,
    currency: &str,
) -> Result<(), InventoryAdjustmentError> {
    let mut tx = pool.begin().await?;

    let event = DocumentEvent::InventoryAdjustmentPosted {
        document_id: adjustment_id,
        warehouse_id: warehouse_id.to_string(),
        product_id: product_id.to_string(),
        qty,
        unit_cost,
        posting_date: posting_date.to_string(),
        currency: currency.to_string(),
    };

    crate::hooks::execute(&mut tx, company_id, &event).await?;

    tx.commit().await?;

    Ok(())
}
