//! Delivery orders: `confirm` advances the referenced sales order's
//! `qty_delivered` under its own row lock (spec §4.1 "partial
//! deliveries") and fires the outbound stock movements — delivery has
//! no GL effect of its own, only the AR invoice that follows does.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::document_core::{Document, DocumentKind, DocumentLine, DocumentStatus, NewLine};
use crate::engines::core::{self, DocumentError};
use crate::engines::sales_order;
use crate::hooks::{source_id_for, DocumentEvent, DoLine};
use crate::repos::{document_line_repo, document_repo};
use inventory::contracts::{MovementRequest, StockTxType};

#[allow(clippy::too_many_arguments)]
pub async fn create(
    pool: &PgPool,
    company_id: &str,
    customer_id: &str,
    warehouse_id: &str,
    reference_so_id: Uuid,
    lines: Vec<NewLine>,
    actor_id: &str,
    effective_date: NaiveDate,
    currency: &str,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    core::create(
        pool,
        company_id,
        DocumentKind::DeliveryOrder,
        Some(customer_id),
        Some(warehouse_id),
        Some(reference_so_id),
        currency,
        lines,
        actor_id,
        effective_date,
    )
    .await
}

/// For one delivery-order line's `(product_id, qty)`, works out how
/// much of it to draw from each of the locked sales order's matching
/// lines, in order, rejecting if the order's remaining quantity for
/// that product can't cover it. Pure — no I/O — so the partial-
/// delivery math can be checked without a database.
fn allocate_delivery_quantity(
    sales_order_id: Uuid,
    so_lines: &[DocumentLine],
    product_id: &str,
    qty: Decimal,
) -> Result<Vec<(Uuid, Decimal)>, DocumentError> {
    let candidates: Vec<_> = so_lines.iter().filter(|l| l.product_id == product_id).collect();

    let total_remaining: Decimal = candidates.iter().map(|l| l.qty - l.qty_delivered).sum();
    if qty > total_remaining {
        return Err(DocumentError::QuantityExceedsRemaining {
            sales_order_id,
            product_id: product_id.to_string(),
            requested: qty,
            remaining: total_remaining,
        });
    }

    let mut remaining_to_consume = qty;
    let mut draws = Vec::new();
    for line in candidates {
        if remaining_to_consume <= Decimal::ZERO {
            break;
        }
        let available = line.qty - line.qty_delivered;
        let take = available.min(remaining_to_consume);
        if take > Decimal::ZERO {
            draws.push((line.id, take));
            remaining_to_consume -= take;
        }
    }

    Ok(draws)
}

async fn advance_so_line(
    tx: &mut Transaction<'_, Postgres>,
    sales_order_id: Uuid,
    so_lines: &[DocumentLine],
    product_id: &str,
    qty: Decimal,
) -> Result<(), DocumentError> {
    let draws = allocate_delivery_quantity(sales_order_id, so_lines, product_id, qty)?;
    for (line_id, take) in draws {
        document_line_repo::add_qty_delivered_tx(tx, line_id, take).await?;
    }
    Ok(())
}

pub async fn confirm(
    pool: &PgPool,
    company_id: &str,
    id: Uuid,
    actor_id: &str,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    let mut open = core::begin_transition(pool, company_id, id, DocumentStatus::Confirmed).await?;

    let warehouse_id = open
        .doc
        .warehouse_id
        .clone()
        .expect("delivery orders always carry a warehouse_id");
    let sales_order_id = open
        .doc
        .reference_document_id
        .expect("delivery orders always reference a sales order");

    let so_doc = document_repo::lock_tx(&mut open.tx, company_id, sales_order_id)
        .await?
        .ok_or(DocumentError::NotFound(sales_order_id))?;
    let so_lines = document_line_repo::find_by_document_tx(&mut open.tx, sales_order_id).await?;

    for line in &open.lines {
        advance_so_line(&mut open.tx, sales_order_id, &so_lines, &line.product_id, line.qty).await?;
    }

    let so_lines_after = document_line_repo::find_by_document_tx(&mut open.tx, sales_order_id).await?;
    sales_order::sync_status_tx(&mut open.tx, &so_doc, &so_lines_after).await?;

    let event = DocumentEvent::DoConfirmed {
        document_id: open.doc.id,
        warehouse_id,
        lines: open
            .lines
            .iter()
            .map(|l| DoLine {
                product_id: l.product_id.clone(),
                qty: l.qty,
            })
            .collect(),
    };

    core::run_hook(&mut open, company_id, &event).await?;
    core::finish_transition(open, DocumentStatus::Confirmed, actor_id, None).await
}

pub async fn ship(
    pool: &PgPool,
    company_id: &str,
    id: Uuid,
    actor_id: &str,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    core::plain_transition(pool, company_id, id, DocumentStatus::InTransit, actor_id).await
}

pub async fn deliver(
    pool: &PgPool,
    company_id: &str,
    id: Uuid,
    actor_id: &str,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    core::plain_transition(pool, company_id, id, DocumentStatus::Delivered, actor_id).await
}

/// Cancelling a `Confirmed` delivery order reverses the outbound stock
/// movement `confirm` posted, atomically with the cancellation (spec's
/// Open Questions: "the spec requires atomic reversal"). A `Draft`
/// cancellation never moved stock, so there's nothing to reverse. This
/// isn't routed through the closed `DocumentEvent` set — there is no
/// GL effect to reverse, and the movement service is already
/// idempotent on its own key — so it calls `inventory::post_movement_tx`
/// directly inside the same transaction as the status transition.
pub async fn cancel(
    pool: &PgPool,
    company_id: &str,
    id: Uuid,
    actor_id: &str,
    reason: &str,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    let mut open = core::begin_transition(pool, company_id, id, DocumentStatus::Cancelled).await?;

    if open.doc.status == DocumentStatus::Confirmed {
        let warehouse_id = open
            .doc
            .warehouse_id
            .clone()
            .expect("delivery orders always carry a warehouse_id");
        let source_id = source_id_for(DocumentKind::DeliveryOrder.module_name(), &open.doc.id.to_string()).to_string();

        for line in &open.lines {
            inventory::post_movement_tx(
                &mut open.tx,
                &MovementRequest {
                    company_id: company_id.to_string(),
                    warehouse_id: warehouse_id.clone(),
                    product_id: line.product_id.clone(),
                    qty: line.qty.abs(),
                    unit_cost: rust_decimal::Decimal::ZERO,
                    tx_type: StockTxType::Inbound,
                    reference_module: "DO-cancel".to_string(),
                    reference_id: source_id.clone(),
                    idempotency_key: format!("{source_id}:cancel:{}", line.product_id),
                },
            )
            .await?;
        }
    }

    core::finish_transition(open, DocumentStatus::Cancelled, actor_id, Some(reason)).await
}

pub async fn edit(
    pool: &PgPool,
    company_id: &str,
    id: Uuid,
    actor_id: &str,
    lines: Vec<NewLine>,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    core::edit(pool, company_id, id, actor_id, lines).await
}

pub async fn get(
    pool: &PgPool,
    company_id: &str,
    id: Uuid,
) -> Result<Option<(Document, Vec<DocumentLine>)>, DocumentError> {
    core::get(pool, company_id, id).await
}

pub async fn list(pool: &PgPool, company_id: &str) -> Result<Vec<Document>, DocumentError> {
    core::list(pool, company_id, DocumentKind::DeliveryOrder).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn so_line(product_id: &str, qty: i64, qty_delivered: i64) -> DocumentLine {
        DocumentLine {
            id: Uuid::new_v4(),
            document_id: Uuid::new_v4(),
            line_no: 1,
            product_id: product_id.to_string(),
            qty: Decimal::new(qty, 0),
            unit_price: Decimal::ONE,
            discount_pct: Decimal::ZERO,
            tax_pct: Decimal::ZERO,
            qty_delivered: Decimal::new(qty_delivered, 0),
        }
    }

    #[test]
    fn allocates_within_a_single_line() {
        let so_id = Uuid::new_v4();
        let lines = vec![so_line("WIDGET", 10, 2)];

        let draws = allocate_delivery_quantity(so_id, &lines, "WIDGET", Decimal::new(5, 0)).unwrap();

        assert_eq!(draws, vec![(lines[0].id, Decimal::new(5, 0))]);
    }

    #[test]
    fn spreads_across_matching_lines_in_order() {
        let so_id = Uuid::new_v4();
        let lines = vec![
            so_line("WIDGET", 4, 4),
            so_line("WIDGET", 10, 0),
            so_line("GADGET", 10, 0),
        ];

        let draws = allocate_delivery_quantity(so_id, &lines, "WIDGET", Decimal::new(6, 0)).unwrap();

        assert_eq!(draws, vec![(lines[1].id, Decimal::new(6, 0))]);
    }

    #[test]
    fn rejects_quantity_exceeding_remaining_across_all_matching_lines() {
        let so_id = Uuid::new_v4();
        let lines = vec![so_line("WIDGET", 5, 3), so_line("WIDGET", 5, 5)];

        let err = allocate_delivery_quantity(so_id, &lines, "WIDGET", Decimal::new(3, 0)).unwrap_err();

        match err {
            DocumentError::QuantityExceedsRemaining { remaining, requested, .. } => {
                assert_eq!(remaining, Decimal::new(2, 0));
                assert_eq!(requested, Decimal::new(3, 0));
            }
            other => panic!("expected QuantityExceedsRemaining, got {other:?}"),
        }
    }

    #[test]
    fn ignores_lines_for_a_different_product() {
        let so_id = Uuid::new_v4();
        let lines = vec![so_line("GADGET", 100, 0)];

        let err = allocate_delivery_quantity(so_id, &lines, "WIDGET", Decimal::ONE).unwrap_err();

        assert!(matches!(err, DocumentError::QuantityExceedsRemaining { remaining, .. } if remaining == Decimal::ZERO));
    }
}
