//! Sales orders: line `qty_delivered` advances only via
//! `delivery_order::confirm`'s row-locked increment; this module never
//! writes it directly.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::document_core::{Document, DocumentKind, DocumentLine, DocumentStatus, NewLine};
use crate::engines::core::{self, DocumentError};
use crate::repos::document_repo;
use crate::state_machine;

pub async fn create(
    pool: &PgPool,
    company_id: &str,
    customer_id: &str,
    reference_quotation_id: Option<Uuid>,
    lines: Vec<NewLine>,
    actor_id: &str,
    effective_date: NaiveDate,
    currency: &str,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    core::create(
        pool,
        company_id,
        DocumentKind::SalesOrder,
        Some(customer_id),
        None,
        reference_quotation_id,
        currency,
        lines,
        actor_id,
        effective_date,
    )
    .await
}

pub async fn confirm(
    pool: &PgPool,
    company_id: &str,
    id: Uuid,
    actor_id: &str,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    core::plain_transition(pool, company_id, id, DocumentStatus::Confirmed, actor_id).await
}

/// Manual override for `Confirmed -> Processing`. The ordinary path is
/// automatic: `sync_status_tx` flips this as soon as a delivery partially
/// fulfils the order.
pub async fn mark_processing(
    pool: &PgPool,
    company_id: &str,
    id: Uuid,
    actor_id: &str,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    core::plain_transition(pool, company_id, id, DocumentStatus::Processing, actor_id).await
}

/// Advances a sales order's status to reflect delivery progress:
/// `Processing` once any line has a partial delivery, `Completed` once
/// every line is fully delivered (Data Model: "status Processing iff
/// 0 < Σqty_delivered < Σqty; Completed iff equal"). Called from inside
/// `delivery_order::confirm`'s transaction, after the referenced
/// lines' `qty_delivered` has been advanced. The transition table
/// forbids skipping `Confirmed` straight to `Completed`, so a delivery
/// that fully satisfies the order in one shot steps through
/// `Processing` first.
pub(crate) async fn sync_status_tx(
    tx: &mut Transaction<'_, Postgres>,
    doc: &Document,
    so_lines: &[DocumentLine],
) -> Result<(), DocumentError> {
    let total_qty: Decimal = so_lines.iter().map(|l| l.qty).sum();
    let total_delivered: Decimal = so_lines.iter().map(|l| l.qty_delivered).sum();

    let target = if total_delivered >= total_qty && total_qty > Decimal::ZERO {
        DocumentStatus::Completed
    } else if total_delivered > Decimal::ZERO {
        DocumentStatus::Processing
    } else {
        return Ok(());
    };

    if doc.status == target {
        return Ok(());
    }

    if doc.status == DocumentStatus::Confirmed && target == DocumentStatus::Completed {
        transition_tx(tx, doc, DocumentStatus::Processing).await?;
        transition_tx(tx, doc, DocumentStatus::Completed).await?;
        return Ok(());
    }

    transition_tx(tx, doc, target).await
}

async fn transition_tx(tx: &mut Transaction<'_, Postgres>, doc: &Document, to: DocumentStatus) -> Result<(), DocumentError> {
    state_machine::validate(DocumentKind::SalesOrder, doc.status, to)?;
    document_repo::transition_tx(
        tx,
        doc.id,
        to,
        "system:delivery",
        doc.subtotal_minor,
        doc.tax_minor,
        doc.total_minor,
        None,
    )
    .await?;
    Ok(())
}

/// Manual override for `Processing -> Completed`. The Data Model names
/// this as a real invariant (`Completed iff Σqty_delivered == Σqty`),
/// which `sync_status_tx` enforces automatically as deliveries land;
/// this entry point exists for operators closing an order by hand.
pub async fn complete(
    pool: &PgPool,
    company_id: &str,
    id: Uuid,
    actor_id: &str,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    core::plain_transition(pool, company_id, id, DocumentStatus::Completed, actor_id).await
}

pub async fn cancel(
    pool: &PgPool,
    company_id: &str,
    id: Uuid,
    actor_id: &str,
    reason: &str,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    core::cancel(pool, company_id, id, actor_id, reason).await
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
    core::list(pool, company_id, DocumentKind::SalesOrder).await
}
