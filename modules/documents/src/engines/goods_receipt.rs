//! Goods receipts: the one procurement document that actually posts —
//! `post` fires both the inbound stock movements and the DR
//! Inventory / CR GR-IR journal in one transaction (spec §4.4, §8).

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::document_core::{Document, DocumentKind, DocumentLine, DocumentStatus, NewLine};
use crate::engines::core::{self, DocumentError};
use crate::hooks::{DocumentEvent, GrnLine};

#[allow(clippy::too_many_arguments)]
pub async fn create(
    pool: &PgPool,
    company_id: &str,
    supplier_id: &str,
    warehouse_id: &str,
    reference_po_id: Uuid,
    lines: Vec<NewLine>,
    actor_id: &str,
    effective_date: NaiveDate,
    currency: &str,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    core::create(
        pool,
        company_id,
        DocumentKind::GoodsReceipt,
        Some(supplier_id),
        Some(warehouse_id),
        Some(reference_po_id),
        currency,
        lines,
        actor_id,
        effective_date,
    )
    .await
}

pub async fn post(
    pool: &PgPool,
    company_id: &str,
    id: Uuid,
    actor_id: &str,
    posting_date: NaiveDate,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    let mut open = core::begin_transition(pool, company_id, id, DocumentStatus::Posted).await?;

    let warehouse_id = open
        .doc
        .warehouse_id
        .clone()
        .expect("goods receipts always carry a warehouse_id");

    let event = DocumentEvent::GrnPosted {
        document_id: open.doc.id,
        warehouse_id,
        posting_date: posting_date.to_string(),
        currency: open.doc.currency.clone(),
        lines: open
            .lines
            .iter()
            .map(|l| GrnLine {
                product_id: l.product_id.clone(),
                qty: l.qty,
                unit_cost: l.unit_price,
            })
            .collect(),
    };

    core::run_hook(&mut open, company_id, &event).await?;
    core::finish_transition(open, DocumentStatus::Posted, actor_id, None).await
}

/// Part of the uniform operation family, but the Data Model names only
/// `Draft → Posted` for a GRN — there is no `Cancelled` state, so this
/// always fails with `InvalidStatus`.
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
    core::list(pool, company_id, DocumentKind::GoodsReceipt).await
}
