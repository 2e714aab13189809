//! Purchase orders: no direct GL/inventory effect — receiving against
//! one is what posts (see `goods_receipt`).

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::document_core::{Document, DocumentKind, DocumentLine, DocumentStatus, NewLine};
use crate::engines::core::{self, DocumentError};
use crate::repos::document_repo;

#[allow(clippy::too_many_arguments)]
pub async fn create(
    pool: &PgPool,
    company_id: &str,
    supplier_id: &str,
    reference_requisition_id: Option<Uuid>,
    lines: Vec<NewLine>,
    actor_id: &str,
    effective_date: NaiveDate,
    currency: &str,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    core::create(
        pool,
        company_id,
        DocumentKind::PurchaseOrder,
        Some(supplier_id),
        None,
        reference_requisition_id,
        currency,
        lines,
        actor_id,
        effective_date,
    )
    .await
}

pub async fn submit(
    pool: &PgPool,
    company_id: &str,
    id: Uuid,
    actor_id: &str,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    core::plain_transition(pool, company_id, id, DocumentStatus::Submitted, actor_id).await
}

pub async fn approve(
    pool: &PgPool,
    company_id: &str,
    id: Uuid,
    actor_id: &str,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    core::plain_transition(pool, company_id, id, DocumentStatus::Approved, actor_id).await
}

/// `Closed` only once every goods receipt referencing this PO is
/// `Posted` (Data Model, PO row) — a PO with no GRNs at all closes
/// freely, there's nothing pending.
pub async fn close(
    pool: &PgPool,
    company_id: &str,
    id: Uuid,
    actor_id: &str,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    let mut open = core::begin_transition(pool, company_id, id, DocumentStatus::Closed).await?;

    let grns =
        document_repo::find_by_reference_tx(&mut open.tx, company_id, DocumentKind::GoodsReceipt, open.doc.id)
            .await?;
    if grns.iter().any(|g| g.status != DocumentStatus::Posted) {
        return Err(DocumentError::GrnsNotAllPosted(open.doc.id));
    }

    core::finish_transition(open, DocumentStatus::Closed, actor_id, None).await
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
    core::list(pool, company_id, DocumentKind::PurchaseOrder).await
}
