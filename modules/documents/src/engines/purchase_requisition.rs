//! Purchase requisitions: no downstream GL/inventory effect anywhere in
//! their lifecycle, they only gate whether a purchase order may be
//! raised against them.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::document_core::{Document, DocumentKind, DocumentLine, DocumentStatus, NewLine};
use crate::engines::core::{self, DocumentError};

pub async fn create(
    pool: &PgPool,
    company_id: &str,
    lines: Vec<NewLine>,
    actor_id: &str,
    effective_date: NaiveDate,
    currency: &str,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    core::create(
        pool,
        company_id,
        DocumentKind::PurchaseRequisition,
        None,
        None,
        None,
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

pub async fn reject(
    pool: &PgPool,
    company_id: &str,
    id: Uuid,
    actor_id: &str,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    core::plain_transition(pool, company_id, id, DocumentStatus::Rejected, actor_id).await
}

pub async fn close(
    pool: &PgPool,
    company_id: &str,
    id: Uuid,
    actor_id: &str,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    core::plain_transition(pool, company_id, id, DocumentStatus::Closed, actor_id).await
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
    core::list(pool, company_id, DocumentKind::PurchaseRequisition).await
}
