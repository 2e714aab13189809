//! AP payments: `post` debits AP and credits Cash for the payment
//! amount (spec §4.4), then checks whether the linked invoice's
//! payments now cover its total and, if so, flips it to `Paid` in the
//! same transaction (Data Model: "Paid when Σ payments >= total").
//! Each payment references exactly one invoice via
//! `reference_document_id` — unlike AR payments, which can split across
//! several invoices' worth of allocations in one go.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::document_core::{Document, DocumentKind, DocumentLine, DocumentStatus, NewLine};
use crate::engines::ap_invoice;
use crate::engines::core::{self, DocumentError};
use crate::hooks::DocumentEvent;
use crate::repos::document_repo;

#[allow(clippy::too_many_arguments)]
pub async fn create(
    pool: &PgPool,
    company_id: &str,
    supplier_id: &str,
    invoice_id: Uuid,
    lines: Vec<NewLine>,
    actor_id: &str,
    effective_date: NaiveDate,
    currency: &str,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    core::create(
        pool,
        company_id,
        DocumentKind::ApPayment,
        Some(supplier_id),
        None,
        Some(invoice_id),
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

    let invoice_id = open
        .doc
        .reference_document_id
        .expect("ap payments always reference the invoice they pay down");

    let invoice = document_repo::lock_tx(&mut open.tx, company_id, invoice_id)
        .await?
        .ok_or(DocumentError::NotFound(invoice_id))?;

    let paid_so_far = document_repo::sum_total_minor_by_reference_tx(
        &mut open.tx,
        company_id,
        DocumentKind::ApPayment,
        DocumentStatus::Posted,
        invoice_id,
    )
    .await?;

    if paid_so_far + open.doc.total_minor >= invoice.total_minor {
        ap_invoice::mark_paid_if_settled_tx(&mut open.tx, &invoice).await?;
    }

    let event = DocumentEvent::ApPaymentPosted {
        document_id: open.doc.id,
        posting_date: posting_date.to_string(),
        currency: open.doc.currency.clone(),
        amount_minor: open.doc.total_minor,
    };

    core::run_hook(&mut open, company_id, &event).await?;
    core::finish_transition(open, DocumentStatus::Posted, actor_id, None).await
}

/// Part of the uniform operation family (every kind exposes `cancel`),
/// but the transition table has no entry admitting `Cancelled` for AP
/// payments — this always fails with `InvalidStatus`. A posted payment
/// is reversed the same way any posted document is: a new document.
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
    core::list(pool, company_id, DocumentKind::ApPayment).await
}
