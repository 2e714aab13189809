//! AR invoices: `post` debits AR and credits Revenue and Tax per line
//! (spec §4.4). Usually created against a delivered delivery order, but
//! the reference is optional (direct/service invoices have none).

use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::document_core::{Document, DocumentKind, DocumentLine, DocumentStatus, NewLine};
use crate::engines::core::{self, DocumentError};
use crate::hooks::{ArInvoiceLine, DocumentEvent};
use crate::line_arithmetic::compute_line;
use crate::repos::document_repo;
use crate::state_machine;

pub async fn create(
    pool: &PgPool,
    company_id: &str,
    customer_id: &str,
    reference_do_id: Option<Uuid>,
    lines: Vec<NewLine>,
    actor_id: &str,
    effective_date: NaiveDate,
    currency: &str,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    core::create(
        pool,
        company_id,
        DocumentKind::ArInvoice,
        Some(customer_id),
        None,
        reference_do_id,
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

    let event = DocumentEvent::ArInvoicePosted {
        document_id: open.doc.id,
        posting_date: posting_date.to_string(),
        currency: open.doc.currency.clone(),
        lines: open
            .lines
            .iter()
            .map(|l| {
                let amounts = compute_line(l.qty, l.unit_price, l.discount_pct, l.tax_pct);
                ArInvoiceLine {
                    net: amounts.net,
                    tax_amt: amounts.tax_amt,
                }
            })
            .collect(),
    };

    core::run_hook(&mut open, company_id, &event).await?;
    core::finish_transition(open, DocumentStatus::Posted, actor_id, None).await
}

/// Transitions an invoice `Posted -> Paid` inside `ar_payment::create`'s
/// open transaction, once an allocation drives its balance to zero
/// (Data Model: "Paid when Σ payments >= total"). No-op if the invoice
/// isn't currently `Posted` — already `Paid`, or `Void`.
pub(crate) async fn mark_paid_if_settled_tx(
    tx: &mut Transaction<'_, Postgres>,
    invoice: &Document,
) -> Result<(), DocumentError> {
    if invoice.status != DocumentStatus::Posted {
        return Ok(());
    }
    state_machine::validate(DocumentKind::ArInvoice, invoice.status, DocumentStatus::Paid)?;
    document_repo::transition_tx(
        tx,
        invoice.id,
        DocumentStatus::Paid,
        "system:payment",
        invoice.subtotal_minor,
        invoice.tax_minor,
        invoice.total_minor,
        None,
    )
    .await?;
    Ok(())
}

pub async fn void(
    pool: &PgPool,
    company_id: &str,
    id: Uuid,
    actor_id: &str,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    core::plain_transition(pool, company_id, id, DocumentStatus::Void, actor_id).await
}

/// Part of the uniform operation family, but the Data Model's AR Invoice
/// row has no `Cancelled` state — `void` is the only way out of
/// `Posted`, and a `Draft` invoice has no exit at all but `post`. This
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
    core::list(pool, company_id, DocumentKind::ArInvoice).await
}
