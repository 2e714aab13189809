//! AP invoices: `post` debits Inventory when a goods receipt backs the
//! invoice, Expense otherwise, and credits AP (spec §4.4).

use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::document_core::{Document, DocumentKind, DocumentLine, DocumentStatus, NewLine};
use crate::engines::core::{self, DocumentError};
use crate::hooks::DocumentEvent;
use crate::line_arithmetic::to_minor_units;
use crate::repos::document_repo;
use crate::state_machine;

pub async fn create(
    pool: &PgPool,
    company_id: &str,
    supplier_id: &str,
    reference_grn_id: Option<Uuid>,
    lines: Vec<NewLine>,
    actor_id: &str,
    effective_date: NaiveDate,
    currency: &str,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    if let Some(grn_id) = reference_grn_id {
        core::reject_if_already_invoiced(pool, company_id, DocumentKind::ApInvoice, grn_id).await?;
    }

    core::create(
        pool,
        company_id,
        DocumentKind::ApInvoice,
        Some(supplier_id),
        None,
        reference_grn_id,
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

    let total_minor: i64 = open
        .lines
        .iter()
        .map(|l| {
            let amounts = crate::line_arithmetic::compute_line(l.qty, l.unit_price, l.discount_pct, l.tax_pct);
            to_minor_units(amounts.line_total)
        })
        .sum();

    let event = DocumentEvent::ApInvoicePosted {
        document_id: open.doc.id,
        has_grn: open.doc.reference_document_id.is_some(),
        posting_date: posting_date.to_string(),
        currency: open.doc.currency.clone(),
        total_minor,
    };

    core::run_hook(&mut open, company_id, &event).await?;
    core::finish_transition(open, DocumentStatus::Posted, actor_id, None).await
}

/// Transitions an invoice `Posted -> Paid` inside `ap_payment::post`'s
/// open transaction, once its linked payments sum to its total (Data
/// Model: "Paid when Σ payments >= total"). No-op if the invoice isn't
/// currently `Posted`.
pub(crate) async fn mark_paid_if_settled_tx(
    tx: &mut Transaction<'_, Postgres>,
    invoice: &Document,
) -> Result<(), DocumentError> {
    if invoice.status != DocumentStatus::Posted {
        return Ok(());
    }
    state_machine::validate(DocumentKind::ApInvoice, invoice.status, DocumentStatus::Paid)?;
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
    core::list(pool, company_id, DocumentKind::ApInvoice).await
}
