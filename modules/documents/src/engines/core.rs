//! Shared create/transition/edit/cancel/get/list plumbing used by
//! every per-kind engine (spec §4.1's operation family). Per-kind
//! modules supply the kind, the numbering prefix, and whatever
//! Integration Hook event the transition implies; this module supplies
//! everything that doesn't vary: the row lock, the transition-table
//! check, re-pricing lines from the persisted rows, and the commit.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

use crate::document_core::{Document, DocumentKind, DocumentLine, DocumentStatus, NewLine};
use crate::hooks::{self, DocumentEvent, HookError};
use crate::line_arithmetic::{compute_line, sum_totals, to_minor_units};
use crate::numbering::{self, NumberingError};
use crate::repos::{document_line_repo, document_repo};
use crate::state_machine::{self, InvalidTransition};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document not found: {0}")]
    NotFound(Uuid),

    #[error(transparent)]
    InvalidStatus(#[from] InvalidTransition),

    #[error("document has no lines")]
    NoLines,

    #[error("line {0} for product {1} has zero quantity")]
    ZeroQuantity(i32, String),

    #[error("document {0} is already invoiced")]
    AlreadyInvoiced(Uuid),

    #[error("purchase order {0} cannot close: one or more linked goods receipts are not yet posted")]
    GrnsNotAllPosted(Uuid),

    #[error("allocations of {allocated} exceed the payment amount of {amount}")]
    InsufficientAmount { amount: Decimal, allocated: Decimal },

    #[error("allocation of {allocated} to invoice {invoice_id} exceeds its remaining balance of {balance}")]
    AllocationExceedsInvoiceBalance {
        invoice_id: Uuid,
        allocated: Decimal,
        balance: Decimal,
    },

    #[error("delivery of {requested} for product {product_id} exceeds the {remaining} remaining on order {sales_order_id}")]
    QuantityExceedsRemaining {
        sales_order_id: Uuid,
        product_id: String,
        requested: Decimal,
        remaining: Decimal,
    },

    #[error(transparent)]
    Repo(#[from] document_repo::DocumentRepoError),

    #[error(transparent)]
    LineRepo(#[from] document_line_repo::DocumentLineRepoError),

    #[error(transparent)]
    Numbering(#[from] NumberingError),

    #[error(transparent)]
    Hook(#[from] HookError),

    #[error(transparent)]
    Movement(#[from] inventory::MovementError),

    #[error(transparent)]
    Audit(#[from] audit::AuditError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub struct Priced {
    pub lines: Vec<DocumentLine>,
    pub subtotal_minor: i64,
    pub tax_minor: i64,
    pub total_minor: i64,
}

/// Re-derives totals from persisted lines. Called on every transition
/// so a caller's claimed total is never trusted (spec §4.1).
fn price(lines: Vec<DocumentLine>) -> Priced {
    let amounts: Vec<_> = lines
        .iter()
        .map(|l| compute_line(l.qty, l.unit_price, l.discount_pct, l.tax_pct))
        .collect();
    let totals = sum_totals(&amounts);

    Priced {
        lines,
        subtotal_minor: to_minor_units(totals.subtotal),
        tax_minor: to_minor_units(totals.tax),
        total_minor: to_minor_units(totals.total),
    }
}

#[allow(clippy::too_many_arguments)]
pub async fn create(
    pool: &PgPool,
    company_id: &str,
    kind: DocumentKind,
    counterparty_id: Option<&str>,
    warehouse_id: Option<&str>,
    reference_document_id: Option<Uuid>,
    currency: &str,
    lines: Vec<NewLine>,
    actor_id: &str,
    effective_date: NaiveDate,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    if lines.is_empty() {
        return Err(DocumentError::NoLines);
    }

    for (idx, line) in lines.iter().enumerate() {
        if line.qty.is_zero() {
            return Err(DocumentError::ZeroQuantity((idx + 1) as i32, line.product_id.clone()));
        }
    }

    let mut tx = pool.begin().await?;
    let number = numbering::next_number_tx(&mut tx, company_id, kind.number_prefix(), effective_date).await?;

    let priced = price(
        lines
            .iter()
            .enumerate()
            .map(|(idx, l)| DocumentLine {
                id: Uuid::nil(),
                document_id: Uuid::nil(),
                line_no: (idx + 1) as i32,
                product_id: l.product_id.clone(),
                qty: l.qty,
                unit_price: l.unit_price,
                discount_pct: l.discount_pct,
                tax_pct: l.tax_pct,
                qty_delivered: Decimal::ZERO,
            })
            .collect(),
    );

    let doc = document_repo::insert_tx(
        &mut tx,
        &document_repo::NewDocument {
            id: Uuid::new_v4(),
            company_id,
            kind,
            number: &number,
            status: DocumentStatus::Draft,
            counterparty_id,
            warehouse_id,
            reference_document_id,
            currency,
            subtotal_minor: priced.subtotal_minor,
            tax_minor: priced.tax_minor,
            total_minor: priced.total_minor,
            created_by: actor_id,
        },
    )
    .await?;

    let inserted_lines = document_line_repo::insert_all_tx(&mut tx, doc.id, &lines).await?;

    audit::record(
        &mut tx,
        company_id,
        actor_id,
        "document.create",
        kind.as_str(),
        &doc.id.to_string(),
        serde_json::json!({ "number": doc.number, "total_minor": priced.total_minor }),
    )
    .await?;

    tx.commit().await?;

    Ok((doc, inserted_lines))
}

/// A transition in progress: the document is locked, its target status
/// has already passed the transition-table check, and its lines are
/// re-priced from what's actually persisted. Held open so a per-kind
/// engine can do whatever extra in-transaction work its transition
/// implies (running a hook, nudging a referenced document's line
/// quantities) before calling [`finish`].
pub struct OpenTransition<'a> {
    pub tx: Transaction<'a, Postgres>,
    pub doc: Document,
    pub lines: Vec<DocumentLine>,
}

/// Locks the document, checks the transition is legal for its current
/// status, and re-prices its persisted lines (a caller's claimed total
/// is never trusted, spec §4.1). Leaves the transaction open.
pub async fn begin_transition(
    pool: &PgPool,
    company_id: &str,
    id: Uuid,
    to: DocumentStatus,
) -> Result<OpenTransition<'_>, DocumentError> {
    let mut tx = pool.begin().await?;

    let doc = document_repo::lock_tx(&mut tx, company_id, id)
        .await?
        .ok_or(DocumentError::NotFound(id))?;

    state_machine::validate(doc.kind, doc.status, to)?;

    let lines = document_line_repo::find_by_document_tx(&mut tx, id).await?;
    let priced = price(lines);

    Ok(OpenTransition {
        tx,
        doc,
        lines: priced.lines,
    })
}

/// Writes the new status and totals and commits. Any hook or
/// referenced-document side effect must already have run against
/// `open.tx` before calling this.
pub async fn finish_transition(
    mut open: OpenTransition<'_>,
    to: DocumentStatus,
    actor_id: &str,
    cancellation_reason: Option<&str>,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    let priced = price(open.lines);
    let from = open.doc.status;

    let updated = document_repo::transition_tx(
        &mut open.tx,
        open.doc.id,
        to,
        actor_id,
        priced.subtotal_minor,
        priced.tax_minor,
        priced.total_minor,
        cancellation_reason,
    )
    .await?;

    let mut delta = serde_json::json!({
        "from": from,
        "to": to,
        "total_minor": priced.total_minor,
    });
    if let (Some(reason), Some(obj)) = (cancellation_reason, delta.as_object_mut()) {
        obj.insert("reason".to_string(), serde_json::Value::String(reason.to_string()));
    }

    audit::record(
        &mut open.tx,
        &open.doc.company_id,
        actor_id,
        &format!("document.{}", to.verb()),
        open.doc.kind.as_str(),
        &open.doc.id.to_string(),
        delta,
    )
    .await?;

    open.tx.commit().await?;

    Ok((updated, priced.lines))
}

/// Runs `event` as a hook inside `open`'s transaction. A hook failure
/// propagates straight out, aborting the whole transition when its
/// caller drops `open.tx` without committing.
pub async fn run_hook(
    open: &mut OpenTransition<'_>,
    company_id: &str,
    event: &DocumentEvent,
) -> Result<(), DocumentError> {
    hooks::execute(&mut open.tx, company_id, event).await?;
    Ok(())
}

/// A transition with no downstream hook effect — most of the
/// procurement and sales lifecycle (submit, approve, reject, close)
/// falls here; only the handful of transitions named in the closed
/// event set (§9) need [`run_hook`].
pub async fn plain_transition(
    pool: &PgPool,
    company_id: &str,
    id: Uuid,
    to: DocumentStatus,
    actor_id: &str,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    let open = begin_transition(pool, company_id, id, to).await?;
    finish_transition(open, to, actor_id, None).await
}

pub async fn cancel(
    pool: &PgPool,
    company_id: &str,
    id: Uuid,
    actor_id: &str,
    reason: &str,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    let open = begin_transition(pool, company_id, id, DocumentStatus::Cancelled).await?;
    finish_transition(open, DocumentStatus::Cancelled, actor_id, Some(reason)).await
}

/// Replaces a document's lines while it is still `Draft` and
/// recomputes its totals. Not a transition: status is untouched.
pub async fn edit(
    pool: &PgPool,
    company_id: &str,
    id: Uuid,
    actor_id: &str,
    lines: Vec<NewLine>,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    if lines.is_empty() {
        return Err(DocumentError::NoLines);
    }

    for (idx, line) in lines.iter().enumerate() {
        if line.qty.is_zero() {
            return Err(DocumentError::ZeroQuantity((idx + 1) as i32, line.product_id.clone()));
        }
    }

    let mut tx = pool.begin().await?;

    let doc = document_repo::lock_tx(&mut tx, company_id, id)
        .await?
        .ok_or(DocumentError::NotFound(id))?;

    if doc.status != DocumentStatus::Draft {
        return Err(DocumentError::InvalidStatus(InvalidTransition {
            kind: doc.kind,
            from: doc.status,
            to: doc.status,
        }));
    }

    document_line_repo::delete_by_document_tx(&mut tx, id).await?;
    let inserted = document_line_repo::insert_all_tx(&mut tx, id, &lines).await?;
    let priced = price(inserted);

    let updated = document_repo::update_totals_tx(
        &mut tx,
        id,
        priced.subtotal_minor,
        priced.tax_minor,
        priced.total_minor,
    )
    .await?;

    audit::record(
        &mut tx,
        company_id,
        actor_id,
        "document.edit",
        doc.kind.as_str(),
        &doc.id.to_string(),
        serde_json::json!({ "total_minor": priced.total_minor }),
    )
    .await?;

    tx.commit().await?;

    Ok((updated, priced.lines))
}

/// Rejects with `AlreadyInvoiced` when a non-cancelled document of
/// `kind` already references `reference_document_id`.
pub async fn reject_if_already_invoiced(
    pool: &PgPool,
    company_id: &str,
    kind: DocumentKind,
    reference_document_id: Uuid,
) -> Result<(), DocumentError> {
    if document_repo::exists_non_cancelled_by_reference(pool, company_id, kind, reference_document_id).await? {
        return Err(DocumentError::AlreadyInvoiced(reference_document_id));
    }
    Ok(())
}

pub async fn get(
    pool: &PgPool,
    company_id: &str,
    id: Uuid,
) -> Result<Option<(Document, Vec<DocumentLine>)>, DocumentError> {
    let Some(doc) = document_repo::find(pool, company_id, id).await? else {
        return Ok(None);
    };
    let lines = document_line_repo::find_by_document(pool, id).await?;
    Ok(Some((doc, lines)))
}

pub async fn list(
    pool: &PgPool,
    company_id: &str,
    kind: DocumentKind,
) -> Result<Vec<Document>, DocumentError> {
    Ok(document_repo::list(pool, company_id, kind).await?)
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(qty: i64, unit_price_minor: i64, tax_pct: i64) -> DocumentLine {
        DocumentLine {
            id: Uuid::new_v4(),
            document_id: Uuid::new_v4(),
            line_no: 1,
            product_id: "WIDGET".to_string(),
            qty: Decimal::new(qty, 0),
            unit_price: Decimal::new(unit_price_minor, 2),
            discount_pct: Decimal::ZERO,
            tax_pct: Decimal::new(tax_pct, 0),
            qty_delivered: Decimal::ZERO,
        }
    }

    #[test]
    fn price_sums_minor_units_across_lines() {
        let priced = price(vec![line(2, 1000, 10), line(1, 500, 0)]);

        // 2*10.00*1.10 + 1*5.00 = 22.00 + 5.00
        assert_eq!(priced.subtotal_minor, 2500);
        assert_eq!(priced.tax_minor, 200);
        assert_eq!(priced.total_minor, 2700);
    }

    #[test]
    fn price_of_no_lines_is_zero() {
        let priced = price(vec![]);

        assert_eq!(priced.subtotal_minor, 0);
        assert_eq!(priced.tax_minor, 0);
        assert_eq!(priced.total_minor, 0);
    }
}
