//! AR payments: always created directly in `Posted` (its transition
//! table is empty, see `state_machine`) — receiving a payment and
//! posting DR Cash / CR AR is one atomic act, there is no draft stage.
//!
//! Allocations are stored as lines, overloading the shared line shape:
//! `product_id` holds the invoice id being paid down, `qty` is always
//! 1, `unit_price` is the allocated amount. Any part of `amount_minor`
//! left unallocated across those lines is customer credit (spec §4.1
//! "Payment allocation") — it is not itself a line.
//!
//! Each allocation is checked against its target invoice's own
//! remaining balance, not just the payment total, and an invoice whose
//! allocations now cover its total is flipped to `Paid` in the same
//! transaction as the payment.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::document_core::{Document, DocumentKind, DocumentLine, DocumentStatus, NewLine};
use crate::engines::ar_invoice;
use crate::engines::core::DocumentError;
use crate::hooks::{self, ArPaymentAllocation, DocumentEvent};
use crate::line_arithmetic::{from_minor_units, to_minor_units};
use crate::numbering;
use crate::repos::{document_line_repo, document_repo};

pub struct Allocation {
    pub invoice_id: Uuid,
    pub amount: Decimal,
}

/// Rejects allocations that overspend the payment amount. Split out
/// from `create` so the validation can be checked without a database.
fn check_allocations(amount: Decimal, allocations: &[Allocation]) -> Result<(), DocumentError> {
    let allocated: Decimal = allocations.iter().map(|a| a.amount).sum();
    if allocated > amount {
        return Err(DocumentError::InsufficientAmount { amount, allocated });
    }
    Ok(())
}

/// Locks `invoice_id`, checks `allocation_amount` doesn't exceed its
/// current remaining balance (Data Model, AR Payment row), and returns
/// the locked invoice for the later settle-check once this payment's
/// lines are in.
async fn lock_and_check_invoice_balance_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    company_id: &str,
    invoice_id: Uuid,
    allocation_amount: Decimal,
) -> Result<Document, DocumentError> {
    let invoice = document_repo::lock_tx(tx, company_id, invoice_id)
        .await?
        .ok_or(DocumentError::NotFound(invoice_id))?;

    let already_allocated = document_line_repo::sum_allocated_to_invoice_tx(tx, company_id, invoice_id).await?;
    let balance = from_minor_units(invoice.total_minor) - already_allocated;

    if allocation_amount > balance {
        return Err(DocumentError::AllocationExceedsInvoiceBalance {
            invoice_id,
            allocated: allocation_amount,
            balance,
        });
    }

    Ok(invoice)
}

#[allow(clippy::too_many_arguments)]
pub async fn create(
    pool: &PgPool,
    company_id: &str,
    customer_id: &str,
    amount: Decimal,
    allocations: Vec<Allocation>,
    actor_id: &str,
    effective_date: NaiveDate,
    currency: &str,
) -> Result<(Document, Vec<DocumentLine>), DocumentError> {
    check_allocations(amount, &allocations)?;

    let amount_minor = to_minor_units(amount);

    let mut tx = pool.begin().await?;

    let mut invoices = Vec::with_capacity(allocations.len());
    for allocation in &allocations {
        let invoice =
            lock_and_check_invoice_balance_tx(&mut tx, company_id, allocation.invoice_id, allocation.amount).await?;
        invoices.push(invoice);
    }

    let number =
        numbering::next_number_tx(&mut tx, company_id, DocumentKind::ArPayment.number_prefix(), effective_date)
            .await?;

    let doc = document_repo::insert_tx(
        &mut tx,
        &document_repo::NewDocument {
            id: Uuid::new_v4(),
            company_id,
            kind: DocumentKind::ArPayment,
            number: &number,
            status: DocumentStatus::Posted,
            counterparty_id: Some(customer_id),
            warehouse_id: None,
            reference_document_id: None,
            currency,
            subtotal_minor: amount_minor,
            tax_minor: 0,
            total_minor: amount_minor,
            created_by: actor_id,
        },
    )
    .await?;

    let new_lines: Vec<NewLine> = allocations
        .iter()
        .map(|a| NewLine {
            product_id: a.invoice_id.to_string(),
            qty: Decimal::ONE,
            unit_price: a.amount,
            discount_pct: Decimal::ZERO,
            tax_pct: Decimal::ZERO,
        })
        .collect();
    let inserted_lines = document_line_repo::insert_all_tx(&mut tx, doc.id, &new_lines).await?;

    for invoice in &invoices {
        let allocated_now = document_line_repo::sum_allocated_to_invoice_tx(&mut tx, company_id, invoice.id).await?;
        if allocated_now >= from_minor_units(invoice.total_minor) {
            ar_invoice::mark_paid_if_settled_tx(&mut tx, invoice).await?;
        }
    }

    let event = DocumentEvent::ArPaymentPosted {
        document_id: doc.id,
        posting_date: effective_date.to_string(),
        currency: currency.to_string(),
        allocations: allocations
            .iter()
            .map(|a| ArPaymentAllocation {
                invoice_id: a.invoice_id,
                amount_minor: to_minor_units(a.amount),
            })
            .collect(),
    };
    hooks::execute(&mut tx, company_id, &event).await?;

    tx.commit().await?;

    Ok((doc, inserted_lines))
}

pub async fn get(
    pool: &PgPool,
    company_id: &str,
    id: Uuid,
) -> Result<Option<(Document, Vec<DocumentLine>)>, DocumentError> {
    crate::engines::core::get(pool, company_id, id).await
}

pub async fn list(pool: &PgPool, company_id: &str) -> Result<Vec<Document>, DocumentError> {
    crate::engines::core::list(pool, company_id, DocumentKind::ArPayment).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocations_exactly_covering_the_payment_are_accepted() {
        let amount = Decimal::new(10000, 2);
        let allocations = vec![
            Allocation { invoice_id: Uuid::new_v4(), amount: Decimal::new(6000, 2) },
            Allocation { invoice_id: Uuid::new_v4(), amount: Decimal::new(4000, 2) },
        ];

        assert!(check_allocations(amount, &allocations).is_ok());
    }

    #[test]
    fn partial_allocation_leaves_the_remainder_as_credit_and_is_accepted() {
        let amount = Decimal::new(10000, 2);
        let allocations = vec![Allocation { invoice_id: Uuid::new_v4(), amount: Decimal::new(6000, 2) }];

        assert!(check_allocations(amount, &allocations).is_ok());
    }

    #[test]
    fn allocations_exceeding_the_payment_are_rejected() {
        let amount = Decimal::new(10000, 2);
        let allocations = vec![
            Allocation { invoice_id: Uuid::new_v4(), amount: Decimal::new(6000, 2) },
            Allocation { invoice_id: Uuid::new_v4(), amount: Decimal::new(5000, 2) },
        ];

        let err = check_allocations(amount, &allocations).unwrap_err();
        match err {
            DocumentError::InsufficientAmount { amount: a, allocated } => {
                assert_eq!(a, amount);
                assert_eq!(allocated, Decimal::new(11000, 2));
            }
            other => panic!("expected InsufficientAmount, got {other:?}"),
        }
    }
}
