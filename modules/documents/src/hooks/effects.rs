use gl::contracts::{GlPostingRequest, JournalLine};
use gl::resolve_account_mapping;
use inventory::contracts::{MovementRequest, StockTxType};
use sqlx::{Postgres, Transaction};

use super::events::DocumentEvent;
use super::source_id_for;
use crate::line_arithmetic::to_minor_units;

pub enum Effect {
    PostJournal(GlPostingRequest),
    PostMovement(MovementRequest),
}

fn journal(
    posting_date: &str,
    currency: &str,
    source_module: &str,
    source_id: &str,
    description: &str,
    lines: Vec<JournalLine>,
) -> GlPostingRequest {
    GlPostingRequest {
        posting_date: posting_date.to_string(),
        currency: currency.to_string(),
        source_module: source_module.to_string(),
        source_id: source_id.to_string(),
        description: description.to_string(),
        lines,
    }
}

fn line(account_code: String, debit_minor: i64, credit_minor: i64) -> JournalLine {
    JournalLine {
        account_code,
        debit_minor,
        credit_minor,
        memo: None,
        dimensions: None,
    }
}

/// Resolves `event` into the effects it implies, reading whatever
/// account mapping rows the binding needs. Account mapping reads are
/// the only I/O here — everything else is arithmetic over the event's
/// own fields.
pub async fn resolve(
    tx: &mut Transaction<'_, Postgres>,
    company_id: &str,
    event: &DocumentEvent,
) -> Result<Vec<Effect>, gl::MappingError> {
    let source_id = source_id_for(event.module_name(), &event.document_id().to_string()).to_string();

    let effects = match event {
        DocumentEvent::GrnPosted {
            document_id: _,
            warehouse_id,
            posting_date,
            currency,
            lines,
        } => {
            let inventory_account =
                resolve_account_mapping(tx, company_id, "GRN", "inventory").await?;
            let gr_ir_account = resolve_account_mapping(tx, company_id, "GRN", "gr_ir").await?;

            let total_minor: i64 = lines
                .iter()
                .map(|l| to_minor_units(l.qty * l.unit_cost))
                .sum();

            let mut movements = Vec::with_capacity(lines.len());
            for l in lines {
                movements.push(Effect::PostMovement(MovementRequest {
                    company_id: company_id.to_string(),
                    warehouse_id: warehouse_id.clone(),
                    product_id: l.product_id.clone(),
                    qty: l.qty,
                    unit_cost: l.unit_cost,
                    tx_type: StockTxType::Inbound,
                    reference_module: "GRN".to_string(),
                    reference_id: source_id.clone(),
                    idempotency_key: format!("{source_id}:{}", l.product_id),
                }));
            }

            movements.push(Effect::PostJournal(journal(
                posting_date,
                currency,
                "GRN",
                &source_id,
                "Goods receipt posting",
                vec![
                    line(inventory_account, total_minor, 0),
                    line(gr_ir_account, 0, total_minor),
                ],
            )));

            movements
        }

        DocumentEvent::ApInvoicePosted {
            has_grn,
            posting_date,
            currency,
            total_minor,
            ..
        } => {
            let debit_account = if *has_grn {
                resolve_account_mapping(tx, company_id, "APInvoice", "inventory").await?
            } else {
                resolve_account_mapping(tx, company_id, "APInvoice", "expense").await?
            };
            let ap_account = resolve_account_mapping(tx, company_id, "APInvoice", "ap").await?;

            vec![Effect::PostJournal(journal(
                posting_date,
                currency,
                "APInvoice",
                &source_id,
                "AP invoice posting",
                vec![
                    line(debit_account, *total_minor, 0),
                    line(ap_account, 0, *total_minor),
                ],
            ))]
        }

        DocumentEvent::ApPaymentPosted {
            posting_date,
            currency,
            amount_minor,
            ..
        } => {
            let ap_account = resolve_account_mapping(tx, company_id, "APPayment", "ap").await?;
            let cash_account = resolve_account_mapping(tx, company_id, "APPayment", "cash").await?;

            vec![Effect::PostJournal(journal(
                posting_date,
                currency,
                "APPayment",
                &source_id,
                "AP payment posting",
                vec![
                    line(ap_account, *amount_minor, 0),
                    line(cash_account, 0, *amount_minor),
                ],
            ))]
        }

        DocumentEvent::DoConfirmed {
            warehouse_id,
            lines,
            ..
        } => lines
            .iter()
            .map(|l| {
                Effect::PostMovement(MovementRequest {
                    company_id: company_id.to_string(),
                    warehouse_id: warehouse_id.clone(),
                    product_id: l.product_id.clone(),
                    qty: -l.qty.abs(),
                    unit_cost: rust_decimal::Decimal::ZERO,
                    tx_type: StockTxType::Outbound,
                    reference_module: "DO".to_string(),
                    reference_id: source_id.clone(),
                    idempotency_key: format!("{source_id}:{}", l.product_id),
                })
            })
            .collect(),

        DocumentEvent::ArInvoicePosted {
            posting_date,
            currency,
            lines,
            ..
        } => {
            let ar_account = resolve_account_mapping(tx, company_id, "ARInvoice", "ar").await?;
            let revenue_account =
                resolve_account_mapping(tx, company_id, "ARInvoice", "revenue").await?;
            let tax_account = resolve_account_mapping(tx, company_id, "ARInvoice", "tax").await?;

            let mut total_net_minor = 0i64;
            let mut total_tax_minor = 0i64;
            for l in lines {
                total_net_minor += to_minor_units(l.net);
                total_tax_minor += to_minor_units(l.tax_amt);
            }
            let total_minor = total_net_minor + total_tax_minor;

            let mut gl_lines = vec![line(ar_account, total_minor, 0), line(revenue_account, 0, total_net_minor)];
            if total_tax_minor != 0 {
                gl_lines.push(line(tax_account, 0, total_tax_minor));
            }

            vec![Effect::PostJournal(journal(
                posting_date,
                currency,
                "ARInvoice",
                &source_id,
                "AR invoice posting",
                gl_lines,
            ))]
        }

        DocumentEvent::ArPaymentPosted {
            posting_date,
            currency,
            allocations,
            ..
        } => {
            let ar_account = resolve_account_mapping(tx, company_id, "ARPayment", "ar").await?;
            let cash_account = resolve_account_mapping(tx, company_id, "ARPayment", "cash").await?;

            let total_minor: i64 = allocations.iter().map(|a| a.amount_minor).sum();

            vec![Effect::PostJournal(journal(
                posting_date,
                currency,
                "ARPayment",
                &source_id,
                "AR payment posting",
                vec![
                    line(cash_account, total_minor, 0),
                    line(ar_account, 0, total_minor),
                ],
            ))]
        }

        DocumentEvent::InventoryAdjustmentPosted {
            warehouse_id,
            product_id,
            qty,
            unit_cost,
            posting_date,
            currency,
            ..
        } => {
            let inventory_account =
                resolve_account_mapping(tx, company_id, "InventoryAdjustment", "inventory").await?;
            let amount_minor = to_minor_units(qty.abs() * unit_cost);

            let gl_lines = if *qty >= rust_decimal::Decimal::ZERO {
                let gain_account =
                    resolve_account_mapping(tx, company_id, "InventoryAdjustment", "gain").await?;
                vec![
                    line(inventory_account.clone(), amount_minor, 0),
                    line(gain_account, 0, amount_minor),
                ]
            } else {
                let loss_account =
                    resolve_account_mapping(tx, company_id, "InventoryAdjustment", "loss").await?;
                vec![
                    line(loss_account, amount_minor, 0),
                    line(inventory_account.clone(), 0, amount_minor),
                ]
            };

            vec![
                Effect::PostMovement(MovementRequest {
                    company_id: company_id.to_string(),
                    warehouse_id: warehouse_id.clone(),
                    product_id: product_id.clone(),
                    qty: *qty,
                    unit_cost: *unit_cost,
                    tx_type: StockTxType::Adjust,
                    reference_module: "InventoryAdjustment".to_string(),
                    reference_id: source_id.clone(),
                    idempotency_key: source_id.clone(),
                }),
                Effect::PostJournal(journal(
                    posting_date,
                    currency,
                    "InventoryAdjustment",
                    &source_id,
                    "Inventory adjustment posting",
                    gl_lines,
                )),
            ]
        }
    };

    Ok(effects)
}
