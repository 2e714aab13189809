//! Shared row shapes used by every document kind. One `documents` table
//! and one `document_lines` table hold all ten kinds — the header and
//! line shape (id, number, status, audit fields, ordered lines with
//! qty/price/discount/tax) is identical across kinds per the Data
//! Model; what differs is the legal transition table (`state_machine`)
//! and the hooks a transition fires (`hooks`).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "document_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    PurchaseRequisition,
    PurchaseOrder,
    GoodsReceipt,
    ApInvoice,
    ApPayment,
    Quotation,
    SalesOrder,
    DeliveryOrder,
    ArInvoice,
    ArPayment,
}

impl DocumentKind {
    pub fn number_prefix(self) -> &'static str {
        match self {
            DocumentKind::PurchaseRequisition => "PR",
            DocumentKind::PurchaseOrder => "PO",
            DocumentKind::GoodsReceipt => "GRN",
            DocumentKind::ApInvoice => "APINV",
            DocumentKind::ApPayment => "APPAY",
            DocumentKind::Quotation => "QUOT",
            DocumentKind::SalesOrder => "SO",
            DocumentKind::DeliveryOrder => "DO",
            DocumentKind::ArInvoice => "INV",
            DocumentKind::ArPayment => "PAY",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::PurchaseRequisition => "purchase_requisition",
            DocumentKind::PurchaseOrder => "purchase_order",
            DocumentKind::GoodsReceipt => "goods_receipt",
            DocumentKind::ApInvoice => "ap_invoice",
            DocumentKind::ApPayment => "ap_payment",
            DocumentKind::Quotation => "quotation",
            DocumentKind::SalesOrder => "sales_order",
            DocumentKind::DeliveryOrder => "delivery_order",
            DocumentKind::ArInvoice => "ar_invoice",
            DocumentKind::ArPayment => "ar_payment",
        }
    }

    /// Module name used in the UUIDv5 source id hooks build for GL/
    /// inventory dedupe (`"<Module>:<id>"`).
    pub fn module_name(self) -> &'static str {
        match self {
            DocumentKind::PurchaseRequisition => "PR",
            DocumentKind::PurchaseOrder => "PO",
            DocumentKind::GoodsReceipt => "GRN",
            DocumentKind::ApInvoice => "APInvoice",
            DocumentKind::ApPayment => "APPayment",
            DocumentKind::Quotation => "Quotation",
            DocumentKind::SalesOrder => "SO",
            DocumentKind::DeliveryOrder => "DO",
            DocumentKind::ArInvoice => "ARInvoice",
            DocumentKind::ArPayment => "ARPayment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "document_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
    Closed,
    Cancelled,
    Posted,
    Paid,
    Void,
    Confirmed,
    Processing,
    Completed,
    InTransit,
    Delivered,
}

impl DocumentStatus {
    /// The audit verb fragment for a transition landing on this status
    /// (spec §4.10: `document.confirm`, `document.cancel`, ...).
    pub fn verb(self) -> &'static str {
        match self {
            DocumentStatus::Draft => "create",
            DocumentStatus::Submitted => "submit",
            DocumentStatus::Approved => "approve",
            DocumentStatus::Rejected => "reject",
            DocumentStatus::Closed => "close",
            DocumentStatus::Cancelled => "cancel",
            DocumentStatus::Posted => "post",
            DocumentStatus::Paid => "pay",
            DocumentStatus::Void => "void",
            DocumentStatus::Confirmed => "confirm",
            DocumentStatus::Processing => "process",
            DocumentStatus::Completed => "complete",
            DocumentStatus::InTransit => "ship",
            DocumentStatus::Delivered => "deliver",
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Document {
    pub id: Uuid,
    pub company_id: String,
    pub kind: DocumentKind,
    pub number: String,
    pub status: DocumentStatus,
    /// Customer id, supplier id, or null depending on kind.
    pub counterparty_id: Option<String>,
    /// Set for the kinds that move stock (goods receipts, delivery
    /// orders, inventory adjustments); null otherwise.
    pub warehouse_id: Option<String>,
    /// PO for a GRN, SO for a DO, DO for an AR invoice, invoice for a
    /// payment allocation set — whatever the prior document in the
    /// chain is, modelled as an id relation only (spec §9: never a
    /// bidirectional in-memory pointer).
    pub reference_document_id: Option<Uuid>,
    pub currency: String,
    pub subtotal_minor: i64,
    pub tax_minor: i64,
    pub total_minor: i64,
    pub cancellation_reason: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub last_transition_by: String,
    pub last_transition_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DocumentLine {
    pub id: Uuid,
    pub document_id: Uuid,
    pub line_no: i32,
    pub product_id: String,
    pub qty: Decimal,
    pub unit_price: Decimal,
    pub discount_pct: Decimal,
    pub tax_pct: Decimal,
    /// Sales-order lines only; zero and unused for every other kind.
    pub qty_delivered: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewLine {
    pub product_id: String,
    pub qty: Decimal,
    pub unit_price: Decimal,
    pub discount_pct: Decimal,
    pub tax_pct: Decimal,
}
