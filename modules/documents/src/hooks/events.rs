use rust_decimal::Decimal;
use uuid::Uuid;

pub struct GrnLine {
    pub product_id: String,
    pub qty: Decimal,
    pub unit_cost: Decimal,
}

pub struct ArInvoiceLine {
    pub net: Decimal,
    pub tax_amt: Decimal,
}

pub struct ArPaymentAllocation {
    pub invoice_id: Uuid,
    pub amount_minor: i64,
}

pub struct DoLine {
    pub product_id: String,
    pub qty: Decimal,
}

/// The closed set of integration-hook event variants (spec §9). No
/// other variant may subscribe a hook; a new binding means extending
/// this enum, never an ad-hoc branch elsewhere.
pub enum DocumentEvent {
    GrnPosted {
        document_id: Uuid,
        warehouse_id: String,
        posting_date: String,
        currency: String,
        lines: Vec<GrnLine>,
    },
    ApInvoicePosted {
        document_id: Uuid,
        has_grn: bool,
        posting_date: String,
        currency: String,
        total_minor: i64,
    },
    ApPaymentPosted {
        document_id: Uuid,
        posting_date: String,
        currency: String,
        amount_minor: i64,
    },
    DoConfirmed {
        document_id: Uuid,
        warehouse_id: String,
        lines: Vec<DoLine>,
    },
    ArInvoicePosted {
        document_id: Uuid,
        posting_date: String,
        currency: String,
        lines: Vec<ArInvoiceLine>,
    },
    ArPaymentPosted {
        document_id: Uuid,
        posting_date: String,
        currency: String,
        allocations: Vec<ArPaymentAllocation>,
    },
    InventoryAdjustmentPosted {
        document_id: Uuid,
        warehouse_id: String,
        product_id: String,
        qty: Decimal,
        unit_cost: Decimal,
        posting_date: String,
        currency: String,
    },
}

impl DocumentEvent {
    pub fn module_name(&self) -> &'static str {
        match self {
            DocumentEvent::GrnPosted { .. } => "GRN",
            DocumentEvent::ApInvoicePosted { .. } => "APInvoice",
            DocumentEvent::ApPaymentPosted { .. } => "APPayment",
            DocumentEvent::DoConfirmed { .. } => "DO",
            DocumentEvent::ArInvoicePosted { .. } => "ARInvoice",
            DocumentEvent::ArPaymentPosted { .. } => "ARPayment",
            DocumentEvent::InventoryAdjustmentPosted { .. } => "InventoryAdjustment",
        }
    }

    pub fn document_id(&self) -> Uuid {
        match self {
            DocumentEvent::GrnPosted { document_id, .. }
            | DocumentEvent::ApInvoicePosted { document_id, .. }
            | DocumentEvent::ApPaymentPosted { document_id, .. }
            | DocumentEvent::DoConfirmed { document_id, .. }
            | DocumentEvent::ArInvoicePosted { document_id, .. }
            | DocumentEvent::ArPaymentPosted { document_id, .. }
            | DocumentEvent::InventoryAdjustmentPosted { document_id, .. } => *document_id,
        }
    }
}
