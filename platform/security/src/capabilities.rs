//! Capability string constants. Call sites reference these instead of
//! string literals so a typo fails to compile rather than silently
//! denying (or worse, granting) access.

pub const DOCUMENT_PR_SUBMIT: &str = "document.pr.submit";
pub const DOCUMENT_PO_APPROVE: &str = "document.po.approve";
pub const DOCUMENT_GRN_POST: &str = "document.grn.post";
pub const DOCUMENT_APINV_POST: &str = "document.apinv.post";
pub const DOCUMENT_APPAY_POST: &str = "document.appay.post";
pub const DOCUMENT_QUOT_SUBMIT: &str = "document.quot.submit";
pub const DOCUMENT_SO_APPROVE: &str = "document.so.approve";
pub const DOCUMENT_DO_POST: &str = "document.do.post";
pub const DOCUMENT_INV_POST: &str = "document.inv.post";
pub const DOCUMENT_PAY_POST: &str = "document.pay.post";
pub const DOCUMENT_CANCEL: &str = "document.cancel";

pub const GL_POST: &str = "gl.post";
pub const PERIOD_LOCK: &str = "period.lock";
pub const PERIOD_CLOSE: &str = "period.close";

pub const INVENTORY_ADJUST: &str = "inventory.adjust";
pub const INVENTORY_TRANSFER: &str = "inventory.transfer";

pub const ELIMINATION_RUN: &str = "elimination.run";
pub const VARIANCE_RUN: &str = "variance.run";
pub const CONSOLIDATION_REFRESH: &str = "consolidation.refresh";
pub const BOARDPACK_GENERATE: &str = "boardpack.generate";

pub const EXPORT_CSV: &str = "export.csv";
pub const EXPORT_PDF: &str = "export.pdf";

pub const AUDIT_READ: &str = "audit.read";
