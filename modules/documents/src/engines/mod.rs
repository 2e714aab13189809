pub mod core;

pub mod ap_invoice;
pub mod ap_payment;
pub mod ar_invoice;
pub mod ar_payment;
pub mod delivery_order;
pub mod goods_receipt;
pub mod inventory_adjustment;
pub mod purchase_order;
pub mod purchase_requisition;
pub mod quotation;
pub mod sales_order;

pub use self::core::DocumentError;
