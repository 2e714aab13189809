//! The Document Engine: ten operational document kinds over a shared
//! header/line table pair, a typed transition-table checker, and the
//! Integration Hooks that project document mutations into the General
//! Ledger and inventory.

pub mod document_core;
pub mod engines;
pub mod hooks;
pub mod line_arithmetic;
pub mod numbering;
pub mod repos;
pub mod state_machine;

pub use document_core::{Document, DocumentKind, DocumentLine, DocumentStatus, NewLine};
pub use engines::DocumentError;
pub use hooks::DocumentEvent;
