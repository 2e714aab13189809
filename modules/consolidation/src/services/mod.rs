pub mod consolidation_service;
pub mod export_guard;
pub mod fx;
