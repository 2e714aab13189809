pub mod consolidation_core;
pub mod services;

pub use consolidation_core::{BalanceSheet, CacheKey, ConsolidatedViewModel, ProfitAndLoss, StatementLine};
pub use services::consolidation_service::{compute, ConsolidationCache, ConsolidationError};
pub use services::export_guard::authorize_export;
