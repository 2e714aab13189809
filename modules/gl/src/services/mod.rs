pub mod account_activity_service;
pub mod account_mapping_service;
pub mod journal_service;
pub mod period_close_service;
pub mod trial_balance_service;
