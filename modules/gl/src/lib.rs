pub mod contracts;
pub mod repos;
pub mod services;
pub mod validation;

pub use services::account_activity_service::{get_account_activity, AccountActivity, AccountActivityError};
pub use services::account_mapping_service::{resolve as resolve_account_mapping, MappingError};
pub use services::journal_service::{post_journal, post_journal_tx, JournalError};
pub use services::period_close_service::{close_period, lock_period, PeriodCloseError};
pub use services::trial_balance_service::{get_trial_balance, TrialBalanceError};
