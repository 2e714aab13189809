pub mod account_activity;
pub mod audit;
pub mod consolidation;
pub mod export;
pub mod health;
pub mod jobs;
pub mod trial_balance;
