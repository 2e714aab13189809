pub mod idempotency_repo;
pub mod stock_balance_repo;
pub mod stock_transaction_repo;
