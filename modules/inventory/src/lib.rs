pub mod contracts;
pub mod repos;
pub mod services;

pub use services::movement_service::{post_movement, post_movement_tx, post_transfer_tx, MovementError};
pub use services::revaluation_service::{recompute_balance, revalue_balance, RevaluationError};
