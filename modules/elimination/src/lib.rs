//! Intercompany elimination: rules matching a pair of accounts across
//! two companies in a consolidation group, simulated against posted
//! balances and posted as a balanced journal entry.

pub mod elimination_core;
pub mod repos;
pub mod services;
pub mod state_machine;

pub use elimination_core::{Rule, Run, RunStatus};
pub use services::posting_service::{post, PostingError};
pub use services::simulation_service::{create_run, simulate, SimulationError, SimulationResult};
