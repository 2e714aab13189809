//! Budget-vs-actual variance snapshots and board pack assembly, reading
//! posted balances straight from `gl` rather than duplicating them.

pub mod repos;
pub mod services;
pub mod variance_core;

pub use services::boardpack_service::{
    assemble, BoardPack, BoardPackError, CashflowSummary, ExecSummary, ProfitAndLoss, BalanceSheet, SectionKind,
    StatementLine,
};
pub use services::snapshot_service::{compute, SnapshotComputeError};
pub use variance_core::{Rule, RuleLine, Snapshot, SnapshotStatus, VarianceRow};
