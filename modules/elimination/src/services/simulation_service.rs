//! Simulation (spec §4.6): read each side's net balance for the period
//! and compute the amount a posting would eliminate, without writing
//! anything to the ledger.

use chrono::NaiveDate;
use gl::repos::{balance_repo, period_repo};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::elimination_core::Rule;
use crate::repos::{rule_repo, run_repo};
use crate::state_machine::{self, InvalidRunTransition};

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    InvalidTransition(#[from] InvalidRunTransition),

    #[error("elimination rule not found: {0}")]
    RuleNotFound(Uuid),

    #[error("elimination run not found: {0}")]
    RunNotFound(Uuid),

    #[error("no accounting period covers {date} for company {company_id}")]
    NoPeriod { company_id: String, date: NaiveDate },

    #[error(transparent)]
    Rule(#[from] rule_repo::RuleError),

    #[error(transparent)]
    Run(#[from] run_repo::RunError),

    #[error(transparent)]
    Period(#[from] period_repo::PeriodError),

    #[error(transparent)]
    Balance(#[from] balance_repo::BalanceError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub struct SimulationResult {
    pub source_net_minor: i64,
    pub target_net_minor: i64,
    pub eliminated_minor: i64,
}

/// Eliminated amount is the smaller magnitude of the two sides, per
/// spec §4.6's `min(|src|, |tgt|)`. Pure so it can be tested without a
/// database.
pub fn eliminated_amount(source_net_minor: i64, target_net_minor: i64) -> i64 {
    source_net_minor.abs().min(target_net_minor.abs())
}

/// Opens a new run in `Draft` for `rule` against `period_end`. Call
/// [`simulate`] on its id to compute and advance it.
pub async fn create_run(pool: &PgPool, rule_id: Uuid, period_end: NaiveDate) -> Result<Uuid, SimulationError> {
    if rule_repo::find(pool, rule_id).await?.is_none() {
        return Err(SimulationError::RuleNotFound(rule_id));
    }

    let run = run_repo::insert_draft(pool, rule_id, period_end).await?;
    Ok(run.id)
}

/// Advances a run to `Simulated` (or `Failed` on a computation error),
/// reading both companies' net balances for the rule's accounts as of
/// the run's period. Legal from `Draft` (first attempt) or `Failed`
/// (the spec's retry edge) — the transition table enforces both and
/// rejects everything else, including re-simulating an already
/// `Simulated` or `Posted` run.
pub async fn simulate(pool: &PgPool, run_id: Uuid) -> Result<SimulationResult, SimulationError> {
    let run = run_repo::find(pool, run_id)
        .await?
        .ok_or(SimulationError::RunNotFound(run_id))?;
    state_machine::validate(run.status, crate::elimination_core::RunStatus::Simulated)?;

    let rule = rule_repo::find(pool, run.rule_id)
        .await?
        .ok_or(SimulationError::RuleNotFound(run.rule_id))?;

    match net_balances(pool, &rule, run.period_end).await {
        Ok((source_net_minor, target_net_minor)) => {
            let eliminated_minor = eliminated_amount(source_net_minor, target_net_minor);
            run_repo::mark_simulated(pool, run.id, source_net_minor, target_net_minor, eliminated_minor).await?;

            Ok(SimulationResult {
                source_net_minor,
                target_net_minor,
                eliminated_minor,
            })
        }
        Err(err) => {
            run_repo::mark_failed(pool, run.id, &err.to_string()).await?;
            Err(err)
        }
    }
}

async fn net_balances(
    pool: &PgPool,
    rule: &Rule,
    period_end: NaiveDate,
) -> Result<(i64, i64), SimulationError> {
    let source_period = period_repo::find_by_date(pool, &rule.source_company_id, period_end)
        .await?
        .ok_or_else(|| SimulationError::NoPeriod {
            company_id: rule.source_company_id.clone(),
            date: period_end,
        })?;
    let target_period = period_repo::find_by_date(pool, &rule.target_company_id, period_end)
        .await?
        .ok_or_else(|| SimulationError::NoPeriod {
            company_id: rule.target_company_id.clone(),
            date: period_end,
        })?;

    let source_net_minor = balance_repo::find_by_grain(
        pool,
        &rule.source_company_id,
        source_period.id,
        &rule.source_account,
        &rule.currency,
    )
    .await?
    .map(|b| b.net_balance_minor)
    .unwrap_or(0);

    let target_net_minor = balance_repo::find_by_grain(
        pool,
        &rule.target_company_id,
        target_period.id,
        &rule.target_account,
        &rule.currency,
    )
    .await?
    .map(|b| b.net_balance_minor)
    .unwrap_or(0);

    Ok((source_net_minor, target_net_minor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eliminates_the_smaller_magnitude() {
        // Scenario S4: source +1000, target -950 -> eliminated 950.
        assert_eq!(eliminated_amount(1000_00, -950_00), 950_00);
    }

    #[test]
    fn symmetric_in_argument_order() {
        assert_eq!(eliminated_amount(-950_00, 1000_00), 950_00);
    }

    #[test]
    fn zero_on_either_side_eliminates_nothing() {
        assert_eq!(eliminated_amount(0, 500_00), 0);
    }
}
