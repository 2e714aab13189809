//! Posting (spec §4.6): turn a `Simulated` run into a balanced journal
//! entry and advance it to `Posted`.
//!
//! The spec names a single "journal touching both accounts", but
//! `gl`'s Journal Entry is scoped to one posting company. This posts
//! one entry under the rule's consolidation group (treated as the
//! posting company for elimination purposes, the way the Data Model's
//! `dim_company_id` implies group-level eliminations), with each line
//! dimensioned to the operating company it actually affects.

use gl::contracts::posting_request::{Dimensions, GlPostingRequest, JournalLine};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::elimination_core::RunStatus;
use crate::repos::{rule_repo, run_repo};
use crate::state_machine::{self, InvalidRunTransition};

#[derive(Debug, Error)]
pub enum PostingError {
    #[error(transparent)]
    InvalidTransition(#[from] InvalidRunTransition),

    #[error("elimination run not found: {0}")]
    RunNotFound(Uuid),

    #[error("elimination run {0} has nothing to eliminate")]
    NothingToEliminate(Uuid),

    #[error(transparent)]
    Rule(#[from] rule_repo::RuleError),

    #[error(transparent)]
    Run(#[from] run_repo::RunError),

    #[error(transparent)]
    Journal(#[from] gl::JournalError),

    #[error(transparent)]
    Audit(#[from] audit::AuditError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Of the two sides, the one with the positive net is credited (it
/// reduces a debit-normal balance back toward zero); the other is
/// debited. Pure so the side-selection rule (spec §4.6) is testable
/// without a database.
pub fn choose_credit_side(source_net_minor: i64) -> Side {
    if source_net_minor > 0 {
        Side::Source
    } else {
        Side::Target
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Target,
}

pub async fn post(pool: &PgPool, run_id: Uuid, actor_id: &str) -> Result<Uuid, PostingError> {
    let mut tx = pool.begin().await?;

    let run = run_repo::lock_tx(&mut tx, run_id)
        .await?
        .ok_or(PostingError::RunNotFound(run_id))?;

    state_machine::validate(run.status, RunStatus::Posted)?;

    let eliminated_minor = run.eliminated_minor.unwrap_or(0);
    if eliminated_minor == 0 {
        return Err(PostingError::NothingToEliminate(run_id));
    }

    let rule = rule_repo::find(pool, run.rule_id)
        .await?
        .ok_or_else(|| PostingError::Rule(rule_repo::RuleError::NotFound(run.rule_id)))?;

    let credit_side = choose_credit_side(run.source_net_minor.unwrap_or(0));

    let (credit_account, credit_company, debit_account, debit_company) = match credit_side {
        Side::Source => (
            &rule.source_account,
            &rule.source_company_id,
            &rule.target_account,
            &rule.target_company_id,
        ),
        Side::Target => (
            &rule.target_account,
            &rule.target_company_id,
            &rule.source_account,
            &rule.source_company_id,
        ),
    };

    let memo = format!("Elimination {} - {}", rule.name, run.period_end);

    let request = GlPostingRequest {
        posting_date: run.period_end.to_string(),
        currency: rule.currency.clone(),
        source_module: "elimination".to_string(),
        source_id: run_id.to_string(),
        description: memo,
        lines: vec![
            JournalLine {
                account_code: debit_account.clone(),
                debit_minor: eliminated_minor,
                credit_minor: 0,
                memo: None,
                dimensions: Some(Dimensions {
                    company_id: Some(debit_company.clone()),
                    ..Default::default()
                }),
            },
            JournalLine {
                account_code: credit_account.clone(),
                debit_minor: 0,
                credit_minor: eliminated_minor,
                memo: None,
                dimensions: Some(Dimensions {
                    company_id: Some(credit_company.clone()),
                    ..Default::default()
                }),
            },
        ],
    };

    let journal_entry_id = gl::post_journal_tx(&mut tx, &rule.group_id, &request).await?;
    run_repo::mark_posted_tx(&mut tx, run_id, journal_entry_id).await?;

    audit::record(
        &mut tx,
        &rule.group_id,
        actor_id,
        "elimination.post",
        "elimination_run",
        &run_id.to_string(),
        serde_json::json!({ "rule": rule.name, "eliminated_minor": eliminated_minor, "journal_entry_id": journal_entry_id }),
    )
    .await?;

    tx.commit().await?;

    Ok(journal_entry_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credits_the_side_with_the_positive_net() {
        assert_eq!(choose_credit_side(1000_00), Side::Source);
    }

    #[test]
    fn credits_the_target_when_its_net_is_positive_instead() {
        assert_eq!(choose_credit_side(-950_00), Side::Target);
    }
}
