//! Transition table for `Run.status` (spec §4.6: `Draft -> Simulated ->
//! Posted`, with a `Failed -> Simulated` retry edge, and either of the
//! first two states able to fail out).

use thiserror::Error;

use crate::elimination_core::RunStatus;

#[derive(Debug, Error)]
#[error("illegal elimination run transition: {from:?} -> {to:?}")]
pub struct InvalidRunTransition {
    pub from: RunStatus,
    pub to: RunStatus,
}

use RunStatus::*;

const TABLE: &[(RunStatus, RunStatus)] = &[
    (Draft, Simulated),
    (Draft, Failed),
    (Simulated, Posted),
    (Simulated, Failed),
    (Failed, Simulated),
];

pub fn validate(from: RunStatus, to: RunStatus) -> Result<(), InvalidRunTransition> {
    if TABLE.contains(&(from, to)) {
        Ok(())
    } else {
        Err(InvalidRunTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_can_be_simulated() {
        assert!(validate(Draft, Simulated).is_ok());
    }

    #[test]
    fn simulated_can_be_posted() {
        assert!(validate(Simulated, Posted).is_ok());
    }

    #[test]
    fn failed_can_be_retried_back_to_simulated() {
        assert!(validate(Failed, Simulated).is_ok());
    }

    #[test]
    fn posted_is_terminal() {
        assert!(validate(Posted, Simulated).is_err());
        assert!(validate(Posted, Failed).is_err());
    }

    #[test]
    fn draft_cannot_jump_straight_to_posted() {
        assert!(validate(Draft, Posted).is_err());
    }
}
