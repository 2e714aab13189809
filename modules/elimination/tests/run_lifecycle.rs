//! Covers the Run status table and the side-selection/elimination math
//! end to end without a database, following Scenario S4.

use elimination::services::posting_service::{choose_credit_side, Side};
use elimination::services::simulation_service::eliminated_amount;
use elimination::state_machine;
use elimination::RunStatus;

#[test]
fn scenario_s4_eliminates_950_and_credits_the_source() {
    let source_net_minor = 1000_00;
    let target_net_minor = -950_00;

    assert_eq!(eliminated_amount(source_net_minor, target_net_minor), 950_00);
    assert_eq!(choose_credit_side(source_net_minor), Side::Source);
}

#[test]
fn a_failed_run_can_only_return_to_simulated() {
    assert!(state_machine::validate(RunStatus::Failed, RunStatus::Simulated).is_ok());
    assert!(state_machine::validate(RunStatus::Failed, RunStatus::Posted).is_err());
    assert!(state_machine::validate(RunStatus::Failed, RunStatus::Draft).is_err());
}

#[test]
fn a_posted_run_is_terminal() {
    assert!(state_machine::validate(RunStatus::Posted, RunStatus::Draft).is_err());
}
