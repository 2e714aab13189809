//! Covers the variance math and board pack section math end to end
//! without a database: a small trial balance and a rule's budget lines
//! are run through the same pure functions the services call.

use variance::services::boardpack_service::{build_balance_sheet, build_exec_summary, top_variances};
use variance::services::snapshot_service::compute_row;
use variance::VarianceRow;

#[test]
fn a_rule_over_budget_on_one_account_and_under_on_another_nets_out() {
    let marketing = compute_row("6100".to_string(), 12_000_00, 10_000_00);
    let travel = compute_row("6200".to_string(), 400_00, 1_000_00);

    assert_eq!(marketing.variance_minor, 2_000_00);
    assert_eq!(travel.variance_minor, -600_00);
    assert_eq!(marketing.variance_pct, Some(20.0));
    assert_eq!(travel.variance_pct, Some(-60.0));
}

#[test]
fn top_variances_keeps_the_largest_swings_regardless_of_sign() {
    let rows = vec![
        VarianceRow { account_code: "a".into(), actual_minor: 0, budget_minor: 0, variance_minor: 5_00, variance_pct: None },
        VarianceRow { account_code: "b".into(), actual_minor: 0, budget_minor: 0, variance_minor: -9_000_00, variance_pct: None },
        VarianceRow { account_code: "c".into(), actual_minor: 0, budget_minor: 0, variance_minor: 120_00, variance_pct: None },
    ];

    let top = top_variances(&rows, 1);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].account_code, "b");
}

#[test]
fn exec_summary_and_balance_sheet_agree_on_the_same_trial_balance() {
    use gl::repos::account_repo::{AccountType, NormalBalance};
    use gl::repos::balance_repo::TrialBalanceRow;

    let row = |code: &str, name: &str, kind: AccountType, net: i64| TrialBalanceRow {
        account_code: code.to_string(),
        currency: "USD".to_string(),
        debit_total_minor: 0,
        credit_total_minor: 0,
        net_balance_minor: net,
        account_name: name.to_string(),
        account_type: kind,
        normal_balance: NormalBalance::Debit,
    };

    let trial_balance = vec![
        row("1000", "Operating Bank", AccountType::Asset, 200_000_00),
        row("3000", "Retained Earnings", AccountType::Equity, -50_000_00),
        row("4000", "Services Revenue", AccountType::Revenue, -120_000_00),
        row("5100", "Payroll Expense", AccountType::Expense, 90_000_00),
    ];

    let summary = build_exec_summary(&trial_balance);
    assert_eq!(summary.revenue_minor, 120_000_00);
    assert_eq!(summary.net_profit_minor, 30_000_00);

    let sheet = build_balance_sheet(&trial_balance);
    assert_eq!(sheet.assets.len(), 1);
    assert_eq!(sheet.equity.len(), 1);
    assert!(sheet.liabilities.is_empty());
}
