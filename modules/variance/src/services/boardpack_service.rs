//! Board pack assembly (spec §4.7): a template of section kinds, a
//! `Ready` variance snapshot, a period and a company produce exec
//! summary / P&L / balance sheet / cashflow summary / top-N variance
//! rows. Missing sub-data is a warning on the pack, never an error.

use chrono::NaiveDate;
use gl::repos::account_repo::AccountType;
use gl::repos::balance_repo::TrialBalanceRow;
use gl::repos::{balance_repo, period_repo};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::repos::snapshot_repo;
use crate::variance_core::{SnapshotStatus, VarianceRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    ExecSummary,
    ProfitAndLoss,
    BalanceSheet,
    CashflowSummary,
    TopVariances,
}

#[derive(Debug, Clone)]
pub struct StatementLine {
    pub account_code: String,
    pub account_name: String,
    pub amount_minor: i64,
}

#[derive(Debug, Clone)]
pub struct ExecSummary {
    pub net_profit_minor: i64,
    pub revenue_minor: i64,
    pub cash_minor: i64,
    pub ar_outstanding_minor: i64,
    pub ap_outstanding_minor: i64,
}

#[derive(Debug, Clone)]
pub struct ProfitAndLoss {
    pub lines: Vec<StatementLine>,
    pub net_profit_minor: i64,
}

#[derive(Debug, Clone)]
pub struct BalanceSheet {
    pub assets: Vec<StatementLine>,
    pub liabilities: Vec<StatementLine>,
    pub equity: Vec<StatementLine>,
}

#[derive(Debug, Clone)]
pub struct CashflowSummary {
    pub cash_accounts: Vec<StatementLine>,
    pub net_cash_minor: i64,
}

#[derive(Debug, Clone, Default)]
pub struct BoardPack {
    pub exec_summary: Option<ExecSummary>,
    pub profit_and_loss: Option<ProfitAndLoss>,
    pub balance_sheet: Option<BalanceSheet>,
    pub cashflow_summary: Option<CashflowSummary>,
    pub top_variances: Option<Vec<VarianceRow>>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Error)]
pub enum BoardPackError {
    #[error("variance snapshot not found: {0}")]
    SnapshotNotFound(Uuid),

    #[error("variance snapshot {0} is not Ready")]
    SnapshotNotReady(Uuid),

    #[error(transparent)]
    Snapshot(#[from] snapshot_repo::SnapshotError),

    #[error(transparent)]
    Period(#[from] period_repo::PeriodError),

    #[error(transparent)]
    Balance(#[from] balance_repo::BalanceError),
}

fn is_cash_account(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("cash") || lower.contains("bank")
}

fn is_receivable_account(name: &str) -> bool {
    name.to_lowercase().contains("receivable")
}

fn is_payable_account(name: &str) -> bool {
    name.to_lowercase().contains("payable")
}

fn to_line(row: &TrialBalanceRow) -> StatementLine {
    StatementLine {
        account_code: row.account_code.clone(),
        account_name: row.account_name.clone(),
        amount_minor: row.net_balance_minor,
    }
}

/// Revenue and expense accounts are credit-normal and debit-normal
/// respectively; `net_balance_minor` is `debit_total - credit_total`,
/// so a credited revenue account carries a negative net. Net profit is
/// therefore the negated sum across both account types.
pub fn build_exec_summary(trial_balance: &[TrialBalanceRow]) -> ExecSummary {
    let revenue_minor: i64 = -trial_balance
        .iter()
        .filter(|r| r.account_type == AccountType::Revenue)
        .map(|r| r.net_balance_minor)
        .sum::<i64>();

    let net_profit_minor: i64 = -trial_balance
        .iter()
        .filter(|r| matches!(r.account_type, AccountType::Revenue | AccountType::Expense))
        .map(|r| r.net_balance_minor)
        .sum::<i64>();

    let cash_minor: i64 = trial_balance
        .iter()
        .filter(|r| is_cash_account(&r.account_name))
        .map(|r| r.net_balance_minor)
        .sum();

    let ar_outstanding_minor: i64 = trial_balance
        .iter()
        .filter(|r| is_receivable_account(&r.account_name))
        .map(|r| r.net_balance_minor)
        .sum();

    let ap_outstanding_minor: i64 = -trial_balance
        .iter()
        .filter(|r| is_payable_account(&r.account_name))
        .map(|r| r.net_balance_minor)
        .sum::<i64>();

    ExecSummary {
        net_profit_minor,
        revenue_minor,
        cash_minor,
        ar_outstanding_minor,
        ap_outstanding_minor,
    }
}

pub fn build_profit_and_loss(trial_balance: &[TrialBalanceRow]) -> ProfitAndLoss {
    let lines: Vec<StatementLine> = trial_balance
        .iter()
        .filter(|r| matches!(r.account_type, AccountType::Revenue | AccountType::Expense))
        .map(to_line)
        .collect();

    let net_profit_minor: i64 = -trial_balance
        .iter()
        .filter(|r| matches!(r.account_type, AccountType::Revenue | AccountType::Expense))
        .map(|r| r.net_balance_minor)
        .sum::<i64>();

    ProfitAndLoss { lines, net_profit_minor }
}

pub fn build_balance_sheet(trial_balance: &[TrialBalanceRow]) -> BalanceSheet {
    BalanceSheet {
        assets: trial_balance.iter().filter(|r| r.account_type == AccountType::Asset).map(to_line).collect(),
        liabilities: trial_balance.iter().filter(|r| r.account_type == AccountType::Liability).map(to_line).collect(),
        equity: trial_balance.iter().filter(|r| r.account_type == AccountType::Equity).map(to_line).collect(),
    }
}

pub fn build_cashflow_summary(trial_balance: &[TrialBalanceRow]) -> CashflowSummary {
    let cash_accounts: Vec<StatementLine> =
        trial_balance.iter().filter(|r| is_cash_account(&r.account_name)).map(to_line).collect();
    let net_cash_minor: i64 = cash_accounts.iter().map(|l| l.amount_minor).sum();

    CashflowSummary { cash_accounts, net_cash_minor }
}

/// Sorted by `|variance|` descending, truncated to `top_n` (spec §4.7).
pub fn top_variances(rows: &[VarianceRow], top_n: usize) -> Vec<VarianceRow> {
    let mut sorted = rows.to_vec();
    sorted.sort_by_key(|r| std::cmp::Reverse(r.variance_minor.abs()));
    sorted.truncate(top_n);
    sorted
}

pub async fn assemble(
    pool: &PgPool,
    template: &[SectionKind],
    snapshot_id: Uuid,
    company_id: &str,
    period_end: NaiveDate,
    currency: Option<&str>,
    top_n: usize,
) -> Result<BoardPack, BoardPackError> {
    let snapshot = snapshot_repo::find(pool, snapshot_id)
        .await?
        .ok_or(BoardPackError::SnapshotNotFound(snapshot_id))?;
    if snapshot.status != SnapshotStatus::Ready {
        return Err(BoardPackError::SnapshotNotReady(snapshot_id));
    }

    let mut pack = BoardPack::default();

    let period = period_repo::find_by_date(pool, company_id, period_end).await?;
    let Some(period) = period else {
        pack.warnings
            .push(format!("no accounting period covers {period_end} for company {company_id}; statement sections skipped"));
        if template.contains(&SectionKind::TopVariances) {
            pack.top_variances = Some(top_variances(&snapshot.rows, top_n));
        }
        return Ok(pack);
    };

    let needs_trial_balance = template.iter().any(|s| {
        matches!(
            s,
            SectionKind::ExecSummary | SectionKind::ProfitAndLoss | SectionKind::BalanceSheet | SectionKind::CashflowSummary
        )
    });

    let trial_balance = if needs_trial_balance {
        balance_repo::find_trial_balance_with_metadata(pool, company_id, period.id, currency).await?
    } else {
        Vec::new()
    };

    if needs_trial_balance && trial_balance.is_empty() {
        pack.warnings.push("no trial balance data for this period; statement sections are empty".to_string());
    }

    for section in template {
        match section {
            SectionKind::ExecSummary => pack.exec_summary = Some(build_exec_summary(&trial_balance)),
            SectionKind::ProfitAndLoss => pack.profit_and_loss = Some(build_profit_and_loss(&trial_balance)),
            SectionKind::BalanceSheet => pack.balance_sheet = Some(build_balance_sheet(&trial_balance)),
            SectionKind::CashflowSummary => pack.cashflow_summary = Some(build_cashflow_summary(&trial_balance)),
            SectionKind::TopVariances => pack.top_variances = Some(top_variances(&snapshot.rows, top_n)),
        }
    }

    Ok(pack)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, name: &str, kind: AccountType, net_minor: i64) -> TrialBalanceRow {
        TrialBalanceRow {
            account_code: code.to_string(),
            currency: "USD".to_string(),
            debit_total_minor: 0,
            credit_total_minor: 0,
            net_balance_minor: net_minor,
            account_name: name.to_string(),
            account_type: kind,
            normal_balance: gl::repos::account_repo::NormalBalance::Debit,
        }
    }

    fn sample_trial_balance() -> Vec<TrialBalanceRow> {
        vec![
            row("1000", "Cash", AccountType::Asset, 5_000_00),
            row("1100", "Accounts Receivable", AccountType::Asset, 1_000_00),
            row("2000", "Accounts Payable", AccountType::Liability, -400_00),
            row("4000", "Revenue", AccountType::Revenue, -2_000_00),
            row("5000", "Expense", AccountType::Expense, 800_00),
        ]
    }

    #[test]
    fn exec_summary_derives_net_profit_from_revenue_and_expense() {
        let summary = build_exec_summary(&sample_trial_balance());
        assert_eq!(summary.revenue_minor, 2_000_00);
        assert_eq!(summary.net_profit_minor, 1_200_00);
        assert_eq!(summary.ar_outstanding_minor, 1_000_00);
        assert_eq!(summary.ap_outstanding_minor, 400_00);
        assert_eq!(summary.cash_minor, 5_000_00);
    }

    #[test]
    fn balance_sheet_buckets_by_account_type() {
        let sheet = build_balance_sheet(&sample_trial_balance());
        assert_eq!(sheet.assets.len(), 2);
        assert_eq!(sheet.liabilities.len(), 1);
        assert_eq!(sheet.equity.len(), 0);
    }

    fn variance_row(code: &str, variance_minor: i64) -> VarianceRow {
        VarianceRow {
            account_code: code.to_string(),
            actual_minor: 0,
            budget_minor: 0,
            variance_minor,
            variance_pct: None,
        }
    }

    #[test]
    fn top_variances_sorts_by_absolute_magnitude_descending() {
        let rows = vec![variance_row("a", 10_00), variance_row("b", -50_00), variance_row("c", 20_00)];
        let top = top_variances(&rows, 2);
        assert_eq!(top.iter().map(|r| r.account_code.as_str()).collect::<Vec<_>>(), vec!["b", "c"]);
    }
}
