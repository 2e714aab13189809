//! Consolidated view-model compute path (spec §4.9): aggregate every
//! group member's trial balance into one P&L/Balance Sheet, converting
//! each company's currency into the requested reporting currency.
//! Memoised per `(group, period, currency, policy)` with a 5-minute TTL;
//! a missing period or FX rate is a warning, never a hard failure.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use gl::repos::account_repo::AccountType;
use gl::repos::{balance_repo, period_repo};
use master_data::MasterDataError;
use moka::future::Cache;
use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use crate::consolidation_core::{BalanceSheet, CacheKey, ConsolidatedViewModel, ProfitAndLoss, StatementLine};
use crate::services::fx;

#[derive(Debug, Error)]
pub enum ConsolidationError {
    #[error("consolidation group {0} has no member companies")]
    EmptyGroup(String),

    #[error(transparent)]
    MasterData(#[from] MasterDataError),

    #[error(transparent)]
    Period(#[from] period_repo::PeriodError),

    #[error(transparent)]
    Balance(#[from] balance_repo::BalanceError),
}

struct Bucket {
    account_name: String,
    account_type: AccountType,
    amount_minor: i64,
}

/// Aggregates every member company's trial balance into one consolidated
/// view-model, converting each row into `currency` via the fallback-only
/// FX policy in [`fx`].
pub async fn compute(
    pool: &PgPool,
    group_id: &str,
    period_end: NaiveDate,
    currency: &str,
    policy: &str,
) -> Result<ConsolidatedViewModel, ConsolidationError> {
    let companies = master_data::list_group_companies(pool, group_id).await?;
    if companies.is_empty() {
        return Err(ConsolidationError::EmptyGroup(group_id.to_string()));
    }

    let mut warnings = Vec::new();
    let mut buckets: HashMap<String, Bucket> = HashMap::new();

    for company in &companies {
        let period = period_repo::find_by_date(pool, &company.id, period_end).await?;
        let Some(period) = period else {
            warnings.push(format!(
                "no accounting period covers {period_end} for company {}; excluded from consolidation",
                company.id
            ));
            continue;
        };

        let rate = if company.base_currency == currency {
            Some(Decimal::ONE)
        } else {
            let found = master_data::find_fx_rate(pool, &company.base_currency, currency, period_end).await?;
            if found.is_none() {
                warnings.push(format!(
                    "no FX rate from {} to {currency} as of {period_end}; company {} included at raw value",
                    company.base_currency, company.id
                ));
            }
            found.map(|r| r.rate)
        };

        let trial_balance = balance_repo::find_trial_balance_with_metadata(
            pool,
            &company.id,
            period.id,
            Some(&company.base_currency),
        )
        .await?;

        for row in trial_balance {
            let converted = fx::convert_minor(row.net_balance_minor, rate);
            buckets
                .entry(row.account_code.clone())
                .and_modify(|b| b.amount_minor += converted)
                .or_insert(Bucket {
                    account_name: row.account_name,
                    account_type: row.account_type,
                    amount_minor: converted,
                });
        }
    }

    let profit_and_loss = build_profit_and_loss(&buckets);
    let balance_sheet = build_balance_sheet(&buckets);

    Ok(ConsolidatedViewModel {
        group_id: group_id.to_string(),
        period_end,
        currency: currency.to_string(),
        policy: policy.to_string(),
        profit_and_loss,
        balance_sheet,
        warnings,
        generated_at: Utc::now(),
    })
}

fn to_line(code: &str, bucket: &Bucket) -> StatementLine {
    StatementLine {
        account_code: code.to_string(),
        account_name: bucket.account_name.clone(),
        amount_minor: bucket.amount_minor,
    }
}

/// Same sign convention as the board pack's exec summary: revenue and
/// expense accounts are credit/debit-normal, so net profit is the
/// negated sum of their net balances.
fn build_profit_and_loss(buckets: &HashMap<String, Bucket>) -> ProfitAndLoss {
    let lines: Vec<StatementLine> = buckets
        .iter()
        .filter(|(_, b)| matches!(b.account_type, AccountType::Revenue | AccountType::Expense))
        .map(|(code, b)| to_line(code, b))
        .collect();

    let net_profit_minor: i64 = -lines.iter().map(|l| l.amount_minor).sum::<i64>();

    ProfitAndLoss { lines, net_profit_minor }
}

fn build_balance_sheet(buckets: &HashMap<String, Bucket>) -> BalanceSheet {
    let of_type = |account_type: AccountType| -> Vec<StatementLine> {
        buckets
            .iter()
            .filter(|(_, b)| b.account_type == account_type)
            .map(|(code, b)| to_line(code, b))
            .collect()
    };

    BalanceSheet {
        assets: of_type(AccountType::Asset),
        liabilities: of_type(AccountType::Liability),
        equity: of_type(AccountType::Equity),
    }
}

/// Memoises [`compute`] per `(group, period, currency, policy)` for 5
/// minutes. A refresh job invalidates the entry it just recomputed.
pub struct ConsolidationCache {
    cache: Cache<CacheKey, Arc<ConsolidatedViewModel>>,
}

impl ConsolidationCache {
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(300))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder().time_to_live(ttl).build(),
        }
    }

    pub async fn get_or_compute(
        &self,
        pool: &PgPool,
        key: CacheKey,
    ) -> Result<Arc<ConsolidatedViewModel>, ConsolidationError> {
        if let Some(hit) = self.cache.get(&key).await {
            return Ok(hit);
        }

        let view = compute(pool, &key.group_id, key.period_end, &key.currency, &key.policy).await?;
        let view = Arc::new(view);
        self.cache.insert(key, Arc::clone(&view)).await;
        Ok(view)
    }

    pub async fn invalidate(&self, key: &CacheKey) {
        self.cache.invalidate(key).await;
    }
}

impl Default for ConsolidationCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(name: &str, account_type: AccountType, amount_minor: i64) -> Bucket {
        Bucket {
            account_name: name.to_string(),
            account_type,
            amount_minor,
        }
    }

    #[test]
    fn profit_and_loss_nets_revenue_against_expense() {
        let mut buckets = HashMap::new();
        buckets.insert("4000".to_string(), bucket("Revenue", AccountType::Revenue, -2_000_00));
        buckets.insert("5000".to_string(), bucket("Expense", AccountType::Expense, 800_00));
        buckets.insert("1000".to_string(), bucket("Cash", AccountType::Asset, 5_000_00));

        let pl = build_profit_and_loss(&buckets);
        assert_eq!(pl.lines.len(), 2);
        assert_eq!(pl.net_profit_minor, 1_200_00);
    }

    #[test]
    fn balance_sheet_buckets_by_account_type() {
        let mut buckets = HashMap::new();
        buckets.insert("1000".to_string(), bucket("Cash", AccountType::Asset, 5_000_00));
        buckets.insert("2000".to_string(), bucket("Accounts Payable", AccountType::Liability, -400_00));

        let sheet = build_balance_sheet(&buckets);
        assert_eq!(sheet.assets.len(), 1);
        assert_eq!(sheet.liabilities.len(), 1);
        assert_eq!(sheet.equity.len(), 0);
    }
}
