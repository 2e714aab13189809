//! Read-only master-data views.
//!
//! These tables are owned by a collaborator CRUD service outside this
//! workspace's scope; the core only ever reads them, to resolve the handful
//! of fields (credit limit, payment terms, default currency, tax code) its
//! own invariants depend on.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MasterDataError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, FromRow)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub base_currency: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct Branch {
    pub id: String,
    pub company_id: String,
    pub name: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct Warehouse {
    pub id: String,
    pub company_id: String,
    pub name: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: String,
    pub company_id: String,
    pub sku: String,
    pub tax_code: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Customer {
    pub id: String,
    pub company_id: String,
    pub name: String,
    pub credit_limit_minor: Option<i64>,
    pub payment_terms_days: i32,
    pub default_currency: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct Supplier {
    pub id: String,
    pub company_id: String,
    pub name: String,
    pub payment_terms_days: i32,
    pub default_currency: String,
}

/// Parent over a set of companies; elimination rules and consolidated
/// reports scope to a group (spec Data Model's *Consolidation Group*).
#[derive(Debug, Clone, FromRow)]
pub struct ConsolidationGroup {
    pub id: String,
    pub name: String,
}

/// A point-in-time FX rate. Consolidation's FX policy is fallback-only
/// — a miss here is not an error, see `modules/consolidation`.
#[derive(Debug, Clone, FromRow)]
pub struct FxRate {
    pub from_currency: String,
    pub to_currency: String,
    pub as_of: NaiveDate,
    pub rate: Decimal,
}

macro_rules! find_by_id {
    ($fn_name:ident, $table:literal, $ty:ty, $kind:literal) => {
        pub async fn $fn_name(pool: &PgPool, id: &str) -> Result<$ty, MasterDataError> {
            sqlx::query_as::<_, $ty>(concat!("SELECT * FROM ", $table, " WHERE id = $1"))
                .bind(id)
                .fetch_optional(pool)
                .await?
                .ok_or_else(|| MasterDataError::NotFound {
                    kind: $kind,
                    id: id.to_string(),
                })
        }
    };
}

find_by_id!(find_company, "companies", Company, "company");
find_by_id!(find_branch, "branches", Branch, "branch");
find_by_id!(find_warehouse, "warehouses", Warehouse, "warehouse");
find_by_id!(find_product, "products", Product, "product");
find_by_id!(find_customer, "customers", Customer, "customer");
find_by_id!(find_supplier, "suppliers", Supplier, "supplier");
find_by_id!(find_consolidation_group, "consolidation_groups", ConsolidationGroup, "consolidation_group");

/// Companies belonging to a consolidation group.
pub async fn list_group_companies(pool: &PgPool, group_id: &str) -> Result<Vec<Company>, MasterDataError> {
    let companies = sqlx::query_as::<_, Company>(
        r#"
        SELECT c.id, c.name, c.base_currency
        FROM companies c
        INNER JOIN consolidation_group_members m ON m.company_id = c.id
        WHERE m.group_id = $1
        ORDER BY c.id
        "#,
    )
    .bind(group_id)
    .fetch_all(pool)
    .await?;

    Ok(companies)
}

/// Most recent rate on or before `as_of`, or `None` when the pair has
/// never been quoted — the caller decides the fallback.
pub async fn find_fx_rate(
    pool: &PgPool,
    from_currency: &str,
    to_currency: &str,
    as_of: NaiveDate,
) -> Result<Option<FxRate>, MasterDataError> {
    let rate = sqlx::query_as::<_, FxRate>(
        r#"
        SELECT from_currency, to_currency, as_of, rate
        FROM fx_rates
        WHERE from_currency = $1 AND to_currency = $2 AND as_of <= $3
        ORDER BY as_of DESC
        LIMIT 1
        "#,
    )
    .bind(from_currency)
    .bind(to_currency)
    .bind(as_of)
    .fetch_optional(pool)
    .await?;

    Ok(rate)
}

#[allow(dead_code)]
fn credit_headroom(customer: &Customer, outstanding_minor: i64) -> Option<Decimal> {
    customer
        .credit_limit_minor
        .map(|limit| Decimal::from(limit - outstanding_minor) / Decimal::from(100))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_headroom_is_limit_minus_outstanding_in_major_units() {
        let customer = Customer {
            id: "cust-1".to_string(),
            company_id: "co-1".to_string(),
            name: "Acme".to_string(),
            credit_limit_minor: Some(500_000),
            payment_terms_days: 30,
            default_currency: "USD".to_string(),
        };

        assert_eq!(
            credit_headroom(&customer, 120_000),
            Some(Decimal::new(3800, 0))
        );
    }

    #[test]
    fn credit_headroom_is_none_without_a_limit() {
        let customer = Customer {
            id: "cust-2".to_string(),
            company_id: "co-1".to_string(),
            name: "No Limit Co".to_string(),
            credit_limit_minor: None,
            payment_terms_days: 15,
            default_currency: "USD".to_string(),
        };

        assert_eq!(credit_headroom(&customer, 0), None);
    }
}
