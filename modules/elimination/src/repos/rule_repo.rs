//! Repository for elimination rules.

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::elimination_core::Rule;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("elimination rule not found: {0}")]
    NotFound(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub struct NewRule<'a> {
    pub group_id: &'a str,
    pub name: &'a str,
    pub source_company_id: &'a str,
    pub target_company_id: &'a str,
    pub source_account: &'a str,
    pub target_account: &'a str,
    pub currency: &'a str,
    pub match_criteria: Option<serde_json::Value>,
}

pub async fn insert(pool: &PgPool, new: &NewRule<'_>) -> Result<Rule, RuleError> {
    let rule = sqlx::query_as::<_, Rule>(
        r#"
        INSERT INTO elimination_rules
            (id, group_id, name, source_company_id, target_company_id,
             source_account, target_account, currency, match_criteria, active, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, true, NOW())
        RETURNING id, group_id, name, source_company_id, target_company_id,
                  source_account, target_account, currency, match_criteria, active, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.group_id)
    .bind(new.name)
    .bind(new.source_company_id)
    .bind(new.target_company_id)
    .bind(new.source_account)
    .bind(new.target_account)
    .bind(new.currency)
    .bind(&new.match_criteria)
    .fetch_one(pool)
    .await?;

    Ok(rule)
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Rule>, RuleError> {
    let rule = sqlx::query_as::<_, Rule>(
        r#"
        SELECT id, group_id, name, source_company_id, target_company_id,
               source_account, target_account, currency, match_criteria, active, created_at
        FROM elimination_rules
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(rule)
}

pub async fn list_active(pool: &PgPool, group_id: &str) -> Result<Vec<Rule>, RuleError> {
    let rules = sqlx::query_as::<_, Rule>(
        r#"
        SELECT id, group_id, name, source_company_id, target_company_id,
               source_account, target_account, currency, match_criteria, active, created_at
        FROM elimination_rules
        WHERE group_id = $1 AND active = true
        ORDER BY name
        "#,
    )
    .bind(group_id)
    .fetch_all(pool)
    .await?;

    Ok(rules)
}

