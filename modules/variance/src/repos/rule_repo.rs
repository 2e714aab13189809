//! Repository for variance rules and their (account, budget) lines.

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::variance_core::{Rule, RuleLine};

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("variance rule not found: {0}")]
    NotFound(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub async fn insert(pool: &PgPool, company_id: &str, name: &str, lines: &[RuleLine]) -> Result<Rule, RuleError> {
    let mut tx = pool.begin().await?;

    let rule = sqlx::query_as::<_, Rule>(
        r#"
        INSERT INTO variance_rules (id, company_id, name, created_at)
        VALUES ($1, $2, $3, NOW())
        RETURNING id, company_id, name, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(company_id)
    .bind(name)
    .fetch_one(&mut *tx)
    .await?;

    for line in lines {
        sqlx::query(
            r#"
            INSERT INTO variance_rule_lines (rule_id, account_code, budget_minor)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(rule.id)
        .bind(&line.account_code)
        .bind(line.budget_minor)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(rule)
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Rule>, RuleError> {
    let rule = sqlx::query_as::<_, Rule>(
        r#"SELECT id, company_id, name, created_at FROM variance_rules WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(rule)
}

pub async fn find_lines(pool: &PgPool, rule_id: Uuid) -> Result<Vec<RuleLine>, RuleError> {
    let lines = sqlx::query_as::<_, RuleLine>(
        r#"SELECT account_code, budget_minor FROM variance_rule_lines WHERE rule_id = $1 ORDER BY account_code"#,
    )
    .bind(rule_id)
    .fetch_all(pool)
    .await?;

    Ok(lines)
}
