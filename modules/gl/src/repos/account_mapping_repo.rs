use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccountMappingError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Resolves `(module, key)` to an account code, preferring a mapping
/// scoped to `company_id` and falling back to the default mapping row
/// (`company_id IS NULL`) when no company-specific row exists.
pub async fn find_account_code_tx(
    tx: &mut Transaction<'_, Postgres>,
    company_id: &str,
    module: &str,
    key: &str,
) -> Result<Option<String>, AccountMappingError> {
    let account_code: Option<String> = sqlx::query_scalar(
        r#"
        SELECT account_code FROM account_mappings
        WHERE module = $2 AND mapping_key = $3
          AND (company_id = $1 OR company_id IS NULL)
        ORDER BY company_id NULLS LAST
        LIMIT 1
        "#,
    )
    .bind(company_id)
    .bind(module)
    .bind(key)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(account_code)
}

pub async fn find_account_code(
    pool: &PgPool,
    company_id: &str,
    module: &str,
    key: &str,
) -> Result<Option<String>, AccountMappingError> {
    let account_code: Option<String> = sqlx::query_scalar(
        r#"
        SELECT account_code FROM account_mappings
        WHERE module = $2 AND mapping_key = $3
          AND (company_id = $1 OR company_id IS NULL)
        ORDER BY company_id NULLS LAST
        LIMIT 1
        "#,
    )
    .bind(company_id)
    .bind(module)
    .bind(key)
    .fetch_optional(pool)
    .await?;

    Ok(account_code)
}
