use sqlx::{Postgres, Transaction};
use thiserror::Error;

use crate::repos::account_mapping_repo::{self, AccountMappingError};

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("no account mapping for {module}.{key} (company {company_id})")]
    MappingMissing {
        company_id: String,
        module: String,
        key: String,
    },

    #[error("database error: {0}")]
    Database(#[from] AccountMappingError),
}

/// Resolves the GL account code a domain event should touch, e.g.
/// `resolve(tx, "co-1", "GRN", "inventory")` for the inventory side of a
/// goods-receipt posting.
pub async fn resolve(
    tx: &mut Transaction<'_, Postgres>,
    company_id: &str,
    module: &str,
    key: &str,
) -> Result<String, MappingError> {
    account_mapping_repo::find_account_code_tx(tx, company_id, module, key)
        .await?
        .ok_or_else(|| MappingError::MappingMissing {
            company_id: company_id.to_string(),
            module: module.to_string(),
            key: key.to_string(),
        })
}
