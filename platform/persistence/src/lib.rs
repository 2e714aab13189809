//! Connection pool construction and the transactional-scope helper every
//! mutating service function in this workspace goes through.

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use std::future::Future;
use std::time::Duration;

/// Build the shared Postgres pool. Override `DB_MAX_CONNECTIONS` down
/// for a test suite that spins up many processes against the same
/// database; the default suits a single long-lived server process.
pub async fn init_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let max_connections: u32 = std::env::var("DB_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    let min_connections: u32 = std::env::var("DB_MIN_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    let acquire_timeout_secs: u64 = std::env::var("DB_ACQUIRE_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3);

    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(min_connections)
        .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// Run `f` inside a transaction, committing on `Ok` and rolling back on
/// `Err`. This is the seam that keeps a document mutation and its GL/
/// inventory integration-hook effects in one atomic unit: callers pass a
/// closure that drives the whole chain of repo calls before returning.
pub async fn with_tx<F, Fut, T, E>(pool: &PgPool, f: F) -> Result<T, E>
where
    F: FnOnce(&mut Transaction<'_, Postgres>) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: From<sqlx::Error>,
{
    let mut tx = pool.begin().await?;
    match f(&mut tx).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "rollback failed after operation error");
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_pool_reads_max_connections_default() {
        std::env::remove_var("DB_MAX_CONNECTIONS");
        assert_eq!(
            std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            10
        );
    }
}
