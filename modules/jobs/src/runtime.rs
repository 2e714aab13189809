//! Worker loop: N tasks claim jobs in parallel, dispatch to the
//! registered handler, and apply the retry/dead-letter policy on
//! failure (spec §4.8).

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::job_core::Job;
use crate::registry::JobRegistry;
use crate::repos::job_repo;
use crate::retry_policy::JobRetryPolicy;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Job(#[from] job_repo::JobError),
}

/// On permanent failure (attempt == max) the job moves to dead-letter
/// instead of being retried again (spec §4.8).
pub fn should_dead_letter(attempt: i32, max_attempts: i32) -> bool {
    attempt >= max_attempts
}

pub struct JobRuntime {
    pool: PgPool,
    registry: Arc<JobRegistry>,
    retry_policy: JobRetryPolicy,
}

impl JobRuntime {
    pub fn new(pool: PgPool, registry: Arc<JobRegistry>, retry_policy: JobRetryPolicy) -> Self {
        Self { pool, registry, retry_policy }
    }

    /// Claims and runs at most one due job. `Ok(false)` means nothing
    /// was due.
    pub async fn run_once(&self, cancel: &CancellationToken) -> Result<bool, RuntimeError> {
        let mut tx = self.pool.begin().await.map_err(job_repo::JobError::Database)?;
        let job = job_repo::claim_next(&mut tx).await?;
        tx.commit().await.map_err(job_repo::JobError::Database)?;

        let Some(job) = job else { return Ok(false) };

        let Some(handler) = self.registry.get(&job.job_type) else {
            self.finish_failed(&job, &format!("no handler registered for job type {}", job.job_type)).await?;
            return Ok(true);
        };

        if let Some(key) = &job.idempotency_key {
            if job_repo::has_succeeded_with_key(&self.pool, &job.job_type, key).await? {
                job_repo::mark_succeeded(&self.pool, job.id).await?;
                return Ok(true);
            }
        }

        match handler.handle(&job.payload, cancel).await {
            Ok(()) => job_repo::mark_succeeded(&self.pool, job.id).await?,
            Err(err) => self.finish_failed(&job, &err.to_string()).await?,
        }

        Ok(true)
    }

    async fn finish_failed(&self, job: &Job, error: &str) -> Result<(), RuntimeError> {
        if should_dead_letter(job.attempt, job.max_attempts) {
            job_repo::mark_dead_letter(&self.pool, job.id, error).await?;
            return Ok(());
        }

        let backoff = self.retry_policy.next_backoff(job.attempt);
        let run_after = chrono::Utc::now() + chrono::Duration::from_std(backoff).unwrap_or_default();
        job_repo::mark_for_retry(&self.pool, job.id, error, run_after).await?;
        Ok(())
    }

    /// Runs `worker_count` tasks until `cancel` fires, polling every
    /// `poll_interval` when the queue is empty.
    pub async fn run_workers(self: Arc<Self>, worker_count: usize, poll_interval: Duration, cancel: CancellationToken) {
        let mut handles = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            let runtime = self.clone();
            let cancel = cancel.clone();
            handles.push(tokio::spawn(async move {
                loop {
                    if cancel.is_cancelled() {
                        break;
                    }
                    match runtime.run_once(&cancel).await {
                        Ok(true) => continue,
                        Ok(false) => {
                            tokio::select! {
                                _ = tokio::time::sleep(poll_interval) => {}
                                _ = cancel.cancelled() => break,
                            }
                        }
                        Err(err) => {
                            tracing::error!(error = %err, "job runtime worker error");
                            tokio::time::sleep(poll_interval).await;
                        }
                    }
                }
            }));
        }

        for handle in handles {
            let _ = handle.await;
        }
    }
}
