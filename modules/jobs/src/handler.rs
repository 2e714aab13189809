//! The trait every registered job type implements.

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum JobHandlerError {
    #[error("{0}")]
    Failed(String),

    #[error("cancelled")]
    Cancelled,
}

/// A handler for one registered job type. `handle` receives the opaque
/// payload and a cancellation token it must observe between awaits —
/// on cancellation it releases locks and aborts its transaction rather
/// than completing the work (spec §4.8).
#[async_trait]
pub trait JobHandler: Send + Sync {
    fn job_type(&self) -> &'static str;

    async fn handle(&self, payload: &serde_json::Value, cancel: &CancellationToken) -> Result<(), JobHandlerError>;
}
