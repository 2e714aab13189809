//! Covers the retry/dead-letter boundary and handler dispatch without a
//! database.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use jobs::{should_dead_letter, JobHandler, JobHandlerError, JobRegistry, JobRetryPolicy};
use tokio_util::sync::CancellationToken;

struct CountingHandler {
    calls: AtomicUsize,
}

#[async_trait]
impl JobHandler for CountingHandler {
    fn job_type(&self) -> &'static str {
        "variance:snapshot"
    }

    async fn handle(&self, _payload: &serde_json::Value, _cancel: &CancellationToken) -> Result<(), JobHandlerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn registry_dispatches_to_the_handler_registered_for_its_type() {
    let handler = Arc::new(CountingHandler { calls: AtomicUsize::new(0) });
    let mut registry = JobRegistry::new();
    registry.register(handler.clone());

    let found = registry.get("variance:snapshot").expect("handler should be registered");
    found.handle(&serde_json::json!({}), &CancellationToken::new()).await.unwrap();

    assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    assert!(registry.get("report:render-pdf").is_none());
}

#[test]
fn an_exhausted_attempt_count_moves_to_dead_letter() {
    assert!(should_dead_letter(5, 5));
    assert!(!should_dead_letter(4, 5));
}

#[test]
fn default_retry_policy_matches_the_documented_numbers() {
    let policy = JobRetryPolicy::default();
    assert_eq!(policy.max_attempts, 5);
    assert_eq!(policy.base.as_secs(), 30);
    assert_eq!(policy.cap.as_secs(), 15 * 60);
}
