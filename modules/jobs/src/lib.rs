//! Typed job queue: a Postgres-backed durable queue with visibility
//! via row locking, exponential-backoff retry, dead-lettering on
//! permanent failure, and cooperative cancellation (spec §4.8).

pub mod handler;
pub mod job_core;
pub mod registry;
pub mod repos;
pub mod retry_policy;
pub mod runtime;

pub use handler::{JobHandler, JobHandlerError};
pub use job_core::{job_types, Job, JobStatus};
pub use registry::JobRegistry;
pub use repos::job_repo;
pub use retry_policy::JobRetryPolicy;
pub use runtime::{should_dead_letter, JobRuntime, RuntimeError};
