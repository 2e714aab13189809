//! Retry/backoff policy for the job runtime (spec §4.8). Same shape as
//! `event_bus::consumer_retry::RetryConfig` but re-tuned to the spec's
//! own numbers — a distinct, spec-sized type, not a reuse of the event
//! bus's transport-level default.

use std::time::Duration;

use rand::Rng;

#[derive(Debug, Clone, Copy)]
pub struct JobRetryPolicy {
    pub base: Duration,
    pub cap: Duration,
    pub jitter_pct: f64,
    pub max_attempts: i32,
}

impl Default for JobRetryPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(30),
            cap: Duration::from_secs(15 * 60),
            jitter_pct: 0.2,
            max_attempts: 5,
        }
    }
}

impl JobRetryPolicy {
    /// Exponential backoff before jitter: `base * 2^(attempt - 1)`, capped.
    /// `attempt` is the attempt number that just failed (1-based).
    pub fn backoff_without_jitter(&self, attempt: i32) -> Duration {
        let exponent = (attempt - 1).max(0) as u32;
        let scaled = self.base.saturating_mul(1u32.checked_shl(exponent).unwrap_or(u32::MAX));
        std::cmp::min(scaled, self.cap)
    }

    /// Applies `±jitter_pct` uniform jitter to a backoff duration.
    pub fn apply_jitter(&self, backoff: Duration, rng: &mut impl Rng) -> Duration {
        let factor = 1.0 + rng.gen_range(-self.jitter_pct..=self.jitter_pct);
        Duration::from_secs_f64((backoff.as_secs_f64() * factor).max(0.0))
    }

    /// Next backoff with jitter applied, using the thread-local RNG.
    pub fn next_backoff(&self, attempt: i32) -> Duration {
        self.apply_jitter(self.backoff_without_jitter(attempt), &mut rand::thread_rng())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_retry_uses_the_base_delay() {
        let policy = JobRetryPolicy::default();
        assert_eq!(policy.backoff_without_jitter(1), Duration::from_secs(30));
    }

    #[test]
    fn backoff_doubles_then_caps_at_fifteen_minutes() {
        let policy = JobRetryPolicy::default();
        assert_eq!(policy.backoff_without_jitter(2), Duration::from_secs(60));
        assert_eq!(policy.backoff_without_jitter(3), Duration::from_secs(120));
        // 30s * 2^5 = 960s > 900s cap
        assert_eq!(policy.backoff_without_jitter(6), Duration::from_secs(15 * 60));
    }

    #[test]
    fn jitter_stays_within_twenty_percent_of_the_base_backoff() {
        let policy = JobRetryPolicy::default();
        let backoff = policy.backoff_without_jitter(1);
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let jittered = policy.apply_jitter(backoff, &mut rng);
            assert!(jittered.as_secs_f64() >= backoff.as_secs_f64() * 0.8 - 0.01);
            assert!(jittered.as_secs_f64() <= backoff.as_secs_f64() * 1.2 + 0.01);
        }
    }
}
