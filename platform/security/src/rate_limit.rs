use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::SecurityError;

/// Fixed-window token bucket keyed by `(actor_id, capability)`. One
/// instance is shared (behind an `Arc`) across the process; export
/// handlers check it before doing any rendering work.
pub struct ExportRateLimiter {
    limit_per_window: u32,
    window: Duration,
    buckets: DashMap<(String, String), Bucket>,
}

struct Bucket {
    window_started_at: Instant,
    count: u32,
}

impl ExportRateLimiter {
    pub fn new(limit_per_window: u32, window: Duration) -> Self {
        Self {
            limit_per_window,
            window,
            buckets: DashMap::new(),
        }
    }

    /// 10 requests/min per user, per the export rate limit.
    pub fn for_exports() -> Self {
        Self::new(10, Duration::from_secs(60))
    }

    pub fn check(&self, actor_id: &str, capability: &str) -> Result<(), SecurityError> {
        let key = (actor_id.to_string(), capability.to_string());
        let now = Instant::now();

        let mut bucket = self.buckets.entry(key).or_insert_with(|| Bucket {
            window_started_at: now,
            count: 0,
        });

        if now.duration_since(bucket.window_started_at) >= self.window {
            bucket.window_started_at = now;
            bucket.count = 0;
        }

        if bucket.count >= self.limit_per_window {
            return Err(SecurityError::RateLimited {
                actor_id: actor_id.to_string(),
                capability: capability.to_string(),
            });
        }

        bucket.count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_requests_under_the_limit() {
        let limiter = ExportRateLimiter::new(3, Duration::from_secs(60));
        for _ in 0..3 {
            assert!(limiter.check("user-1", "export.csv").is_ok());
        }
    }

    #[test]
    fn rejects_the_request_that_exceeds_the_limit() {
        let limiter = ExportRateLimiter::new(2, Duration::from_secs(60));
        assert!(limiter.check("user-1", "export.csv").is_ok());
        assert!(limiter.check("user-1", "export.csv").is_ok());
        let err = limiter.check("user-1", "export.csv").unwrap_err();
        assert!(matches!(err, SecurityError::RateLimited { .. }));
    }

    #[test]
    fn tracks_each_actor_capability_pair_independently() {
        let limiter = ExportRateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.check("user-1", "export.csv").is_ok());
        assert!(limiter.check("user-1", "export.pdf").is_ok());
        assert!(limiter.check("user-2", "export.csv").is_ok());
    }
}
