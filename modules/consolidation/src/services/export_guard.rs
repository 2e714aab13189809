//! Export endpoints require an explicit export capability and are
//! rate-limited per user (spec §4.9, §6).

use security::{ActorContext, CapabilityGate, ExportRateLimiter, SecurityError};

pub fn authorize_export(
    actor: &ActorContext,
    capability: &str,
    limiter: &ExportRateLimiter,
) -> Result<(), SecurityError> {
    CapabilityGate.require(actor, capability)?;
    limiter.check(&actor.actor_id, capability)
}

#[cfg(test)]
mod tests {
    use super::*;
    use security::capabilities;
    use std::time::Duration;

    fn actor_with(capabilities: &[&str]) -> ActorContext {
        ActorContext {
            actor_id: "user-1".to_string(),
            company_id: "co-1".to_string(),
            capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn rejects_an_actor_without_the_export_capability() {
        let actor = actor_with(&[]);
        let limiter = ExportRateLimiter::new(10, Duration::from_secs(60));
        let err = authorize_export(&actor, capabilities::EXPORT_CSV, &limiter).unwrap_err();
        assert!(matches!(err, SecurityError::MissingCapability { .. }));
    }

    #[test]
    fn rejects_once_the_per_user_rate_limit_is_exceeded() {
        let actor = actor_with(&[capabilities::EXPORT_CSV]);
        let limiter = ExportRateLimiter::new(1, Duration::from_secs(60));
        assert!(authorize_export(&actor, capabilities::EXPORT_CSV, &limiter).is_ok());
        let err = authorize_export(&actor, capabilities::EXPORT_CSV, &limiter).unwrap_err();
        assert!(matches!(err, SecurityError::RateLimited { .. }));
    }
}
