//! Actor identity and capability checks shared across the core.
//!
//! RBAC policy evaluation itself is out of scope here — this crate treats
//! a capability as an opaque string the caller already resolved, and
//! exposes only the check and the plumbing to get it off a request.

pub mod capabilities;
mod claims;
mod rate_limit;

use std::collections::HashSet;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub use claims::{decode_access_token, AccessClaims};
pub use rate_limit::ExportRateLimiter;

#[derive(Debug, Clone)]
pub struct ActorContext {
    pub actor_id: String,
    pub company_id: String,
    pub capabilities: HashSet<String>,
}

impl ActorContext {
    /// Construct the context a background job runs as. Job types never
    /// carry a bearer token, so they get the full capability set for
    /// the company they're operating on.
    pub fn system(company_id: impl Into<String>, job_type: &str, capabilities: &[&str]) -> Self {
        Self {
            actor_id: format!("system:{job_type}"),
            company_id: company_id.into(),
            capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn has(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }
}

#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("missing or malformed bearer token")]
    MissingToken,

    #[error("token verification failed: {0}")]
    InvalidToken(String),

    #[error("actor {actor_id} lacks capability {capability}")]
    MissingCapability {
        actor_id: String,
        capability: String,
    },

    #[error("rate limit exceeded for {actor_id} on {capability}")]
    RateLimited {
        actor_id: String,
        capability: String,
    },
}

impl IntoResponse for SecurityError {
    fn into_response(self) -> Response {
        let status = match &self {
            SecurityError::MissingToken | SecurityError::InvalidToken(_) => {
                StatusCode::UNAUTHORIZED
            }
            SecurityError::MissingCapability { .. } => StatusCode::FORBIDDEN,
            SecurityError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        };
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Opaque capability check: the `ActorContext` either carries the
/// capability or it doesn't. No policy evaluation happens here.
#[derive(Debug, Default, Clone, Copy)]
pub struct CapabilityGate;

impl CapabilityGate {
    pub fn require(&self, ctx: &ActorContext, capability: &str) -> Result<(), SecurityError> {
        if ctx.has(capability) {
            Ok(())
        } else {
            Err(SecurityError::MissingCapability {
                actor_id: ctx.actor_id.clone(),
                capability: capability.to_string(),
            })
        }
    }
}

/// Axum middleware handler: resolves the bearer token into an
/// `ActorContext`, checks the capability carried in `State`, and
/// inserts the context into request extensions for downstream handlers.
/// Rejects before `next` runs on any failure — nothing behind this
/// middleware executes for an actor that doesn't have the capability.
///
/// Wire it in with `axum::middleware::from_fn_with_state(capability, require_capability)`
/// per route, since the capability differs by route.
pub async fn require_capability(
    State(capability): State<&'static str>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let token = match header {
        Some(t) => t,
        None => return SecurityError::MissingToken.into_response(),
    };

    let claims = match decode_access_token(token) {
        Ok(c) => c,
        Err(e) => return SecurityError::InvalidToken(e).into_response(),
    };

    let ctx = ActorContext {
        actor_id: claims.sub,
        company_id: claims.company_id,
        capabilities: claims.capabilities.into_iter().collect(),
    };

    if let Err(e) = CapabilityGate.require(&ctx, capability) {
        tracing::warn!(
            actor_id = %ctx.actor_id,
            capability = %capability,
            "capability check failed"
        );
        return e.into_response();
    }

    request.extensions_mut().insert(ctx);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_with(capabilities: &[&str]) -> ActorContext {
        ActorContext {
            actor_id: "user-1".to_string(),
            company_id: "co-1".to_string(),
            capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn gate_allows_a_held_capability() {
        let ctx = ctx_with(&[capabilities::DOCUMENT_GRN_POST]);
        assert!(CapabilityGate.require(&ctx, capabilities::DOCUMENT_GRN_POST).is_ok());
    }

    #[test]
    fn gate_rejects_a_missing_capability() {
        let ctx = ctx_with(&[capabilities::DOCUMENT_GRN_POST]);
        let err = CapabilityGate
            .require(&ctx, capabilities::EXPORT_CSV)
            .unwrap_err();
        assert!(matches!(err, SecurityError::MissingCapability { .. }));
    }

    #[test]
    fn system_actor_id_is_namespaced_by_job_type() {
        let ctx = ActorContext::system("co-1", "variance-snapshot", &[capabilities::VARIANCE_RUN]);
        assert_eq!(ctx.actor_id, "system:variance-snapshot");
        assert!(ctx.has(capabilities::VARIANCE_RUN));
    }
}
