//! Environment-derived configuration for the engine binary.

use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bus_type: String,
    pub nats_url: String,
    pub host: String,
    pub port: u16,
    pub renderer_url: String,
    pub job_worker_count: usize,
    pub job_poll_interval: Duration,
    pub storage_root: String,
    pub cache_ttl: Duration,
    /// Session/CSRF middleware itself lives in the HTTP layer this crate
    /// doesn't own; the core only validates the secrets are present so a
    /// misconfigured deployment fails at start-up rather than downstream.
    pub session_secret: String,
    pub csrf_secret: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let bus_type = env::var("BUS_TYPE").unwrap_or_else(|_| "inmemory".to_string());

        let nats_url = env::var("NATS_URL").unwrap_or_else(|_| "nats://localhost:4222".to_string());

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| "PORT must be a valid u16".to_string())?;

        // Empty by default: the renderer is a collaborator service, and a
        // missing URL surfaces as `RenderError::NotReady` at call time
        // rather than failing start-up.
        let renderer_url = env::var("RENDERER_URL").unwrap_or_default();

        let job_worker_count: usize = env::var("JOB_WORKER_COUNT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(4);

        let job_poll_interval_secs: u64 = env::var("JOB_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2);

        let storage_root = env::var("STORAGE_ROOT").unwrap_or_else(|_| "./storage".to_string());

        let cache_ttl_secs: u64 = env::var("CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300);

        let session_secret = env::var("SESSION_SECRET").map_err(|_| "SESSION_SECRET must be set".to_string())?;
        let csrf_secret = env::var("CSRF_SECRET").map_err(|_| "CSRF_SECRET must be set".to_string())?;

        Ok(Config {
            database_url,
            bus_type,
            nats_url,
            host,
            port,
            renderer_url,
            job_worker_count,
            job_poll_interval: Duration::from_secs(job_poll_interval_secs),
            storage_root,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            session_secret,
            csrf_secret,
        })
    }
}
