//! Idempotency-key middleware for mutating endpoints (job submission,
//! elimination runs, etc). Ported from the AR module's
//! `check_idempotency`, keyed on the authenticated actor rather than a
//! placeholder app id, and backed by this binary's own
//! `engine_idempotency_keys` table rather than AR's.

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value as JsonValue};
use sha2::{Digest, Sha256};
use sqlx::{FromRow, PgPool};

use security::ActorContext;

const REPLAY_TTL_HOURS: i64 = 24;

#[derive(Debug, FromRow)]
struct IdempotencyRecord {
    response_body: JsonValue,
    status_code: i32,
}

/// Buffers and replays 2xx responses keyed on `(actor_id, Idempotency-Key)`.
/// Requests without the header, and non-mutating methods, pass through
/// untouched. Runs after capability middleware so `ActorContext` is
/// already in request extensions; requests with no context fall back to
/// an `"anonymous"` bucket (unauthenticated routes never mutate).
pub async fn check_idempotency(State(pool): State<PgPool>, request: Request, next: Next) -> Response {
    let idempotency_key = match request
        .headers()
        .get("Idempotency-Key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
    {
        Some(key) => key,
        None => return next.run(request).await,
    };

    if !matches!(request.method().as_str(), "POST" | "PUT" | "PATCH" | "DELETE") {
        return next.run(request).await;
    }

    let actor_id = request
        .extensions()
        .get::<ActorContext>()
        .map(|ctx| ctx.actor_id.clone())
        .unwrap_or_else(|| "anonymous".to_string());

    match find_existing(&pool, &actor_id, &idempotency_key).await {
        Ok(Some(cached)) => {
            let status = StatusCode::from_u16(cached.status_code as u16).unwrap_or(StatusCode::OK);
            return (status, Json(cached.response_body)).into_response();
        }
        Ok(None) => {}
        Err(err) => {
            tracing::error!(error = %err, "idempotency lookup failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "idempotency lookup failed" })))
                .into_response();
        }
    }

    let response = next.run(request).await;
    let status_code = response.status().as_u16();

    if !(200..300).contains(&status_code) {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "failed to buffer response" })))
                .into_response();
        }
    };

    let response_body: JsonValue =
        serde_json::from_slice(&bytes).unwrap_or_else(|_| json!({ "raw": String::from_utf8_lossy(&bytes) }));
    let request_hash = format!("{:x}", Sha256::digest(idempotency_key.as_bytes()));
    let expires_at = Utc::now() + Duration::hours(REPLAY_TTL_HOURS);

    if let Err(err) =
        store(&pool, &actor_id, &idempotency_key, &request_hash, &response_body, status_code as i32, expires_at).await
    {
        tracing::warn!(error = %err, "failed to persist idempotency record");
    }

    Response::from_parts(parts, Body::from(bytes))
}

async fn find_existing(
    pool: &PgPool,
    actor_id: &str,
    idempotency_key: &str,
) -> Result<Option<IdempotencyRecord>, sqlx::Error> {
    sqlx::query_as::<_, IdempotencyRecord>(
        r#"
        SELECT response_body, status_code
        FROM engine_idempotency_keys
        WHERE actor_id = $1 AND idempotency_key = $2 AND expires_at > NOW()
        "#,
    )
    .bind(actor_id)
    .bind(idempotency_key)
    .fetch_optional(pool)
    .await
}

#[allow(clippy::too_many_arguments)]
async fn store(
    pool: &PgPool,
    actor_id: &str,
    idempotency_key: &str,
    request_hash: &str,
    response_body: &JsonValue,
    status_code: i32,
    expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO engine_idempotency_keys
            (actor_id, idempotency_key, request_hash, response_body, status_code, created_at, expires_at)
        VALUES ($1, $2, $3, $4, $5, NOW(), $6)
        ON CONFLICT (actor_id, idempotency_key) DO NOTHING
        "#,
    )
    .bind(actor_id)
    .bind(idempotency_key)
    .bind(request_hash)
    .bind(response_body)
    .bind(status_code)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}
