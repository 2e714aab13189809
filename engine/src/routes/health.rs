use axum::Json;
use serde_json::Value;

pub async fn health() -> Json<Value> {
    health::health("engine").await
}
