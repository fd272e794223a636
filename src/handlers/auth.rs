// src/handlers/auth.rs

use axum::{Extension, Json};

use crate::models::user::Identity;

/// Returns the identity behind the bearer token, or `null` for anonymous visitors.
pub async fn me(Extension(identity): Extension<Option<Identity>>) -> Json<Option<Identity>> {
    Json(identity)
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
