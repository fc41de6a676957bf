use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::SharedState;

pub mod auth;
pub mod events;
pub mod me;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/health", get(health))
        .nest("/api/auth", auth::router())
        .nest("/api/events", events::router())
        .nest("/api/me", me::router())
}

async fn health() -> Json<Value> {
    Json(json!({"status": "API working"}))
}
