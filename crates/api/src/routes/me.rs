use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use shared::domain::event::Event;
use shared::Result;

use crate::extract::Caller;
use crate::SharedState;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/saved", get(saved))
        .route("/rsvps", get(rsvps))
        .route("/events", get(created))
}

async fn saved(State(state): State<SharedState>, Caller(identity): Caller) -> Result<Json<Vec<Event>>> {
    Ok(Json(state.events.saved(&identity).await?))
}

async fn rsvps(State(state): State<SharedState>, Caller(identity): Caller) -> Result<Json<Vec<Event>>> {
    Ok(Json(state.events.attending(&identity).await?))
}

async fn created(State(state): State<SharedState>, Caller(identity): Caller) -> Result<Json<Vec<Event>>> {
    Ok(Json(state.events.created(&identity).await?))
}
