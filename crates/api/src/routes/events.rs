use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use shared::domain::event::{Event, EventDetails};
use shared::domain::payload::Payload;
use shared::domain::rsvp::{Attendee, RsvpRequest, RsvpResponse};
use shared::Result;

use crate::extract::{Caller, EventId};
use crate::SharedState;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(get_one).patch(update).delete(remove))
        .route("/:id/rsvp", post(rsvp))
        .route("/:id/attendees", get(attendees))
        .route("/:id/save", post(save).delete(unsave))
}

async fn list(State(state): State<SharedState>) -> Result<Json<Vec<Event>>> {
    Ok(Json(state.events.list().await?))
}

// Write handlers take the raw body: identity and ownership are checked
// before the payload is judged.
async fn create(
    State(state): State<SharedState>,
    Caller(identity): Caller,
    body: Bytes,
) -> Result<(StatusCode, Json<EventDetails>)> {
    let details = state.events.create(&identity, Payload::decode(&body)).await?;
    Ok((StatusCode::CREATED, Json(details)))
}

async fn get_one(
    State(state): State<SharedState>,
    Caller(identity): Caller,
    EventId(id): EventId,
) -> Result<Json<EventDetails>> {
    Ok(Json(state.events.get(&identity, id).await?))
}

async fn update(
    State(state): State<SharedState>,
    Caller(identity): Caller,
    EventId(id): EventId,
    body: Bytes,
) -> Result<Json<EventDetails>> {
    Ok(Json(state.events.update(&identity, id, Payload::decode(&body)).await?))
}

async fn remove(
    State(state): State<SharedState>,
    Caller(identity): Caller,
    EventId(id): EventId,
) -> Result<Json<Value>> {
    state.events.delete(&identity, id).await?;
    Ok(Json(json!({"message": "Event deleted successfully"})))
}

async fn rsvp(
    State(state): State<SharedState>,
    Caller(identity): Caller,
    EventId(id): EventId,
    body: Bytes,
) -> Result<Json<RsvpResponse>> {
    let req = RsvpRequest::from_body(&body);
    Ok(Json(state.events.rsvp(&identity, id, &req).await?))
}

async fn attendees(
    State(state): State<SharedState>,
    Caller(identity): Caller,
    EventId(id): EventId,
) -> Result<Json<Vec<Attendee>>> {
    Ok(Json(state.events.attendees(&identity, id).await?))
}

async fn save(
    State(state): State<SharedState>,
    Caller(identity): Caller,
    EventId(id): EventId,
) -> Result<Json<Value>> {
    state.events.save(&identity, id).await?;
    Ok(Json(json!({"message": "Event saved", "saved": true})))
}

async fn unsave(
    State(state): State<SharedState>,
    Caller(identity): Caller,
    EventId(id): EventId,
) -> Result<Json<Value>> {
    state.events.unsave(&identity, id).await?;
    Ok(Json(json!({"message": "Event removed from saved", "saved": false})))
}
