use std::sync::Arc;

use crate::domain::event::{CreateEventRequest, Event, EventDetails, EventPatch};
use crate::domain::payload::Payload;
use crate::domain::rsvp::{Attendee, RsvpRequest, RsvpResponse, RsvpState};
use crate::error::{ApiError, Result};
use crate::identity::Identity;
use crate::policy;
use crate::repo::Store;

/// Event, RSVP and bookmark operations. Every check runs before the first
/// write, so a rejected request never leaves a partial change behind.
#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn Store>,
}

impl EventService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn load(&self, id: i64) -> Result<Event> {
        self.store.find_event(id).await?.ok_or_else(ApiError::event_not_found)
    }

    async fn details(&self, event: Event, identity: &Identity) -> Result<EventDetails> {
        let created_by_username = self.store.find_user(event.owner_id).await?.map(|u| u.username);
        let (user_rsvp_status, user_saved) = match identity.user_id() {
            Some(user_id) => (
                self.store.find_rsvp(event.id, user_id).await?,
                self.store.is_saved(user_id, event.id).await?,
            ),
            None => (None, false),
        };
        Ok(EventDetails {
            is_owner: policy::is_owner(&event, identity),
            event,
            created_by_username,
            user_rsvp_status,
            user_saved,
        })
    }

    pub async fn create(&self, identity: &Identity, req: Payload<CreateEventRequest>) -> Result<EventDetails> {
        let user = identity.require()?;
        let req = req.into_inner()?;
        let new = req.validate()?;
        let event = self.store.insert_event(user.user_id, &new).await?;
        tracing::info!(event_id = event.id, owner_id = user.user_id, "event created");
        self.details(event, identity).await
    }

    pub async fn list(&self) -> Result<Vec<Event>> {
        self.store.list_events().await
    }

    pub async fn get(&self, identity: &Identity, id: i64) -> Result<EventDetails> {
        let event = self.load(id).await?;
        self.details(event, identity).await
    }

    /// The patch body is judged only after the caller is known to own the event.
    pub async fn update(&self, identity: &Identity, id: i64, patch: Payload<EventPatch>) -> Result<EventDetails> {
        let event = self.load(id).await?;
        policy::ensure_owner(&event, identity, "edit this event")?;
        let next = patch.into_inner()?.apply_to(&event)?;
        let updated = self.store.update_event(&next).await?.ok_or_else(ApiError::event_not_found)?;
        tracing::info!(event_id = id, "event updated");
        self.details(updated, identity).await
    }

    pub async fn delete(&self, identity: &Identity, id: i64) -> Result<()> {
        let event = self.load(id).await?;
        policy::ensure_owner(&event, identity, "delete this event")?;
        if !self.store.delete_event(id).await? {
            return Err(ApiError::event_not_found());
        }
        tracing::info!(event_id = id, "event deleted");
        Ok(())
    }

    /// RSVP state machine. Rejections, in order: no identity, unknown
    /// event, caller owns the event, `attending` not a boolean.
    pub async fn rsvp(&self, identity: &Identity, id: i64, req: &RsvpRequest) -> Result<RsvpResponse> {
        identity.require()?;
        let event = self.load(id).await?;
        let user = policy::ensure_can_rsvp(&event, identity)?;
        let attending = req.attending()?;
        let stored = self.store.upsert_rsvp(event.id, user.user_id, attending).await?;
        tracing::info!(event_id = id, user_id = user.user_id, attending = stored, "rsvp recorded");
        Ok(RsvpResponse {
            event_id: event.id,
            user_id: user.user_id,
            attending: stored,
            state: stored.into(),
        })
    }

    pub async fn rsvp_state(&self, identity: &Identity, id: i64) -> Result<RsvpState> {
        let user = identity.require()?;
        let event = self.load(id).await?;
        Ok(self.store.find_rsvp(event.id, user.user_id).await?.into())
    }

    pub async fn attendees(&self, identity: &Identity, id: i64) -> Result<Vec<Attendee>> {
        let event = self.load(id).await?;
        policy::ensure_owner(&event, identity, "view attendees")?;
        self.store.list_attendees(event.id).await
    }

    pub async fn save(&self, identity: &Identity, id: i64) -> Result<()> {
        let user = identity.require()?;
        let event = self.load(id).await?;
        self.store.save_event(user.user_id, event.id).await
    }

    pub async fn unsave(&self, identity: &Identity, id: i64) -> Result<()> {
        let user = identity.require()?;
        let event = self.load(id).await?;
        self.store.unsave_event(user.user_id, event.id).await
    }

    pub async fn saved(&self, identity: &Identity) -> Result<Vec<Event>> {
        let user = identity.require()?;
        self.store.list_saved_events(user.user_id).await
    }

    pub async fn attending(&self, identity: &Identity) -> Result<Vec<Event>> {
        let user = identity.require()?;
        self.store.list_attending_events(user.user_id).await
    }

    pub async fn created(&self, identity: &Identity) -> Result<Vec<Event>> {
        let user = identity.require()?;
        self.store.list_events_by_owner(user.user_id).await
    }
}
