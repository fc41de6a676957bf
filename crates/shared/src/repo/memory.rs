use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::domain::event::{Event, NewEvent};
use crate::domain::rsvp::Attendee;
use crate::domain::user::{NewUser, User};
use crate::error::{ApiError, Result};

use super::Store;

/// In-process reference store. Used when no database is configured and by
/// the test suites. One lock guards every table, so each call is atomic.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

#[derive(Default)]
struct Tables {
    last_user_id: i64,
    last_event_id: i64,
    last_rsvp_seq: u64,
    users: BTreeMap<i64, User>,
    events: BTreeMap<i64, Event>,
    /// Keyed by `(event_id, user_id)`.
    rsvps: BTreeMap<(i64, i64), RsvpRow>,
    /// Keyed by `(user_id, event_id)`.
    saved: BTreeSet<(i64, i64)>,
}

struct RsvpRow {
    attending: bool,
    // Order of first response, standing in for `created_at`.
    seq: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of RSVP rows for the pair; at most one.
    pub async fn rsvp_rows(&self, event_id: i64, user_id: i64) -> usize {
        let t = self.tables.lock().await;
        usize::from(t.rsvps.contains_key(&(event_id, user_id)))
    }

    /// Number of bookmark rows for the pair; at most one.
    pub async fn saved_rows(&self, user_id: i64, event_id: i64) -> usize {
        let t = self.tables.lock().await;
        usize::from(t.saved.contains(&(user_id, event_id)))
    }
}

fn by_start(mut events: Vec<Event>) -> Vec<Event> {
    events.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
    events
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, new: &NewUser<'_>) -> Result<User> {
        let mut t = self.tables.lock().await;
        if t.users.values().any(|u| u.email == new.email) {
            return Err(ApiError::Conflict("Email already registered.".into()));
        }
        t.last_user_id += 1;
        let user = User {
            id: t.last_user_id,
            username: new.username.to_string(),
            email: new.email.to_string(),
            password_hash: new.password_hash.to_string(),
            created_at: Utc::now(),
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let t = self.tables.lock().await;
        Ok(t.users.values().find(|u| u.email == email).cloned())
    }

    async fn insert_event(&self, owner_id: i64, new: &NewEvent<'_>) -> Result<Event> {
        let mut t = self.tables.lock().await;
        if !t.users.contains_key(&owner_id) {
            tracing::error!(owner_id, "event owner does not exist");
            return Err(ApiError::Internal);
        }
        t.last_event_id += 1;
        let event = Event {
            id: t.last_event_id,
            title: new.title.to_string(),
            description: new.description.map(str::to_string),
            location: new.location.to_string(),
            category: new.category.map(str::to_string),
            start_time: new.start_time,
            end_time: new.end_time,
            image_url: new.image_url.map(str::to_string),
            owner_id,
            created_at: Utc::now(),
        };
        t.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn find_event(&self, id: i64) -> Result<Option<Event>> {
        Ok(self.tables.lock().await.events.get(&id).cloned())
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        let t = self.tables.lock().await;
        Ok(by_start(t.events.values().cloned().collect()))
    }

    async fn list_events_by_owner(&self, owner_id: i64) -> Result<Vec<Event>> {
        let t = self.tables.lock().await;
        Ok(by_start(t.events.values().filter(|e| e.owner_id == owner_id).cloned().collect()))
    }

    async fn count_events(&self) -> Result<i64> {
        Ok(self.tables.lock().await.events.len() as i64)
    }

    async fn update_event(&self, event: &Event) -> Result<Option<Event>> {
        let mut t = self.tables.lock().await;
        let Some(stored) = t.events.get_mut(&event.id) else { return Ok(None) };
        *stored = Event { id: stored.id, owner_id: stored.owner_id, created_at: stored.created_at, ..event.clone() };
        Ok(Some(stored.clone()))
    }

    async fn delete_event(&self, id: i64) -> Result<bool> {
        let mut t = self.tables.lock().await;
        if t.events.remove(&id).is_none() {
            return Ok(false);
        }
        t.rsvps.retain(|&(event_id, _), _| event_id != id);
        t.saved.retain(|&(_, event_id)| event_id != id);
        Ok(true)
    }

    async fn upsert_rsvp(&self, event_id: i64, user_id: i64, attending: bool) -> Result<bool> {
        let mut t = self.tables.lock().await;
        if !t.events.contains_key(&event_id) {
            return Err(ApiError::event_not_found());
        }
        t.last_rsvp_seq += 1;
        let seq = t.last_rsvp_seq;
        t.rsvps
            .entry((event_id, user_id))
            .and_modify(|row| row.attending = attending)
            .or_insert(RsvpRow { attending, seq });
        Ok(attending)
    }

    async fn find_rsvp(&self, event_id: i64, user_id: i64) -> Result<Option<bool>> {
        let t = self.tables.lock().await;
        Ok(t.rsvps.get(&(event_id, user_id)).map(|r| r.attending))
    }

    async fn list_attendees(&self, event_id: i64) -> Result<Vec<Attendee>> {
        let t = self.tables.lock().await;
        let mut rows: Vec<_> = t.rsvps.range((event_id, i64::MIN)..=(event_id, i64::MAX)).collect();
        rows.sort_by_key(|(_, row)| row.seq);
        Ok(rows
            .into_iter()
            .filter_map(|(&(_, user_id), row)| {
                t.users.get(&user_id).map(|u| Attendee {
                    user_id: u.id,
                    username: u.username.clone(),
                    email: u.email.clone(),
                    attending: row.attending,
                })
            })
            .collect())
    }

    async fn list_attending_events(&self, user_id: i64) -> Result<Vec<Event>> {
        let t = self.tables.lock().await;
        let events = t
            .rsvps
            .iter()
            .filter(|((_, u), row)| *u == user_id && row.attending)
            .filter_map(|(&(event_id, _), _)| t.events.get(&event_id).cloned())
            .collect();
        Ok(by_start(events))
    }

    async fn save_event(&self, user_id: i64, event_id: i64) -> Result<()> {
        let mut t = self.tables.lock().await;
        if !t.events.contains_key(&event_id) {
            return Err(ApiError::event_not_found());
        }
        t.saved.insert((user_id, event_id));
        Ok(())
    }

    async fn unsave_event(&self, user_id: i64, event_id: i64) -> Result<()> {
        let mut t = self.tables.lock().await;
        t.saved.remove(&(user_id, event_id));
        Ok(())
    }

    async fn is_saved(&self, user_id: i64, event_id: i64) -> Result<bool> {
        Ok(self.tables.lock().await.saved.contains(&(user_id, event_id)))
    }

    async fn list_saved_events(&self, user_id: i64) -> Result<Vec<Event>> {
        let t = self.tables.lock().await;
        let events = t
            .saved
            .range((user_id, i64::MIN)..=(user_id, i64::MAX))
            .filter_map(|(_, event_id)| t.events.get(event_id).cloned())
            .collect();
        Ok(by_start(events))
    }
}
