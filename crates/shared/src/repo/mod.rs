use async_trait::async_trait;

use crate::domain::event::{Event, NewEvent};
use crate::domain::rsvp::Attendee;
use crate::domain::user::{NewUser, User};
use crate::error::Result;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Persistence for users, events and their RSVP and bookmark join rows.
///
/// RSVP and bookmark writes must be atomic per composite key: concurrent
/// writers for the same pair never produce two rows, and the last committed
/// write wins.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a user; a taken email is a `Conflict`
    async fn insert_user(&self, new: &NewUser<'_>) -> Result<User>;

    async fn find_user(&self, id: i64) -> Result<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn insert_event(&self, owner_id: i64, new: &NewEvent<'_>) -> Result<Event>;

    async fn find_event(&self, id: i64) -> Result<Option<Event>>;

    /// All events, earliest start first
    async fn list_events(&self) -> Result<Vec<Event>>;

    async fn list_events_by_owner(&self, owner_id: i64) -> Result<Vec<Event>>;

    async fn count_events(&self) -> Result<i64>;

    /// Overwrite the mutable fields of an existing event. `id` and
    /// `owner_id` are never written. Returns `None` if the event is gone.
    async fn update_event(&self, event: &Event) -> Result<Option<Event>>;

    /// Delete an event with its RSVPs and bookmarks. Returns whether a row was removed.
    async fn delete_event(&self, id: i64) -> Result<bool>;

    /// Insert or overwrite the RSVP for (event, user), returning the stored flag
    async fn upsert_rsvp(&self, event_id: i64, user_id: i64, attending: bool) -> Result<bool>;

    async fn find_rsvp(&self, event_id: i64, user_id: i64) -> Result<Option<bool>>;

    /// Every RSVP row of an event, in the order they were first created
    async fn list_attendees(&self, event_id: i64) -> Result<Vec<Attendee>>;

    /// Events the user RSVP'd `attending = true` to
    async fn list_attending_events(&self, user_id: i64) -> Result<Vec<Event>>;

    /// Idempotent: an existing bookmark is left as is
    async fn save_event(&self, user_id: i64, event_id: i64) -> Result<()>;

    /// Idempotent: removing a missing bookmark is a no-op
    async fn unsave_event(&self, user_id: i64, event_id: i64) -> Result<()>;

    async fn is_saved(&self, user_id: i64, event_id: i64) -> Result<bool>;

    async fn list_saved_events(&self, user_id: i64) -> Result<Vec<Event>>;
}
