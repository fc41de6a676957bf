//! Ownership rules for events. Every handler that gates on ownership goes
//! through these predicates.

use crate::domain::event::Event;
use crate::error::{ApiError, Result};
use crate::identity::{AuthUser, Identity};

/// True only for an authenticated requester who created the event.
pub fn is_owner(event: &Event, identity: &Identity) -> bool {
    identity.user_id() == Some(event.owner_id)
}

/// Owner-only actions (edit, delete, attendee list). Anonymous callers are
/// treated as non-owners and get `Forbidden`.
pub fn ensure_owner<'a>(event: &Event, identity: &'a Identity, action: &str) -> Result<&'a AuthUser> {
    match identity {
        Identity::Authenticated(user) if user.user_id == event.owner_id => Ok(user),
        _ => {
            tracing::debug!(event_id = event.id, user_id = ?identity.user_id(), action, "not the event owner");
            Err(ApiError::Forbidden(format!("Only the event creator can {action}")))
        }
    }
}

/// RSVP is reserved for authenticated users who do not own the event.
pub fn ensure_can_rsvp<'a>(event: &Event, identity: &'a Identity) -> Result<&'a AuthUser> {
    let user = identity.require()?;
    if user.user_id == event.owner_id {
        tracing::debug!(event_id = event.id, user_id = user.user_id, "owner tried to rsvp");
        return Err(ApiError::Forbidden("Event creators cannot RSVP to their own event".into()));
    }
    Ok(user)
}
