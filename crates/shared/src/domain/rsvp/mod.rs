use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::payload::Payload;
use crate::error::{ApiError, Result};

/// Response state of one (user, event) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsvpState {
    NoResponse,
    Attending,
    NotAttending,
}

impl From<Option<bool>> for RsvpState {
    fn from(flag: Option<bool>) -> Self {
        match flag {
            None => RsvpState::NoResponse,
            Some(true) => RsvpState::Attending,
            Some(false) => RsvpState::NotAttending,
        }
    }
}

impl From<bool> for RsvpState {
    fn from(flag: bool) -> Self {
        Some(flag).into()
    }
}

impl RsvpState {
    pub fn as_flag(self) -> Option<bool> {
        match self {
            RsvpState::NoResponse => None,
            RsvpState::Attending => Some(true),
            RsvpState::NotAttending => Some(false),
        }
    }
}

/// Raw RSVP body. `attending` is kept untyped so a non-boolean is reported
/// as invalid input instead of being coerced or rejected by the decoder.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct RsvpRequest {
    #[serde(default)]
    pub attending: Option<Value>,
}

impl RsvpRequest {
    pub fn new(attending: bool) -> Self {
        Self { attending: Some(Value::Bool(attending)) }
    }

    /// Decodes a raw body without failing; a body that is not a JSON object
    /// surfaces later as a missing `attending`.
    pub fn from_body(body: &[u8]) -> Self {
        Payload::decode(body).into_inner().unwrap_or_default()
    }

    pub fn attending(&self) -> Result<bool> {
        match &self.attending {
            Some(Value::Bool(flag)) => Ok(*flag),
            Some(_) => Err(ApiError::InvalidInput("attending must be a boolean".into())),
            None => Err(ApiError::InvalidInput("attending is required".into())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RsvpResponse {
    pub event_id: i64,
    pub user_id: i64,
    pub attending: bool,
    pub state: RsvpState,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Attendee {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub attending: bool,
}
