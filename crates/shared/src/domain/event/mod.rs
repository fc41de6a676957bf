use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub category: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub image_url: Option<String>,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewEvent<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub location: &'a str,
    pub category: Option<&'a str>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub image_url: Option<&'a str>,
}

/// Event as shown to one particular viewer.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct EventDetails {
    #[serde(flatten)]
    pub event: Event,
    pub created_by_username: Option<String>,
    pub is_owner: bool,
    pub user_rsvp_status: Option<bool>,
    pub user_saved: bool,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub image_url: Option<String>,
}

impl CreateEventRequest {
    pub fn validate(&self) -> Result<NewEvent<'_>> {
        let title = non_blank(&self.title);
        let location = non_blank(&self.location);
        let start = non_blank(&self.start_time);
        let end = non_blank(&self.end_time);

        let missing: Vec<&str> = [
            ("title", title.is_none()),
            ("start_time", start.is_none()),
            ("end_time", end.is_none()),
            ("location", location.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        match (title, location, start, end) {
            (Some(title), Some(location), Some(start), Some(end)) => {
                let start_time = parse_timestamp("start_time", start)?;
                let end_time = parse_timestamp("end_time", end)?;
                check_window(start_time, end_time)?;
                Ok(NewEvent {
                    title,
                    description: non_blank(&self.description),
                    location,
                    category: non_blank(&self.category),
                    start_time,
                    end_time,
                    image_url: non_blank(&self.image_url),
                })
            }
            _ => Err(ApiError::InvalidInput(format!(
                "Missing required fields: {}",
                missing.join(", ")
            ))),
        }
    }
}

/// Partial update. Fields not present are left untouched; unknown fields
/// (including `id` and `owner_id`) are ignored.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub image_url: Option<String>,
}

impl EventPatch {
    /// Applies the patch to a copy of `current`, validating the result.
    pub fn apply_to(&self, current: &Event) -> Result<Event> {
        let mut next = current.clone();

        if let Some(title) = &self.title {
            next.title = required_text("title", title)?;
        }
        if let Some(location) = &self.location {
            next.location = required_text("location", location)?;
        }
        if let Some(description) = &self.description {
            next.description = optional_text(description);
        }
        if let Some(category) = &self.category {
            next.category = optional_text(category);
        }
        if let Some(image_url) = &self.image_url {
            next.image_url = optional_text(image_url);
        }
        if let Some(start) = &self.start_time {
            next.start_time = parse_timestamp("start_time", start)?;
        }
        if let Some(end) = &self.end_time {
            next.end_time = parse_timestamp("end_time", end)?;
        }
        check_window(next.start_time, next.end_time)?;

        Ok(next)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn required_text(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}

fn optional_text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn check_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    if end < start {
        return Err(ApiError::InvalidInput("end_time must not be before start_time".into()));
    }
    Ok(())
}

/// Accepts RFC 3339 and the `datetime-local` forms browsers submit,
/// the latter interpreted as UTC.
pub fn parse_timestamp(field: &str, raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| ApiError::InvalidInput(format!("{field} is not a valid timestamp")))
}
