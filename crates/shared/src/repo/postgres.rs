use async_trait::async_trait;

use crate::db::pool::Db;
use crate::domain::event::{Event, NewEvent};
use crate::domain::rsvp::Attendee;
use crate::domain::user::{NewUser, User};
use crate::error::{ApiError, Result};

use super::Store;

const EVENT_COLUMNS: &str = "e.id, e.title, e.description, e.location, e.category, e.start_time, \
     e.end_time, e.image_url, e.owner_id, e.created_at";

/// Postgres-backed store. Composite-key uniqueness on `rsvps` and
/// `saved_events` is enforced by their primary keys.
#[derive(Clone)]
pub struct PgStore { pub db: Db }

impl PgStore {
    pub fn new(db: Db) -> Self { Self { db } }

    async fn events_where(&self, clause: &str, id: i64) -> Result<Vec<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events e {clause} ORDER BY e.start_time ASC, e.id ASC");
        Ok(sqlx::query_as::<_, Event>(&sql).bind(id).fetch_all(&self.db.0).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, new: &NewUser<'_>) -> Result<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, password_hash) VALUES ($1,$2,$3) \
             RETURNING id, username, email, password_hash, created_at",
        )
        .bind(new.username)
        .bind(new.email)
        .bind(new.password_hash)
        .fetch_one(&self.db.0)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => ApiError::Conflict("Email already registered.".into()),
            other => other,
        })
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE id=$1",
        )
        .bind(id)
        .fetch_optional(&self.db.0)
        .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE email=$1",
        )
        .bind(email)
        .fetch_optional(&self.db.0)
        .await?)
    }

    async fn insert_event(&self, owner_id: i64, new: &NewEvent<'_>) -> Result<Event> {
        Ok(sqlx::query_as::<_, Event>(
            r#"INSERT INTO events (title, description, location, category, start_time, end_time, image_url, owner_id)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            RETURNING id, title, description, location, category, start_time, end_time, image_url, owner_id, created_at"#,
        )
        .bind(new.title)
        .bind(new.description)
        .bind(new.location)
        .bind(new.category)
        .bind(new.start_time)
        .bind(new.end_time)
        .bind(new.image_url)
        .bind(owner_id)
        .fetch_one(&self.db.0)
        .await?)
    }

    async fn find_event(&self, id: i64) -> Result<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events e WHERE e.id=$1");
        Ok(sqlx::query_as::<_, Event>(&sql).bind(id).fetch_optional(&self.db.0).await?)
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events e ORDER BY e.start_time ASC, e.id ASC");
        Ok(sqlx::query_as::<_, Event>(&sql).fetch_all(&self.db.0).await?)
    }

    async fn list_events_by_owner(&self, owner_id: i64) -> Result<Vec<Event>> {
        self.events_where("WHERE e.owner_id=$1", owner_id).await
    }

    async fn count_events(&self) -> Result<i64> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events").fetch_one(&self.db.0).await?)
    }

    async fn update_event(&self, event: &Event) -> Result<Option<Event>> {
        Ok(sqlx::query_as::<_, Event>(
            r#"UPDATE events SET title=$2, description=$3, location=$4, category=$5,
                   start_time=$6, end_time=$7, image_url=$8
            WHERE id=$1
            RETURNING id, title, description, location, category, start_time, end_time, image_url, owner_id, created_at"#,
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(&event.category)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(&event.image_url)
        .fetch_optional(&self.db.0)
        .await?)
    }

    async fn delete_event(&self, id: i64) -> Result<bool> {
        let res = sqlx::query("DELETE FROM events WHERE id=$1").bind(id).execute(&self.db.0).await?;
        Ok(res.rows_affected() > 0)
    }

    async fn upsert_rsvp(&self, event_id: i64, user_id: i64, attending: bool) -> Result<bool> {
        Ok(sqlx::query_scalar::<_, bool>(
            r#"INSERT INTO rsvps (event_id, user_id, attending) VALUES ($1,$2,$3)
            ON CONFLICT (event_id, user_id)
            DO UPDATE SET attending = EXCLUDED.attending, updated_at = NOW()
            RETURNING attending"#,
        )
        .bind(event_id)
        .bind(user_id)
        .bind(attending)
        .fetch_one(&self.db.0)
        .await?)
    }

    async fn find_rsvp(&self, event_id: i64, user_id: i64) -> Result<Option<bool>> {
        Ok(sqlx::query_scalar::<_, bool>(
            "SELECT attending FROM rsvps WHERE event_id=$1 AND user_id=$2",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.db.0)
        .await?)
    }

    async fn list_attendees(&self, event_id: i64) -> Result<Vec<Attendee>> {
        Ok(sqlx::query_as::<_, Attendee>(
            r#"SELECT r.user_id, u.username, u.email, r.attending
            FROM rsvps r JOIN users u ON u.id = r.user_id
            WHERE r.event_id=$1
            ORDER BY r.created_at ASC, r.user_id ASC"#,
        )
        .bind(event_id)
        .fetch_all(&self.db.0)
        .await?)
    }

    async fn list_attending_events(&self, user_id: i64) -> Result<Vec<Event>> {
        self.events_where(
            "JOIN rsvps r ON r.event_id = e.id WHERE r.user_id=$1 AND r.attending",
            user_id,
        )
        .await
    }

    async fn save_event(&self, user_id: i64, event_id: i64) -> Result<()> {
        sqlx::query(
            "INSERT INTO saved_events (user_id, event_id) VALUES ($1,$2) ON CONFLICT (user_id, event_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(event_id)
        .execute(&self.db.0)
        .await?;
        Ok(())
    }

    async fn unsave_event(&self, user_id: i64, event_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM saved_events WHERE user_id=$1 AND event_id=$2")
            .bind(user_id)
            .bind(event_id)
            .execute(&self.db.0)
            .await?;
        Ok(())
    }

    async fn is_saved(&self, user_id: i64, event_id: i64) -> Result<bool> {
        Ok(sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM saved_events WHERE user_id=$1 AND event_id=$2)",
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_one(&self.db.0)
        .await?)
    }

    async fn list_saved_events(&self, user_id: i64) -> Result<Vec<Event>> {
        self.events_where("JOIN saved_events s ON s.event_id = e.id WHERE s.user_id=$1", user_id).await
    }
}
