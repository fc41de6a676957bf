use anyhow::Result;
use chrono::{Duration, SecondsFormat, Utc};

use crate::auth::password::hash_password;
use crate::domain::event::CreateEventRequest;
use crate::domain::user::NewUser;
use crate::repo::Store;

pub const DEMO_EMAIL: &str = "demo@campus.example";
pub const DEMO_PASSWORD: &str = "demo-password";

pub async fn seed(store: &dyn Store, bcrypt_cost: u32) -> Result<()> {
    // idempotent: any existing event means the store was already seeded
    if store.count_events().await? > 0 {
        return Ok(());
    }

    let owner = match store.find_user_by_email(DEMO_EMAIL).await? {
        Some(u) => u,
        None => {
            let hash = hash_password(DEMO_PASSWORD, bcrypt_cost).await?;
            store
                .insert_user(&NewUser { username: "demo", email: DEMO_EMAIL, password_hash: &hash })
                .await?
        }
    };

    let now = Utc::now();
    let at = |hours: i64| Some((now + Duration::hours(hours)).to_rfc3339_opts(SecondsFormat::Secs, true));
    let demos = [
        ("Welcome Week Mixer", "Student Union", "Social", 48, 51),
        ("Intro to Rust Workshop", "Engineering Hall 101", "Workshop", 72, 74),
        ("Career Fair", "Main Gym", "Career", 120, 126),
    ];
    for (title, location, category, start, end) in demos {
        let req = CreateEventRequest {
            title: Some(title.into()),
            description: Some(format!("{title} (demo)")),
            location: Some(location.into()),
            category: Some(category.into()),
            start_time: at(start),
            end_time: at(end),
            image_url: None,
        };
        store.insert_event(owner.id, &req.validate()?).await?;
    }
    tracing::info!(owner_id = owner.id, count = demos.len(), "demo events seeded");
    Ok(())
}
