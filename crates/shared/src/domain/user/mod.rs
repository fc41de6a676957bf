use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// User fields safe to hand back to clients.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self { id: u.id, username: u.username.clone(), email: u.email.clone(), created_at: u.created_at }
    }
}

#[derive(Debug)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Validated registration input, borrowed from the request.
#[derive(Debug)]
pub struct Registration<'a> {
    pub username: &'a str,
    pub email: String,
    pub password: &'a str,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<Registration<'_>> {
        let username = self.username.as_deref().map(str::trim).filter(|v| !v.is_empty());
        let email = self.email.as_deref().map(str::trim).filter(|v| !v.is_empty());
        let password = self.password.as_deref().filter(|v| !v.is_empty());
        match (username, email, password) {
            (Some(username), Some(email), Some(password)) => Ok(Registration {
                username,
                email: normalize_email(email),
                password,
            }),
            _ => Err(ApiError::InvalidInput("All fields are required.".into())),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
