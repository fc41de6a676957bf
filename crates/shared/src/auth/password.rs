use crate::error::{ApiError, Result};

// bcrypt is CPU bound; keep it off the async workers.

pub async fn hash_password(password: &str, cost: u32) -> Result<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| {
            tracing::error!(?e, "hash task failed");
            ApiError::Internal
        })?
        .map_err(|e| {
            tracing::error!(?e, "password hash failed");
            ApiError::Internal
        })
}

pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let (password, hash) = (password.to_owned(), hash.to_owned());
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| {
            tracing::error!(?e, "verify task failed");
            ApiError::Internal
        })?
        .or_else(|e| {
            tracing::warn!(?e, "stored hash unreadable");
            Ok(false)
        })
}
