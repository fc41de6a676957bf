use std::sync::Arc;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::TokenIssuer;
use crate::domain::user::{normalize_email, LoginRequest, NewUser, PublicUser, RegisterRequest};
use crate::error::{ApiError, Result};
use crate::identity::{AuthUser, Identity};
use crate::repo::Store;

/// A freshly authenticated user and the token to hand back in the cookie.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: PublicUser,
    pub token: String,
}

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
    tokens: TokenIssuer,
    bcrypt_cost: u32,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, tokens: TokenIssuer, bcrypt_cost: u32) -> Self {
        Self { store, tokens, bcrypt_cost }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<Session> {
        let reg = req.validate()?;
        if self.store.find_user_by_email(&reg.email).await?.is_some() {
            return Err(ApiError::Conflict("Email already registered.".into()));
        }
        let password_hash = hash_password(reg.password, self.bcrypt_cost).await?;
        let user = self
            .store
            .insert_user(&NewUser { username: reg.username, email: &reg.email, password_hash: &password_hash })
            .await?;
        tracing::info!(user_id = user.id, "account created");
        let token = self.tokens.issue(user.id, &user.email)?;
        Ok(Session { user: PublicUser::from(&user), token })
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<Session> {
        let (Some(email), Some(password)) = (req.email.as_deref(), req.password.as_deref()) else {
            return Err(ApiError::InvalidInput("Email and password are required.".into()));
        };
        let invalid = || ApiError::Unauthenticated("Invalid email or password".into());

        let user = self.store.find_user_by_email(&normalize_email(email)).await?.ok_or_else(invalid)?;
        if !verify_password(password, &user.password_hash).await? {
            tracing::debug!(user_id = user.id, "password mismatch");
            return Err(invalid());
        }
        let token = self.tokens.issue(user.id, &user.email)?;
        Ok(Session { user: PublicUser::from(&user), token })
    }

    pub fn me(&self, identity: &Identity) -> Result<AuthUser> {
        identity
            .require()
            .cloned()
            .map_err(|_| ApiError::Unauthenticated("No auth".into()))
    }
}
