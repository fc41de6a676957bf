use crate::error::{ApiError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
}

/// Who is making the current request. Resolved once per request and passed
/// explicitly into every check.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    Authenticated(AuthUser),
    #[default]
    Anonymous,
}

impl Identity {
    pub fn user(user_id: i64, email: impl Into<String>) -> Self {
        Identity::Authenticated(AuthUser { user_id, email: email.into() })
    }

    pub fn user_id(&self) -> Option<i64> {
        match self {
            Identity::Authenticated(u) => Some(u.user_id),
            Identity::Anonymous => None,
        }
    }

    /// The authenticated user, or `Unauthenticated` for operations that need one.
    pub fn require(&self) -> Result<&AuthUser> {
        match self {
            Identity::Authenticated(u) => Ok(u),
            Identity::Anonymous => Err(ApiError::unauthenticated()),
        }
    }
}
