use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::identity::{AuthUser, Identity};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies the signed session tokens carried in the auth cookie.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::seconds(ttl_secs),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user_id: i64, email: &str) -> Result<String> {
        self.issue_at(user_id, email, Utc::now())
    }

    pub fn issue_at(&self, user_id: i64, email: &str, now: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            tracing::error!(?e, "token encode failed");
            ApiError::Internal
        })
    }

    pub fn verify(&self, token: &str) -> Result<AuthUser> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|_| ApiError::Unauthenticated("Invalid or expired token".into()))?;
        let user_id = data
            .claims
            .sub
            .parse()
            .map_err(|_| ApiError::Unauthenticated("Invalid or expired token".into()))?;
        Ok(AuthUser { user_id, email: data.claims.email })
    }

    /// Never fails: anything short of a valid token is anonymous.
    pub fn resolve(&self, token: Option<&str>) -> Identity {
        let Some(token) = token else { return Identity::Anonymous };
        match self.verify(token) {
            Ok(user) => Identity::Authenticated(user),
            Err(e) => {
                tracing::debug!(error = %e, "token rejected, treating request as anonymous");
                Identity::Anonymous
            }
        }
    }
}
