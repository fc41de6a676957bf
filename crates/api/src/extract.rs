use std::convert::Infallible;

use async_trait::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use shared::domain::payload::invalid_body;
use shared::{ApiError, Identity};

use crate::{CookieSettings, SharedState};

pub const AUTH_COOKIE: &str = "token";

/// Identity of the caller, resolved from the auth cookie. Never rejects:
/// a missing or bad token yields `Identity::Anonymous`.
pub struct Caller(pub Identity);

#[async_trait]
impl FromRequestParts<SharedState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(AUTH_COOKIE).map(|c| c.value());
        Ok(Caller(state.accounts.tokens().resolve(token)))
    }
}

/// `:id` path segment. Anything that is not an integer cannot name an event.
pub struct EventId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for EventId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::event_not_found())?;
        Ok(EventId(id))
    }
}

/// JSON body whose decoding failures are reported as `InvalidInput`.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "rejected JSON body");
                Err(invalid_body())
            }
        }
    }
}

pub fn auth_cookie(settings: CookieSettings, token: String) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .http_only(true)
        .secure(settings.secure)
        .same_site(if settings.secure { SameSite::None } else { SameSite::Lax })
        .path("/")
        .max_age(time::Duration::seconds(settings.ttl_secs))
        .build()
}

/// Expired, empty cookie that makes the browser drop the session.
pub fn cleared_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((AUTH_COOKIE, "")).http_only(true).path("/").build();
    cookie.make_removal();
    cookie
}
