use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::CookieJar;
use serde_json::{json, Value};
use shared::domain::user::{LoginRequest, RegisterRequest};
use shared::Result;

use crate::extract::{auth_cookie, cleared_cookie, Caller, JsonBody};
use crate::SharedState;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

async fn register(
    State(state): State<SharedState>,
    jar: CookieJar,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<Value>)> {
    let session = state.accounts.register(&req).await?;
    let jar = jar.add(auth_cookie(state.cookies, session.token));
    Ok((
        StatusCode::CREATED,
        jar,
        Json(json!({"message": "Account created successfully", "user": session.user})),
    ))
}

async fn login(
    State(state): State<SharedState>,
    jar: CookieJar,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<(CookieJar, Json<Value>)> {
    let session = state.accounts.login(&req).await?;
    tracing::info!(user_id = session.user.id, "login");
    let jar = jar.add(auth_cookie(state.cookies, session.token));
    let user = session.user;
    Ok((jar, Json(json!({"id": user.id, "username": user.username, "email": user.email}))))
}

async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    (jar.add(cleared_cookie()), Json(json!({"message": "Logged out"})))
}

async fn me(State(state): State<SharedState>, Caller(identity): Caller) -> Result<Json<Value>> {
    let user = state.accounts.me(&identity)?;
    Ok(Json(json!({"id": user.user_id, "email": user.email})))
}
