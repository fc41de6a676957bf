use std::sync::Arc;

use api::{router, AppState};
use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use shared::repo::MemoryStore;
use shared::AppConfig;
use tower::ServiceExt;

struct TestApp {
    router: Router,
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

impl TestApp {
    fn new() -> Self {
        let cfg = AppConfig::for_tests("http-test-secret");
        let state = Arc::new(AppState::new(Arc::new(MemoryStore::new()), &cfg));
        Self { router: router(state) }
    }

    async fn send(&self, method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Reply {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        let req = match body {
            Some(body) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        Reply { status, headers, body }
    }

    async fn raw(&self, method: &str, uri: &str, cookie: &str, body: &'static str) -> Reply {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        Reply { status, headers, body: serde_json::from_slice(&bytes).unwrap_or(Value::Null) }
    }

    async fn register(&self, username: &str, email: &str) -> Reply {
        self.send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({"username": username, "email": email, "password": "password123"})),
        )
        .await
    }

    /// Registers then logs in, returning the `token=...` cookie pair.
    async fn user(&self, username: &str) -> String {
        let email = format!("{username}@example.com");
        assert_eq!(self.register(username, &email).await.status, StatusCode::CREATED);
        let login = self
            .send("POST", "/api/auth/login", None, Some(json!({"email": email, "password": "password123"})))
            .await;
        assert_eq!(login.status, StatusCode::OK);
        session_cookie(&login.headers).expect("login sets cookie")
    }

    async fn create_event(&self, cookie: &str, overrides: Value) -> Value {
        let mut payload = json!({
            "title": "Test Event",
            "description": "A scheduled event",
            "location": "Test Hall",
            "category": "General",
            "start_time": "2025-11-01T10:00",
            "end_time": "2025-11-01T12:00",
            "image_url": "",
        });
        if let (Some(base), Some(extra)) = (payload.as_object_mut(), overrides.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }
        let res = self.send("POST", "/api/events", Some(cookie), Some(payload)).await;
        assert_eq!(res.status, StatusCode::CREATED, "{:?}", res.body);
        res.body
    }
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("token="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

fn error_code(reply: &Reply) -> &str {
    reply.body["error_code"].as_str().unwrap_or_default()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::new();
    let res = app.send("GET", "/api/health", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "API working");
}

#[tokio::test]
async fn register_sets_http_only_cookie() {
    let app = TestApp::new();
    let res = app.register("temp", "temp@example.com").await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["user"]["email"], "temp@example.com");
    assert!(res.body["user"].get("password_hash").is_none());

    let raw = res.headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(raw.starts_with("token="));
    assert!(raw.contains("HttpOnly"));
    assert!(raw.contains("Path=/"));
    assert!(raw.contains("Max-Age=3600"));
}

#[tokio::test]
async fn register_rejects_duplicates_and_missing_fields() {
    let app = TestApp::new();
    assert_eq!(app.register("a", "duplicate@example.com").await.status, StatusCode::CREATED);

    let dup = app.register("b", "duplicate@example.com").await;
    assert_eq!(dup.status, StatusCode::CONFLICT);
    assert_eq!(error_code(&dup), "CONFLICT");
    assert!(dup.body["message"].as_str().unwrap().contains("Email already registered"));

    let missing = app
        .send("POST", "/api/auth/register", None, Some(json!({"email": "", "password": ""})))
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&missing), "INVALID_INPUT");
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = TestApp::new();
    app.user("isabelle").await;

    let wrong = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "isabelle@example.com", "password": "wrongpass"})),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert!(wrong.body["message"].as_str().unwrap().contains("Invalid"));

    let unknown = app
        .send("POST", "/api/auth/login", None, Some(json!({"email": "random123@nope.com", "password": "x"})))
        .await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&unknown), "UNAUTHENTICATED");
}

#[tokio::test]
async fn me_requires_valid_cookie() {
    let app = TestApp::new();
    let cookie = app.user("isabelle").await;

    let me = app.send("GET", "/api/auth/me", Some(&cookie), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["email"], "isabelle@example.com");

    assert_eq!(app.send("GET", "/api/auth/me", None, None).await.status, StatusCode::UNAUTHORIZED);
    let bad = app.send("GET", "/api/auth/me", Some("token=INVALIDTOKEN123"), None).await;
    assert_eq!(bad.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_always_clears_cookie() {
    let app = TestApp::new();
    let cookie = app.user("isabelle").await;

    for cookie in [Some(cookie.as_str()), None] {
        let res = app.send("POST", "/api/auth/logout", cookie, None).await;
        assert_eq!(res.status, StatusCode::OK);
        let raw = res.headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(raw.starts_with("token=;"));
        assert!(raw.contains("Max-Age=0"));
    }
}

#[tokio::test]
async fn create_requires_auth_and_fields() {
    let app = TestApp::new();
    let cookie = app.user("owner").await;

    let anon = app.send("POST", "/api/events", None, Some(json!({"title": "x"}))).await;
    assert_eq!(anon.status, StatusCode::UNAUTHORIZED);
    let anon_bad = app.send("POST", "/api/events", None, Some(json!({"title": 1}))).await;
    assert_eq!(anon_bad.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.send("POST", "/api/events", None, None).await.status, StatusCode::UNAUTHORIZED);

    let mistyped = app.send("POST", "/api/events", Some(&cookie), Some(json!({"title": 1}))).await;
    assert_eq!(mistyped.status, StatusCode::BAD_REQUEST);
    assert_eq!(mistyped.body["message"], "Invalid JSON body");

    let missing = app.send("POST", "/api/events", Some(&cookie), Some(json!({"title": "x"}))).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&missing), "INVALID_INPUT");

    let created = app.create_event(&cookie, json!({})).await;
    assert_eq!(created["title"], "Test Event");
    assert_eq!(created["created_by_username"], "owner");
    assert_eq!(created["is_owner"], true);
    assert_eq!(created["image_url"], Value::Null);
}

#[tokio::test]
async fn events_are_public_and_ordered() {
    let app = TestApp::new();
    let cookie = app.user("owner").await;
    let late = app.create_event(&cookie, json!({"title": "Late", "start_time": "2025-12-01T10:00", "end_time": "2025-12-01T11:00"})).await;
    let early = app.create_event(&cookie, json!({"title": "Early"})).await;

    let list = app.send("GET", "/api/events", None, None).await;
    assert_eq!(list.status, StatusCode::OK);
    let ids: Vec<&Value> = list.body.as_array().unwrap().iter().map(|e| &e["id"]).collect();
    assert_eq!(ids, vec![&early["id"], &late["id"]]);

    let one = app.send("GET", &format!("/api/events/{}", early["id"]), None, None).await;
    assert_eq!(one.status, StatusCode::OK);
    assert_eq!(one.body["title"], "Early");
    assert_eq!(one.body["is_owner"], false);

    let missing = app.send("GET", "/api/events/999999", None, None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&missing), "NOT_FOUND");
    assert_eq!(app.send("GET", "/api/events/abc", None, None).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_is_owner_only_and_partial() {
    let app = TestApp::new();
    let owner = app.user("owner").await;
    let other = app.user("other").await;
    let event = app.create_event(&owner, json!({})).await;
    let uri = format!("/api/events/{}", event["id"]);

    let hacked = app.send("PATCH", &uri, Some(&other), Some(json!({"title": "Hacked"}))).await;
    assert_eq!(hacked.status, StatusCode::FORBIDDEN);
    let anon = app.send("PATCH", &uri, None, Some(json!({"title": "Hacked"}))).await;
    assert_eq!(anon.status, StatusCode::FORBIDDEN);
    let mistyped = app.send("PATCH", &uri, Some(&other), Some(json!({"start_time": 5}))).await;
    assert_eq!(mistyped.status, StatusCode::FORBIDDEN);
    assert_eq!(app.send("PATCH", &uri, None, None).await.status, StatusCode::FORBIDDEN);
    let listed = app.raw("PATCH", &uri, &other, "[1, 2]").await;
    assert_eq!(listed.status, StatusCode::FORBIDDEN);

    let owner_mistyped = app.send("PATCH", &uri, Some(&owner), Some(json!({"start_time": 5}))).await;
    assert_eq!(owner_mistyped.status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&owner_mistyped), "INVALID_INPUT");
    let missing = app.send("PATCH", "/api/events/999999", Some(&owner), Some(json!({"title": "X"}))).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let updated = app
        .send("PATCH", &uri, Some(&owner), Some(json!({"title": "X", "owner_id": 999, "id": 5})))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["title"], "X");
    for field in ["id", "owner_id", "description", "location", "category", "start_time", "end_time", "image_url"] {
        assert_eq!(updated.body[field], event[field], "{field} changed");
    }

    let blank = app.send("PATCH", &uri, Some(&owner), Some(json!({"title": ""}))).await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_is_owner_only_then_not_found() {
    let app = TestApp::new();
    let owner = app.user("owner").await;
    let other = app.user("other").await;
    let event = app.create_event(&owner, json!({})).await;
    let uri = format!("/api/events/{}", event["id"]);

    assert_eq!(app.send("DELETE", &uri, Some(&other), None).await.status, StatusCode::FORBIDDEN);

    let deleted = app.send("DELETE", &uri, Some(&owner), None).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["message"], "Event deleted successfully");

    assert_eq!(app.send("GET", &uri, None, None).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.send("DELETE", "/api/events/999999", Some(&owner), None).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.send("DELETE", "/api/events/999999", None, None).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rsvp_rules() {
    let app = TestApp::new();
    let owner = app.user("owner").await;
    let guest = app.user("guest").await;
    let event = app.create_event(&owner, json!({})).await;
    let uri = format!("/api/events/{}/rsvp", event["id"]);

    for _ in 0..2 {
        let ok = app.send("POST", &uri, Some(&guest), Some(json!({"attending": true}))).await;
        assert_eq!(ok.status, StatusCode::OK);
        assert_eq!(ok.body["attending"], true);
    }
    let view = app.send("GET", &format!("/api/events/{}", event["id"]), Some(&guest), None).await;
    assert_eq!(view.body["user_rsvp_status"], true);

    let own = app.send("POST", &uri, Some(&owner), Some(json!({"attending": true}))).await;
    assert_eq!(own.status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&own), "FORBIDDEN");

    let yes = app.send("POST", &uri, Some(&guest), Some(json!({"attending": "yes"}))).await;
    assert_eq!(yes.status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&yes), "INVALID_INPUT");
    let garbage = app.raw("POST", &uri, &guest, "{not json").await;
    assert_eq!(garbage.status, StatusCode::BAD_REQUEST);
    let listed = app.raw("POST", &uri, &guest, "[true]").await;
    assert_eq!(listed.status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&listed), "INVALID_INPUT");
    let view = app.send("GET", &format!("/api/events/{}", event["id"]), Some(&guest), None).await;
    assert_eq!(view.body["user_rsvp_status"], true);

    let anon = app.send("POST", &uri, None, Some(json!({"attending": "yes"}))).await;
    assert_eq!(anon.status, StatusCode::UNAUTHORIZED);
    let owner_bad_value = app.send("POST", &uri, Some(&owner), Some(json!({"attending": "yes"}))).await;
    assert_eq!(owner_bad_value.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn attendees_visible_only_to_owner() {
    let app = TestApp::new();
    let owner = app.user("owner").await;
    let guest = app.user("guest").await;
    let other = app.user("other").await;
    let event = app.create_event(&owner, json!({})).await;
    let rsvp = format!("/api/events/{}/rsvp", event["id"]);
    let uri = format!("/api/events/{}/attendees", event["id"]);

    app.send("POST", &rsvp, Some(&guest), Some(json!({"attending": true}))).await;
    app.send("POST", &rsvp, Some(&other), Some(json!({"attending": false}))).await;

    assert_eq!(app.send("GET", &uri, Some(&other), None).await.status, StatusCode::FORBIDDEN);
    assert_eq!(app.send("GET", &uri, None, None).await.status, StatusCode::FORBIDDEN);

    let list = app.send("GET", &uri, Some(&owner), None).await;
    assert_eq!(list.status, StatusCode::OK);
    let rows = list.body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    let guest_row = rows.iter().find(|r| r["username"] == "guest").unwrap();
    assert_eq!(guest_row["attending"], true);
    assert_eq!(guest_row["email"], "guest@example.com");
    let other_row = rows.iter().find(|r| r["username"] == "other").unwrap();
    assert_eq!(other_row["attending"], false);
}

#[tokio::test]
async fn save_toggle_and_dashboard() {
    let app = TestApp::new();
    let owner = app.user("owner").await;
    let guest = app.user("guest").await;
    let event = app.create_event(&owner, json!({})).await;
    let save = format!("/api/events/{}/save", event["id"]);

    assert_eq!(app.send("POST", &save, None, None).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.send("DELETE", &save, Some(&guest), None).await.status, StatusCode::OK);

    for _ in 0..2 {
        assert_eq!(app.send("POST", &save, Some(&guest), None).await.status, StatusCode::OK);
    }
    let saved = app.send("GET", "/api/me/saved", Some(&guest), None).await;
    assert_eq!(saved.body.as_array().unwrap().len(), 1);
    let view = app.send("GET", &format!("/api/events/{}", event["id"]), Some(&guest), None).await;
    assert_eq!(view.body["user_saved"], true);

    assert_eq!(app.send("DELETE", &save, Some(&guest), None).await.status, StatusCode::OK);
    let saved = app.send("GET", "/api/me/saved", Some(&guest), None).await;
    assert!(saved.body.as_array().unwrap().is_empty());

    assert_eq!(app.send("POST", &save, Some(&owner), None).await.status, StatusCode::OK);

    let rsvp = format!("/api/events/{}/rsvp", event["id"]);
    app.send("POST", &rsvp, Some(&guest), Some(json!({"attending": true}))).await;
    let rsvps = app.send("GET", "/api/me/rsvps", Some(&guest), None).await;
    assert_eq!(rsvps.body.as_array().unwrap().len(), 1);
    app.send("POST", &rsvp, Some(&guest), Some(json!({"attending": false}))).await;
    let rsvps = app.send("GET", "/api/me/rsvps", Some(&guest), None).await;
    assert!(rsvps.body.as_array().unwrap().is_empty());

    let mine = app.send("GET", "/api/me/events", Some(&owner), None).await;
    assert_eq!(mine.body.as_array().unwrap().len(), 1);
    assert_eq!(app.send("GET", "/api/me/events", None, None).await.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_account_bodies_get_a_fixed_message() {
    let app = TestApp::new();
    let broken = app.raw("POST", "/api/auth/register", "", "{\"email\": ").await;
    assert_eq!(broken.status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&broken), "INVALID_INPUT");
    assert_eq!(broken.body["message"], "Invalid JSON body");

    let mistyped = app.raw("POST", "/api/auth/login", "", "{\"email\": 5, \"password\": true}").await;
    assert_eq!(mistyped.status, StatusCode::BAD_REQUEST);
    assert_eq!(mistyped.body["message"], "Invalid JSON body");
}
