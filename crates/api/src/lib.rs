use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use shared::auth::TokenIssuer;
use shared::repo::Store;
use shared::service::{AccountService, EventService};
use shared::AppConfig;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod extract;
pub mod routes;

#[derive(Clone, Copy, Debug)]
pub struct CookieSettings {
    pub secure: bool,
    pub ttl_secs: i64,
}

pub struct AppState {
    pub events: EventService,
    pub accounts: AccountService,
    pub cookies: CookieSettings,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(store: Arc<dyn Store>, cfg: &AppConfig) -> Self {
        let tokens = TokenIssuer::new(&cfg.jwt_secret, cfg.token_ttl_secs);
        Self {
            events: EventService::new(store.clone()),
            accounts: AccountService::new(store, tokens, cfg.bcrypt_cost),
            cookies: CookieSettings { secure: cfg.cookie_secure, ttl_secs: cfg.token_ttl_secs },
        }
    }
}

/// Full application: routes plus request tracing and credentialed CORS.
pub fn app(state: SharedState, cfg: &AppConfig) -> Router {
    let origins: Vec<HeaderValue> = cfg
        .cors_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(origin = %o, ?e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    router(state).layer(cors).layer(TraceLayer::new_for_http())
}

pub fn router(state: SharedState) -> Router {
    routes::router().with_state(state)
}
