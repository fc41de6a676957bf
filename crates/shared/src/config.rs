use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Postgres connection string; the in-memory store is used when unset.
    #[serde(default)]
    pub database_url: Option<String>,
    pub jwt_secret: String,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,
    #[serde(default)]
    pub cookie_secure: bool,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    #[serde(default)]
    pub seed_demo: bool,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_listen_addr() -> String { "0.0.0.0:8080".into() }
fn default_token_ttl_secs() -> i64 { 60 * 60 }
fn default_bcrypt_cost() -> u32 { 10 }
fn default_cors_origins() -> Vec<String> { vec!["http://localhost:5173".into()] }
fn default_max_connections() -> u32 { 10 }

impl AppConfig {
    pub fn from_env() -> Result<Self, figment::Error> {
        dotenvy::dotenv().ok();
        let fig = figment::Figment::new()
            .merge(figment::providers::Env::prefixed("CEF_"));
        fig.extract()
    }

    /// Minimal configuration for tests and local tooling.
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            database_url: None,
            jwt_secret: jwt_secret.into(),
            listen_addr: default_listen_addr(),
            token_ttl_secs: default_token_ttl_secs(),
            cookie_secure: false,
            bcrypt_cost: 4,
            cors_origins: default_cors_origins(),
            seed_demo: false,
            max_connections: 1,
        }
    }
}
