use std::sync::Arc;

use api::{app, AppState};
use shared::db::pool::Db;
use shared::repo::{MemoryStore, PgStore, Store};
use shared::{seed, AppConfig};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cfg = match AppConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %e, "config load failed");
            return Err(anyhow::anyhow!("config load failed: {e}"));
        }
    };

    let store: Arc<dyn Store> = match &cfg.database_url {
        Some(url) => {
            let db = Db::connect(url, cfg.max_connections).await?;
            db.migrate().await?;
            tracing::info!("connected to postgres");
            Arc::new(PgStore::new(db))
        }
        None => {
            tracing::warn!("CEF_DATABASE_URL not set, using in-memory store; data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    if cfg.seed_demo {
        seed::seed(store.as_ref(), cfg.bcrypt_cost).await?;
    }

    let state = Arc::new(AppState::new(store, &cfg));
    let app = app(state, &cfg);

    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr).await?;
    tracing::info!(addr = %cfg.listen_addr, "api listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();
}
