use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use habitual_api::config::{self, StoreBackend};
use habitual_api::database::{DatabaseManager, MemoryStore, PgStore, Store};
use habitual_api::routes;
use habitual_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    let config = config::config();
    let default_filter = if config.filter.debug_logging {
        "habitual_api=debug,tower_http=debug"
    } else {
        "habitual_api=info,tower_http=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    tracing::info!("Starting habitual-api in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        if habitual_api::is_production!() {
            anyhow::bail!("JWT_SECRET must be set in production");
        }
        tracing::warn!("JWT_SECRET is empty; every authenticated request will be rejected");
    }

    let store: Arc<dyn Store> = match config.database.backend {
        StoreBackend::Postgres => {
            let pool = DatabaseManager::connect(&config.database)
                .await
                .context("failed to connect to Postgres")?;
            Arc::new(PgStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let app = routes::app(AppState::new(store));

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("habitual-api listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
