//! # TaskFlow API Server
//!
//! Kanban board service. Persistence is PostgreSQL by default; `STORE=memory`
//! runs everything in-process, seeded with the default column types.
//!
//! ## Usage
//!
//! ```bash
//! JWT_SECRET=$(openssl rand -hex 32) STORE=memory cargo run -p taskflow-api
//! ```

use std::sync::Arc;

use taskflow_api::{
    app::{build_router, AppState},
    config::{Config, StoreBackend},
};
use taskflow_shared::{
    db::{
        memory::MemoryStore,
        migrations::{ensure_database_exists, run_migrations},
        pool::{create_pool, DatabaseConfig},
        postgres::PgStore,
        store::Store,
    },
    notify::LogNotifier,
    services::Services,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "taskflow_api=debug,taskflow_shared=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn Store>> {
    match config.store {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on shutdown");
            Ok(Arc::new(MemoryStore::seeded()))
        }
        StoreBackend::Postgres => {
            ensure_database_exists(&config.database.url).await?;
            let pool = create_pool(DatabaseConfig {
                url: config.database.url.clone(),
                max_connections: config.database.max_connections,
                ..DatabaseConfig::default()
            })
            .await?;
            run_migrations(&pool).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("TaskFlow API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    let store = open_store(&config).await?;
    let services = Services::new(store, Arc::new(LogNotifier));

    let address = config.bind_address();
    let app = build_router(AppState::new(services, config));

    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
