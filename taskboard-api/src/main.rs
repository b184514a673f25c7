//! # Taskboard API Server
//!
//! REST API for users, projects, tasks and comments backed by a document store.
//!
//! ## Startup
//!
//! 1. Load configuration from the environment (and `.env`)
//! 2. Construct the document store (PostgreSQL pool + migrations, or in-memory)
//! 3. Build the Axum router around the store
//! 4. Serve until Ctrl-C, then close the pool
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/taskboard cargo run -p taskboard-api
//! STORE_BACKEND=memory cargo run -p taskboard-api
//! ```

use std::sync::Arc;
use taskboard_api::{
    app::{build_router, AppState},
    config::{Config, StoreBackend},
};
use taskboard_shared::{
    db::{migrations::run_migrations, pool},
    store::{memory::InMemoryDocumentStore, postgres::PgDocumentStore, DocumentStore},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Text logs by default; JSON lines in production unless `LOG_FORMAT` says otherwise
fn init_tracing(production: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "taskboard_api=debug,taskboard_shared=debug,tower_http=debug".into()
    });

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(production);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.api.production);

    tracing::info!(
        "Taskboard API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let pg_pool = match config.store {
        StoreBackend::Postgres => {
            let pool = pool::create_pool(config.pool_config()).await?;
            run_migrations(&pool).await?;
            Some(pool)
        }
        StoreBackend::Memory => None,
    };

    let store: Arc<dyn DocumentStore> = match &pg_pool {
        Some(pool) => Arc::new(PgDocumentStore::new(pool.clone())),
        None => {
            if config.api.production {
                anyhow::bail!("STORE_BACKEND=memory is not allowed when API_PRODUCTION is set");
            }
            tracing::warn!("Using the in-memory document store; data is lost on restart");
            Arc::new(InMemoryDocumentStore::new())
        }
    };

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pg_pool {
        pool::close_pool(pool).await;
    }

    tracing::info!("Server stopped");
    Ok(())
}
