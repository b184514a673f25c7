/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskboard_api::{app::{build_router, AppState}, config::Config};
/// use taskboard_shared::store::memory::InMemoryDocumentStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(InMemoryDocumentStore::new()), config);
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, routes};
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use taskboard_shared::{
    engine::PartialUpdateEngine,
    models::{comment::Comment, project::Project, task::Task, user::User, Entity},
    store::DocumentStore,
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Document store handle, constructed at startup
    pub store: Arc<dyn DocumentStore>,

    /// Partial update engine writing through `store`
    pub engine: PartialUpdateEngine,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state around an explicitly constructed store
    pub fn new(store: Arc<dyn DocumentStore>, config: Config) -> Self {
        Self {
            engine: PartialUpdateEngine::new(store.clone()),
            store,
            config: Arc::new(config),
        }
    }
}

/// Routes for one entity collection
fn resource<E: Entity>() -> Router<AppState> {
    use routes::documents;

    Router::new()
        .route(
            "/",
            get(documents::list::<E>)
                .post(documents::create::<E>)
                .put(documents::update::<E>)
                .delete(documents::remove::<E>),
        )
        .route("/:id", get(documents::get_one::<E>))
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                   # Health check
/// └── /v1/
///     ├── /users                # GET list, POST create, PUT patch, DELETE
///     │   └── /:id              # GET one
///     ├── /projects             # (same shape)
///     ├── /tasks                # (same shape)
///     └── /comments             # (same shape)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Compression (tower-http CompressionLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Logging (tower-http TraceLayer)
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let v1_routes = Router::new()
        .nest("/users", resource::<User>())
        .nest("/projects", resource::<Project>())
        .nest("/tasks", resource::<Task>())
        .nest("/comments", resource::<Comment>());

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|origin| origin == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(CompressionLayer::new())
        .with_state(state)
}
