//! Church SSL: lesson editing state, the persistence gateway client, and the
//! REST server that stores lessons.

use axum::{
    http::HeaderValue,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::info;

pub mod cli;
pub mod config;
pub mod database;
pub mod editor;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod notes;
pub mod pagination;
pub mod services;
pub mod types;

#[cfg(test)]
pub mod testing;

use config::{AppConfig, SecurityConfig, StorageBackend};
use database::{DatabaseManager, LessonStore, MemoryStore, PgStore, StoreError};
use services::LessonService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub service: LessonService,
}

impl AppState {
    pub fn new(store: Arc<dyn LessonStore>, config: &AppConfig) -> Self {
        Self {
            service: LessonService::new(store, config.api.clone()),
        }
    }
}

/// Opens the configured lesson store, creating the schema when it is Postgres
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn LessonStore>, StoreError> {
    match config.server.storage {
        StorageBackend::Memory => {
            info!("Using in-memory lesson store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Postgres => {
            let manager = DatabaseManager::connect(&config.database).await?;
            manager.bootstrap().await?;
            Ok(Arc::new(PgStore::new(&manager)))
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::system::root))
        .route("/health", get(handlers::system::health))
        .merge(language_routes())
        .merge(lesson_routes())
        .merge(notification_routes())
        .with_state(state)
}

fn language_routes() -> Router<AppState> {
    use handlers::languages;

    Router::new()
        .route("/api/languages", get(languages::list))
        .route("/api/languages/:id", put(languages::update))
}

fn lesson_routes() -> Router<AppState> {
    use handlers::{lessons, sections};

    Router::new()
        .route("/api/lessons", post(lessons::create))
        // Static segments take precedence over :id
        .route("/api/lessons/list", get(lessons::list))
        .route("/api/lessons/search", get(lessons::search))
        .route("/api/lessons/by-quarter", get(lessons::by_quarter))
        .route("/api/lessons/years", get(lessons::years))
        .route("/api/lessons/delete", post(lessons::delete_many))
        .route(
            "/api/lessons/:id",
            get(lessons::get).put(lessons::update).delete(lessons::delete),
        )
        .route("/api/lessons/:id/sections", post(sections::append))
        .route("/api/sections", post(sections::create))
}

fn notification_routes() -> Router<AppState> {
    use handlers::notifications;

    Router::new().route(
        "/api/notifications",
        get(notifications::list).post(notifications::create),
    )
}

/// CORS policy from configuration; `*` or an empty list allows any origin
pub fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
