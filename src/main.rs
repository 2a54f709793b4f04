use axum::extract::DefaultBodyLimit;
use std::process;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use church_ssl::{build_router, config, cors_layer, open_store, AppState};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, SSL_STORAGE, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config();
    tracing::info!(
        "Starting Church SSL API in {:?} mode ({:?} storage)",
        config.environment,
        config.server.storage
    );

    let store = match open_store(config).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open lesson store: {}", e);
            process::exit(1);
        }
    };

    let mut app = build_router(AppState::new(store, config))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config.security));
    if config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", bind_addr, e);
            process::exit(1);
        }
    };

    tracing::info!("Church SSL API listening on http://{}", bind_addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        process::exit(1);
    }
}
