use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use paldex_backend::config::Config;
use paldex_backend::db::SqlStore;
use paldex_backend::models::DataSnapshot;
use paldex_backend::service::PalService;
use paldex_backend::{api, metrics};

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "paldex-backend" }))
}

/// Import a snapshot file into a store that has no species catalog yet.
async fn seed_store(service: &PalService, path: &Path) {
    match service.is_empty().await {
        Ok(true) => {}
        Ok(false) => return,
        Err(e) => {
            tracing::error!("Could not check store before seeding: {e}");
            return;
        }
    }

    let snapshot: DataSnapshot = match std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|raw| serde_json::from_str(&raw).map_err(|e| e.to_string()))
    {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::error!("Failed to read seed file {}: {e}", path.display());
            return;
        }
    };

    match service.import(snapshot).await {
        Ok(counts) => tracing::info!(?counts, "Seeded store from {}", path.display()),
        Err(e) => tracing::error!("Failed to seed store: {e}"),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::load();
    metrics::register_metrics();

    let store = SqlStore::new(&config.database_url)
        .await
        .expect("Failed to initialize store database");
    let service = Arc::new(PalService::new(Arc::new(store), config.gender_domain));

    if let Some(seed) = &config.seed_file {
        seed_store(&service, seed).await;
    }

    let mut app = Router::new()
        .route("/health", get(health_check))
        .merge(api::router(service))
        .layer(axum::middleware::from_fn(metrics::track_requests))
        .layer(CorsLayer::permissive());

    if let Some(dir) = &config.static_dir {
        tracing::info!("Serving frontend from {}", dir.display());
        app = app.fallback_service(ServeDir::new(dir));
    }

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {addr}: {e}"));

    tracing::info!("Paldex backend listening on port {}", config.port);
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
