//! HTTP surface
//!
//! Routes:
//! - `GET  /api/diagrams`       diagram summaries
//! - `POST /api/diagrams`       save (insert or update) a diagram
//! - `GET  /api/diagrams/{id}`  assembled diagram
//! - `DELETE /api/diagrams/{id}` cascade delete
//! - `GET/POST /api/config`     global config singleton

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerSettings;
use crate::engine::{ConfigService, DiagramEngine};
use crate::storage::{Database, DocumentStore, SqliteDocumentStore};

pub mod routes;

/// Server state
pub struct AppState {
    pub diagrams: DiagramEngine,
    pub config: ConfigService,
}

impl AppState {
    pub fn new(docs: Arc<dyn DocumentStore>, settings: &ServerSettings) -> Self {
        Self {
            diagrams: DiagramEngine::new(Arc::clone(&docs), settings.request_timeout),
            config: ConfigService::new(docs, settings.request_timeout),
        }
    }
}

fn cors_layer(origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    Ok(match origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.parse::<HeaderValue>()?)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::permissive(),
    })
}

pub fn build_router(state: Arc<AppState>, settings: &ServerSettings) -> anyhow::Result<Router> {
    let app = Router::new()
        .route("/api/diagrams", get(routes::list_diagrams).post(routes::save_diagram))
        .route("/api/diagrams/{id}", get(routes::get_diagram).delete(routes::delete_diagram))
        .route("/api/config", get(routes::get_config).post(routes::save_config))
        .layer(DefaultBodyLimit::max(settings.body_limit))
        .layer(cors_layer(settings.cors_origin.as_deref())?)
        .layer(TraceLayer::new_for_http())
        .with_state(state);
    Ok(app)
}

pub async fn start_server(settings: ServerSettings) -> anyhow::Result<()> {
    let db = Database::open(&settings.database)?;
    let docs: Arc<dyn DocumentStore> = Arc::new(SqliteDocumentStore::new(db.clone()));
    let state = Arc::new(AppState::new(docs, &settings));
    let app = build_router(state, &settings)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    tracing::info!("Starting server on {} (database: {:?})", addr, settings.database);
    println!("🌍 Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close()?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
