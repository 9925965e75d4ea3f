//! JSON HTTP API over the resolver.

mod handlers;
mod state;

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use state::AppState;

use crate::config::Config;
use crate::facts::FactResolver;
use crate::location::IpLocator;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/facts", get(handlers::facts))
        .route("/api/locate", get(handlers::locate))
        .route("/api/session", get(handlers::session))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub fn state_from_config(config: &Config) -> Arc<AppState> {
    Arc::new(AppState::new(
        FactResolver::from_config(config),
        Arc::new(IpLocator::new(config)),
    ))
}

pub async fn start(host: &str, port: u16, config: &Config) -> std::io::Result<()> {
    let app = build_router(state_from_config(config));
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("LocalLens API listening on http://{}", addr);
    axum::serve(listener, app).await
}
