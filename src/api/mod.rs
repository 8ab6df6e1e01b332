pub mod handlers;
pub mod types;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::balances::aggregator::BalanceAggregator;
use crate::chains::registry::ChainRegistry;

pub struct AppState {
    pub registry: Arc<ChainRegistry>,
    pub aggregator: Arc<BalanceAggregator>,
    pub max_addresses: usize,
}

pub fn router(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/api/v1/health", get(handlers::health))
        .route("/api/v1/chains", get(handlers::list_chains))
        .route("/api/v1/addresses/balances", post(handlers::query_balances))
        .route(
            "/api/v1/chains/{chain}/addresses/{address}/balance",
            get(handlers::single_chain_balance),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(state: AppState, host: &str, port: u16) -> eyre::Result<()> {
    let app = router(state);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}
