pub mod query;
pub mod resources;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::error::{GatewayError, Result};
use crate::store::Store;

/// Shared handler state: the one read-only store handle, safe for use by
/// concurrent in-flight requests.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/query", post(query::query_data))
        .route("/metrics", post(resources::list_metrics))
        .route("/health", get(resources::check_health))
        .fallback(resources::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(store: Arc<dyn Store>, addr: &str) -> Result<()> {
    let app = router(AppState { store });

    info!("starting the query gateway on {addr}");
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|err| GatewayError::Internal(format!("failed to bind to {addr}: {err}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|err| GatewayError::Internal(format!("server error: {err}")))?;

    Ok(())
}
