use axum::{extract::State, http::Uri, Json};
use serde::Serialize;
use tracing::{debug, error};

use crate::api::AppState;
use crate::discovery;
use crate::error::{GatewayError, Result};
use crate::metrics::{RequestTimer, DISCOVERY_REQUESTS};
use crate::models::{MetricDescriptor, MetricsRequest};

/// Lists the queryable collections with their current tag options. The
/// request payload is accepted for forward compatibility but not consulted.
pub async fn list_metrics(
    State(state): State<AppState>,
    Json(request): Json<MetricsRequest>,
) -> Result<Json<Vec<MetricDescriptor>>> {
    let _timer = RequestTimer::new();
    DISCOVERY_REQUESTS.inc();
    debug!(metric = %request.metric, "handling metrics discovery request");

    let descriptors = discovery::discover(state.store.as_ref()).await?;
    Ok(Json(descriptors))
}

pub async fn not_found(uri: Uri) -> GatewayError {
    GatewayError::NotFound(format!("requested non-existent resource {}", uri.path()))
}

#[derive(Debug, Serialize)]
pub struct HealthReply {
    pub status: &'static str,
    pub message: String,
}

/// Pings the backing store so a configuration page can verify the data
/// source works. Failures are reported in the body, not as a transport
/// error.
pub async fn check_health(State(state): State<AppState>) -> Json<HealthReply> {
    match state.store.ping().await {
        Ok(()) => Json(HealthReply {
            status: "ok",
            message: "data source is working".to_string(),
        }),
        Err(err) => {
            error!(%err, "error trying to ping the database");
            Json(HealthReply {
                status: "error",
                message: format!("error when pinging the database: {err}"),
            })
        }
    }
}
