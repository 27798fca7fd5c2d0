use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::api::AppState;
use crate::metrics::{RequestTimer, QUERY_REQUESTS};
use crate::models::TimeWindow;
use crate::query::columns::{ColumnPair, ValueColumn};
use crate::query::run_query;

/// A batch of data queries. Each entry carries the raw descriptor JSON plus
/// the externally supplied window and cap that bound it.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub queries: Vec<DataQuery>,
}

#[derive(Debug, Deserialize)]
pub struct DataQuery {
    #[serde(rename = "refId")]
    pub ref_id: String,

    #[serde(rename = "timeRange")]
    pub time_range: TimeWindow,

    #[serde(rename = "maxDataPoints")]
    pub max_data_points: i64,

    /// The query descriptor, passed through opaquely to the normalizer.
    pub query: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub results: HashMap<String, QueryResult>,
}

/// One labeled series with a time column and a values column, or a
/// structured error for that query alone.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum QueryResult {
    Frames { frames: Vec<Frame> },
    Error { error: String, kind: &'static str },
}

#[derive(Debug, Serialize)]
pub struct Frame {
    pub name: &'static str,
    pub time: Vec<DateTime<Utc>>,
    pub values: ValueColumn,
}

impl From<ColumnPair> for Frame {
    fn from(pair: ColumnPair) -> Self {
        Frame {
            name: "response",
            time: pair.timestamps,
            values: pair.values,
        }
    }
}

/// Answers a batch of queries. Queries are handled individually; one bad or
/// empty query reports its own error under its refId without aborting its
/// siblings.
pub async fn query_data(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Json<QueryResponse> {
    let _timer = RequestTimer::new();

    let mut results = HashMap::with_capacity(request.queries.len());
    for data_query in request.queries {
        QUERY_REQUESTS.inc();
        debug!(ref_id = %data_query.ref_id, "answering query request");

        let result = match run_query(
            state.store.as_ref(),
            &data_query.query,
            &data_query.time_range,
            data_query.max_data_points,
        )
        .await
        {
            Ok(pair) => QueryResult::Frames {
                frames: vec![Frame::from(pair)],
            },
            Err(err) => {
                warn!(ref_id = %data_query.ref_id, %err, "query failed");
                QueryResult::Error {
                    error: err.to_string(),
                    kind: err.kind(),
                }
            }
        };

        results.insert(data_query.ref_id, result);
    }

    Json(QueryResponse { results })
}
