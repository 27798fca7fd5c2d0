use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fields of the payload embedded in a query descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPayload {
    /// Find query to relay to the backing database.
    #[serde(default, rename = "findQuery")]
    pub find_query: String,

    /// The one field to return as the value column.
    #[serde(default)]
    pub projection: String,
}

/// Time range as embedded in the descriptor, RFC 3339 encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTimeRange {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}

/// First-pass decode of a descriptor: only the discriminator, everything
/// else ignored. Depending on the mode, `payload` is either a JSON string
/// or a structured object.
#[derive(Debug, Default, Deserialize)]
pub struct ModeDiscriminator {
    #[serde(default, rename = "editorMode")]
    pub editor_mode: String,
}

/// Descriptor shape produced by the builder editor: payload is structured.
#[derive(Debug, Deserialize)]
pub struct BuilderQueryModel {
    /// The metric (i.e. collection) being requested.
    pub target: String,

    #[serde(default)]
    pub payload: QueryPayload,

    #[serde(default, rename = "intervalMs")]
    pub interval_ms: i64,

    #[serde(default, rename = "maxDataPoints")]
    pub max_data_points: i64,

    #[serde(default, rename = "timeRange")]
    pub time_range: RawTimeRange,
}

/// Descriptor shape produced by the code editor: payload is a JSON string
/// that itself encodes a [`QueryPayload`].
#[derive(Debug, Deserialize)]
pub struct CodeQueryModel {
    pub target: String,

    #[serde(default)]
    pub payload: String,

    #[serde(default, rename = "intervalMs")]
    pub interval_ms: i64,

    #[serde(default, rename = "maxDataPoints")]
    pub max_data_points: i64,

    #[serde(default, rename = "timeRange")]
    pub time_range: RawTimeRange,
}

/// The normalized query consumed downstream, independent of wire shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalQuery {
    pub collection: String,
    pub find_query: String,
    pub projection: String,
    pub max_points: i64,
}

/// Inclusive `[from, to]` window every query is bounded by. Supplied by the
/// caller alongside the descriptor; `from <= to` is their responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Body of a metrics discovery request. The payload is accepted for forward
/// compatibility but unused by the discovery algorithm.
#[derive(Debug, Default, Deserialize)]
pub struct MetricsRequest {
    #[serde(default)]
    pub metric: String,

    #[serde(default)]
    pub payload: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelValue {
    pub label: String,
    pub value: String,
}

/// One selectable tag key with its distinct value options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagOption {
    pub key: String,

    #[serde(rename = "valueOptions")]
    pub value_options: Vec<LabelValue>,
}

/// One queryable collection with its current tag options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricDescriptor {
    pub name: String,

    #[serde(rename = "tagOptions")]
    pub tag_options: Vec<TagOption>,
}
