//! The query path: normalize the wire descriptor, merge it with the time
//! window, run it against the store, and assemble typed columns.

pub mod build;
pub mod columns;
pub mod normalize;

use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::models::TimeWindow;
use crate::query::columns::ColumnPair;
use crate::store::Store;

/// Runs one query end to end. Steps are strictly sequential; each consumes
/// the previous step's output, and the store round trip dominates the cost.
pub async fn run_query(
    store: &dyn Store,
    raw: &Value,
    window: &TimeWindow,
    max_points: i64,
) -> Result<ColumnPair> {
    let canonical = normalize::canonicalize(raw)?;
    let spec = build::range_query(&canonical, window, max_points)?;

    let rows = store.find(&canonical.collection, &spec).await?;
    debug!(collection = %canonical.collection, rows = rows.len(), "query executed");

    columns::assemble(&rows, &canonical.projection)
}
