//! Boundary to the backing document store. The core only ever talks to the
//! [`Store`] trait; connection management, pooling and retries belong to the
//! driver behind it.

pub mod mongo;

use async_trait::async_trait;
use bson::{Bson, Document};

use crate::error::Result;

/// A fully built, store-ready query: filter, projection, ordering and cap.
#[derive(Debug, Clone, PartialEq)]
pub struct FindSpec {
    pub filter: Document,
    pub projection: Document,
    pub sort: Document,
    pub limit: i64,
}

/// One collection as reported by the store's own metadata. The time-series
/// flag comes from collection metadata, never from inspecting contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionInfo {
    pub name: String,
    pub time_series: bool,
}

/// Operations the gateway needs from a live store handle. Safe for
/// concurrent use by in-flight requests.
#[async_trait]
pub trait Store: Send + Sync {
    /// Runs a find against the named collection and returns the raw rows in
    /// store order.
    async fn find(&self, collection: &str, spec: &FindSpec) -> Result<Vec<Document>>;

    /// Lists every collection in the database with its metadata flags.
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>>;

    /// Distinct values of `field` across the whole collection, unfiltered.
    async fn distinct(&self, collection: &str, field: &str) -> Result<Vec<Bson>>;

    /// Round-trips to the store to confirm it is reachable.
    async fn ping(&self) -> Result<()>;
}
