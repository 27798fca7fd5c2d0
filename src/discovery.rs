//! Request-time schema discovery: no registry, no caching. Each call probes
//! the store for what exists right now.

use bson::{doc, Bson, Document};
use tracing::debug;

use crate::error::Result;
use crate::models::{LabelValue, MetricDescriptor, TagOption};
use crate::store::{FindSpec, Store};

/// Probe for the single most recent document's tag bag.
fn latest_tags_spec() -> FindSpec {
    FindSpec {
        filter: Document::new(),
        projection: doc! { "tags": 1, "_id": 0 },
        sort: doc! { "timestamp": -1 },
        limit: 1,
    }
}

/// Enumerates queryable collections and the tag keys/values available for
/// query building.
///
/// Only collections flagged as time-series by store metadata are considered.
/// The current tag-key set comes from the newest document alone; a
/// collection with no documents (or no usable tag bag) is still listed, with
/// an empty option set. Distinct values are computed across the whole
/// collection, unbounded. A failure at any single collection's probe or
/// distinct step aborts the entire call; there are no partial results.
pub async fn discover(store: &dyn Store) -> Result<Vec<MetricDescriptor>> {
    let collections = store.list_collections().await?;

    let mut descriptors = Vec::new();
    for collection in collections.into_iter().filter(|c| c.time_series) {
        let probe = store.find(&collection.name, &latest_tags_spec()).await?;
        let tag_keys: Vec<String> = probe
            .first()
            .and_then(|document| document.get_document("tags").ok())
            .map(|tags| tags.keys().cloned().collect())
            .unwrap_or_default();

        debug!(collection = %collection.name, ?tag_keys, "discovered tag keys");

        let mut tag_options = Vec::with_capacity(tag_keys.len());
        for key in tag_keys {
            let values = store
                .distinct(&collection.name, &format!("tags.{key}"))
                .await?;

            let mut value_options = Vec::with_capacity(values.len());
            for value in values {
                match value {
                    Bson::String(text) => value_options.push(LabelValue {
                        label: text.clone(),
                        value: text,
                    }),
                    Bson::Document(entries) => {
                        for entry_key in entries.keys() {
                            value_options.push(LabelValue {
                                label: entry_key.clone(),
                                value: entry_key.clone(),
                            });
                        }
                    }
                    other => {
                        // No rendering label can be derived for scalar or
                        // array shapes beyond the above.
                        debug!(value = ?other, "skipping unlabelable tag value");
                    }
                }
            }

            tag_options.push(TagOption { key, value_options });
        }

        descriptors.push(MetricDescriptor {
            name: collection.name,
            tag_options,
        });
    }

    Ok(descriptors)
}
