use async_trait::async_trait;
use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use mongodb::{
    options::{ClientOptions, FindOptions},
    results::CollectionType,
    Client, Database,
};
use tracing::debug;

use crate::error::Result;
use crate::store::{CollectionInfo, FindSpec, Store};

/// Store handle backed by the MongoDB driver. Cheap to clone; the driver
/// multiplexes concurrent operations over its own connection pool.
#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self> {
        debug!(uri, database, "connecting to the backing store");
        let options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(options)?;
        Ok(Self {
            db: client.database(database),
        })
    }
}

#[async_trait]
impl Store for MongoStore {
    async fn find(&self, collection: &str, spec: &FindSpec) -> Result<Vec<Document>> {
        let options = FindOptions::builder()
            .projection(spec.projection.clone())
            .sort(spec.sort.clone())
            .limit(spec.limit)
            .build();

        debug!(collection, filter = ?spec.filter, "running find");

        let cursor = self
            .db
            .collection::<Document>(collection)
            .find(spec.filter.clone(), options)
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        let mut cursor = self.db.list_collections(None, None).await?;

        let mut collections = Vec::new();
        while let Some(spec) = cursor.try_next().await? {
            collections.push(CollectionInfo {
                time_series: matches!(spec.collection_type, CollectionType::Timeseries),
                name: spec.name,
            });
        }
        Ok(collections)
    }

    async fn distinct(&self, collection: &str, field: &str) -> Result<Vec<Bson>> {
        Ok(self
            .db
            .collection::<Document>(collection)
            .distinct(field, None, None)
            .await?)
    }

    async fn ping(&self) -> Result<()> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}
