use std::env;
use std::process;
use std::sync::Arc;

use mongo_metrics_gateway::{api, logging, metrics, store::mongo::MongoStore};
use tracing::error;

#[tokio::main]
async fn main() {
    logging::init_logger();
    metrics::init_metrics();

    let uri = env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let database = env::var("MONGODB_DATABASE").unwrap_or_else(|_| "telegrafData".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("0.0.0.0:{port}");

    let store = match MongoStore::connect(&uri, &database).await {
        Ok(store) => Arc::new(store),
        Err(err) => {
            error!(%err, uri, "could not set up the store client");
            process::exit(1);
        }
    };

    if let Err(err) = api::serve(store, &addr).await {
        error!(%err, "gateway exited with an error");
        process::exit(1);
    }
}
