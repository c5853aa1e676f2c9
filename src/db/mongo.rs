use mongodb::{
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client,
};
use std::sync::Arc;
use std::time::Duration;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const MAX_POOL_SIZE: u32 = 10;

/// Builds the shared Mongo client for the share-link store. The service can
/// run without a reachable database; only the share endpoints need it, so a
/// failed startup ping is reported but not fatal.
pub async fn create_mongo_client(uri: &str) -> Arc<Client> {
    let mut options = ClientOptions::parse(uri)
        .await
        .expect("MONGODB_URI could not be parsed");

    options.connect_timeout = Some(Duration::from_secs(CONNECT_TIMEOUT_SECS));
    options.server_selection_timeout = Some(Duration::from_secs(CONNECT_TIMEOUT_SECS));
    options.max_pool_size = Some(MAX_POOL_SIZE);
    options.min_pool_size = Some(1);
    options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());

    let client = Client::with_options(options).expect("failed to create MongoDB client");

    match client
        .database("Itineraries")
        .run_command(mongodb::bson::doc! { "ping": 1 })
        .await
    {
        Ok(_) => println!("MongoDB connection verified"),
        Err(e) => {
            eprintln!("WARNING: MongoDB ping failed: {}", e);
            eprintln!("Share links will not work until the database is reachable");
        }
    }

    Arc::new(client)
}
