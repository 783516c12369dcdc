pub mod documents;
pub mod repositories;
pub mod schema;

use std::time::Duration;

use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use tracing::info;

pub use documents::RatingDocument;
pub use repositories::MongoRatingRepository;
pub use schema::ensure_ratings_collection;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// MongoDB connection string (e.g., "mongodb://localhost:27017")
    pub uri: String,
    pub name: String,
    pub collection: String,
    /// Upper bound for every single store operation.
    pub operation_timeout: Duration,
    pub server_selection_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: "easyprofind".to_string(),
            collection: schema::RATINGS_COLLECTION.to_string(),
            operation_timeout: Duration::from_secs(5),
            server_selection_timeout: Duration::from_secs(5),
        }
    }
}

/// Build a client and return a handle to the configured database.
///
/// The driver connects lazily; the first real round-trip happens when the
/// collection is bootstrapped.
pub async fn init_database(config: &DatabaseConfig) -> Result<Database, mongodb::error::Error> {
    info!("Connecting to MongoDB: {}", redact_uri(&config.uri));
    let mut options = ClientOptions::parse(&config.uri).await?;
    options.app_name = Some("rating-service".to_string());
    options.server_selection_timeout = Some(config.server_selection_timeout);
    let client = Client::with_options(options)?;
    info!(database = %config.name, "MongoDB client ready");
    Ok(client.database(&config.name))
}

/// Hide credentials in a connection string so it can be logged.
pub fn redact_uri(uri: &str) -> String {
    let Some((scheme, rest)) = uri.split_once("://") else {
        return uri.to_string();
    };
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{scheme}://***@{}", &rest[at + 1..]),
        None => uri.to_string(),
    }
}
