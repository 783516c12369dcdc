//! Collection bootstrap: `$jsonSchema` validator and indexes

use bson::{doc, Document};
use mongodb::error::ErrorKind;
use mongodb::{Collection, Database, IndexModel};
use tracing::{debug, info};

use super::documents::RatingDocument;

pub const RATINGS_COLLECTION: &str = "ratings";

/// Canonical lowercase hyphenated UUID text.
pub const UUID_PATTERN: &str =
    "^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$";

/// "NamespaceExists": the collection was created concurrently.
const NAMESPACE_EXISTS: i32 = 48;

/// Store-side constraints every rating document must satisfy.
pub fn ratings_validator() -> Document {
    doc! {
        "$jsonSchema": {
            "bsonType": "object",
            "required": ["_id", "professional_id", "consumer_id", "rate", "created_at"],
            "properties": {
                "_id": { "bsonType": "string", "pattern": UUID_PATTERN },
                "professional_id": { "bsonType": "string", "pattern": UUID_PATTERN },
                "consumer_id": { "bsonType": "string", "pattern": UUID_PATTERN },
                "rate": { "bsonType": "int", "minimum": 0, "maximum": 5 },
                "description": { "bsonType": ["string", "null"] },
                "created_at": { "bsonType": "date" },
            },
        }
    }
}

/// Lookup indexes plus the compound indexes that serve the
/// newest-first listing queries directly.
pub fn rating_indexes() -> Vec<IndexModel> {
    [
        doc! { "professional_id": 1 },
        doc! { "consumer_id": 1 },
        doc! { "professional_id": -1, "created_at": -1 },
        doc! { "consumer_id": -1, "created_at": -1 },
    ]
    .into_iter()
    .map(|keys| IndexModel::builder().keys(keys).build())
    .collect()
}

/// Create the collection with its validator when missing, then make sure
/// all indexes exist. Safe to run on every startup.
pub async fn ensure_ratings_collection(
    db: &Database,
    name: &str,
) -> mongodb::error::Result<Collection<RatingDocument>> {
    let existing = db.list_collection_names().await?;
    if existing.iter().any(|n| n == name) {
        debug!(collection = name, "Collection already exists");
    } else {
        match db.create_collection(name).validator(ratings_validator()).await {
            Ok(()) => info!(collection = name, "Created collection with schema validator"),
            Err(e) if is_namespace_exists(&e) => {
                debug!(collection = name, "Collection created concurrently")
            }
            Err(e) => return Err(e),
        }
    }

    let collection = db.collection::<RatingDocument>(name);
    collection.create_indexes(rating_indexes()).await?;
    info!(collection = name, "Indexes ensured");
    Ok(collection)
}

fn is_namespace_exists(err: &mongodb::error::Error) -> bool {
    matches!(err.kind.as_ref(), ErrorKind::Command(cmd) if cmd.code == NAMESPACE_EXISTS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validator_requires_all_mandatory_fields() {
        let validator = ratings_validator();
        let schema = validator.get_document("$jsonSchema").unwrap();
        let required: Vec<&str> = schema
            .get_array("required")
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(
            required,
            vec!["_id", "professional_id", "consumer_id", "rate", "created_at"]
        );
    }

    #[test]
    fn validator_bounds_rate() {
        let validator = ratings_validator();
        let rate = validator
            .get_document("$jsonSchema")
            .and_then(|s| s.get_document("properties"))
            .and_then(|p| p.get_document("rate"))
            .unwrap();
        assert_eq!(rate.get_str("bsonType").unwrap(), "int");
        assert_eq!(rate.get_i32("minimum").unwrap(), 0);
        assert_eq!(rate.get_i32("maximum").unwrap(), 5);
    }

    #[test]
    fn listing_indexes_sort_by_creation_descending() {
        let indexes = rating_indexes();
        assert_eq!(indexes.len(), 4);
        assert_eq!(
            indexes[2].keys,
            doc! { "professional_id": -1, "created_at": -1 }
        );
        assert_eq!(indexes[3].keys, doc! { "consumer_id": -1, "created_at": -1 });
    }
}
