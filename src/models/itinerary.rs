use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};

use crate::models::trip::TripParameters;

pub mod structured;

/// A shared itinerary as stored in the `Itineraries.Shared` collection. The
/// markdown blob is opaque to the store; the whole record is the unit of
/// read and write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedItinerary {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub share_id: String,
    pub markdown: String,
    pub payload: TripParameters,
    pub created_at: BsonDateTime,
    pub expires_at: BsonDateTime,
    pub delete_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<BsonDateTime>,
}

/// What a fetch returns to the client: everything except the delete token,
/// which is only handed out once at creation time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedItineraryView {
    pub id: String,
    pub markdown: String,
    pub payload: TripParameters,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

fn to_chrono(dt: BsonDateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis()).unwrap_or_default()
}

impl From<SharedItinerary> for SharedItineraryView {
    fn from(record: SharedItinerary) -> Self {
        SharedItineraryView {
            id: record.share_id,
            markdown: record.markdown,
            payload: record.payload,
            created_at: to_chrono(record.created_at),
            expires_at: to_chrono(record.expires_at),
        }
    }
}
