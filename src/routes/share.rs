use std::env;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bson::doc;
use mongodb::bson::DateTime as BsonDateTime;
use mongodb::Client;
use rand::RngCore;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::models::itinerary::{SharedItinerary, SharedItineraryView};
use crate::models::trip::TripParameters;
use crate::routes::generate::rate_limited;
use crate::services::rate_limit_service::{client_id, RateLimiter};

const SHARE_WINDOW: Duration = Duration::from_secs(60);
const SHARE_CREATE_MAX: u32 = 10;
const SHARE_GET_MAX: u32 = 60;
const SHARE_DELETE_MAX: u32 = 20;
const DEFAULT_TTL_DAYS: i64 = 30;
const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

fn shared_collection(client: &Client) -> mongodb::Collection<SharedItinerary> {
    client.database("Itineraries").collection("Shared")
}

fn share_ttl_days() -> i64 {
    env::var("SHARE_TTL_DAYS")
        .ok()
        .and_then(|raw| raw.parse::<i64>().ok())
        .filter(|days| *days > 0)
        .unwrap_or(DEFAULT_TTL_DAYS)
}

fn new_delete_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[derive(Deserialize)]
pub struct ShareRequest {
    pub markdown: String,
    pub payload: TripParameters,
}

/*
    POST /api/share
*/
pub async fn create(
    req: HttpRequest,
    body: web::Json<ShareRequest>,
    limiter: web::Data<RateLimiter>,
    data: web::Data<Arc<Client>>,
) -> impl Responder {
    let key = format!("share:create:{}", client_id(&req));
    if !limiter.check(&key, SHARE_WINDOW, SHARE_CREATE_MAX).allowed {
        return rate_limited();
    }

    let request = body.into_inner();
    if request.markdown.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({ "error": "There is nothing to share." }));
    }
    if let Err(message) = request.payload.validate() {
        return HttpResponse::BadRequest().json(json!({ "error": message }));
    }

    let now = BsonDateTime::now();
    let expires_at =
        BsonDateTime::from_millis(now.timestamp_millis() + share_ttl_days() * MILLIS_PER_DAY);
    let record = SharedItinerary {
        id: None,
        share_id: Uuid::new_v4().to_string(),
        markdown: request.markdown,
        payload: request.payload,
        created_at: now,
        expires_at,
        delete_token: new_delete_token(),
        deleted_at: None,
    };

    let collection = shared_collection(&data.into_inner());
    match collection.insert_one(&record).await {
        Ok(_) => HttpResponse::Ok().json(json!({
            "id": record.share_id,
            "expiresAt": record.expires_at.try_to_rfc3339_string().ok(),
            "deleteToken": record.delete_token,
        })),
        Err(err) => {
            eprintln!("Failed to store shared itinerary: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Could not create the share link." }))
        }
    }
}

/*
    GET /api/share/{id}

    Soft-deleted and expired records are treated as absent.
*/
pub async fn get_by_id(
    req: HttpRequest,
    path: web::Path<String>,
    limiter: web::Data<RateLimiter>,
    data: web::Data<Arc<Client>>,
) -> impl Responder {
    let key = format!("share:get:{}", client_id(&req));
    if !limiter.check(&key, SHARE_WINDOW, SHARE_GET_MAX).allowed {
        return rate_limited();
    }

    let share_id = path.into_inner();
    if share_id.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({ "error": "A share id is required." }));
    }

    let filter = doc! {
        "share_id": &share_id,
        "deleted_at": bson::Bson::Null,
        "expires_at": { "$gt": BsonDateTime::now() },
    };

    let collection = shared_collection(&data.into_inner());
    match collection.find_one(filter).await {
        Ok(Some(record)) => {
            HttpResponse::Ok().json(json!({ "itinerary": SharedItineraryView::from(record) }))
        }
        Ok(None) => HttpResponse::NotFound().json(json!({ "error": "Itinerary not found." })),
        Err(err) => {
            eprintln!("Failed to fetch shared itinerary: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Could not fetch the itinerary." }))
        }
    }
}

/*
    DELETE /api/share/{id}

    Soft delete, gated by the delete token issued at creation.
*/
pub async fn delete(
    req: HttpRequest,
    path: web::Path<String>,
    limiter: web::Data<RateLimiter>,
    data: web::Data<Arc<Client>>,
) -> impl Responder {
    let key = format!("share:delete:{}", client_id(&req));
    if !limiter.check(&key, SHARE_WINDOW, SHARE_DELETE_MAX).allowed {
        return rate_limited();
    }

    let share_id = path.into_inner();
    let token = match req.headers().get("x-delete-token").and_then(|v| v.to_str().ok()) {
        Some(token) if !token.is_empty() => token.to_string(),
        _ => {
            return HttpResponse::Unauthorized()
                .json(json!({ "error": "A delete token is required." }))
        }
    };

    let filter = doc! {
        "share_id": &share_id,
        "delete_token": &token,
        "deleted_at": bson::Bson::Null,
    };
    let update = doc! { "$set": { "deleted_at": BsonDateTime::now() } };

    let collection = shared_collection(&data.into_inner());
    match collection.update_one(filter, update).await {
        Ok(result) if result.matched_count > 0 => HttpResponse::Ok().json(json!({ "ok": true })),
        Ok(_) => HttpResponse::NotFound().json(json!({ "error": "Itinerary not found." })),
        Err(err) => {
            eprintln!("Failed to delete shared itinerary: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Could not delete the itinerary." }))
        }
    }
}
