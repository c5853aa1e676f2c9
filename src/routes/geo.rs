use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::models::geo::LookupItem;
use crate::services::geocoding_service::GeocodingService;

#[derive(Deserialize)]
pub struct GeoLookupRequest {
    #[serde(default)]
    pub items: Vec<LookupItem>,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/*
    POST /api/geo/lookup

    Accepts either metadata-carrying items or a plain name list.
*/
pub async fn lookup(
    body: web::Json<GeoLookupRequest>,
    geocoder: web::Data<GeocodingService>,
) -> impl Responder {
    let request = body.into_inner();

    let mut items: Vec<LookupItem> = request
        .items
        .into_iter()
        .map(|item| LookupItem {
            name: item.name.trim().to_string(),
            ..item
        })
        .filter(|item| !item.name.is_empty())
        .collect();
    if items.is_empty() {
        items = request
            .names
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(|name| LookupItem {
                name: name.to_string(),
                day_num: None,
                order: None,
                section: None,
            })
            .collect();
    }
    if items.is_empty() {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "At least one place name is required." }));
    }

    let city = request.city.unwrap_or_default();
    let country = request.country.unwrap_or_default();
    let response = geocoder
        .lookup(&items, city.trim(), country.trim())
        .await;
    HttpResponse::Ok().json(response)
}
