use std::time::Duration;

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::models::trip::TripParameters;
use crate::routes::generate::{generation_failure, rate_limited};
use crate::services::generation_service::GenerationService;
use crate::services::markdown::extract::extract_days;
use crate::services::markdown::ops::{replace_day, replace_day_raw, replace_section};
use crate::services::markdown::sanitize::sanitize_day_raw;
use crate::services::rate_limit_service::{client_id, RateLimiter};

const REGENERATE_WINDOW: Duration = Duration::from_secs(60);
const REGENERATE_MAX: u32 = 8;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateDayRequest {
    #[serde(flatten)]
    pub params: TripParameters,
    pub day_number: u32,
    pub existing_markdown: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateSectionRequest {
    #[serde(flatten)]
    pub params: TripParameters,
    pub day_number: u32,
    pub section_title: String,
    pub existing_markdown: String,
}

/*
    POST /api/itineraries/regenerate-day

    Calls the generation backend for one day block, then splices it into the
    supplied document. A day the document does not contain leaves it
    untouched and is reported as unprocessable.
*/
pub async fn regenerate_day(
    req: HttpRequest,
    body: web::Json<RegenerateDayRequest>,
    limiter: web::Data<RateLimiter>,
    generator: web::Data<GenerationService>,
) -> impl Responder {
    let key = format!("regenerate-day:{}", client_id(&req));
    if !limiter.check(&key, REGENERATE_WINDOW, REGENERATE_MAX).allowed {
        return rate_limited();
    }

    let request = body.into_inner();
    if let Err(message) = request.params.validate() {
        return HttpResponse::BadRequest().json(json!({ "error": message }));
    }
    if let Err(message) = request.params.validate_day_number(request.day_number) {
        return HttpResponse::BadRequest().json(json!({ "error": message }));
    }

    let block = match generator
        .regenerate_day(&request.params, request.day_number, &request.existing_markdown)
        .await
    {
        Ok(block) => block,
        Err(err) => return generation_failure(err),
    };

    let mut updated = replace_day(&request.existing_markdown, request.day_number, &block);
    if updated == request.existing_markdown {
        let sanitized = sanitize_day_raw(&block, request.day_number);
        updated = replace_day_raw(&request.existing_markdown, request.day_number, &sanitized);
    }
    if updated == request.existing_markdown {
        return HttpResponse::UnprocessableEntity().json(json!({
            "error": format!("Day {} was not found in the itinerary.", request.day_number)
        }));
    }

    let day_markdown = sanitize_day_raw(&block, request.day_number);
    HttpResponse::Ok().json(json!({ "markdown": updated, "dayMarkdown": day_markdown }))
}

/*
    POST /api/itineraries/regenerate-section

    Regenerates one section of one day, with the current day text as model
    context, and returns the whole updated document.
*/
pub async fn regenerate_section(
    req: HttpRequest,
    body: web::Json<RegenerateSectionRequest>,
    limiter: web::Data<RateLimiter>,
    generator: web::Data<GenerationService>,
) -> impl Responder {
    let key = format!("regenerate-section:{}", client_id(&req));
    if !limiter.check(&key, REGENERATE_WINDOW, REGENERATE_MAX).allowed {
        return rate_limited();
    }

    let request = body.into_inner();
    if let Err(message) = request.params.validate() {
        return HttpResponse::BadRequest().json(json!({ "error": message }));
    }
    if let Err(message) = request.params.validate_day_number(request.day_number) {
        return HttpResponse::BadRequest().json(json!({ "error": message }));
    }
    if request.section_title.trim().is_empty() {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "A section title is required." }));
    }

    let Some(day) = extract_days(&request.existing_markdown)
        .into_iter()
        .find(|d| d.day_num == request.day_number)
    else {
        return HttpResponse::UnprocessableEntity().json(json!({
            "error": format!("Day {} was not found in the itinerary.", request.day_number)
        }));
    };

    let block = match generator
        .regenerate_section(
            &request.params,
            request.day_number,
            &request.section_title,
            &day.raw,
        )
        .await
    {
        Ok(block) => block,
        Err(err) => return generation_failure(err),
    };

    let updated = replace_section(
        &request.existing_markdown,
        request.day_number,
        &request.section_title,
        &block,
    );
    if updated == request.existing_markdown {
        return HttpResponse::UnprocessableEntity().json(json!({
            "error": format!(
                "Day {} could not be updated. Check the day header format.",
                request.day_number
            )
        }));
    }

    HttpResponse::Ok().json(json!({ "markdown": updated }))
}
