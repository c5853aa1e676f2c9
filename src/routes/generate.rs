use std::time::Duration;

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Serialize;
use serde_json::json;

use crate::models::trip::TripParameters;
use crate::services::feasibility_service::{analyze_structured_day, StructuredDayAnalysis};
use crate::services::generation_service::{GenerationError, GenerationService};
use crate::services::rate_limit_service::{client_id, RateLimiter};
use crate::services::structured_itinerary::{
    build_markdown_from_itinerary, parse_itinerary_response, strip_code_fence,
};

const GENERATE_WINDOW: Duration = Duration::from_secs(60);
const GENERATE_MAX: u32 = 5;

pub fn rate_limited() -> HttpResponse {
    HttpResponse::TooManyRequests()
        .json(json!({ "error": "Too many requests. Please try again in a moment." }))
}

pub fn generation_failure(err: GenerationError) -> HttpResponse {
    match err {
        GenerationError::MissingApiKey => {
            eprintln!("Generation refused: {}", GenerationError::MissingApiKey);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "The OpenAI API key is not configured." }))
        }
        GenerationError::EmptyOutput => HttpResponse::BadGateway()
            .json(json!({ "error": "The itinerary came back empty. Please try again." })),
        err => {
            eprintln!("Generation failed: {}", err);
            HttpResponse::BadGateway()
                .json(json!({ "error": "Itinerary generation failed. Please try again." }))
        }
    }
}

/*
    POST /api/itineraries/generate
*/
pub async fn generate(
    req: HttpRequest,
    body: web::Json<TripParameters>,
    limiter: web::Data<RateLimiter>,
    generator: web::Data<GenerationService>,
) -> impl Responder {
    let key = format!("generate:{}", client_id(&req));
    if !limiter.check(&key, GENERATE_WINDOW, GENERATE_MAX).allowed {
        return rate_limited();
    }

    let params = body.into_inner();
    if let Err(message) = params.validate() {
        return HttpResponse::BadRequest().json(json!({ "error": message }));
    }

    match generator.generate(&params).await {
        Ok(markdown) => HttpResponse::Ok().json(json!({ "markdown": markdown })),
        Err(err) => generation_failure(err),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StructuredDayFeasibility {
    day: i64,
    #[serde(flatten)]
    analysis: StructuredDayAnalysis,
}

/*
    POST /api/itineraries/generate-structured

    The strict path: the model answers with typed JSON, which is validated
    all-or-nothing, sanitized, and projected to the shared markdown shape.
*/
pub async fn generate_structured(
    req: HttpRequest,
    body: web::Json<TripParameters>,
    limiter: web::Data<RateLimiter>,
    generator: web::Data<GenerationService>,
) -> impl Responder {
    let key = format!("generate-structured:{}", client_id(&req));
    if !limiter.check(&key, GENERATE_WINDOW, GENERATE_MAX).allowed {
        return rate_limited();
    }

    let params = body.into_inner();
    if let Err(message) = params.validate() {
        return HttpResponse::BadRequest().json(json!({ "error": message }));
    }

    let raw = match generator.generate_structured(&params).await {
        Ok(raw) => raw,
        Err(err) => return generation_failure(err),
    };

    let Some(itinerary) = parse_itinerary_response(strip_code_fence(&raw)) else {
        eprintln!("Structured generation returned an invalid payload");
        return HttpResponse::BadGateway()
            .json(json!({ "error": "The generated itinerary was invalid. Please try again." }));
    };

    let feasibility: Vec<StructuredDayFeasibility> = itinerary
        .days
        .iter()
        .map(|day| StructuredDayFeasibility {
            day: day.day,
            analysis: analyze_structured_day(day),
        })
        .collect();
    let markdown = build_markdown_from_itinerary(&itinerary);

    HttpResponse::Ok().json(json!({
        "markdown": markdown,
        "days": itinerary.days,
        "feasibility": feasibility,
    }))
}
