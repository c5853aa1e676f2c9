use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::models::trip::TripParameters;
use crate::services::budget_service::budget_breakdown;
use crate::services::feasibility_service::{analyze_day, DayAnalysis};
use crate::services::markdown::extract::extract_days;
use crate::services::markdown::places::extract_place_candidates_with_meta;
use crate::services::markdown::sanitize::sanitize_day_raw;

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub markdown: String,
    pub payload: TripParameters,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DayReport {
    day_num: u32,
    title: String,
    #[serde(flatten)]
    analysis: DayAnalysis,
}

/*
    POST /api/itineraries/analyze

    Derived data for the current document: per-day feasibility heuristics
    over the sanitized day text, a budget estimate from the trip parameters,
    and the geocodable place candidates. A document with no recognizable day
    headers yields empty per-day data; the caller renders it as plain prose.
*/
pub async fn analyze(body: web::Json<AnalyzeRequest>) -> impl Responder {
    let request = body.into_inner();
    if request.markdown.trim().is_empty() {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "An itinerary document is required." }));
    }

    let days: Vec<DayReport> = extract_days(&request.markdown)
        .into_iter()
        .map(|day| {
            let sanitized = sanitize_day_raw(&day.raw, day.day_num);
            DayReport {
                day_num: day.day_num,
                title: day.title,
                analysis: analyze_day(&sanitized),
            }
        })
        .collect();

    let warnings: Vec<String> = days
        .iter()
        .flat_map(|d| {
            d.analysis
                .warnings
                .iter()
                .map(move |w| format!("Day {}: {}", d.day_num, w))
        })
        .collect();

    let places = extract_place_candidates_with_meta(&request.markdown);
    let budget = budget_breakdown(&request.payload);

    HttpResponse::Ok().json(json!({
        "days": days,
        "warnings": warnings,
        "places": places,
        "budget": budget,
    }))
}
