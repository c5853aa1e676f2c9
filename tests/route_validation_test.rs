mod common;

use actix_web::test;
use serde_json::json;
use serial_test::serial;

use common::TestApp;

fn trip_payload() -> serde_json::Value {
    json!({
        "country": "Portugal",
        "city": "Porto",
        "nights": 3,
        "travelStyles": ["food-dining"],
        "budgetMode": "standard",
        "companionType": "couple",
        "pace": "relaxed",
        "dayStartHour": 9,
        "dayEndHour": 21
    })
}

#[actix_rt::test]
#[serial]
async fn test_generate_rejects_missing_city() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let mut payload = trip_payload();
    payload["city"] = json!("  ");
    let req = test::TestRequest::post()
        .uri("/api/itineraries/generate")
        .set_json(&payload)
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap_or_default().contains("country and a city"));
}

#[actix_rt::test]
#[serial]
async fn test_generate_rejects_out_of_range_nights() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    for nights in [0, 15] {
        let mut payload = trip_payload();
        payload["nights"] = json!(nights);
        let req = test::TestRequest::post()
            .uri("/api/itineraries/generate")
            .set_json(&payload)
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400, "nights = {}", nights);
    }
}

#[actix_rt::test]
#[serial]
async fn test_generate_rate_limit_kicks_in() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    // Invalid payloads are rejected with 400 while the quota lasts; the
    // sixth request in the window must hit 429 instead.
    let mut payload = trip_payload();
    payload["nights"] = json!(0);
    for _ in 0..5 {
        let req = test::TestRequest::post()
            .uri("/api/itineraries/generate")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    let req = test::TestRequest::post()
        .uri("/api/itineraries/generate")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 429);
}

#[actix_rt::test]
#[serial]
async fn test_regenerate_day_rejects_day_out_of_range() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let mut payload = trip_payload();
    payload["dayNumber"] = json!(9);
    payload["existingMarkdown"] = json!("## Day 1 - A\n- one\n");
    let req = test::TestRequest::post()
        .uri("/api/itineraries/regenerate-day")
        .set_json(&payload)
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap_or_default().contains("between 1 and 4"));
}

#[actix_rt::test]
#[serial]
async fn test_edit_append_day_and_nights() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/itineraries/edit")
        .set_json(json!({
            "markdown": "## Day 1 - A\n### Morning\n- **Walk**\n",
            "op": "appendDay"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["nights"], json!(1));
    assert!(body["markdown"]
        .as_str()
        .unwrap_or_default()
        .contains("## Day 2 - New day"));
}

#[actix_rt::test]
#[serial]
async fn test_edit_missing_day_returns_document_unchanged() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let doc = "## Day 1 - A\n### Morning\n- **Walk**\n";
    let req = test::TestRequest::post()
        .uri("/api/itineraries/edit")
        .set_json(json!({
            "markdown": doc,
            "op": "appendNote",
            "dayNumber": 5,
            "note": "late checkout"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["markdown"], json!(doc));
}

#[actix_rt::test]
#[serial]
async fn test_analyze_reports_days_and_budget() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let markdown = "## Day 1 - Walks\n### Morning\n- **Fort** move 30 min\n- **Garden** move 20 min\n\n## Day 2 - Food\n### Lunch\n- **Market hall** move 10 min\n";
    let req = test::TestRequest::post()
        .uri("/api/itineraries/analyze")
        .set_json(json!({ "markdown": markdown, "payload": trip_payload() }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["days"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["days"][0]["moveMinutes"], json!(50));
    assert_eq!(body["budget"]["currency"], json!("KRW"));
    let places: Vec<&str> = body["places"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["name"].as_str())
        .collect();
    assert_eq!(places, vec!["Fort", "Garden", "Market hall"]);
}

#[actix_rt::test]
#[serial]
async fn test_analyze_without_day_headers_degrades_to_empty() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/itineraries/analyze")
        .set_json(json!({ "markdown": "Just a paragraph of prose.", "payload": trip_payload() }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["days"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["warnings"].as_array().map(Vec::len), Some(0));
}

#[actix_rt::test]
#[serial]
async fn test_geo_lookup_requires_names() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/geo/lookup")
        .set_json(json!({ "items": [], "names": [], "city": "Porto" }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
#[serial]
async fn test_share_delete_requires_token() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::delete()
        .uri("/api/share/some-id")
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_share_create_rejects_empty_markdown() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/share")
        .set_json(json!({ "markdown": "  ", "payload": trip_payload() }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}
