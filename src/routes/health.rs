use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use mongodb::Client;
use serde::Serialize;

use crate::services::generation_service::GenerationService;
use crate::services::geocoding_service::GeocodingService;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

pub async fn health_check(
    client: web::Data<Arc<Client>>,
    generator: web::Data<GenerationService>,
    geocoder: web::Data<GeocodingService>,
) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let mongo_status = match client
        .database("Itineraries")
        .run_command(mongodb::bson::doc! {"ping": 1})
        .await
    {
        Ok(_) => ServiceStatus {
            status: "ok".to_string(),
            details: None,
        },
        Err(e) => {
            health.status = "degraded".to_string();
            ServiceStatus {
                status: "error".to_string(),
                details: Some(e.to_string()),
            }
        }
    };
    health.services.insert("mongodb".to_string(), mongo_status);

    let openai_status = if generator.is_configured() {
        ServiceStatus {
            status: "ok".to_string(),
            details: None,
        }
    } else {
        health.status = "degraded".to_string();
        ServiceStatus {
            status: "unconfigured".to_string(),
            details: Some("OPENAI_API_KEY is not set".to_string()),
        }
    };
    health.services.insert("openai".to_string(), openai_status);

    health.services.insert(
        "geocoding".to_string(),
        ServiceStatus {
            status: "ok".to_string(),
            details: Some(format!("provider: {}", geocoder.provider())),
        },
    );

    HttpResponse::Ok().json(health)
}
