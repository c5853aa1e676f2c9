use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App};
use mongodb::options::ClientOptions;
use std::sync::Arc;

use smart_trip_planner::routes;
use smart_trip_planner::services::generation_service::GenerationService;
use smart_trip_planner::services::geocoding_service::GeocodingService;
use smart_trip_planner::services::rate_limit_service::RateLimiter;

pub struct TestApp {
    pub client: Arc<mongodb::Client>,
}

impl TestApp {
    pub async fn new() -> Self {
        let mongo_uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        // Build the client without the startup ping; these tests only cover
        // routes that do not touch the database.
        let options = ClientOptions::parse(&mongo_uri)
            .await
            .expect("parse mongo uri");
        let client = mongodb::Client::with_options(options).expect("mongo client");

        Self {
            client: Arc::new(client),
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(self.client.clone()))
            .app_data(web::Data::new(RateLimiter::new()))
            .app_data(web::Data::new(GenerationService::from_env()))
            .app_data(web::Data::new(GeocodingService::from_env()))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .route(
                "/api/itineraries/generate",
                web::post().to(routes::generate::generate),
            )
            .route(
                "/api/itineraries/generate-structured",
                web::post().to(routes::generate::generate_structured),
            )
            .route(
                "/api/itineraries/regenerate-day",
                web::post().to(routes::regenerate::regenerate_day),
            )
            .route(
                "/api/itineraries/regenerate-section",
                web::post().to(routes::regenerate::regenerate_section),
            )
            .route("/api/itineraries/edit", web::post().to(routes::edit::edit))
            .route(
                "/api/itineraries/analyze",
                web::post().to(routes::analyze::analyze),
            )
            .route("/api/share", web::post().to(routes::share::create))
            .route("/api/share/{id}", web::get().to(routes::share::get_by_id))
            .route("/api/share/{id}", web::delete().to(routes::share::delete))
            .route("/api/geo/lookup", web::post().to(routes::geo::lookup))
    }
}
