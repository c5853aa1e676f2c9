use std::env;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use smart_trip_planner::db;
use smart_trip_planner::routes;
use smart_trip_planner::services::generation_service::GenerationService;
use smart_trip_planner::services::geocoding_service::GeocodingService;
use smart_trip_planner::services::rate_limit_service::RateLimiter;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    println!("Logger initialized");

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    } else {
        println!("Release mode");
    }

    let host = env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);
    println!("Attempting to bind to {}:{}", host, port);

    let mongo_uri = env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    println!("Got MongoDB URI, attempting connection...");
    let client = db::mongo::create_mongo_client(&mongo_uri).await;
    println!("MongoDB connection established");

    let limiter = web::Data::new(RateLimiter::new());
    let generator = web::Data::new(GenerationService::from_env());
    let geocoder = web::Data::new(GeocodingService::from_env());
    if !generator.is_configured() {
        eprintln!("WARNING: OPENAI_API_KEY is not set; generation endpoints will fail");
    }

    println!("Starting HTTP server...");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .app_data(web::Data::new(client.clone()))
            .app_data(limiter.clone())
            .app_data(generator.clone())
            .app_data(geocoder.clone())
            .route("/health", web::get().to(routes::health::health_check))
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/itineraries")
                            .route("/generate", web::post().to(routes::generate::generate))
                            .route(
                                "/generate-structured",
                                web::post().to(routes::generate::generate_structured),
                            )
                            .route(
                                "/regenerate-day",
                                web::post().to(routes::regenerate::regenerate_day),
                            )
                            .route(
                                "/regenerate-section",
                                web::post().to(routes::regenerate::regenerate_section),
                            )
                            .route("/edit", web::post().to(routes::edit::edit))
                            .route("/analyze", web::post().to(routes::analyze::analyze)),
                    )
                    .service(
                        web::scope("/share")
                            .route("", web::post().to(routes::share::create))
                            .route("/{id}", web::get().to(routes::share::get_by_id))
                            .route("/{id}", web::delete().to(routes::share::delete)),
                    )
                    .route("/geo/lookup", web::post().to(routes::geo::lookup)),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
