#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the county explorer.
//!
//! Serves the county dataset and its summary statistics as a REST API
//! plus static front-end files. Everything is loaded once at startup and
//! held in memory; scoring happens client-side against the
//! `/api/counties` payload, so there are no scoring endpoints here.

mod handlers;

use std::path::Path;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use county_compass_county_models::CountyRecord;
use county_compass_dataset::DatasetVersion;
use county_compass_scoring_models::StatisticsSummary;

/// Shared application state.
pub struct AppState {
    /// Every county in the loaded dataset, in file order.
    pub counties: Vec<CountyRecord>,
    /// Fingerprint of the dataset file, reported by the health endpoint.
    pub version: DatasetVersion,
    /// Summary statistics, computed once at startup.
    pub stats: StatisticsSummary,
}

/// Starts the county explorer API server.
///
/// Loads the dataset from `DATASET_PATH` (default
/// `data/final/dataset.json`), computes its summary statistics, and
/// serves on `BIND_ADDR`:`PORT` (default `0.0.0.0:8016`). This is a
/// regular async function; the caller provides the async runtime (e.g.
/// via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an error if the dataset cannot be loaded or the HTTP server
/// fails to bind.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let dataset_path =
        std::env::var("DATASET_PATH").unwrap_or_else(|_| "data/final/dataset.json".to_string());

    log::info!("Loading dataset from {dataset_path}...");
    let dataset = county_compass_dataset::load(Path::new(&dataset_path)).map_err(|e| {
        log::error!("Cannot serve without a dataset at {dataset_path}: {e}");
        std::io::Error::other(e)
    })?;

    let stats = county_compass_scoring::stats::summarize(&dataset.counties);

    let state = web::Data::new(AppState {
        counties: dataset.counties,
        version: dataset.version,
        stats,
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8016);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/counties", web::get().to(handlers::counties))
                    .route("/counties/{fips}", web::get().to(handlers::county_by_fips))
                    .route("/stats", web::get().to(handlers::stats))
                    .route("/palette", web::get().to(handlers::palette)),
            )
            // Serve frontend static files (production)
            .service(Files::new("/", "app/dist").index_file("index.html"))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
