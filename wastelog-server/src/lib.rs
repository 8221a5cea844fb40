//! Actix-Web API server for wastelog.
//!
//! Serves the REST API for logging waste collections, managing collection
//! schedules, and reading daily reports and summary statistics.

pub mod api;
pub mod config;
mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, ResponseError, error, middleware, web};
use wastelog_core::{BackendKind, StoreBackend, WasteService, memory};

use crate::api::ApiError;
use crate::config::ServerConfig;

/// Shared application state.
pub struct AppState {
    /// Service facade over the configured store backend.
    pub service: Arc<WasteService>,
}

/// Register the `/api` routes and request extractor error handling on an app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).app_data(query_config()).service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/records", web::post().to(handlers::create_record))
            .route("/records", web::get().to(handlers::records))
            .route("/records/daily/{date}", web::get().to(handlers::daily_report))
            .route("/records/{id}", web::delete().to(handlers::delete_record))
            .route("/schedules", web::post().to(handlers::create_schedule))
            .route("/schedules", web::get().to(handlers::schedules))
            .route(
                "/schedules/{id}/complete",
                web::patch().to(handlers::complete_schedule),
            )
            .route("/schedules/{id}", web::delete().to(handlers::delete_schedule))
            .route("/statistics", web::get().to(handlers::statistics)),
    );
}

// Malformed bodies and query strings get the same error shape as validation
// failures.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| bad_request(err))
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| bad_request(err))
}

fn bad_request<E: ResponseError + 'static>(err: E) -> error::Error {
    let body = ApiError::new(err.to_string());
    error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

/// Open the store backend selected by the configuration.
///
/// # Errors
///
/// Returns an error when the JSON store directory cannot be prepared or read.
pub async fn open_backend(config: &ServerConfig) -> anyhow::Result<StoreBackend> {
    match config.store {
        BackendKind::Json => Ok(wastelog_store_json::backend(&config.data_dir).await?),
        BackendKind::Memory => {
            log::warn!("using in-memory store; data is lost on shutdown");
            Ok(memory::backend())
        }
    }
}

/// Starts the wastelog API server.
///
/// The caller provides the async runtime (e.g. via `#[actix_web::main]`) and
/// initialises logging.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the HTTP server fails to
/// bind or encounters a runtime error.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    log::info!("Opening {} store...", config.store);
    let backend = open_backend(&config).await?;

    let state = web::Data::new(AppState {
        service: Arc::new(WasteService::new(backend)),
    });

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
