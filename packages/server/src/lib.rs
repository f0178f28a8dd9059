#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the safety map application.
//!
//! Serves the filtered report feed, map markers, a live feed over
//! server-sent events, report submission with geocoding, settings and
//! emergency contacts, and the emergency alert trigger.

pub mod config;
pub mod error;
pub mod handlers;
pub mod live;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use safety_map_alert::{AlertChannel, channels_from_env};
use safety_map_database::{ReportStore, SettingsStore, SqliteReportStore};
use safety_map_feed::FeedView;
use safety_map_geocoder::{AddressLookup, Geocoder, SessionDebouncers};

pub use config::ServerConfig;

/// Shared application state.
pub struct AppState {
    /// Report storage.
    pub reports: Arc<dyn ReportStore>,
    /// Preference storage.
    pub settings: Arc<dyn SettingsStore>,
    /// Location geocoder.
    pub geocoder: Arc<dyn AddressLookup>,
    /// Per-session debouncing for address suggestions.
    pub suggestions: SessionDebouncers,
    /// Configured alert delivery channels.
    pub alert_channels: Arc<Vec<Box<dyn AlertChannel>>>,
    /// Last successfully loaded report snapshot.
    pub feed: Mutex<FeedView>,
    /// Server settings.
    pub config: ServerConfig,
}

impl AppState {
    /// Locks the shared feed snapshot.
    pub fn lock_feed(&self) -> MutexGuard<'_, FeedView> {
        self.feed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/reports", web::get().to(handlers::list_reports))
            .route("/reports", web::post().to(handlers::create_report))
            .route("/reports/live", web::get().to(handlers::live_feed))
            .route("/markers", web::get().to(handlers::markers))
            .route("/geocode/suggest", web::get().to(handlers::suggest))
            .route("/contacts", web::get().to(handlers::get_contacts))
            .route("/contacts", web::put().to(handlers::put_contacts))
            .route("/settings/{key}", web::get().to(handlers::get_setting))
            .route("/settings/{key}", web::put().to(handlers::put_setting))
            .route("/alert", web::post().to(handlers::send_alert)),
    );
}

/// Starts the safety map API server.
///
/// Opens the report database, loads the geocoder configuration and alert
/// channels, and starts the Actix-Web HTTP server. This is a regular async
/// function; the caller is responsible for providing the async runtime
/// (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the database cannot be opened,
/// the geocoder cannot be built, or the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = ServerConfig::from_env();

    log::info!("Opening report database at {}...", config.db_path.display());
    let store = SqliteReportStore::open(&config.db_path)
        .await
        .map_err(std::io::Error::other)?;
    match store.count().await {
        Ok(count) => log::info!("{count} reports on file"),
        Err(e) => log::warn!("Could not count reports: {e}"),
    }

    let geocoder = Geocoder::from_registry().map_err(std::io::Error::other)?;
    let suggestions = SessionDebouncers::new(geocoder.debounce_delay());
    let alert_channels = channels_from_env();
    log::info!("{} alert channel(s) configured", alert_channels.len());

    let settings = store.settings();
    let state = web::Data::new(AppState {
        reports: Arc::new(store),
        settings: Arc::new(settings),
        geocoder: Arc::new(geocoder),
        suggestions,
        alert_channels: Arc::new(alert_channels),
        feed: Mutex::new(FeedView::new()),
        config: config.clone(),
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
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}
