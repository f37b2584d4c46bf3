use std::path::Path;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, Level};

mod config;
mod db;
mod domain;
mod rest;
mod storage;

use crate::config::ConfigService;
use crate::db::DbConnection;
use crate::domain::appointment_service::AppointmentService;
use crate::domain::notification_service::{AppointmentNotifier, Mailer, NoopMailer, SmtpMailer};
use crate::storage::sqlite::{SqliteAppointmentRepository, SqliteUserRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let config_path =
        std::env::var("WELLNESS_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let config = ConfigService::load_config_or_default(Path::new(&config_path));

    info!("Setting up database");
    let db = DbConnection::new(&config.database_url).await?;

    let appointment_repository = SqliteAppointmentRepository::new(db.clone());
    let user_repository = SqliteUserRepository::new(db);
    let appointment_service = AppointmentService::new(appointment_repository, user_repository);

    let mailer: Arc<dyn Mailer> = if config.email.is_configured() {
        Arc::new(SmtpMailer::from_config(&config.email)?)
    } else {
        info!("Email transport not configured; notifications are disabled");
        Arc::new(NoopMailer)
    };
    let notifier = AppointmentNotifier::new(mailer);

    let state = rest::AppState::new(appointment_service, notifier);

    // CORS setup to allow the dashboard to make requests
    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api", rest::api_router(state))
        .layer(cors);

    // Start the server
    info!("Starting server on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
