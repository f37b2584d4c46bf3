pub mod appointment_apis;
pub mod error;

use axum::routing::get;
use axum::Router;

use crate::domain::appointment_service::AppointmentService;
use crate::domain::notification_service::AppointmentNotifier;
use crate::storage::sqlite::{SqliteAppointmentRepository, SqliteUserRepository};

use appointment_apis::{
    create_appointment, delete_appointment, get_appointment, list_appointments,
    update_appointment,
};

/// The appointment service wired to its production storage.
pub type BackendAppointmentService =
    AppointmentService<SqliteAppointmentRepository, SqliteUserRepository>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub appointment_service: BackendAppointmentService,
    pub notifier: AppointmentNotifier,
}

impl AppState {
    pub fn new(appointment_service: BackendAppointmentService, notifier: AppointmentNotifier) -> Self {
        Self {
            appointment_service,
            notifier,
        }
    }
}

/// Build the API routes; the caller nests these under `/api`
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/appointments", get(list_appointments).post(create_appointment))
        .route(
            "/appointments/:id",
            get(get_appointment)
                .put(update_appointment)
                .delete(delete_appointment),
        )
        .with_state(state)
}
