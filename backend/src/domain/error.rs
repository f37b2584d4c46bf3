use shared::AppointmentStatus;
use thiserror::Error;

/// Domain-level errors for the appointment lifecycle.
#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error("Appointment not found: {0}")]
    NotFound(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Appointment {0} is no longer pending; its scheduled date cannot change")]
    DateLocked(String),

    #[error("Referenced user not found: {0}")]
    UnknownReference(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
