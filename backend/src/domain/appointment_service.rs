use chrono::Utc;
use shared::{AppointmentStatus, CreateAppointmentRequest, DeleteAppointmentResponse};
use tracing::{info, warn};

use crate::domain::error::AppointmentError;
use crate::domain::models::appointment::{
    Appointment, AppointmentChanges, AppointmentDetail, AppointmentFilter,
};
use crate::storage::traits::{AppointmentStorage, UserStorage};

/// Service for managing the appointment lifecycle.
///
/// Mutations funnel through here so the transition rules apply regardless
/// of which surface issued the request.
#[derive(Clone)]
pub struct AppointmentService<S, U> {
    appointments: S,
    users: U,
}

/// Check whether a status transition is allowed.
///
/// Re-setting the current status is always allowed (and re-triggers any
/// notification tied to it); `completed` and `canceled` are otherwise
/// terminal.
fn validate_transition(
    from: AppointmentStatus,
    to: AppointmentStatus,
) -> Result<(), AppointmentError> {
    use AppointmentStatus::*;

    let allowed = match (from, to) {
        (current, next) if current == next => true,
        (Pending, Confirmed) | (Pending, Canceled) | (Pending, Completed) => true,
        (Confirmed, Canceled) | (Confirmed, Completed) => true,
        (Completed, _) | (Canceled, _) => false,
        _ => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(AppointmentError::InvalidTransition { from, to })
    }
}

impl<S: AppointmentStorage, U: UserStorage> AppointmentService<S, U> {
    pub fn new(appointments: S, users: U) -> Self {
        Self { appointments, users }
    }

    /// List appointments, optionally filtered by client or specialist
    pub async fn list_appointments(
        &self,
        filter: AppointmentFilter,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let appointments = self.appointments.list_appointments(&filter).await?;
        info!("Found {} appointments", appointments.len());
        Ok(appointments)
    }

    /// Get an appointment by ID
    pub async fn get_appointment(&self, appointment_id: &str) -> Result<Appointment, AppointmentError> {
        self.appointments
            .get_appointment(appointment_id)
            .await?
            .ok_or_else(|| AppointmentError::NotFound(appointment_id.to_string()))
    }

    /// Get an appointment with its client and specialist records resolved
    pub async fn get_appointment_detail(
        &self,
        appointment_id: &str,
    ) -> Result<AppointmentDetail, AppointmentError> {
        self.appointments
            .get_appointment_detail(appointment_id)
            .await?
            .ok_or_else(|| AppointmentError::NotFound(appointment_id.to_string()))
    }

    /// Book a new appointment
    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Creating appointment: user={}, specialist={}, type={}",
            request.user_id, request.specialist_id, request.appointment_type
        );

        // Both parties must exist before a booking can reference them
        if self.users.get_user(&request.user_id).await?.is_none() {
            return Err(AppointmentError::UnknownReference(request.user_id));
        }
        if self.users.get_user(&request.specialist_id).await?.is_none() {
            return Err(AppointmentError::UnknownReference(request.specialist_id));
        }

        let now = Utc::now();
        let appointment = Appointment {
            id: Appointment::generate_id(now.timestamp_millis() as u64),
            user_id: request.user_id,
            specialist_id: request.specialist_id,
            appointment_date: request.appointment_date,
            status: AppointmentStatus::Pending,
            appointment_type: request.appointment_type,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };

        self.appointments.store_appointment(&appointment).await?;

        info!("Created appointment with ID: {}", appointment.id);

        Ok(appointment)
    }

    /// Apply an allow-listed change set to an existing appointment
    pub async fn update_appointment(
        &self,
        appointment_id: &str,
        changes: AppointmentChanges,
    ) -> Result<Appointment, AppointmentError> {
        info!("Updating appointment: {}", appointment_id);

        let mut appointment = self
            .appointments
            .get_appointment(appointment_id)
            .await?
            .ok_or_else(|| {
                warn!("Appointment not found: {}", appointment_id);
                AppointmentError::NotFound(appointment_id.to_string())
            })?;

        if let Some(next) = changes.status {
            validate_transition(appointment.status, next)?;
        }
        // Once an appointment has been acted on, its date is fixed
        if changes.appointment_date.is_some() && appointment.status != AppointmentStatus::Pending {
            return Err(AppointmentError::DateLocked(appointment_id.to_string()));
        }

        if let Some(status) = changes.status {
            appointment.status = status;
        }
        if let Some(notes) = changes.notes {
            appointment.notes = Some(notes);
        }
        if let Some(date) = changes.appointment_date {
            appointment.appointment_date = date;
        }
        appointment.updated_at = Utc::now();

        let updated = self.appointments.update_appointment(&appointment).await?;
        if !updated {
            // Deleted between the read and the write; last writer loses
            return Err(AppointmentError::NotFound(appointment_id.to_string()));
        }

        info!(
            "Updated appointment {} to status {}",
            appointment.id, appointment.status
        );

        Ok(appointment)
    }

    /// Delete an appointment
    pub async fn delete_appointment(
        &self,
        appointment_id: &str,
    ) -> Result<DeleteAppointmentResponse, AppointmentError> {
        info!("Deleting appointment: {}", appointment_id);

        let deleted = self.appointments.delete_appointment(appointment_id).await?;
        if !deleted {
            warn!("Appointment not found: {}", appointment_id);
            return Err(AppointmentError::NotFound(appointment_id.to_string()));
        }

        Ok(DeleteAppointmentResponse {
            message: format!("Appointment '{}' deleted successfully", appointment_id),
        })
    }
}
