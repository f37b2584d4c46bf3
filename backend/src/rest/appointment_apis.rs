//! # REST API for Appointment Management
//!
//! Endpoints for booking, retrieving, updating, and deleting appointments.
//! Status updates trigger the email notifications handled by the
//! notification service.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::{error, info};

use shared::{
    AppointmentStatus, CreateAppointmentRequest, DeleteAppointmentResponse,
    UpdateAppointmentRequest,
};

use crate::domain::models::appointment::{Appointment, AppointmentChanges, AppointmentFilter};
use crate::rest::error::ApiError;
use crate::rest::AppState;

/// Query parameters for the appointment list endpoint
#[derive(Deserialize, Debug)]
pub struct AppointmentListQuery {
    pub user_id: Option<String>,
    pub specialist_id: Option<String>,
}

/// Axum handler function for GET /api/appointments
pub async fn list_appointments(
    State(state): State<AppState>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    info!("GET /api/appointments - query: {:?}", query);

    let filter = AppointmentFilter {
        user_id: query.user_id,
        specialist_id: query.specialist_id,
    };

    let appointments = state.appointment_service.list_appointments(filter).await?;
    Ok(Json(appointments))
}

/// Axum handler function for GET /api/appointments/:id
pub async fn get_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Appointment>, ApiError> {
    info!("GET /api/appointments/{}", appointment_id);

    let appointment = state.appointment_service.get_appointment(&appointment_id).await?;
    Ok(Json(appointment))
}

/// Axum handler function for POST /api/appointments
pub async fn create_appointment(
    State(state): State<AppState>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    info!("POST /api/appointments - request: {:?}", request);

    let appointment = state.appointment_service.create_appointment(request).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// Axum handler function for PUT /api/appointments/:id
///
/// Applies the allow-listed fields, then dispatches the confirmation or
/// cancellation email keyed on the requested status. The response carries
/// the record returned by the update itself; the notification works off a
/// second read that resolves the related user records.
pub async fn update_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<String>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Appointment>, ApiError> {
    info!("PUT /api/appointments/{} - request: {:?}", appointment_id, request);

    let UpdateAppointmentRequest {
        status,
        notes,
        appointment_date,
        cancel_reason,
    } = request;

    // Only the allow-listed fields reach storage; cancel_reason is
    // notification-only.
    let changes = AppointmentChanges {
        status,
        notes,
        appointment_date,
    };

    let updated = state
        .appointment_service
        .update_appointment(&appointment_id, changes)
        .await?;

    if let Some(status) = status {
        dispatch_status_notification(&state, &appointment_id, status, cancel_reason.as_deref())
            .await;
    }

    Ok(Json(updated))
}

/// Axum handler function for DELETE /api/appointments/:id
pub async fn delete_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<String>,
) -> Result<Json<DeleteAppointmentResponse>, ApiError> {
    info!("DELETE /api/appointments/{}", appointment_id);

    let response = state.appointment_service.delete_appointment(&appointment_id).await?;
    Ok(Json(response))
}

/// Send the email tied to a status change, if the new status calls for one.
///
/// A failed dispatch must not fail the already-persisted update, so every
/// failure path here only logs.
async fn dispatch_status_notification(
    state: &AppState,
    appointment_id: &str,
    status: AppointmentStatus,
    cancel_reason: Option<&str>,
) {
    // Second read: the email body needs the joined client/specialist records
    let detail = match state
        .appointment_service
        .get_appointment_detail(appointment_id)
        .await
    {
        Ok(detail) => detail,
        Err(e) => {
            error!(
                "Failed to load appointment {} for notification: {}",
                appointment_id, e
            );
            return;
        }
    };

    let result = match status {
        AppointmentStatus::Confirmed => state.notifier.send_confirmation(&detail),
        AppointmentStatus::Canceled => state.notifier.send_cancellation(&detail, cancel_reason),
        AppointmentStatus::Pending | AppointmentStatus::Completed => return,
    };

    if let Err(e) = result {
        error!(
            "Failed to send notification for appointment {}: {}",
            appointment_id, e
        );
    }
}
