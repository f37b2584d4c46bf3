use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Booked but not yet acted on by the specialist
    Pending,
    /// Accepted by the specialist
    Confirmed,
    /// Called off by either party
    Canceled,
    /// Service was delivered
    Completed,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Canceled => write!(f, "canceled"),
            AppointmentStatus::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "canceled" => Ok(AppointmentStatus::Canceled),
            "completed" => Ok(AppointmentStatus::Completed),
            other => Err(format!("Unknown appointment status: {}", other)),
        }
    }
}

/// Kind of service an appointment is booked for.
/// Determines which specialist role acts on the appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    Training,
    Nutrition,
    Therapy,
    MentalPerformance,
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentType::Training => write!(f, "training"),
            AppointmentType::Nutrition => write!(f, "nutrition"),
            AppointmentType::Therapy => write!(f, "therapy"),
            AppointmentType::MentalPerformance => write!(f, "mental_performance"),
        }
    }
}

impl FromStr for AppointmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "training" => Ok(AppointmentType::Training),
            "nutrition" => Ok(AppointmentType::Nutrition),
            "therapy" => Ok(AppointmentType::Therapy),
            "mental_performance" => Ok(AppointmentType::MentalPerformance),
            other => Err(format!("Unknown appointment type: {}", other)),
        }
    }
}

/// Request body for booking a new appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    /// ID of the client requesting the appointment
    pub user_id: String,
    /// ID of the specialist the appointment is booked with
    pub specialist_id: String,
    /// Scheduled date and time (UTC)
    pub appointment_date: DateTime<Utc>,
    pub appointment_type: AppointmentType,
    pub notes: Option<String>,
}

/// Request body for updating an appointment.
///
/// Only `status`, `notes` and `appointment_date` are ever persisted; any
/// other field in the incoming JSON is dropped during deserialization.
/// `cancel_reason` is carried through to the cancellation notification and
/// never written to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
    pub appointment_date: Option<DateTime<Utc>>,
    pub cancel_reason: Option<String>,
}

/// Response body for a successful appointment deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteAppointmentResponse {
    pub message: String,
}
