//! Domain model for an appointment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{AppointmentStatus, AppointmentType};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::models::user::User;

/// A scheduled service booking between a client and a specialist.
///
/// `user_id` and `specialist_id` are fixed at booking time; only `status`,
/// `notes` and (while still pending) `appointment_date` change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub user_id: String,
    pub specialist_id: String,
    pub appointment_date: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub appointment_type: AppointmentType,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Generate a unique appointment ID.
    /// Format: appointment::<timestamp_ms>-<random_suffix>
    pub fn generate_id(timestamp_ms: u64) -> String {
        format!("appointment::{}-{}", timestamp_ms, Self::generate_random_suffix(4))
    }

    /// Generate a random hex suffix for appointment IDs.
    fn generate_random_suffix(len: usize) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards")
            .as_nanos();
        format!("{:x}", now % (16_u128.pow(len as u32)))
            .chars()
            .take(len)
            .collect()
    }
}

/// An appointment with its related user records resolved.
/// Either side may be absent if the referenced user has been removed.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentDetail {
    pub appointment: Appointment,
    pub client: Option<User>,
    pub specialist: Option<User>,
}

/// Optional filters for listing appointments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentFilter {
    pub user_id: Option<String>,
    pub specialist_id: Option<String>,
}

/// The allow-listed set of mutable appointment fields. Everything else an
/// update request carries never reaches storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentChanges {
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
    pub appointment_date: Option<DateTime<Utc>>,
}
