//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::appointment::{Appointment, AppointmentDetail, AppointmentFilter};
use crate::domain::models::user::User;

/// Trait defining the interface for appointment storage operations
///
/// This trait abstracts away the specific storage implementation details,
/// allowing the domain layer to work with different storage backends
/// without modification.
#[async_trait]
pub trait AppointmentStorage: Send + Sync {
    /// Store a new appointment
    async fn store_appointment(&self, appointment: &Appointment) -> Result<()>;

    /// Retrieve a specific appointment by ID
    async fn get_appointment(&self, appointment_id: &str) -> Result<Option<Appointment>>;

    /// Retrieve an appointment with its client and specialist records resolved
    async fn get_appointment_detail(&self, appointment_id: &str) -> Result<Option<AppointmentDetail>>;

    /// List appointments matching the filter, most recent first
    async fn list_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>>;

    /// Write the mutable fields of an existing appointment
    /// Returns true if the appointment was found and updated, false otherwise
    async fn update_appointment(&self, appointment: &Appointment) -> Result<bool>;

    /// Delete an appointment
    /// Returns true if the appointment was found and deleted, false otherwise
    async fn delete_appointment(&self, appointment_id: &str) -> Result<bool>;
}

/// Trait defining the interface for user storage operations
///
/// User records are owned by the wider platform; this service reads them
/// to resolve appointment relations and referential checks.
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Store a new user
    async fn store_user(&self, user: &User) -> Result<()>;

    /// Retrieve a specific user by ID
    async fn get_user(&self, user_id: &str) -> Result<Option<User>>;
}
