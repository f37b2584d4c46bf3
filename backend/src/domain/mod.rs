pub mod appointment_service;
pub mod error;
pub mod models;
pub mod notification_service;
