mod appointment_repository;
mod user_repository;

pub use appointment_repository::SqliteAppointmentRepository;
pub use user_repository::SqliteUserRepository;
