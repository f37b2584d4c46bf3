use anyhow::{Context, Result};
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Message, SmtpTransport, Transport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::domain::models::appointment::AppointmentDetail;

/// Placeholder used when a cancellation request carries no reason.
pub const DEFAULT_CANCEL_REASON: &str = "No reason provided.";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_server: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            username: String::new(),
            password: String::new(),
            from_email: String::new(),
        }
    }
}

impl EmailConfig {
    /// Whether the config carries enough to build a transport
    pub fn is_configured(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty() && !self.from_email.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Failed to build notification email: {0}")]
    Build(String),

    #[error("Failed to deliver notification email: {0}")]
    Delivery(String),
}

/// A fully rendered email, ready for a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Single-operation mail capability. The SMTP transport implements it in
/// production; tests substitute a recording double.
pub trait Mailer: Send + Sync {
    fn send(&self, email: &OutboundEmail) -> Result<(), NotificationError>;
}

/// Mailer backed by a lettre SMTP transport.
pub struct SmtpMailer {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(config: &EmailConfig) -> Result<Self> {
        info!(
            "Initializing SMTP transport for {}:{}",
            config.smtp_server, config.smtp_port
        );

        let tls_params = TlsParameters::new(config.smtp_server.clone())
            .context("Failed to create TLS parameters")?;

        let transport = SmtpTransport::relay(&config.smtp_server)
            .context("Failed to create SMTP relay")?
            .port(config.smtp_port)
            .tls(Tls::Required(tls_params))
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        let from = config
            .from_email
            .parse::<Mailbox>()
            .context("Failed to parse from email")?;

        Ok(Self { transport, from })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, email: &OutboundEmail) -> Result<(), NotificationError> {
        let to = email
            .to
            .parse::<Mailbox>()
            .map_err(|e| NotificationError::Build(e.to_string()))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone())
            .body(email.body.clone())
            .map_err(|e| NotificationError::Build(e.to_string()))?;

        self.transport
            .send(&message)
            .map_err(|e| NotificationError::Delivery(e.to_string()))?;
        Ok(())
    }
}

/// Mailer used when no email transport is configured.
pub struct NoopMailer;

impl Mailer for NoopMailer {
    fn send(&self, email: &OutboundEmail) -> Result<(), NotificationError> {
        info!(
            "Email notifications disabled, skipping send to {}",
            email.to
        );
        Ok(())
    }
}

/// Formats and dispatches the emails tied to appointment status changes.
///
/// One outbound email per triggering update; no queueing, retries or
/// deduplication. Dispatch failures surface to the caller, which decides
/// whether they affect the request outcome.
#[derive(Clone)]
pub struct AppointmentNotifier {
    mailer: Arc<dyn Mailer>,
}

impl AppointmentNotifier {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    /// Send a confirmation email for the appointment.
    /// A client without a resolvable address gets no email; that is not an error.
    pub fn send_confirmation(&self, detail: &AppointmentDetail) -> Result<(), NotificationError> {
        let Some(to) = client_email(detail) else {
            info!(
                "No client email for appointment {}, skipping confirmation",
                detail.appointment.id
            );
            return Ok(());
        };

        let email = confirmation_email(detail, to);
        self.mailer.send(&email)?;
        info!(
            "Confirmation email sent for appointment {}",
            detail.appointment.id
        );
        Ok(())
    }

    /// Send a cancellation email for the appointment.
    pub fn send_cancellation(
        &self,
        detail: &AppointmentDetail,
        reason: Option<&str>,
    ) -> Result<(), NotificationError> {
        let Some(to) = client_email(detail) else {
            info!(
                "No client email for appointment {}, skipping cancellation notice",
                detail.appointment.id
            );
            return Ok(());
        };

        let email = cancellation_email(detail, to, reason.unwrap_or(DEFAULT_CANCEL_REASON));
        self.mailer.send(&email)?;
        info!(
            "Cancellation email sent for appointment {}",
            detail.appointment.id
        );
        Ok(())
    }
}

fn client_email(detail: &AppointmentDetail) -> Option<String> {
    detail.client.as_ref().and_then(|client| client.email.clone())
}

fn specialist_name(detail: &AppointmentDetail) -> String {
    detail
        .specialist
        .as_ref()
        .map(|specialist| specialist.full_name())
        .unwrap_or_else(|| "your specialist".to_string())
}

fn format_date(detail: &AppointmentDetail) -> String {
    detail
        .appointment
        .appointment_date
        .format("%B %d, %Y at %H:%M")
        .to_string()
}

fn confirmation_email(detail: &AppointmentDetail, to: String) -> OutboundEmail {
    let body = format!(
        "Hello!\n\nYour {} appointment has been confirmed.\n\nAppointment Details:\n- Specialist: {}\n- Date: {}\n- Service: {}\n\nBest regards,\nWellness Hub",
        detail.appointment.appointment_type,
        specialist_name(detail),
        format_date(detail),
        detail.appointment.appointment_type,
    );

    OutboundEmail {
        to,
        subject: "Appointment Confirmation".to_string(),
        body,
    }
}

fn cancellation_email(detail: &AppointmentDetail, to: String, reason: &str) -> OutboundEmail {
    let body = format!(
        "Hello!\n\nYour {} appointment has been canceled.\n\nAppointment Details:\n- Specialist: {}\n- Date: {}\n- Service: {}\n- Reason: {}\n\nBest regards,\nWellness Hub",
        detail.appointment.appointment_type,
        specialist_name(detail),
        format_date(detail),
        detail.appointment.appointment_type,
        reason,
    );

    OutboundEmail {
        to,
        subject: "Appointment Cancellation".to_string(),
        body,
    }
}

/// Recording test double for the mail capability.
#[cfg(test)]
pub struct RecordingMailer {
    sent: std::sync::Mutex<Vec<OutboundEmail>>,
    fail: bool,
}

#[cfg(test)]
impl RecordingMailer {
    pub fn new() -> Self {
        Self {
            sent: std::sync::Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// A mailer whose every send fails, for exercising the failure path
    pub fn failing() -> Self {
        Self {
            sent: std::sync::Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Mailer for RecordingMailer {
    fn send(&self, email: &OutboundEmail) -> Result<(), NotificationError> {
        if self.fail {
            return Err(NotificationError::Delivery("connection refused".to_string()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::appointment::Appointment;
    use crate::domain::models::user::User;
    use chrono::{TimeZone, Utc};
    use shared::{AppointmentStatus, AppointmentType};

    fn detail_fixture(client_email: Option<&str>) -> AppointmentDetail {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        AppointmentDetail {
            appointment: Appointment {
                id: "appointment::1".to_string(),
                user_id: "user::client".to_string(),
                specialist_id: "user::specialist".to_string(),
                appointment_date: date,
                status: AppointmentStatus::Confirmed,
                appointment_type: AppointmentType::Training,
                notes: None,
                created_at: date,
                updated_at: date,
            },
            client: Some(User {
                id: "user::client".to_string(),
                name: "Ana".to_string(),
                last_name: "Garcia".to_string(),
                email: client_email.map(str::to_string),
                role: "client".to_string(),
            }),
            specialist: Some(User {
                id: "user::specialist".to_string(),
                name: "Jane".to_string(),
                last_name: "Doe".to_string(),
                email: None,
                role: "trainer".to_string(),
            }),
        }
    }

    fn notifier_with_recorder() -> (AppointmentNotifier, Arc<RecordingMailer>) {
        let mailer = Arc::new(RecordingMailer::new());
        (AppointmentNotifier::new(mailer.clone()), mailer)
    }

    #[test]
    fn confirmation_interpolates_specialist_date_and_type() {
        let (notifier, mailer) = notifier_with_recorder();

        notifier
            .send_confirmation(&detail_fixture(Some("a@example.com")))
            .unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@example.com");
        assert_eq!(sent[0].subject, "Appointment Confirmation");
        assert!(sent[0].body.contains("Jane Doe"));
        assert!(sent[0].body.contains("January 01, 2024 at 10:00"));
        assert!(sent[0].body.contains("training"));
    }

    #[test]
    fn confirmation_without_client_email_sends_nothing() {
        let (notifier, mailer) = notifier_with_recorder();

        notifier.send_confirmation(&detail_fixture(None)).unwrap();

        assert!(mailer.sent().is_empty());
    }

    #[test]
    fn cancellation_carries_the_reason() {
        let (notifier, mailer) = notifier_with_recorder();

        notifier
            .send_cancellation(&detail_fixture(Some("a@example.com")), Some("Trainer is ill"))
            .unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Appointment Cancellation");
        assert!(sent[0].body.contains("Reason: Trainer is ill"));
    }

    #[test]
    fn cancellation_defaults_the_reason() {
        let (notifier, mailer) = notifier_with_recorder();

        notifier
            .send_cancellation(&detail_fixture(Some("a@example.com")), None)
            .unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.contains("Reason: No reason provided."));
    }

    #[test]
    fn missing_specialist_falls_back_to_generic_name() {
        let (notifier, mailer) = notifier_with_recorder();

        let mut detail = detail_fixture(Some("a@example.com"));
        detail.specialist = None;
        notifier.send_confirmation(&detail).unwrap();

        assert!(mailer.sent()[0].body.contains("your specialist"));
    }

    #[test]
    fn repeated_sends_are_not_deduplicated() {
        let (notifier, mailer) = notifier_with_recorder();
        let detail = detail_fixture(Some("a@example.com"));

        notifier.send_confirmation(&detail).unwrap();
        notifier.send_confirmation(&detail).unwrap();

        assert_eq!(mailer.sent().len(), 2);
    }

    #[test]
    fn delivery_failure_surfaces_as_error() {
        let mailer = Arc::new(RecordingMailer::failing());
        let notifier = AppointmentNotifier::new(mailer);

        let error = notifier
            .send_confirmation(&detail_fixture(Some("a@example.com")))
            .unwrap_err();
        assert!(matches!(error, NotificationError::Delivery(_)));
    }

    #[test]
    fn default_email_config_is_not_configured() {
        assert!(!EmailConfig::is_configured(&EmailConfig::default()));

        let configured = EmailConfig {
            username: "mailer".to_string(),
            password: "secret".to_string(),
            from_email: "noreply@wellnesshub.example".to_string(),
            ..EmailConfig::default()
        };
        assert!(configured.is_configured());
    }
}
