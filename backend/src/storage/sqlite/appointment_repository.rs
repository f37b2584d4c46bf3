use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{AppointmentStatus, AppointmentType};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::DbConnection;
use crate::domain::models::appointment::{Appointment, AppointmentDetail, AppointmentFilter};
use crate::domain::models::user::User;
use crate::storage::traits::AppointmentStorage;

const APPOINTMENT_COLUMNS: &str =
    "id, user_id, specialist_id, appointment_date, status, appointment_type, notes, created_at, updated_at";

/// SQLite-backed repository for appointment records.
#[derive(Clone)]
pub struct SqliteAppointmentRepository {
    db: DbConnection,
}

impl SqliteAppointmentRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}

fn appointment_from_row(row: &SqliteRow) -> Result<Appointment> {
    let status: String = row.get("status");
    let appointment_type: String = row.get("appointment_type");
    let appointment_date: String = row.get("appointment_date");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Appointment {
        id: row.get("id"),
        user_id: row.get("user_id"),
        specialist_id: row.get("specialist_id"),
        appointment_date: parse_datetime(&appointment_date)?,
        status: status.parse::<AppointmentStatus>().map_err(anyhow::Error::msg)?,
        appointment_type: appointment_type
            .parse::<AppointmentType>()
            .map_err(anyhow::Error::msg)?,
        notes: row.get("notes"),
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

/// Build a user from prefixed join columns, if the joined row matched.
fn joined_user_from_row(row: &SqliteRow, prefix: &str) -> Result<Option<User>> {
    let id: Option<String> = row.try_get(format!("{}_id", prefix).as_str())?;
    let Some(id) = id else {
        return Ok(None);
    };

    Ok(Some(User {
        id,
        name: row.try_get(format!("{}_name", prefix).as_str())?,
        last_name: row.try_get(format!("{}_last_name", prefix).as_str())?,
        email: row.try_get(format!("{}_email", prefix).as_str())?,
        role: row.try_get(format!("{}_role", prefix).as_str())?,
    }))
}

#[async_trait]
impl AppointmentStorage for SqliteAppointmentRepository {
    async fn store_appointment(&self, appointment: &Appointment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO appointments
                (id, user_id, specialist_id, appointment_date, status, appointment_type, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&appointment.id)
        .bind(&appointment.user_id)
        .bind(&appointment.specialist_id)
        .bind(appointment.appointment_date.to_rfc3339())
        .bind(appointment.status.to_string())
        .bind(appointment.appointment_type.to_string())
        .bind(&appointment.notes)
        .bind(appointment.created_at.to_rfc3339())
        .bind(appointment.updated_at.to_rfc3339())
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_appointment(&self, appointment_id: &str) -> Result<Option<Appointment>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM appointments WHERE id = ?",
            APPOINTMENT_COLUMNS
        ))
        .bind(appointment_id)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(row) => Ok(Some(appointment_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_appointment_detail(&self, appointment_id: &str) -> Result<Option<AppointmentDetail>> {
        let row = sqlx::query(
            r#"
            SELECT a.id, a.user_id, a.specialist_id, a.appointment_date, a.status,
                   a.appointment_type, a.notes, a.created_at, a.updated_at,
                   c.id AS c_id, c.name AS c_name, c.last_name AS c_last_name,
                   c.email AS c_email, c.role AS c_role,
                   s.id AS s_id, s.name AS s_name, s.last_name AS s_last_name,
                   s.email AS s_email, s.role AS s_role
            FROM appointments a
            LEFT JOIN users c ON c.id = a.user_id
            LEFT JOIN users s ON s.id = a.specialist_id
            WHERE a.id = ?
            "#,
        )
        .bind(appointment_id)
        .fetch_optional(self.db.pool())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(AppointmentDetail {
            appointment: appointment_from_row(&row)?,
            client: joined_user_from_row(&row, "c")?,
            specialist: joined_user_from_row(&row, "s")?,
        }))
    }

    async fn list_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>> {
        let mut sql = format!("SELECT {} FROM appointments", APPOINTMENT_COLUMNS);
        let mut clauses = Vec::new();
        if filter.user_id.is_some() {
            clauses.push("user_id = ?");
        }
        if filter.specialist_id.is_some() {
            clauses.push("specialist_id = ?");
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY appointment_date DESC");

        let mut query = sqlx::query(&sql);
        if let Some(user_id) = &filter.user_id {
            query = query.bind(user_id);
        }
        if let Some(specialist_id) = &filter.specialist_id {
            query = query.bind(specialist_id);
        }

        let rows = query.fetch_all(self.db.pool()).await?;
        rows.iter().map(appointment_from_row).collect()
    }

    async fn update_appointment(&self, appointment: &Appointment) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE appointments
            SET appointment_date = ?, status = ?, notes = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(appointment.appointment_date.to_rfc3339())
        .bind(appointment.status.to_string())
        .bind(&appointment.notes)
        .bind(appointment.updated_at.to_rfc3339())
        .bind(&appointment.id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_appointment(&self, appointment_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = ?")
            .bind(appointment_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sqlite::SqliteUserRepository;
    use crate::storage::traits::UserStorage;
    use chrono::TimeZone;

    async fn setup_test() -> (SqliteAppointmentRepository, SqliteUserRepository) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        (
            SqliteAppointmentRepository::new(db.clone()),
            SqliteUserRepository::new(db),
        )
    }

    fn test_appointment(id: &str, date: DateTime<Utc>) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: id.to_string(),
            user_id: "user::client".to_string(),
            specialist_id: "user::specialist".to_string(),
            appointment_date: date,
            status: AppointmentStatus::Pending,
            appointment_type: AppointmentType::Training,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn test_user(id: &str, name: &str, last_name: &str, email: Option<&str>, role: &str) -> User {
        User {
            id: id.to_string(),
            name: name.to_string(),
            last_name: last_name.to_string(),
            email: email.map(str::to_string),
            role: role.to_string(),
        }
    }

    #[tokio::test]
    async fn test_store_and_get_appointment() {
        let (repository, _) = setup_test().await;

        let date = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let appointment = test_appointment("appointment::1", date);

        repository
            .store_appointment(&appointment)
            .await
            .expect("Failed to store appointment");

        let retrieved = repository
            .get_appointment("appointment::1")
            .await
            .expect("Failed to get appointment")
            .expect("Appointment should exist");
        assert_eq!(retrieved, appointment);
    }

    #[tokio::test]
    async fn test_get_nonexistent_appointment() {
        let (repository, _) = setup_test().await;

        let result = repository
            .get_appointment("appointment::missing")
            .await
            .expect("Query failed");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_appointment() {
        let (repository, _) = setup_test().await;

        let date = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let mut appointment = test_appointment("appointment::1", date);
        repository.store_appointment(&appointment).await.unwrap();

        appointment.status = AppointmentStatus::Confirmed;
        appointment.notes = Some("Bring workout gear".to_string());
        appointment.updated_at = Utc::now();

        let updated = repository
            .update_appointment(&appointment)
            .await
            .expect("Failed to update appointment");
        assert!(updated);

        let retrieved = repository
            .get_appointment("appointment::1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(retrieved.status, AppointmentStatus::Confirmed);
        assert_eq!(retrieved.notes, Some("Bring workout gear".to_string()));
        // Immutable fields are untouched by updates
        assert_eq!(retrieved.user_id, appointment.user_id);
        assert_eq!(retrieved.created_at, appointment.created_at);
    }

    #[tokio::test]
    async fn test_update_nonexistent_appointment_reports_miss() {
        let (repository, _) = setup_test().await;

        let date = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let appointment = test_appointment("appointment::missing", date);

        let updated = repository
            .update_appointment(&appointment)
            .await
            .expect("Update query failed");
        assert!(!updated);
    }

    #[tokio::test]
    async fn test_delete_appointment() {
        let (repository, _) = setup_test().await;

        let date = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        repository
            .store_appointment(&test_appointment("appointment::1", date))
            .await
            .unwrap();

        let deleted = repository
            .delete_appointment("appointment::1")
            .await
            .expect("Failed to delete appointment");
        assert!(deleted);

        let deleted_again = repository
            .delete_appointment("appointment::1")
            .await
            .expect("Failed to re-delete appointment");
        assert!(!deleted_again);
    }

    #[tokio::test]
    async fn test_list_appointments_filters_and_orders() {
        let (repository, _) = setup_test().await;

        let early = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap();

        let mut first = test_appointment("appointment::1", early);
        first.user_id = "user::a".to_string();
        let mut second = test_appointment("appointment::2", late);
        second.user_id = "user::a".to_string();
        let mut other = test_appointment("appointment::3", late);
        other.user_id = "user::b".to_string();

        for appointment in [&first, &second, &other] {
            repository.store_appointment(appointment).await.unwrap();
        }

        let all = repository
            .list_appointments(&AppointmentFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let for_user = repository
            .list_appointments(&AppointmentFilter {
                user_id: Some("user::a".to_string()),
                specialist_id: None,
            })
            .await
            .unwrap();
        assert_eq!(for_user.len(), 2);
        // Most recent first
        assert_eq!(for_user[0].id, "appointment::2");
        assert_eq!(for_user[1].id, "appointment::1");

        let for_specialist = repository
            .list_appointments(&AppointmentFilter {
                user_id: Some("user::b".to_string()),
                specialist_id: Some("user::specialist".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(for_specialist.len(), 1);
        assert_eq!(for_specialist[0].id, "appointment::3");
    }

    #[tokio::test]
    async fn test_detail_resolves_related_users() {
        let (repository, users) = setup_test().await;

        users
            .store_user(&test_user("user::client", "Ana", "Garcia", Some("ana@example.com"), "client"))
            .await
            .unwrap();
        users
            .store_user(&test_user("user::specialist", "Jane", "Doe", None, "trainer"))
            .await
            .unwrap();

        let date = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        repository
            .store_appointment(&test_appointment("appointment::1", date))
            .await
            .unwrap();

        let detail = repository
            .get_appointment_detail("appointment::1")
            .await
            .expect("Failed to get detail")
            .expect("Detail should exist");

        assert_eq!(detail.appointment.id, "appointment::1");
        let client = detail.client.expect("Client should resolve");
        assert_eq!(client.email, Some("ana@example.com".to_string()));
        let specialist = detail.specialist.expect("Specialist should resolve");
        assert_eq!(specialist.full_name(), "Jane Doe");
    }

    #[tokio::test]
    async fn test_detail_with_missing_users() {
        let (repository, _) = setup_test().await;

        let date = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        repository
            .store_appointment(&test_appointment("appointment::1", date))
            .await
            .unwrap();

        let detail = repository
            .get_appointment_detail("appointment::1")
            .await
            .unwrap()
            .unwrap();

        assert!(detail.client.is_none());
        assert!(detail.specialist.is_none());
    }

    #[tokio::test]
    async fn test_detail_for_nonexistent_appointment() {
        let (repository, _) = setup_test().await;

        let detail = repository
            .get_appointment_detail("appointment::missing")
            .await
            .expect("Query failed");
        assert!(detail.is_none());
    }
}
