use anyhow::Result;
use async_trait::async_trait;
use sqlx::Row;

use crate::db::DbConnection;
use crate::domain::models::user::User;
use crate::storage::traits::UserStorage;

/// SQLite-backed repository for user records.
#[derive(Clone)]
pub struct SqliteUserRepository {
    db: DbConnection,
}

impl SqliteUserRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStorage for SqliteUserRepository {
    async fn store_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO users (id, name, last_name, email, role) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.role)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, name, last_name, email, role FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;

        match row {
            Some(row) => Ok(Some(User {
                id: row.get("id"),
                name: row.get("name"),
                last_name: row.get("last_name"),
                email: row.get("email"),
                role: row.get("role"),
            })),
            None => Ok(None),
        }
    }
}
