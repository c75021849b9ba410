use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracing::debug;
use uuid::Uuid;

use crate::api::user::models::User;
use crate::db::models::{USER_COLUMNS, UserRow};
use super::StoreError;

/// Storage for internal user profiles
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<User>, StoreError>;

    async fn find(&self, uid: Uuid) -> Result<Option<User>, StoreError>;

    /// Insert the profile or overwrite the existing one with the same uid
    async fn upsert(&self, user: &User) -> Result<(), StoreError>;

    async fn delete(&self, uid: Uuid) -> Result<bool, StoreError>;
}

/// PostgreSQL-backed user profile storage
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY created_at",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!("Fetched {} users", rows.len());
        rows.into_iter().map(User::try_from).collect()
    }

    async fn find(&self, uid: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE uid = $1",
            USER_COLUMNS
        ))
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn upsert(&self, user: &User) -> Result<(), StoreError> {
        debug!("Upserting user: uid={}, role={}", user.uid, user.role);

        sqlx::query(
            r#"
            INSERT INTO users (uid, first_name, last_name, email, role, department, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (uid) DO UPDATE
            SET first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                email = EXCLUDED.email,
                role = EXCLUDED.role,
                department = EXCLUDED.department
            "#,
        )
        .bind(user.uid)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.department)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, uid: Uuid) -> Result<bool, StoreError> {
        debug!("Deleting user: uid={}", uid);

        let result = sqlx::query("DELETE FROM users WHERE uid = $1")
            .bind(uid)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
