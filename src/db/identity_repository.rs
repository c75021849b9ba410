use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use tracing::debug;
use uuid::Uuid;

use crate::api::auth::models::Identity;
use crate::db::models::{IDENTITY_COLUMNS, IdentityRow};
use super::{StoreError, is_unique_violation};

/// Credential and session storage standing in for an identity provider
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Fails with [`StoreError::DuplicateEmail`] when the email is taken
    async fn create(&self, identity: &Identity) -> Result<(), StoreError>;

    async fn find(&self, uid: Uuid) -> Result<Option<Identity>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError>;

    /// Overwrite email, display name and password of an identity
    async fn update(&self, identity: &Identity) -> Result<bool, StoreError>;

    /// Remove the identity together with its sessions
    async fn delete(&self, uid: Uuid) -> Result<bool, StoreError>;

    /// Open a session, pruning every session that has already expired
    async fn create_session(
        &self,
        token_hash: &str,
        uid: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Owner of an unexpired session; an expired row for the token is removed
    async fn session_owner(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, StoreError>;

    async fn delete_session(&self, token_hash: &str) -> Result<(), StoreError>;
}

/// PostgreSQL-backed identity storage
pub struct PgIdentityRepository {
    pool: Pool<Postgres>,
}

impl PgIdentityRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_duplicate(err: sqlx::Error, email: &str) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::DuplicateEmail(email.to_string())
    } else {
        StoreError::Database(err)
    }
}

#[async_trait]
impl IdentityRepository for PgIdentityRepository {
    async fn create(&self, identity: &Identity) -> Result<(), StoreError> {
        debug!("Creating identity: uid={}", identity.uid);

        sqlx::query(
            r#"
            INSERT INTO identities (uid, email, display_name, password_hash, password_salt, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(identity.uid)
        .bind(&identity.email)
        .bind(&identity.display_name)
        .bind(&identity.password_hash)
        .bind(&identity.password_salt)
        .bind(identity.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_duplicate(e, &identity.email))?;

        Ok(())
    }

    async fn find(&self, uid: Uuid) -> Result<Option<Identity>, StoreError> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            "SELECT {} FROM identities WHERE uid = $1",
            IDENTITY_COLUMNS
        ))
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Identity::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            "SELECT {} FROM identities WHERE email = $1",
            IDENTITY_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Identity::from))
    }

    async fn update(&self, identity: &Identity) -> Result<bool, StoreError> {
        debug!("Updating identity: uid={}", identity.uid);

        let result = sqlx::query(
            r#"
            UPDATE identities
            SET email = $2, display_name = $3, password_hash = $4, password_salt = $5
            WHERE uid = $1
            "#,
        )
        .bind(identity.uid)
        .bind(&identity.email)
        .bind(&identity.display_name)
        .bind(&identity.password_hash)
        .bind(&identity.password_salt)
        .execute(&self.pool)
        .await
        .map_err(|e| map_duplicate(e, &identity.email))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, uid: Uuid) -> Result<bool, StoreError> {
        debug!("Deleting identity: uid={}", uid);

        // sessions go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM identities WHERE uid = $1")
            .bind(uid)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_session(
        &self,
        token_hash: &str,
        uid: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let pruned = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?
            .rows_affected();
        if pruned > 0 {
            debug!("Pruned {} expired sessions", pruned);
        }

        sqlx::query("INSERT INTO sessions (token_hash, uid, expires_at) VALUES ($1, $2, $3)")
            .bind(token_hash)
            .bind(uid)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;

        debug!("Session created for uid={}", uid);
        Ok(())
    }

    async fn session_owner(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, StoreError> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = $1 AND expires_at <= $2")
            .bind(token_hash)
            .bind(now)
            .execute(&self.pool)
            .await?;

        let uid = sqlx::query_scalar::<_, Uuid>(
            "SELECT uid FROM sessions WHERE token_hash = $1 AND expires_at > $2",
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(uid)
    }

    async fn delete_session(&self, token_hash: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
