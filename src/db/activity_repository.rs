use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{Pool, Postgres};
use tracing::debug;

use crate::api::activity::models::ActivityEntry;
use crate::db::models::{ACTIVITY_COLUMNS, ActivityRow};
use super::StoreError;

/// Append-only activity feed
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn append(&self, entry: &ActivityEntry) -> Result<(), StoreError>;

    /// Every entry, newest first
    async fn list(&self) -> Result<Vec<ActivityEntry>, StoreError>;
}

/// PostgreSQL-backed activity feed
pub struct PgActivityRepository {
    pool: Pool<Postgres>,
}

impl PgActivityRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityRepository for PgActivityRepository {
    async fn append(&self, entry: &ActivityEntry) -> Result<(), StoreError> {
        debug!(
            "Appending activity: {} {} {}",
            entry.entity_type, entry.entity_id, entry.action_label
        );

        sqlx::query(
            r#"
            INSERT INTO activity_logs (id, actor, entity_id, entity_type, entity_name, action_label, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id)
        .bind(Json(&entry.actor))
        .bind(&entry.entity_id)
        .bind(entry.entity_type.as_str())
        .bind(&entry.entity_name)
        .bind(&entry.action_label)
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<ActivityEntry>, StoreError> {
        let rows = sqlx::query_as::<_, ActivityRow>(&format!(
            "SELECT {} FROM activity_logs ORDER BY timestamp DESC",
            ACTIVITY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!("Fetched {} activity entries", rows.len());
        rows.into_iter().map(ActivityEntry::try_from).collect()
    }
}
