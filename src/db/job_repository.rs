use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{Pool, Postgres};
use tracing::debug;
use uuid::Uuid;

use crate::api::job::models::Job;
use crate::db::models::{JOB_COLUMNS, JobRow};
use super::StoreError;

/// Storage for job postings
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Persist a new posting
    async fn insert(&self, job: &Job) -> Result<(), StoreError>;

    /// All postings, newest first
    async fn list(&self) -> Result<Vec<Job>, StoreError>;

    async fn find(&self, id: Uuid) -> Result<Option<Job>, StoreError>;

    /// Overwrite every field of an existing posting; `false` when it is gone
    async fn update(&self, job: &Job) -> Result<bool, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// PostgreSQL-backed job storage
pub struct PgJobRepository {
    pool: Pool<Postgres>,
}

impl PgJobRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn insert(&self, job: &Job) -> Result<(), StoreError> {
        debug!("Creating job: id={}, title={}, status={}", job.id, job.title, job.status);

        sqlx::query(
            r#"
            INSERT INTO jobs (id, title, department, location, job_type, status, summary,
                description, job_info, company_info, salary, application_fields, created_by,
                posted, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(job.id)
        .bind(&job.title)
        .bind(&job.department)
        .bind(&job.location)
        .bind(&job.job_type)
        .bind(job.status.as_str())
        .bind(&job.summary)
        .bind(&job.description)
        .bind(Json(&job.job_info))
        .bind(Json(&job.company_info))
        .bind(Json(&job.salary))
        .bind(Json(&job.application_fields))
        .bind(Json(&job.created_by))
        .bind(job.posted)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await?;

        debug!("Job created with id={}", job.id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Job>, StoreError> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {} FROM jobs ORDER BY posted DESC",
            JOB_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!("Fetched {} jobs", rows.len());
        rows.into_iter().map(Job::try_from).collect()
    }

    async fn find(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {} FROM jobs WHERE id = $1",
            JOB_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Job::try_from).transpose()
    }

    async fn update(&self, job: &Job) -> Result<bool, StoreError> {
        debug!("Updating job: id={}, status={}", job.id, job.status);

        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET title = $2, department = $3, location = $4, job_type = $5, status = $6,
                summary = $7, description = $8, job_info = $9, company_info = $10,
                salary = $11, application_fields = $12, updated_at = $13
            WHERE id = $1
            "#,
        )
        .bind(job.id)
        .bind(&job.title)
        .bind(&job.department)
        .bind(&job.location)
        .bind(&job.job_type)
        .bind(job.status.as_str())
        .bind(&job.summary)
        .bind(&job.description)
        .bind(Json(&job.job_info))
        .bind(Json(&job.company_info))
        .bind(Json(&job.salary))
        .bind(Json(&job.application_fields))
        .bind(job.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        debug!("Deleting job: id={}", id);

        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
