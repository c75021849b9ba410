use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{Pool, Postgres};
use tracing::debug;
use uuid::Uuid;

use crate::api::candidate::models::{Candidate, CandidateStatus, CandidateUpdate};
use crate::db::models::{CANDIDATE_COLUMNS, CandidateRow};
use super::StoreError;

/// Storage for candidate applications and their pipeline history
#[async_trait]
pub trait CandidateRepository: Send + Sync {
    async fn insert(&self, candidate: &Candidate) -> Result<(), StoreError>;

    /// Candidates newest first, optionally limited to one job
    async fn list(&self, job_id: Option<Uuid>) -> Result<Vec<Candidate>, StoreError>;

    async fn find(&self, id: Uuid) -> Result<Option<Candidate>, StoreError>;

    /// Apply a pipeline write as one statement and return the updated row
    async fn apply(
        &self,
        id: Uuid,
        update: &CandidateUpdate,
    ) -> Result<Option<Candidate>, StoreError>;
}

/// PostgreSQL-backed candidate storage
pub struct PgCandidateRepository {
    pool: Pool<Postgres>,
}

impl PgCandidateRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CandidateRepository for PgCandidateRepository {
    async fn insert(&self, candidate: &Candidate) -> Result<(), StoreError> {
        debug!(
            "Creating candidate: id={}, job_id={}",
            candidate.id, candidate.job_id
        );

        sqlx::query(
            r#"
            INSERT INTO candidates (id, job_id, job_title, name, email, contact, headline,
                address, photo_url, resume, profile_summary, cover_letter, education,
                experience, answers, stage, status, comments, email_logs, timeline,
                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21, $22)
            "#,
        )
        .bind(candidate.id)
        .bind(candidate.job_id)
        .bind(&candidate.job_title)
        .bind(&candidate.name)
        .bind(&candidate.email)
        .bind(&candidate.contact)
        .bind(&candidate.headline)
        .bind(&candidate.address)
        .bind(&candidate.photo_url)
        .bind(&candidate.resume)
        .bind(&candidate.profile_summary)
        .bind(&candidate.cover_letter)
        .bind(Json(&candidate.education))
        .bind(Json(&candidate.experience))
        .bind(Json(&candidate.answers))
        .bind(candidate.stage.as_str())
        .bind(candidate.status.as_str())
        .bind(Json(&candidate.comments))
        .bind(Json(&candidate.email_logs))
        .bind(Json(&candidate.timeline))
        .bind(candidate.created_at)
        .bind(candidate.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self, job_id: Option<Uuid>) -> Result<Vec<Candidate>, StoreError> {
        let rows = sqlx::query_as::<_, CandidateRow>(&format!(
            "SELECT {} FROM candidates WHERE ($1::uuid IS NULL OR job_id = $1) \
             ORDER BY created_at DESC",
            CANDIDATE_COLUMNS
        ))
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        debug!("Fetched {} candidates (job_id={:?})", rows.len(), job_id);
        rows.into_iter().map(Candidate::try_from).collect()
    }

    async fn find(&self, id: Uuid) -> Result<Option<Candidate>, StoreError> {
        let row = sqlx::query_as::<_, CandidateRow>(&format!(
            "SELECT {} FROM candidates WHERE id = $1",
            CANDIDATE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Candidate::try_from).transpose()
    }

    async fn apply(
        &self,
        id: Uuid,
        update: &CandidateUpdate,
    ) -> Result<Option<Candidate>, StoreError> {
        // Array columns grow with `||` inside the statement, so concurrent
        // appends to the same candidate never overwrite each other.
        let assignments = match update {
            CandidateUpdate::Stage { .. } => "stage = $2, timeline = timeline || $3",
            CandidateUpdate::Comment { .. } => {
                "comments = comments || $2, timeline = timeline || $3"
            }
            CandidateUpdate::Reject { .. } => {
                "status = $2, rejection_reason = $3, rejected_by = $4, rejected_at = $5, \
                 timeline = timeline || $6"
            }
            CandidateUpdate::UndoReject { .. } => {
                "status = $2, rejection_reason = NULL, rejected_by = NULL, \
                 rejected_at = NULL, timeline = timeline || $3"
            }
            CandidateUpdate::Email { .. } => {
                "email_logs = email_logs || $2, timeline = timeline || $3"
            }
        };
        let sql = format!(
            "UPDATE candidates SET {}, updated_at = NOW() WHERE id = $1 RETURNING {}",
            assignments, CANDIDATE_COLUMNS
        );

        let query = sqlx::query_as::<_, CandidateRow>(&sql).bind(id);
        let query = match update {
            CandidateUpdate::Stage { stage, entry } => {
                query.bind(stage.as_str()).bind(Json([entry]))
            }
            CandidateUpdate::Comment { comment, entry } => {
                query.bind(Json([comment])).bind(Json([entry]))
            }
            CandidateUpdate::Reject { reason, by, at, entry } => query
                .bind(CandidateStatus::Rejected.as_str())
                .bind(reason)
                .bind(by)
                .bind(at)
                .bind(Json([entry])),
            CandidateUpdate::UndoReject { entry } => query
                .bind(CandidateStatus::Active.as_str())
                .bind(Json([entry])),
            CandidateUpdate::Email { log, entry } => {
                query.bind(Json([log])).bind(Json([entry]))
            }
        };

        debug!("Applying candidate update: id={}", id);
        let row = query.fetch_optional(&self.pool).await?;
        row.map(Candidate::try_from).transpose()
    }
}
