use chrono::{DateTime, Utc};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

use crate::api::activity::models::{ActivityEntry, ActorSnapshot};
use crate::api::auth::models::Identity;
use crate::api::candidate::models::{
    Answer, Candidate, Comment, EmailLog, Education, Experience, TimelineEntry,
};
use crate::api::job::models::{CompanyInfo, CreatedBy, FormField, Job, JobInfo, Salary};
use crate::api::user::models::User;
use super::StoreError;

pub const JOB_COLUMNS: &str = "id, title, department, location, job_type, status, summary, \
    description, job_info, company_info, salary, application_fields, created_by, posted, updated_at";

/// Database representation of a job posting
#[derive(Debug, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub department: String,
    pub location: String,
    pub job_type: String,
    pub status: String,
    pub summary: String,
    pub description: String,
    pub job_info: Json<JobInfo>,
    pub company_info: Json<CompanyInfo>,
    pub salary: Json<Salary>,
    pub application_fields: Json<Vec<FormField>>,
    pub created_by: Json<CreatedBy>,
    pub posted: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = StoreError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(|e: String| StoreError::decode("job", row.id, e))?;

        Ok(Job {
            id: row.id,
            title: row.title,
            department: row.department,
            location: row.location,
            job_type: row.job_type,
            status,
            summary: row.summary,
            description: row.description,
            job_info: row.job_info.0,
            company_info: row.company_info.0,
            salary: row.salary.0,
            application_fields: row.application_fields.0,
            created_by: row.created_by.0,
            posted: row.posted,
            updated_at: row.updated_at,
        })
    }
}

pub const CANDIDATE_COLUMNS: &str = "id, job_id, job_title, name, email, contact, headline, \
    address, photo_url, resume, profile_summary, cover_letter, education, experience, answers, \
    stage, status, rejection_reason, rejected_by, rejected_at, comments, email_logs, timeline, \
    created_at, updated_at";

/// Database representation of a candidate application
#[derive(Debug, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub name: String,
    pub email: String,
    pub contact: String,
    pub headline: String,
    pub address: String,
    pub photo_url: Option<String>,
    pub resume: Option<String>,
    pub profile_summary: String,
    pub cover_letter: String,
    pub education: Json<Vec<Education>>,
    pub experience: Json<Vec<Experience>>,
    pub answers: Json<Vec<Answer>>,
    pub stage: String,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub rejected_by: Option<String>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub comments: Json<Vec<Comment>>,
    pub email_logs: Json<Vec<EmailLog>>,
    pub timeline: Json<Vec<TimelineEntry>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CandidateRow> for Candidate {
    type Error = StoreError;

    fn try_from(row: CandidateRow) -> Result<Self, Self::Error> {
        let stage = row
            .stage
            .parse()
            .map_err(|e: String| StoreError::decode("candidate", row.id, e))?;
        let status = row
            .status
            .parse()
            .map_err(|e: String| StoreError::decode("candidate", row.id, e))?;

        Ok(Candidate {
            id: row.id,
            job_id: row.job_id,
            job_title: row.job_title,
            name: row.name,
            email: row.email,
            contact: row.contact,
            headline: row.headline,
            address: row.address,
            photo_url: row.photo_url,
            resume: row.resume,
            profile_summary: row.profile_summary,
            cover_letter: row.cover_letter,
            education: row.education.0,
            experience: row.experience.0,
            answers: row.answers.0,
            stage,
            status,
            rejection_reason: row.rejection_reason,
            rejected_by: row.rejected_by,
            rejected_at: row.rejected_at,
            comments: row.comments.0,
            email_logs: row.email_logs.0,
            timeline: row.timeline.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub const USER_COLUMNS: &str = "uid, first_name, last_name, email, role, department, created_at";

/// Database representation of a user profile
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub uid: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub department: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse()
            .map_err(|e: String| StoreError::decode("user", row.uid, e))?;

        Ok(User {
            uid: row.uid,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            role,
            department: row.department,
            created_at: row.created_at,
        })
    }
}

pub const IDENTITY_COLUMNS: &str = "uid, email, display_name, password_hash, password_salt, created_at";

#[derive(Debug, FromRow)]
pub struct IdentityRow {
    pub uid: Uuid,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub password_salt: String,
    pub created_at: DateTime<Utc>,
}

impl From<IdentityRow> for Identity {
    fn from(row: IdentityRow) -> Self {
        Identity {
            uid: row.uid,
            email: row.email,
            display_name: row.display_name,
            password_hash: row.password_hash,
            password_salt: row.password_salt,
            created_at: row.created_at,
        }
    }
}

pub const ACTIVITY_COLUMNS: &str =
    "id, actor, entity_id, entity_type, entity_name, action_label, timestamp";

#[derive(Debug, FromRow)]
pub struct ActivityRow {
    pub id: Uuid,
    pub actor: Json<ActorSnapshot>,
    pub entity_id: String,
    pub entity_type: String,
    pub entity_name: String,
    pub action_label: String,
    pub timestamp: DateTime<Utc>,
}

impl TryFrom<ActivityRow> for ActivityEntry {
    type Error = StoreError;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        let entity_type = row
            .entity_type
            .parse()
            .map_err(|e: String| StoreError::decode("activity", row.id, e))?;

        Ok(ActivityEntry {
            id: row.id,
            actor: row.actor.0,
            entity_id: row.entity_id,
            entity_type,
            entity_name: row.entity_name,
            action_label: row.action_label,
            timestamp: row.timestamp,
        })
    }
}
