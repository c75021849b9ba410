use std::sync::Arc;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::api::activity::models::{ActorSnapshot, EntityType};
use crate::api::activity::ActivityService;
use crate::api::auth::Actor;
use crate::api::error::ServiceError;
use crate::api::job::models::{FormFieldType, Job, JobStatus};
use crate::api::validation::first_message;
use crate::db::{CandidateRepository, JobRepository};
use super::models::{
    Answer, Application, Candidate, CandidateStatus, CandidateUpdate, Comment, EmailLog, Stage,
    TimelineEntry, TimelineEvent,
};

/// Candidate pipeline: applications plus the admin actions taken on them
pub struct CandidateService {
    candidates: Arc<dyn CandidateRepository>,
    jobs: Arc<dyn JobRepository>,
    activity: Arc<ActivityService>,
}

impl CandidateService {
    pub fn new(
        candidates: Arc<dyn CandidateRepository>,
        jobs: Arc<dyn JobRepository>,
        activity: Arc<ActivityService>,
    ) -> Self {
        Self {
            candidates,
            jobs,
            activity,
        }
    }

    /// Submit an application to a live job
    ///
    /// Everything is validated before the candidate row is written.
    pub async fn apply(&self, job_id: Uuid, application: Application) -> Result<Candidate, ServiceError> {
        let job = match self.jobs.find(job_id).await? {
            Some(job) if job.status == JobStatus::Live => job,
            _ => return Err(ServiceError::not_found("Job", job_id)),
        };

        application
            .validate()
            .map_err(|e| ServiceError::ValidationError(first_message(&e)))?;
        let answers = resolve_answers(&job, &application)?;
        check_history(&application)?;

        let name = application.full_name();
        let now = Utc::now();
        let candidate = Candidate {
            id: Uuid::new_v4(),
            job_id: job.id,
            job_title: job.title.clone(),
            name: name.clone(),
            email: application.email.trim().to_string(),
            contact: application.contact,
            headline: application.headline,
            address: application.address,
            photo_url: application.photo_url.filter(|url| !url.trim().is_empty()),
            resume: application.resume.filter(|url| !url.trim().is_empty()),
            profile_summary: application.profile_summary,
            cover_letter: application.cover_letter,
            education: application
                .education
                .into_iter()
                .filter(|row| !row.is_blank())
                .collect(),
            experience: application
                .experience
                .into_iter()
                .filter(|row| !row.is_blank())
                .collect(),
            answers,
            stage: Stage::Applied,
            status: CandidateStatus::Active,
            rejection_reason: None,
            rejected_by: None,
            rejected_at: None,
            comments: Vec::new(),
            email_logs: Vec::new(),
            timeline: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.candidates.insert(&candidate).await?;

        let applicant = ActorSnapshot {
            name,
            email: candidate.email.clone(),
        };
        self.activity
            .record(
                applicant,
                EntityType::Candidate,
                candidate.id,
                &candidate.name,
                "applied to job",
            )
            .await;

        info!(
            "Service: Candidate {} applied to job {} ({})",
            candidate.id, job.id, job.title
        );
        Ok(candidate)
    }

    pub async fn list_candidates(&self, job_id: Option<Uuid>) -> Result<Vec<Candidate>, ServiceError> {
        let candidates = self.candidates.list(job_id).await?;
        info!(
            "Service: Listing {} candidates (job filter: {:?})",
            candidates.len(),
            job_id
        );
        Ok(candidates)
    }

    pub async fn get_candidate(&self, id: Uuid) -> Result<Candidate, ServiceError> {
        self.candidates
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Candidate", id))
    }

    /// Move to `stage`; any stage may follow any other
    pub async fn change_stage(&self, actor: &Actor, id: Uuid, stage: Stage) -> Result<Candidate, ServiceError> {
        let entry = TimelineEntry::new(TimelineEvent::StageChange { stage }, &actor.admin_name());
        let candidate = self.write(id, CandidateUpdate::Stage { stage, entry }).await?;
        info!("Service: Candidate {} moved to {}", id, stage);
        Ok(candidate)
    }

    pub async fn add_comment(&self, actor: &Actor, id: Uuid, text: &str) -> Result<Candidate, ServiceError> {
        let text = non_blank(text, "Comment text is required")?;
        let admin = actor.admin_name();
        let comment = Comment {
            text: text.clone(),
            admin: admin.clone(),
            date: Utc::now(),
        };
        let entry = TimelineEntry::new(TimelineEvent::Comment { text }, &admin);

        let candidate = self.write(id, CandidateUpdate::Comment { comment, entry }).await?;
        info!("Service: Comment added to candidate {} by {}", id, admin);
        Ok(candidate)
    }

    pub async fn reject(&self, actor: &Actor, id: Uuid, reason: &str) -> Result<Candidate, ServiceError> {
        let reason = non_blank(reason, "Rejection reason is required")?;
        let admin = actor.admin_name();
        let entry = TimelineEntry::new(
            TimelineEvent::Reject {
                reason: reason.clone(),
            },
            &admin,
        );
        let update = CandidateUpdate::Reject {
            reason,
            by: admin.clone(),
            at: entry.date,
            entry,
        };

        let candidate = self.write(id, update).await?;
        info!("Service: Candidate {} rejected by {}", id, admin);
        Ok(candidate)
    }

    pub async fn undo_reject(&self, actor: &Actor, id: Uuid) -> Result<Candidate, ServiceError> {
        let entry = TimelineEntry::new(TimelineEvent::UndoReject, &actor.admin_name());
        let candidate = self.write(id, CandidateUpdate::UndoReject { entry }).await?;
        info!("Service: Rejection of candidate {} undone", id);
        Ok(candidate)
    }

    /// Record an email that was sent to the candidate
    pub async fn log_email(
        &self,
        id: Uuid,
        subject: &str,
        body: &str,
        admin: &str,
    ) -> Result<Candidate, ServiceError> {
        let entry = TimelineEntry::new(
            TimelineEvent::Email {
                subject: subject.to_string(),
                body: body.to_string(),
            },
            admin,
        );
        let log = EmailLog {
            subject: subject.to_string(),
            body: body.to_string(),
            admin: admin.to_string(),
            date: entry.date,
        };

        self.write(id, CandidateUpdate::Email { log, entry }).await
    }

    async fn write(&self, id: Uuid, update: CandidateUpdate) -> Result<Candidate, ServiceError> {
        match self.candidates.apply(id, &update).await? {
            Some(candidate) => Ok(candidate),
            None => {
                warn!("Service: Pipeline write for unknown candidate {}", id);
                Err(ServiceError::not_found("Candidate", id))
            }
        }
    }
}

fn non_blank(value: &str, message: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::ValidationError(message.to_string()));
    }
    Ok(trimmed.to_string())
}

/// One answer per job form field, in form order
///
/// Answers are matched to fields by label; answers for labels the form does not
/// have are dropped. A file field left empty takes the uploaded resume URL.
fn resolve_answers(job: &Job, application: &Application) -> Result<Vec<Answer>, ServiceError> {
    let mut answers = Vec::with_capacity(job.application_fields.len());

    for field in &job.application_fields {
        let mut value = application
            .answers
            .iter()
            .find(|answer| answer.label.trim() == field.label.trim())
            .map(|answer| answer.value.trim().to_string())
            .unwrap_or_default();

        if value.is_empty() && field.input_type == FormFieldType::File {
            value = application.resume.clone().unwrap_or_default().trim().to_string();
        }

        if field.required && value.is_empty() {
            return Err(ServiceError::ValidationError(format!(
                "Field \"{}\" is required",
                field.label
            )));
        }

        answers.push(Answer {
            label: field.label.clone(),
            input_type: field.input_type,
            required: field.required,
            value,
        });
    }

    Ok(answers)
}

/// Partially filled education/experience rows need their key column
fn check_history(application: &Application) -> Result<(), ServiceError> {
    for (i, row) in application.education.iter().enumerate() {
        if !row.is_blank() && row.school.trim().is_empty() {
            return Err(ServiceError::ValidationError(format!(
                "Education entry {} requires a school",
                i + 1
            )));
        }
    }
    for (i, row) in application.experience.iter().enumerate() {
        if !row.is_blank() && row.title.trim().is_empty() {
            return Err(ServiceError::ValidationError(format!(
                "Experience entry {} requires a title",
                i + 1
            )));
        }
    }
    Ok(())
}
