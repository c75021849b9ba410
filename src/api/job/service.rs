use std::sync::Arc;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::activity::models::EntityType;
use crate::api::activity::ActivityService;
use crate::api::auth::Actor;
use crate::api::error::ServiceError;
use crate::db::JobRepository;
use super::dto::JobResponse;
use super::models::{CreatedBy, FormField, Job, JobFilter, JobPatch, JobStatus, NewJob};

/// Job service containing business logic
pub struct JobService {
    jobs: Arc<dyn JobRepository>,
    activity: Arc<ActivityService>,
}

impl JobService {
    pub fn new(jobs: Arc<dyn JobRepository>, activity: Arc<ActivityService>) -> Self {
        Self { jobs, activity }
    }

    /// Create a job posting
    ///
    /// Missing application fields default to a single required resume upload.
    pub async fn create_job(&self, actor: &Actor, new: NewJob) -> Result<JobResponse, ServiceError> {
        info!("Service: Creating job with title={}", new.title);

        let now = Utc::now();
        let job = Job {
            id: Uuid::new_v4(),
            title: new.title,
            department: new.department,
            location: new.location,
            job_type: new.job_type,
            status: new.status,
            summary: new.summary,
            description: new.description,
            job_info: new.job_info,
            company_info: new.company_info,
            salary: new.salary,
            application_fields: new
                .application_fields
                .unwrap_or_else(|| vec![FormField::resume()]),
            created_by: CreatedBy {
                name: actor.admin_name(),
                email: actor.email.clone(),
                uid: actor.uid,
            },
            posted: now,
            updated_at: now,
        };
        self.jobs.insert(&job).await?;

        let label = match job.status {
            JobStatus::Live => "published job",
            JobStatus::Draft => "saved job as draft",
        };
        self.activity
            .record(actor.snapshot(), EntityType::Job, job.id, &job.title, label)
            .await;

        info!("Service: Job created successfully with id={}", job.id);
        Ok(JobResponse {
            message: "Job created successfully".to_string(),
            job,
        })
    }

    /// Jobs visible to `actor` that pass `filter`, newest first
    pub async fn list_jobs(&self, actor: &Actor, filter: &JobFilter) -> Result<Vec<Job>, ServiceError> {
        let include_drafts = actor.role.is_admin();
        let jobs: Vec<Job> = self
            .jobs
            .list()
            .await?
            .into_iter()
            .filter(|job| include_drafts || job.status == JobStatus::Live)
            .filter(|job| filter.matches(job))
            .collect();

        info!("Service: Listing {} jobs for {}", jobs.len(), actor.role);
        Ok(jobs)
    }

    /// A single job; drafts are hidden from guests
    pub async fn get_job(&self, actor: &Actor, id: Uuid) -> Result<Job, ServiceError> {
        match self.jobs.find(id).await? {
            Some(job) if job.status == JobStatus::Live || actor.role.is_admin() => Ok(job),
            _ => Err(ServiceError::not_found("Job", id)),
        }
    }

    pub async fn update_job(&self, actor: &Actor, id: Uuid, patch: JobPatch) -> Result<JobResponse, ServiceError> {
        let job = self
            .mutate(id, |job| patch.apply(job))
            .await?;

        self.activity
            .record(actor.snapshot(), EntityType::Job, job.id, &job.title, "updated job")
            .await;

        info!("Service: Job {} updated", id);
        Ok(JobResponse {
            message: "Job updated successfully".to_string(),
            job,
        })
    }

    /// Publish or unpublish
    pub async fn set_status(&self, actor: &Actor, id: Uuid, status: JobStatus) -> Result<JobResponse, ServiceError> {
        let job = self.mutate(id, |job| job.status = status).await?;

        let label = match status {
            JobStatus::Live => "published job",
            JobStatus::Draft => "unpublished job",
        };
        self.activity
            .record(actor.snapshot(), EntityType::Job, job.id, &job.title, label)
            .await;

        info!("Service: Job {} is now {}", id, status);
        Ok(JobResponse {
            message: format!("Job status set to {}", status),
            job,
        })
    }

    /// Replace the application form
    pub async fn set_form_fields(
        &self,
        actor: &Actor,
        id: Uuid,
        fields: Vec<FormField>,
    ) -> Result<JobResponse, ServiceError> {
        let job = self
            .mutate(id, |job| job.application_fields = fields)
            .await?;

        self.activity
            .record(
                actor.snapshot(),
                EntityType::Job,
                job.id,
                &job.title,
                "updated application form",
            )
            .await;

        info!(
            "Service: Job {} application form now has {} fields",
            id,
            job.application_fields.len()
        );
        Ok(JobResponse {
            message: "Application form updated".to_string(),
            job,
        })
    }

    pub async fn delete_job(&self, actor: &Actor, id: Uuid) -> Result<(), ServiceError> {
        let job = self
            .jobs
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Job", id))?;

        if !self.jobs.delete(id).await? {
            warn!("Service: Job {} disappeared before delete", id);
            return Err(ServiceError::not_found("Job", id));
        }

        self.activity
            .record(actor.snapshot(), EntityType::Job, id, &job.title, "deleted job")
            .await;

        info!("Service: Job {} deleted", id);
        Ok(())
    }

    /// Read, modify and write back a job; last writer wins
    async fn mutate<F>(&self, id: Uuid, change: F) -> Result<Job, ServiceError>
    where
        F: FnOnce(&mut Job),
    {
        let mut job = self
            .jobs
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Job", id))?;

        change(&mut job);
        job.updated_at = Utc::now();

        if !self.jobs.update(&job).await? {
            return Err(ServiceError::not_found("Job", id));
        }
        Ok(job)
    }
}
