use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::api::validation::not_blank;

/// Publication state of a job posting
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Draft,
    Live,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Draft => "draft",
            JobStatus::Live => "live",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(JobStatus::Draft),
            "live" => Ok(JobStatus::Live),
            other => Err(format!("unknown job status: {}", other)),
        }
    }
}

/// Input widget an application form field renders as
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FormFieldType {
    #[default]
    Text,
    Textarea,
    RichText,
    Url,
    Number,
    File,
}

/// One entry of a job's application form
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    #[validate(custom(function = "not_blank", message = "Form field label must not be empty"))]
    pub label: String,
    #[serde(default)]
    pub input_type: FormFieldType,
    #[serde(default)]
    pub required: bool,
}

impl FormField {
    /// The field every new posting gets when none are supplied
    pub fn resume() -> Self {
        FormField {
            label: "Resume".to_string(),
            input_type: FormFieldType::File,
            required: true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct JobInfo {
    pub location_type: String,
    pub requirements: Vec<String>,
    pub benefits: Vec<String>,
    pub job_function: String,
    pub experience: String,
    pub employment_type: String,
    pub education: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct CompanyInfo {
    pub industry: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Salary {
    pub from: Option<f64>,
    pub to: Option<f64>,
    pub currency: String,
}

impl Default for Salary {
    fn default() -> Self {
        Salary {
            from: None,
            to: None,
            currency: "USD".to_string(),
        }
    }
}

/// Snapshot of the admin who created a posting
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct CreatedBy {
    pub name: String,
    pub email: String,
    pub uid: Option<Uuid>,
}

/// A stored job posting
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub department: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub status: JobStatus,
    pub summary: String,
    pub description: String,
    pub job_info: JobInfo,
    pub company_info: CompanyInfo,
    pub salary: Salary,
    pub application_fields: Vec<FormField>,
    pub created_by: CreatedBy,
    pub posted: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_job_type() -> String {
    "Full-time".to_string()
}

/// Job payload submitted by an admin
#[derive(Deserialize, Serialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    #[validate(
        custom(function = "not_blank", message = "Title is required"),
        length(max = 200, message = "Title must be at most 200 characters")
    )]
    pub title: String,
    #[serde(default)]
    pub department: String,
    #[validate(custom(function = "not_blank", message = "Location is required"))]
    pub location: String,
    #[serde(rename = "type", default = "default_job_type")]
    pub job_type: String,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub summary: String,
    #[validate(custom(function = "not_blank", message = "Description is required"))]
    pub description: String,
    #[serde(default)]
    pub job_info: JobInfo,
    #[serde(default)]
    pub company_info: CompanyInfo,
    #[serde(default)]
    pub salary: Salary,
    #[validate(nested)]
    pub application_fields: Option<Vec<FormField>>,
}

/// Partial job update; absent fields are left untouched
#[derive(Deserialize, Serialize, Debug, Default, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JobPatch {
    #[validate(
        custom(function = "not_blank", message = "Title must not be empty"),
        length(max = 200, message = "Title must be at most 200 characters")
    )]
    pub title: Option<String>,
    pub department: Option<String>,
    #[validate(custom(function = "not_blank", message = "Location must not be empty"))]
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    pub status: Option<JobStatus>,
    pub summary: Option<String>,
    #[validate(custom(function = "not_blank", message = "Description must not be empty"))]
    pub description: Option<String>,
    pub job_info: Option<JobInfo>,
    pub company_info: Option<CompanyInfo>,
    pub salary: Option<Salary>,
    #[validate(nested)]
    pub application_fields: Option<Vec<FormField>>,
}

impl JobPatch {
    pub fn apply(self, job: &mut Job) {
        if let Some(title) = self.title {
            job.title = title;
        }
        if let Some(department) = self.department {
            job.department = department;
        }
        if let Some(location) = self.location {
            job.location = location;
        }
        if let Some(job_type) = self.job_type {
            job.job_type = job_type;
        }
        if let Some(status) = self.status {
            job.status = status;
        }
        if let Some(summary) = self.summary {
            job.summary = summary;
        }
        if let Some(description) = self.description {
            job.description = description;
        }
        if let Some(job_info) = self.job_info {
            job.job_info = job_info;
        }
        if let Some(company_info) = self.company_info {
            job.company_info = company_info;
        }
        if let Some(salary) = self.salary {
            job.salary = salary;
        }
        if let Some(fields) = self.application_fields {
            job.application_fields = fields;
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct StatusChange {
    pub status: JobStatus,
}

#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct FormFieldsChange {
    #[validate(nested)]
    pub fields: Vec<FormField>,
}

/// Query-string filters for the job listing
#[derive(Deserialize, Debug, Default)]
pub struct JobFilter {
    pub search: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
}

impl JobFilter {
    /// Whether `job` passes every filter that is set
    pub fn matches(&self, job: &Job) -> bool {
        let term = self
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_default();

        let matches_search = term.is_empty()
            || job.title.to_lowercase().contains(&term)
            || job.summary.to_lowercase().contains(&term)
            || job.department.to_lowercase().contains(&term);

        let exact = |wanted: &Option<String>, actual: &str| {
            wanted.as_deref().map_or(true, |w| w == actual)
        };

        matches_search
            && exact(&self.department, &job.department)
            && exact(&self.location, &job.location)
            && exact(&self.job_type, &job.job_type)
    }
}
