use serde::Serialize;
use super::models::Job;

/// Response for job creation and mutation
#[derive(Serialize)]
pub struct JobResponse {
    pub message: String,
    pub job: Job,
}
