use serde::Serialize;
use super::models::Candidate;

/// Response for a submitted application
#[derive(Serialize)]
pub struct CandidateResponse {
    pub message: String,
    pub candidate: Candidate,
}
