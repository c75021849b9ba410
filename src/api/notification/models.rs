use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `sendEmailToCandidate`; presence of the required fields is
/// checked by the service
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    pub candidate_email: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub candidate_id: Option<Uuid>,
    pub admin_name: Option<String>,
}
