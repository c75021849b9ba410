use std::sync::Arc;
use tracing::info;

use crate::api::auth::Actor;
use crate::api::candidate::CandidateService;
use crate::api::error::ServiceError;
use crate::mailer::{Mailer, OutgoingEmail};
use super::models::SendEmailRequest;

/// Sends candidate email and records it on the candidate
pub struct NotificationService {
    mailer: Arc<dyn Mailer>,
    candidates: Arc<CandidateService>,
    from: String,
}

impl NotificationService {
    pub fn new(mailer: Arc<dyn Mailer>, candidates: Arc<CandidateService>, from: String) -> Self {
        Self {
            mailer,
            candidates,
            from,
        }
    }

    /// Deliver the message, then log it on the candidate when one is named
    ///
    /// The log write happens only after a successful send.
    pub async fn send_to_candidate(&self, actor: &Actor, request: SendEmailRequest) -> Result<(), ServiceError> {
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        let (to, subject, body) = match (
            present(request.candidate_email),
            present(request.subject),
            present(request.body),
        ) {
            (Some(to), Some(subject), Some(body)) => (to.trim().to_string(), subject, body),
            _ => {
                return Err(ServiceError::ValidationError(
                    "candidateEmail, subject, and body are required.".to_string(),
                ))
            }
        };

        let email = OutgoingEmail {
            from: self.from.clone(),
            to,
            subject,
            html: body,
        };
        self.mailer.send(&email).await?;
        info!("Service: Email sent to {} (subject={:?})", email.to, email.subject);

        if let Some(candidate_id) = request.candidate_id {
            let admin = present(request.admin_name).unwrap_or_else(|| actor.admin_name());
            self.candidates
                .log_email(candidate_id, &email.subject, &email.html, &admin)
                .await?;
            info!("Service: Email logged on candidate {}", candidate_id);
        }

        Ok(())
    }
}
