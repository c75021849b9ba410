use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use std::fmt;
use tracing::{error, warn};

use crate::api::validation::ErrorResponse;
use crate::db::StoreError;
use crate::mailer::MailError;

/// Service-level errors
#[derive(Debug)]
pub enum ServiceError {
    /// Storage operation failed
    DatabaseError(StoreError),

    /// Request content is invalid
    ValidationError(String),

    /// Request conflicts with existing data (e.g. an email already in use)
    Conflict(String),

    /// Referenced record does not exist
    NotFound(String),

    /// Caller is not signed in or the credentials are wrong
    Unauthorized(String),

    /// Caller is signed in but lacks the required role
    Forbidden(String),

    /// Outbound email delivery failed
    MailError(MailError),

    /// Reading or writing an uploaded file failed
    StorageError(std::io::Error),
}

impl ServiceError {
    pub fn not_found(what: &str, id: impl fmt::Display) -> Self {
        ServiceError::NotFound(format!("{} with id {} not found", what, id))
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::DatabaseError(e) => write!(f, "Database error: {}", e),
            ServiceError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ServiceError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ServiceError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ServiceError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ServiceError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ServiceError::MailError(e) => write!(f, "Mail error: {}", e),
            ServiceError::StorageError(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(email) => {
                ServiceError::Conflict(format!("Email {} is already in use.", email))
            }
            other => ServiceError::DatabaseError(other),
        }
    }
}

impl From<MailError> for ServiceError {
    fn from(err: MailError) -> Self {
        ServiceError::MailError(err)
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::DatabaseError(_)
            | ServiceError::MailError(_)
            | ServiceError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::ValidationError(_) | ServiceError::Conflict(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Internal details stay in the logs
        let message = match self {
            ServiceError::DatabaseError(e) => {
                error!("Database error: {}", e);
                "Failed to process request".to_string()
            }
            ServiceError::MailError(e) => {
                error!("Mail delivery failed: {}", e);
                "Failed to send email".to_string()
            }
            ServiceError::StorageError(e) => {
                error!("File storage failed: {}", e);
                "Failed to store file".to_string()
            }
            ServiceError::ValidationError(msg)
            | ServiceError::Conflict(msg)
            | ServiceError::NotFound(msg)
            | ServiceError::Unauthorized(msg)
            | ServiceError::Forbidden(msg) => {
                warn!("{}", self);
                msg.clone()
            }
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse::new(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use rstest::rstest;

    #[rstest]
    #[case(ServiceError::ValidationError("bad".into()), StatusCode::BAD_REQUEST)]
    #[case(ServiceError::Conflict("taken".into()), StatusCode::BAD_REQUEST)]
    #[case(ServiceError::not_found("Job", 7), StatusCode::NOT_FOUND)]
    #[case(ServiceError::Unauthorized("login".into()), StatusCode::UNAUTHORIZED)]
    #[case(ServiceError::Forbidden("nope".into()), StatusCode::FORBIDDEN)]
    fn maps_variants_to_status_codes(#[case] err: ServiceError, #[case] expected: StatusCode) {
        assert_eq!(err.status_code(), expected);
    }

    #[actix_web::test]
    async fn database_errors_do_not_leak_details() {
        let err = ServiceError::DatabaseError(StoreError::decode("job", 1, "secret column"));
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], "Failed to process request");
        assert!(!body.windows(6).any(|w| w == b"secret"));
    }

    #[test]
    fn duplicate_email_becomes_conflict() {
        let err: ServiceError = StoreError::DuplicateEmail("a@b.c".into()).into();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }
}
