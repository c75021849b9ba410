pub mod activity;
pub mod auth;
pub mod candidate;
pub mod error;
pub mod health;
pub mod job;
pub mod notification;
pub mod state;
#[cfg(test)]
pub mod test_support;
pub mod user;
pub mod validation;

use actix_web::{HttpResponse, web::{ServiceConfig, scope}};

use self::validation::ErrorResponse;

/// Fallback for privileged functions called with the wrong method
pub async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().json(ErrorResponse::new("Method not allowed"))
}

/// Every application route except the health probes
pub fn routes(config: &mut ServiceConfig) {
    config
        .configure(auth::handlers::auth_config)
        .configure(job::handlers::job_config)
        .configure(candidate::handlers::candidate_config)
        .configure(candidate::uploads::upload_config)
        .configure(user::handlers::user_config)
        .configure(activity::handlers::activity_config)
        .service(
            scope("functions")
                .configure(user::handlers::user_functions_config)
                .configure(notification::handlers::notification_config),
        );
}
