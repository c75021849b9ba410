use actix_web::{
    HttpResponse,
    http::Method,
    web::{self, Data, Json, ServiceConfig, resource},
};

use crate::api::auth::Actor;
use crate::api::error::ServiceError;
use crate::api::method_not_allowed;
use crate::api::user::models::Success;
use super::models::SendEmailRequest;
use super::service::NotificationService;

async fn send_email_to_candidate(
    actor: Actor,
    notifications: Data<NotificationService>,
    body: Option<Json<SendEmailRequest>>,
) -> Result<HttpResponse, ServiceError> {
    actor.require_admin()?;
    let request = body.map(Json::into_inner).unwrap_or_default();
    notifications.send_to_candidate(&actor, request).await?;
    Ok(HttpResponse::Ok().json(Success::ok()))
}

/// CORS preflight
async fn preflight() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Mounted inside the `/functions` scope
pub fn notification_config(config: &mut ServiceConfig) {
    config.service(
        resource("/sendEmailToCandidate")
            .route(web::post().to(send_email_to_candidate))
            .route(web::method(Method::OPTIONS).to(preflight))
            .default_service(web::to(method_not_allowed)),
    );
}
