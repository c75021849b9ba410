use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web::Data};
use futures_util::future::LocalBoxFuture;

use crate::api::error::ServiceError;
use crate::api::user::models::Role;
use super::models::Actor;
use super::service::AuthService;

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

impl FromRequest for Actor {
    type Error = ServiceError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let auth = req.app_data::<Data<AuthService>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            match auth {
                Some(auth) => auth.resolve(token.as_deref()).await,
                // Apps assembled without auth treat everyone as a guest
                None => Ok(Actor::guest()),
            }
        })
    }
}

impl Actor {
    /// Admin or super-admin
    pub fn require_admin(&self) -> Result<(), ServiceError> {
        self.require(Role::Admin)
    }

    pub fn require_super_admin(&self) -> Result<(), ServiceError> {
        self.require(Role::SuperAdmin)
    }

    fn require(&self, minimum: Role) -> Result<(), ServiceError> {
        if self.is_guest() {
            return Err(ServiceError::Unauthorized("Sign in required".to_string()));
        }
        if self.role < minimum {
            return Err(ServiceError::Forbidden(format!(
                "This action requires the {} role",
                minimum
            )));
        }
        Ok(())
    }
}
