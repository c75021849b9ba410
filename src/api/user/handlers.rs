use actix_web::{
    HttpResponse, get,
    web::{self, Data, Json, Path, ServiceConfig, resource, scope},
};
use uuid::Uuid;

use crate::api::auth::Actor;
use crate::api::error::ServiceError;
use crate::api::method_not_allowed;
use super::models::{CreateUserRequest, CreatedUid, DeleteUserRequest, Success, UpdateUserRequest};
use super::service::UserService;

#[get("")]
async fn list_users(actor: Actor, users: Data<UserService>) -> Result<HttpResponse, ServiceError> {
    actor.require_admin()?;
    let users = users.list_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

#[get("/{uid}")]
async fn get_user(
    actor: Actor,
    users: Data<UserService>,
    uid: Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    actor.require_admin()?;
    let user = users.get_user(uid.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

// A missing or unparsable body is treated as an empty one so the
// field checks produce the error message.

async fn create_user_by_admin(
    actor: Actor,
    users: Data<UserService>,
    body: Option<Json<CreateUserRequest>>,
) -> Result<HttpResponse, ServiceError> {
    actor.require_super_admin()?;
    let request = body.map(Json::into_inner).unwrap_or_default();
    let uid = users.create_user(&actor, request).await?;
    Ok(HttpResponse::Ok().json(CreatedUid { uid }))
}

async fn update_user_by_admin(
    actor: Actor,
    users: Data<UserService>,
    body: Option<Json<UpdateUserRequest>>,
) -> Result<HttpResponse, ServiceError> {
    actor.require_super_admin()?;
    let request = body.map(Json::into_inner).unwrap_or_default();
    users.update_user(&actor, request).await?;
    Ok(HttpResponse::Ok().json(Success::ok()))
}

async fn delete_user_by_admin(
    actor: Actor,
    users: Data<UserService>,
    body: Option<Json<DeleteUserRequest>>,
) -> Result<HttpResponse, ServiceError> {
    actor.require_super_admin()?;
    let request = body.map(Json::into_inner).unwrap_or_default();
    users.delete_user(&actor, request.uid).await?;
    Ok(HttpResponse::Ok().json(Success::ok()))
}

pub fn user_config(config: &mut ServiceConfig) {
    config.service(scope("users").service(list_users).service(get_user));
}

/// Privileged functions, mounted inside the `/functions` scope
pub fn user_functions_config(config: &mut ServiceConfig) {
    config
        .service(
            resource("/createUserByAdmin")
                .route(web::post().to(create_user_by_admin))
                .default_service(web::to(method_not_allowed)),
        )
        .service(
            resource("/updateUserByAdmin")
                .route(web::post().to(update_user_by_admin))
                .default_service(web::to(method_not_allowed)),
        )
        .service(
            resource("/deleteUserByAdmin")
                .route(web::post().to(delete_user_by_admin))
                .default_service(web::to(method_not_allowed)),
        );
}
