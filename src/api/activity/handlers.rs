use actix_web::{
    HttpResponse, get, post,
    web::{Data, ServiceConfig, scope},
};
use actix_web_validator::Json;

use crate::api::auth::Actor;
use crate::api::error::ServiceError;
use super::models::NewActivity;
use super::service::ActivityService;

#[get("")]
async fn list_logs(
    actor: Actor,
    activity: Data<ActivityService>,
) -> Result<HttpResponse, ServiceError> {
    actor.require_admin()?;
    let views = activity.list().await?;
    Ok(HttpResponse::Ok().json(views))
}

#[post("")]
async fn create_log(
    actor: Actor,
    activity: Data<ActivityService>,
    body: Json<NewActivity>,
) -> Result<HttpResponse, ServiceError> {
    actor.require_admin()?;
    let entry = activity.append(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(entry))
}

pub fn activity_config(config: &mut ServiceConfig) {
    config.service(scope("logs").service(list_logs).service(create_log));
}
