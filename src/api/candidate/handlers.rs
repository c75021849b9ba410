use actix_web::{
    HttpResponse, get, post,
    web::{Data, Json, Path, Query, ServiceConfig, scope},
};
use uuid::Uuid;

use crate::api::auth::Actor;
use crate::api::error::ServiceError;
use super::dto::CandidateResponse;
use super::models::{Application, CandidateFilter, CommentRequest, RejectRequest, StageChange};
use super::service::CandidateService;

/// Guests may apply; the job must be live
#[post("/{job_id}/applications")]
async fn apply(
    candidates: Data<CandidateService>,
    job_id: Path<Uuid>,
    application: Json<Application>,
) -> Result<HttpResponse, ServiceError> {
    let candidate = candidates
        .apply(job_id.into_inner(), application.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(CandidateResponse {
        message: "Application submitted successfully".to_string(),
        candidate,
    }))
}

#[get("/{job_id}/candidates")]
async fn list_for_job(
    actor: Actor,
    candidates: Data<CandidateService>,
    job_id: Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    actor.require_admin()?;
    let list = candidates.list_candidates(Some(job_id.into_inner())).await?;
    Ok(HttpResponse::Ok().json(list))
}

#[get("")]
async fn list_candidates(
    actor: Actor,
    candidates: Data<CandidateService>,
    filter: Query<CandidateFilter>,
) -> Result<HttpResponse, ServiceError> {
    actor.require_admin()?;
    let list = candidates.list_candidates(filter.job_id).await?;
    Ok(HttpResponse::Ok().json(list))
}

#[get("/{id}")]
async fn get_candidate(
    actor: Actor,
    candidates: Data<CandidateService>,
    id: Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    actor.require_admin()?;
    let candidate = candidates.get_candidate(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(candidate))
}

#[post("/{id}/stage")]
async fn change_stage(
    actor: Actor,
    candidates: Data<CandidateService>,
    id: Path<Uuid>,
    body: Json<StageChange>,
) -> Result<HttpResponse, ServiceError> {
    actor.require_admin()?;
    let candidate = candidates
        .change_stage(&actor, id.into_inner(), body.stage)
        .await?;
    Ok(HttpResponse::Ok().json(candidate))
}

#[post("/{id}/comments")]
async fn add_comment(
    actor: Actor,
    candidates: Data<CandidateService>,
    id: Path<Uuid>,
    body: Json<CommentRequest>,
) -> Result<HttpResponse, ServiceError> {
    actor.require_admin()?;
    let candidate = candidates
        .add_comment(&actor, id.into_inner(), &body.text)
        .await?;
    Ok(HttpResponse::Ok().json(candidate))
}

#[post("/{id}/reject")]
async fn reject(
    actor: Actor,
    candidates: Data<CandidateService>,
    id: Path<Uuid>,
    body: Json<RejectRequest>,
) -> Result<HttpResponse, ServiceError> {
    actor.require_admin()?;
    let candidate = candidates
        .reject(&actor, id.into_inner(), &body.reason)
        .await?;
    Ok(HttpResponse::Ok().json(candidate))
}

#[post("/{id}/undo-reject")]
async fn undo_reject(
    actor: Actor,
    candidates: Data<CandidateService>,
    id: Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    actor.require_admin()?;
    let candidate = candidates.undo_reject(&actor, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(candidate))
}

/// Routes nested under `/jobs/{job_id}`, mounted inside the job scope
pub fn job_candidate_config(config: &mut ServiceConfig) {
    config.service(apply).service(list_for_job);
}

pub fn candidate_config(config: &mut ServiceConfig) {
    config.service(
        scope("candidates")
            .service(list_candidates)
            .service(get_candidate)
            .service(change_stage)
            .service(add_comment)
            .service(reject)
            .service(undo_reject),
    );
}
