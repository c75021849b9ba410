use actix_web::{
    HttpResponse, delete, get, patch, post, put,
    web::{Data, Path, Query, ServiceConfig, scope},
};
use actix_web_validator::Json;
use uuid::Uuid;

use crate::api::auth::Actor;
use crate::api::candidate::handlers::job_candidate_config;
use crate::api::error::ServiceError;
use crate::api::user::models::Success;
use super::models::{FormFieldsChange, JobFilter, JobPatch, NewJob, StatusChange};
use super::service::JobService;

#[post("")]
async fn create_job(
    actor: Actor,
    jobs: Data<JobService>,
    job: Json<NewJob>,
) -> Result<HttpResponse, ServiceError> {
    actor.require_admin()?;
    let response = jobs.create_job(&actor, job.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

#[get("")]
async fn list_jobs(
    actor: Actor,
    jobs: Data<JobService>,
    filter: Query<JobFilter>,
) -> Result<HttpResponse, ServiceError> {
    let jobs = jobs.list_jobs(&actor, &filter).await?;
    Ok(HttpResponse::Ok().json(jobs))
}

#[get("/{id}")]
async fn get_job(
    actor: Actor,
    jobs: Data<JobService>,
    id: Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let job = jobs.get_job(&actor, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(job))
}

#[put("/{id}")]
async fn update_job(
    actor: Actor,
    jobs: Data<JobService>,
    id: Path<Uuid>,
    patch: Json<JobPatch>,
) -> Result<HttpResponse, ServiceError> {
    actor.require_admin()?;
    let response = jobs
        .update_job(&actor, id.into_inner(), patch.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[patch("/{id}/status")]
async fn set_status(
    actor: Actor,
    jobs: Data<JobService>,
    id: Path<Uuid>,
    body: Json<StatusChange>,
) -> Result<HttpResponse, ServiceError> {
    actor.require_admin()?;
    let response = jobs.set_status(&actor, id.into_inner(), body.status).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[put("/{id}/form-fields")]
async fn set_form_fields(
    actor: Actor,
    jobs: Data<JobService>,
    id: Path<Uuid>,
    body: Json<FormFieldsChange>,
) -> Result<HttpResponse, ServiceError> {
    actor.require_admin()?;
    let response = jobs
        .set_form_fields(&actor, id.into_inner(), body.into_inner().fields)
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[delete("/{id}")]
async fn delete_job(
    actor: Actor,
    jobs: Data<JobService>,
    id: Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    actor.require_admin()?;
    jobs.delete_job(&actor, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Success::ok()))
}

pub fn job_config(config: &mut ServiceConfig) {
    config.service(
        scope("jobs")
            .configure(job_candidate_config)
            .service(create_job)
            .service(list_jobs)
            .service(get_job)
            .service(update_job)
            .service(set_status)
            .service(set_form_fields)
            .service(delete_job),
    );
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};

    use crate::api::test_support::TestContext;

    #[actix_web::test]
    async fn create_applies_defaults() {
        let ctx = TestContext::new().await;
        let app = test::init_service(ctx.app()).await;

        let req = test::TestRequest::post()
            .uri("/jobs")
            .insert_header(ctx.admin_auth())
            .set_json(json!({
                "title": "Backend Engineer",
                "location": "Remote",
                "description": "Build services"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        let job = &body["job"];
        assert_eq!(job["status"], "draft");
        assert_eq!(job["type"], "Full-time");
        assert_eq!(job["salary"]["currency"], "USD");
        assert_eq!(
            job["applicationFields"],
            json!([{ "label": "Resume", "inputType": "file", "required": true }])
        );
        assert_eq!(job["createdBy"]["email"], "admin@example.com");
    }

    #[actix_web::test]
    async fn create_requires_title_location_and_description() {
        let ctx = TestContext::new().await;
        let app = test::init_service(ctx.app()).await;

        let req = test::TestRequest::post()
            .uri("/jobs")
            .insert_header(ctx.admin_auth())
            .set_json(json!({ "title": "", "location": "Remote", "description": "x" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["fields"]["title"]["errors"][0], "Title is required");
    }

    #[actix_web::test]
    async fn whitespace_only_fields_are_rejected() {
        let ctx = TestContext::new().await;
        let app = test::init_service(ctx.app()).await;

        let req = test::TestRequest::post()
            .uri("/jobs")
            .insert_header(ctx.admin_auth())
            .set_json(json!({
                "title": "   ",
                "location": "  ",
                "description": " ",
                "applicationFields": [{ "label": " ", "inputType": "text" }]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["fields"]["title"]["errors"][0], "Title is required");
        assert_eq!(body["fields"]["location"]["errors"][0], "Location is required");
        assert_eq!(body["fields"]["description"]["errors"][0], "Description is required");

        let job_id = ctx.create_job(&app, "Designer", "draft").await;
        let req = test::TestRequest::put()
            .uri(&format!("/jobs/{}", job_id))
            .insert_header(ctx.admin_auth())
            .set_json(json!({ "title": "\t" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["fields"]["title"]["errors"][0], "Title must not be empty");

        let req = test::TestRequest::put()
            .uri(&format!("/jobs/{}/form-fields", job_id))
            .insert_header(ctx.admin_auth())
            .set_json(json!({ "fields": [{ "label": "  ", "inputType": "text" }] }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn guests_cannot_create_jobs() {
        let ctx = TestContext::new().await;
        let app = test::init_service(ctx.app()).await;

        let req = test::TestRequest::post()
            .uri("/jobs")
            .set_json(json!({ "title": "T", "location": "L", "description": "D" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn status_toggle_controls_guest_visibility() {
        let ctx = TestContext::new().await;
        let app = test::init_service(ctx.app()).await;
        let job_id = ctx.create_job(&app, "QA Lead", "draft").await;

        let req = test::TestRequest::get().uri("/jobs").to_request();
        let listed: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed, json!([]));

        let req = test::TestRequest::get()
            .uri(&format!("/jobs/{}", job_id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::patch()
            .uri(&format!("/jobs/{}/status", job_id))
            .insert_header(ctx.admin_auth())
            .set_json(json!({ "status": "live" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["job"]["status"], "live");

        let req = test::TestRequest::get()
            .uri(&format!("/jobs/{}", job_id))
            .to_request();
        let job: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(job["status"], "live");
        assert_eq!(job["title"], "QA Lead");
    }

    #[actix_web::test]
    async fn list_filters_by_search_and_department() {
        let ctx = TestContext::new().await;
        let app = test::init_service(ctx.app()).await;
        ctx.create_job(&app, "Rust Engineer", "live").await;
        ctx.create_job(&app, "Recruiter", "live").await;

        let req = test::TestRequest::get().uri("/jobs?search=rust").to_request();
        let listed: Value = test::call_and_read_body_json(&app, req).await;
        let listed = listed.as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["title"], "Rust Engineer");

        let req = test::TestRequest::get()
            .uri("/jobs?department=Nowhere")
            .to_request();
        let listed: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed, json!([]));
    }

    #[actix_web::test]
    async fn update_and_form_fields_replace_content() {
        let ctx = TestContext::new().await;
        let app = test::init_service(ctx.app()).await;
        let job_id = ctx.create_job(&app, "Designer", "live").await;

        let req = test::TestRequest::put()
            .uri(&format!("/jobs/{}", job_id))
            .insert_header(ctx.admin_auth())
            .set_json(json!({ "title": "Senior Designer" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["job"]["title"], "Senior Designer");
        assert_eq!(body["job"]["location"], "Remote");

        let req = test::TestRequest::put()
            .uri(&format!("/jobs/{}/form-fields", job_id))
            .insert_header(ctx.admin_auth())
            .set_json(json!({
                "fields": [
                    { "label": "Portfolio", "inputType": "url", "required": true },
                    { "label": "Notes", "inputType": "textarea" }
                ]
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let fields = body["job"]["applicationFields"].as_array().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1]["required"], false);
    }

    #[actix_web::test]
    async fn unknown_job_is_not_found() {
        let ctx = TestContext::new().await;
        let app = test::init_service(ctx.app()).await;

        let req = test::TestRequest::put()
            .uri("/jobs/00000000-0000-0000-0000-000000000000")
            .insert_header(ctx.admin_auth())
            .set_json(json!({ "title": "Ghost" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
