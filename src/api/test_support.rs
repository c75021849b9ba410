//! In-memory application harness for handler tests.

use std::sync::Arc;

use actix_http::Request;
use actix_web::{
    App,
    body::MessageBody,
    dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse},
    http::header,
    test,
};
use chrono::Utc;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::api::auth::models::Identity;
use crate::api::auth::password::{generate_salt, hash_password};
use crate::api::routes;
use crate::api::state::AppState;
use crate::api::user::models::{Role, User};
use crate::config::Config;
use crate::db::Repositories;
use crate::mailer::testing::RecordingMailer;

const PASSWORD: &str = "correct-horse";

pub struct TestContext {
    pub repos: Repositories,
    pub mailer: Arc<RecordingMailer>,
    pub state: AppState,
    pub admin_uid: Uuid,
    pub super_admin_uid: Uuid,
    admin_token: String,
    super_admin_token: String,
    _uploads: tempfile::TempDir,
}

impl TestContext {
    /// Fresh store with one admin (Alan Turing) and one super-admin, both signed in
    pub async fn new() -> Self {
        Self::build(RecordingMailer::default()).await
    }

    pub async fn with_failing_mailer() -> Self {
        Self::build(RecordingMailer::failing()).await
    }

    async fn build(mailer: RecordingMailer) -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let upload_dir = uploads.path().display().to_string();
        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://unused/test".to_string()),
            "MAIL_FROM" => Some("hiring@example.com".to_string()),
            "UPLOAD_DIR" => Some(upload_dir.clone()),
            "PUBLIC_BASE_URL" => Some("http://files.test".to_string()),
            _ => None,
        })
        .unwrap();

        let repos = Repositories::in_memory();
        let mailer = Arc::new(mailer);
        let state = AppState::new(repos.clone(), mailer.clone(), &config);

        let super_admin_uid = seed_user(&repos, "root@example.com", "Root", "", Role::SuperAdmin).await;
        let admin_uid = seed_user(&repos, "admin@example.com", "Alan", "Turing", Role::Admin).await;
        let super_admin_token = state.auth.login("root@example.com", PASSWORD).await.unwrap().token;
        let admin_token = state.auth.login("admin@example.com", PASSWORD).await.unwrap().token;

        TestContext {
            repos,
            mailer,
            state,
            admin_uid,
            super_admin_uid,
            admin_token,
            super_admin_token,
            _uploads: uploads,
        }
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let state = self.state.clone();
        App::new().configure(move |config| {
            state.configure(config);
            routes(config);
        })
    }

    pub fn admin_auth(&self) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {}", self.admin_token))
    }

    pub fn super_admin_auth(&self) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {}", self.super_admin_token))
    }

    /// Create a job through the API as the admin; returns its id
    pub async fn create_job<S, B>(&self, app: &S, title: &str, status: &str) -> String
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let req = test::TestRequest::post()
            .uri("/jobs")
            .insert_header(self.admin_auth())
            .set_json(json!({
                "title": title,
                "location": "Remote",
                "description": format!("{} role", title),
                "status": status
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(app, req).await;
        body["job"]["id"].as_str().unwrap().to_string()
    }

    /// Submit a minimal application as a guest; returns the candidate id
    pub async fn apply<S, B>(&self, app: &S, job_id: &str, first_name: &str, email: &str) -> String
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let req = test::TestRequest::post()
            .uri(&format!("/jobs/{}/applications", job_id))
            .set_json(json!({
                "firstName": first_name,
                "lastName": "Applicant",
                "email": email,
                "resume": "http://files.test/uploads/resumes/cv.pdf"
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(app, req).await;
        body["candidate"]["id"].as_str().unwrap().to_string()
    }
}

async fn seed_user(repos: &Repositories, email: &str, first: &str, last: &str, role: Role) -> Uuid {
    let salt = generate_salt();
    let identity = Identity {
        uid: Uuid::new_v4(),
        email: email.to_string(),
        display_name: format!("{} {}", first, last).trim().to_string(),
        password_hash: hash_password(PASSWORD, &salt),
        password_salt: salt,
        created_at: Utc::now(),
    };
    repos.identities.create(&identity).await.unwrap();
    repos
        .users
        .upsert(&User {
            uid: identity.uid,
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            role,
            department: "People".to_string(),
            created_at: Utc::now(),
        })
        .await
        .unwrap();
    identity.uid
}
