use std::sync::Arc;

use actix_multipart::form::MultipartFormConfig;
use actix_web::web::{self, Data, ServiceConfig};

use crate::api::activity::ActivityService;
use crate::api::auth::AuthService;
use crate::api::candidate::uploads::UploadStore;
use crate::api::candidate::CandidateService;
use crate::api::job::JobService;
use crate::api::notification::NotificationService;
use crate::api::user::UserService;
use crate::api::validation;
use crate::config::Config;
use crate::db::Repositories;
use crate::mailer::Mailer;

/// Services shared by every HTTP worker
#[derive(Clone)]
pub struct AppState {
    pub auth: Data<AuthService>,
    pub jobs: Data<JobService>,
    pub candidates: Data<CandidateService>,
    pub users: Data<UserService>,
    pub notifications: Data<NotificationService>,
    pub activity: Data<ActivityService>,
    pub uploads: Data<UploadStore>,
    max_payload_size: usize,
}

impl AppState {
    pub fn new(repos: Repositories, mailer: Arc<dyn Mailer>, config: &Config) -> Self {
        let activity = Arc::new(ActivityService::new(
            repos.activity.clone(),
            repos.jobs.clone(),
            repos.candidates.clone(),
            repos.users.clone(),
        ));
        let candidates = Arc::new(CandidateService::new(
            repos.candidates.clone(),
            repos.jobs.clone(),
            activity.clone(),
        ));
        let auth = AuthService::new(
            repos.identities.clone(),
            repos.users.clone(),
            chrono::Duration::hours(config.session_ttl_hours),
        );

        AppState {
            auth: Data::new(auth),
            jobs: Data::new(JobService::new(repos.jobs.clone(), activity.clone())),
            users: Data::new(UserService::new(repos.identities, repos.users, activity.clone())),
            notifications: Data::new(NotificationService::new(
                mailer,
                candidates.clone(),
                config.mail_from.clone(),
            )),
            candidates: Data::from(candidates),
            activity: Data::from(activity),
            uploads: Data::new(UploadStore::new(
                config.upload_dir.clone(),
                config.public_base_url.clone(),
            )),
            max_payload_size: config.max_payload_size,
        }
    }

    /// Register services and extractor configuration on an app
    pub fn configure(&self, config: &mut ServiceConfig) {
        config
            .app_data(self.auth.clone())
            .app_data(self.jobs.clone())
            .app_data(self.candidates.clone())
            .app_data(self.users.clone())
            .app_data(self.notifications.clone())
            .app_data(self.activity.clone())
            .app_data(self.uploads.clone())
            .app_data(web::PayloadConfig::default().limit(self.max_payload_size))
            .app_data(validation::web_json_config().limit(self.max_payload_size))
            .app_data(validation::json_config().limit(self.max_payload_size))
            .app_data(MultipartFormConfig::default().total_limit(self.max_payload_size));
    }
}
