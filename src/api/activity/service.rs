use std::collections::HashMap;
use std::sync::Arc;
use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::api::error::ServiceError;
use crate::db::{ActivityRepository, CandidateRepository, JobRepository, UserRepository};
use super::models::{ActivityEntry, ActivityView, ActorSnapshot, EntityRef, EntityType, NewActivity};

/// Activity feed: appends from every other service, joined reads for display
pub struct ActivityService {
    activity: Arc<dyn ActivityRepository>,
    jobs: Arc<dyn JobRepository>,
    candidates: Arc<dyn CandidateRepository>,
    users: Arc<dyn UserRepository>,
}

impl ActivityService {
    pub fn new(
        activity: Arc<dyn ActivityRepository>,
        jobs: Arc<dyn JobRepository>,
        candidates: Arc<dyn CandidateRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            activity,
            jobs,
            candidates,
            users,
        }
    }

    /// Append an entry
    pub async fn append(&self, new: NewActivity) -> Result<ActivityEntry, ServiceError> {
        let entry = ActivityEntry {
            id: Uuid::new_v4(),
            actor: new.actor,
            entity_id: new.entity_id,
            entity_type: new.entity_type,
            entity_name: new.entity_name,
            action_label: new.action_label,
            timestamp: Utc::now(),
        };
        self.activity.append(&entry).await?;

        info!(
            "Service: Activity recorded: {} {} {} {}",
            entry.actor.name, entry.action_label, entry.entity_type, entry.entity_id
        );
        Ok(entry)
    }

    /// Best-effort append used alongside other writes; failures are only logged
    pub async fn record(
        &self,
        actor: ActorSnapshot,
        entity_type: EntityType,
        entity_id: Uuid,
        entity_name: &str,
        action_label: &str,
    ) {
        let new = NewActivity {
            actor,
            entity_id: entity_id.to_string(),
            entity_type,
            entity_name: entity_name.to_string(),
            action_label: action_label.to_string(),
        };
        if let Err(e) = self.append(new).await {
            error!(
                "Service: Failed to record activity for {} {}: {}",
                entity_type, entity_id, e
            );
        }
    }

    /// Every entry newest first, joined against the live jobs, candidates and users
    pub async fn list(&self) -> Result<Vec<ActivityView>, ServiceError> {
        let entries = self.activity.list().await?;

        let jobs: HashMap<String, String> = self
            .jobs
            .list()
            .await?
            .into_iter()
            .map(|job| (job.id.to_string(), job.title))
            .collect();
        let candidates: HashMap<String, String> = self
            .candidates
            .list(None)
            .await?
            .into_iter()
            .map(|c| (c.id.to_string(), c.name))
            .collect();
        let users: HashMap<String, String> = self
            .users
            .list()
            .await?
            .into_iter()
            .map(|user| {
                let name = user.display_name();
                let label = if name.is_empty() { user.email } else { name };
                (user.uid.to_string(), label)
            })
            .collect();

        info!("Service: Listing {} activity entries", entries.len());

        Ok(entries
            .into_iter()
            .map(|entry| {
                let live = match entry.entity_type {
                    EntityType::Job => jobs.get(&entry.entity_id),
                    EntityType::Candidate => candidates.get(&entry.entity_id),
                    EntityType::User => users.get(&entry.entity_id),
                };
                let entity = match live {
                    Some(display) => EntityRef::available(entry.entity_type, display.clone()),
                    None => EntityRef::unavailable(entry.entity_type),
                };
                ActivityView { entry, entity }
            })
            .collect())
    }
}
