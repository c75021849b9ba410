//! In-process store implementing every repository trait, used by tests.

use std::collections::HashMap;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::api::activity::models::ActivityEntry;
use crate::api::auth::models::Identity;
use crate::api::candidate::models::{Candidate, CandidateUpdate};
use crate::api::job::models::Job;
use crate::api::user::models::User;
use super::{
    ActivityRepository, CandidateRepository, IdentityRepository, JobRepository, StoreError,
    UserRepository,
};

#[derive(Default)]
struct State {
    // Vecs keep insertion order so listings are deterministic
    jobs: Vec<Job>,
    candidates: Vec<Candidate>,
    users: Vec<User>,
    identities: Vec<Identity>,
    sessions: HashMap<String, (Uuid, DateTime<Utc>)>,
    activity: Vec<ActivityEntry>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub async fn session_count(&self) -> usize {
        self.state.read().await.sessions.len()
    }
}

#[async_trait]
impl JobRepository for MemoryStore {
    async fn insert(&self, job: &Job) -> Result<(), StoreError> {
        self.state.write().await.jobs.push(job.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Job>, StoreError> {
        Ok(self.state.read().await.jobs.iter().rev().cloned().collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        Ok(self.state.read().await.jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn update(&self, job: &Job) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        match state.jobs.iter_mut().find(|j| j.id == job.id) {
            Some(existing) => {
                *existing = job.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let before = state.jobs.len();
        state.jobs.retain(|j| j.id != id);
        Ok(state.jobs.len() != before)
    }
}

#[async_trait]
impl CandidateRepository for MemoryStore {
    async fn insert(&self, candidate: &Candidate) -> Result<(), StoreError> {
        self.state.write().await.candidates.push(candidate.clone());
        Ok(())
    }

    async fn list(&self, job_id: Option<Uuid>) -> Result<Vec<Candidate>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .candidates
            .iter()
            .rev()
            .filter(|c| job_id.map_or(true, |id| c.job_id == id))
            .cloned()
            .collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Candidate>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .candidates
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn apply(
        &self,
        id: Uuid,
        update: &CandidateUpdate,
    ) -> Result<Option<Candidate>, StoreError> {
        let mut state = self.state.write().await;
        Ok(state.candidates.iter_mut().find(|c| c.id == id).map(|candidate| {
            candidate.apply(update);
            candidate.clone()
        }))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.state.read().await.users.clone())
    }

    async fn find(&self, uid: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().await.users.iter().find(|u| u.uid == uid).cloned())
    }

    async fn upsert(&self, user: &User) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        match state.users.iter_mut().find(|u| u.uid == user.uid) {
            Some(existing) => {
                // created_at is only written on insert, like the SQL upsert
                let created_at = existing.created_at;
                *existing = user.clone();
                existing.created_at = created_at;
            }
            None => state.users.push(user.clone()),
        }
        Ok(())
    }

    async fn delete(&self, uid: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let before = state.users.len();
        state.users.retain(|u| u.uid != uid);
        Ok(state.users.len() != before)
    }
}

#[async_trait]
impl IdentityRepository for MemoryStore {
    async fn create(&self, identity: &Identity) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.identities.iter().any(|i| i.email == identity.email) {
            return Err(StoreError::DuplicateEmail(identity.email.clone()));
        }
        state.identities.push(identity.clone());
        Ok(())
    }

    async fn find(&self, uid: Uuid) -> Result<Option<Identity>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .identities
            .iter()
            .find(|i| i.uid == uid)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .identities
            .iter()
            .find(|i| i.email == email)
            .cloned())
    }

    async fn update(&self, identity: &Identity) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if state
            .identities
            .iter()
            .any(|i| i.email == identity.email && i.uid != identity.uid)
        {
            return Err(StoreError::DuplicateEmail(identity.email.clone()));
        }
        match state.identities.iter_mut().find(|i| i.uid == identity.uid) {
            Some(existing) => {
                *existing = identity.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, uid: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let before = state.identities.len();
        state.identities.retain(|i| i.uid != uid);
        state.sessions.retain(|_, (owner, _)| *owner != uid);
        Ok(state.identities.len() != before)
    }

    async fn create_session(
        &self,
        token_hash: &str,
        uid: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        state.sessions.retain(|_, (_, expires)| *expires > now);
        state
            .sessions
            .insert(token_hash.to_string(), (uid, expires_at));
        Ok(())
    }

    async fn session_owner(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, StoreError> {
        let mut state = self.state.write().await;
        match state.sessions.get(token_hash).copied() {
            Some((uid, expires_at)) if expires_at > now => Ok(Some(uid)),
            Some(_) => {
                state.sessions.remove(token_hash);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete_session(&self, token_hash: &str) -> Result<(), StoreError> {
        self.state.write().await.sessions.remove(token_hash);
        Ok(())
    }
}

#[async_trait]
impl ActivityRepository for MemoryStore {
    async fn append(&self, entry: &ActivityEntry) -> Result<(), StoreError> {
        self.state.write().await.activity.push(entry.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ActivityEntry>, StoreError> {
        Ok(self.state.read().await.activity.iter().rev().cloned().collect())
    }
}
