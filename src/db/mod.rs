pub mod activity_repository;
pub mod candidate_repository;
pub mod connection;
pub mod identity_repository;
pub mod job_repository;
#[cfg(test)]
pub mod memory;
pub mod migrations;
pub mod models;
pub mod user_repository;

use std::sync::Arc;
use sqlx::{Pool, Postgres};

pub use activity_repository::{ActivityRepository, PgActivityRepository};
pub use candidate_repository::{CandidateRepository, PgCandidateRepository};
pub use identity_repository::{IdentityRepository, PgIdentityRepository};
pub use job_repository::{JobRepository, PgJobRepository};
#[cfg(test)]
pub use memory::MemoryStore;
pub use user_repository::{PgUserRepository, UserRepository};

/// Errors raised by repository implementations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Query or connection failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Another identity already owns this email
    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    /// A stored row could not be mapped back into its model
    #[error("corrupt {entity} record {id}: {message}")]
    Decode {
        entity: &'static str,
        id: String,
        message: String,
    },
}

impl StoreError {
    pub fn decode(entity: &'static str, id: impl ToString, message: impl Into<String>) -> Self {
        StoreError::Decode {
            entity,
            id: id.to_string(),
            message: message.into(),
        }
    }
}

/// Postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION)
}

/// Every repository the services depend on
#[derive(Clone)]
pub struct Repositories {
    pub jobs: Arc<dyn JobRepository>,
    pub candidates: Arc<dyn CandidateRepository>,
    pub users: Arc<dyn UserRepository>,
    pub identities: Arc<dyn IdentityRepository>,
    pub activity: Arc<dyn ActivityRepository>,
}

impl Repositories {
    /// Repositories backed by PostgreSQL
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Repositories {
            jobs: Arc::new(PgJobRepository::new(pool.clone())),
            candidates: Arc::new(PgCandidateRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
            identities: Arc::new(PgIdentityRepository::new(pool.clone())),
            activity: Arc::new(PgActivityRepository::new(pool)),
        }
    }

    /// Repositories sharing one in-process store
    #[cfg(test)]
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::default());
        Repositories {
            jobs: store.clone(),
            candidates: store.clone(),
            users: store.clone(),
            identities: store.clone(),
            activity: store,
        }
    }
}
