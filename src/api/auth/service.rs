use std::sync::Arc;
use chrono::{Duration, Utc};
use tracing::{info, warn};

use crate::api::error::ServiceError;
use crate::db::{IdentityRepository, UserRepository};
use super::models::{Actor, LoginResponse};
use super::password::{hash_token, new_session_token, verify_password};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Sign-in, sign-out and mapping of bearer tokens to actors
pub struct AuthService {
    identities: Arc<dyn IdentityRepository>,
    users: Arc<dyn UserRepository>,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(
        identities: Arc<dyn IdentityRepository>,
        users: Arc<dyn UserRepository>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            identities,
            users,
            session_ttl,
        }
    }

    /// Check credentials and open a session
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ServiceError> {
        let email = normalize_email(email);
        info!("Service: Login attempt for {}", email);

        let identity = match self.identities.find_by_email(&email).await? {
            Some(identity) => identity,
            None => {
                warn!("Service: Login failed, unknown email {}", email);
                return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
        };

        if !verify_password(password, &identity.password_salt, &identity.password_hash) {
            warn!("Service: Login failed, wrong password for uid={}", identity.uid);
            return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let user = self.users.find(identity.uid).await?.ok_or_else(|| {
            ServiceError::Forbidden("This account has no user profile".to_string())
        })?;

        let token = new_session_token();
        let expires_at = Utc::now() + self.session_ttl;
        self.identities
            .create_session(&hash_token(&token), identity.uid, expires_at)
            .await?;

        info!("Service: uid={} signed in as {}", user.uid, user.role);
        Ok(LoginResponse { token, user })
    }

    pub async fn logout(&self, token: &str) -> Result<(), ServiceError> {
        self.identities.delete_session(&hash_token(token)).await?;
        Ok(())
    }

    /// Actor for a bearer token; unknown, expired or orphaned tokens map to a guest
    pub async fn resolve(&self, token: Option<&str>) -> Result<Actor, ServiceError> {
        let Some(token) = token else {
            return Ok(Actor::guest());
        };

        let Some(uid) = self
            .identities
            .session_owner(&hash_token(token), Utc::now())
            .await?
        else {
            return Ok(Actor::guest());
        };

        Ok(self
            .users
            .find(uid)
            .await?
            .map(|user| Actor::from_user(&user))
            .unwrap_or_else(Actor::guest))
    }
}

/// Emails are compared case-insensitively
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    use crate::api::auth::models::Identity;
    use crate::api::auth::password::{generate_salt, hash_password};
    use crate::api::user::models::{Role, User};
    use crate::db::MemoryStore;

    async fn store_with_admin() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::default());
        let salt = generate_salt();
        let identity = Identity {
            uid: Uuid::new_v4(),
            email: "grace@example.com".to_string(),
            display_name: "Grace Hopper".to_string(),
            password_hash: hash_password("cobol-1959", &salt),
            password_salt: salt,
            created_at: Utc::now(),
        };
        IdentityRepository::create(&*store, &identity).await.unwrap();
        UserRepository::upsert(
            &*store,
            &User {
                uid: identity.uid,
                first_name: "Grace".to_string(),
                last_name: "Hopper".to_string(),
                email: identity.email.clone(),
                role: Role::Admin,
                department: "Engineering".to_string(),
                created_at: Utc::now(),
            },
        )
        .await
        .unwrap();
        store
    }

    #[actix_web::test]
    async fn live_sessions_resolve_to_their_user() {
        let store = store_with_admin().await;
        let auth = AuthService::new(store.clone(), store.clone(), Duration::hours(1));

        let login = auth.login(" Grace@Example.com ", "cobol-1959").await.unwrap();
        let actor = auth.resolve(Some(&login.token)).await.unwrap();
        assert_eq!(actor.role, Role::Admin);
        assert_eq!(actor.email, "grace@example.com");
        assert_eq!(store.session_count().await, 1);
    }

    #[actix_web::test]
    async fn expired_sessions_resolve_to_guest_and_are_removed() {
        let store = store_with_admin().await;
        let auth = AuthService::new(store.clone(), store.clone(), Duration::hours(-1));

        let first = auth.login("grace@example.com", "cobol-1959").await.unwrap();
        let second = auth.login("grace@example.com", "cobol-1959").await.unwrap();
        // Opening the second session pruned the first, already expired one
        assert_eq!(store.session_count().await, 1);

        let actor = auth.resolve(Some(&second.token)).await.unwrap();
        assert_eq!(actor.role, Role::Guest);
        assert_eq!(store.session_count().await, 0);

        let actor = auth.resolve(Some(&first.token)).await.unwrap();
        assert_eq!(actor.role, Role::Guest);
    }
}
