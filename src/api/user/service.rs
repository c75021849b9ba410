use std::sync::Arc;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::activity::models::EntityType;
use crate::api::activity::ActivityService;
use crate::api::auth::models::Identity;
use crate::api::auth::password::{generate_salt, hash_password};
use crate::api::auth::service::normalize_email;
use crate::api::auth::Actor;
use crate::api::error::ServiceError;
use crate::db::{IdentityRepository, UserRepository};
use super::models::{CreateUserRequest, Role, UpdateUserRequest, User, display_name};

const MIN_PASSWORD_LEN: usize = 6;

/// User administration over the identity store and the profile documents
///
/// Identity and profile writes are separate statements; a failure between
/// them leaves the two out of step.
pub struct UserService {
    identities: Arc<dyn IdentityRepository>,
    users: Arc<dyn UserRepository>,
    activity: Arc<ActivityService>,
}

impl UserService {
    pub fn new(
        identities: Arc<dyn IdentityRepository>,
        users: Arc<dyn UserRepository>,
        activity: Arc<ActivityService>,
    ) -> Self {
        Self {
            identities,
            users,
            activity,
        }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ServiceError> {
        let users = self.users.list().await?;
        info!("Service: Listing {} users", users.len());
        Ok(users)
    }

    pub async fn get_user(&self, uid: Uuid) -> Result<User, ServiceError> {
        self.users
            .find(uid)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", uid))
    }

    /// Create an identity and its profile; returns the new uid
    pub async fn create_user(&self, actor: &Actor, request: CreateUserRequest) -> Result<Uuid, ServiceError> {
        let (email, password) = match (non_empty(request.email), non_empty(request.password)) {
            (Some(email), Some(password)) => (normalize_email(&email), password),
            _ => {
                return Err(ServiceError::ValidationError(
                    "Request body is missing data.".to_string(),
                ))
            }
        };
        check_password(&password)?;
        let role = stored_role(request.role)?;

        let first_name = request.first_name.unwrap_or_default();
        let last_name = request.last_name.unwrap_or_default();
        let now = Utc::now();
        let salt = generate_salt();
        let identity = Identity {
            uid: Uuid::new_v4(),
            email: email.clone(),
            display_name: display_name(&first_name, &last_name),
            password_hash: hash_password(&password, &salt),
            password_salt: salt,
            created_at: now,
        };
        self.identities.create(&identity).await?;

        let user = User {
            uid: identity.uid,
            first_name,
            last_name,
            email,
            role,
            department: request.department.unwrap_or_default(),
            created_at: now,
        };
        self.users.upsert(&user).await?;

        self.activity
            .record(actor.snapshot(), EntityType::User, user.uid, &label(&user), "created")
            .await;

        info!("Service: User {} created with role {}", user.uid, user.role);
        Ok(user.uid)
    }

    /// Apply the fields present in `request` to the identity and the profile
    pub async fn update_user(&self, actor: &Actor, request: UpdateUserRequest) -> Result<(), ServiceError> {
        let uid = request
            .uid
            .ok_or_else(|| ServiceError::ValidationError("UID is required".to_string()))?;

        let mut identity = self.identities.find(uid).await?.ok_or_else(|| {
            warn!("Service: Update for unknown identity {}", uid);
            ServiceError::NotFound("User not found in Auth".to_string())
        })?;

        let email = non_empty(request.email.clone()).map(|e| normalize_email(&e));
        if let Some(email) = &email {
            if let Some(owner) = self.identities.find_by_email(email).await? {
                if owner.uid != uid {
                    return Err(ServiceError::Conflict(
                        "Email already in use by another user.".to_string(),
                    ));
                }
            }
        }
        if let Some(role) = request.role {
            stored_role(Some(role))?;
        }

        let mut identity_changed = false;
        if let Some(email) = &email {
            identity.email = email.clone();
            identity_changed = true;
        }
        if let Some(password) = non_empty(request.password) {
            check_password(&password)?;
            let salt = generate_salt();
            identity.password_hash = hash_password(&password, &salt);
            identity.password_salt = salt;
            identity_changed = true;
        }
        let has_first = non_empty(request.first_name.clone()).is_some();
        let has_last = non_empty(request.last_name.clone()).is_some();
        if has_first || has_last {
            identity.display_name = display_name(
                request.first_name.as_deref().unwrap_or_default(),
                request.last_name.as_deref().unwrap_or_default(),
            );
            identity_changed = true;
        }
        if identity_changed {
            self.identities.update(&identity).await?;
        }

        let mut user = match self.users.find(uid).await? {
            Some(user) => user,
            None => User {
                uid,
                first_name: String::new(),
                last_name: String::new(),
                email: identity.email.clone(),
                role: Role::default(),
                department: String::new(),
                created_at: Utc::now(),
            },
        };
        if let Some(first_name) = request.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = request.last_name {
            user.last_name = last_name;
        }
        if let Some(email) = email {
            user.email = email;
        }
        if let Some(role) = request.role {
            user.role = role;
        }
        if let Some(department) = request.department {
            user.department = department;
        }
        self.users.upsert(&user).await?;

        self.activity
            .record(actor.snapshot(), EntityType::User, uid, &label(&user), "updated")
            .await;

        info!("Service: User {} updated", uid);
        Ok(())
    }

    /// Remove the profile, then the identity and its sessions
    pub async fn delete_user(&self, actor: &Actor, uid: Option<Uuid>) -> Result<(), ServiceError> {
        let uid = uid.ok_or_else(|| ServiceError::ValidationError("UID is required".to_string()))?;

        let name = match self.users.find(uid).await? {
            Some(user) => label(&user),
            None => uid.to_string(),
        };

        self.users.delete(uid).await?;
        if !self.identities.delete(uid).await? {
            warn!("Service: Delete for unknown identity {}", uid);
            return Err(ServiceError::NotFound("User not found in Auth".to_string()));
        }

        self.activity
            .record(actor.snapshot(), EntityType::User, uid, &name, "deleted")
            .await;

        info!("Service: User {} deleted", uid);
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn check_password(password: &str) -> Result<(), ServiceError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::ValidationError(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Stored profiles are admins or super-admins
fn stored_role(role: Option<Role>) -> Result<Role, ServiceError> {
    match role.unwrap_or_default() {
        Role::Guest => Err(ServiceError::ValidationError(
            "Role must be admin or super-admin".to_string(),
        )),
        role => Ok(role),
    }
}

fn label(user: &User) -> String {
    let name = user.display_name();
    if name.is_empty() {
        user.email.clone()
    } else {
        name
    }
}
