use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::activity::models::ActorSnapshot;
use crate::api::user::models::{Role, User};

/// Credential record held by the identity store
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub uid: Uuid,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub password_salt: String,
    pub created_at: DateTime<Utc>,
}

/// Resolved caller of a request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub uid: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Actor {
    pub fn guest() -> Self {
        Actor {
            uid: None,
            name: String::new(),
            email: String::new(),
            role: Role::Guest,
        }
    }

    pub fn from_user(user: &User) -> Self {
        Actor {
            uid: Some(user.uid),
            name: user.display_name(),
            email: user.email.clone(),
            role: user.role,
        }
    }

    pub fn is_guest(&self) -> bool {
        self.role == Role::Guest
    }

    /// Name written into timeline entries
    pub fn admin_name(&self) -> String {
        if self.name.trim().is_empty() {
            "Admin".to_string()
        } else {
            self.name.clone()
        }
    }

    pub fn snapshot(&self) -> ActorSnapshot {
        ActorSnapshot {
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Serialize, Debug)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}
