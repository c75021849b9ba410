use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Access level of a caller
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Guest,
    #[default]
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Admin => "admin",
            Role::SuperAdmin => "super-admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "guest" => Ok(Role::Guest),
            "admin" => Ok(Role::Admin),
            "super-admin" => Ok(Role::SuperAdmin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Internal account profile; credentials live in the identity store
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub department: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn display_name(&self) -> String {
        display_name(&self.first_name, &self.last_name)
    }
}

/// `"{first} {last}"` with surrounding whitespace removed
pub fn display_name(first: &str, last: &str) -> String {
    format!("{} {}", first, last).trim().to_string()
}

/// Body of `createUserByAdmin`
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
    pub department: Option<String>,
}

/// Body of `updateUserByAdmin`; only present fields are written
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub uid: Option<Uuid>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
    pub department: Option<String>,
}

/// Body of `deleteUserByAdmin`
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct DeleteUserRequest {
    pub uid: Option<Uuid>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CreatedUid {
    pub uid: Uuid,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub fn ok() -> Self {
        Success { success: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_use_hyphenated_wire_names() {
        assert_eq!(serde_json::to_value(Role::SuperAdmin).unwrap(), "super-admin");
        assert_eq!("super-admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert!(Role::SuperAdmin.is_admin());
        assert!(!Role::Guest.is_admin());
    }

    #[test]
    fn display_name_trims_missing_parts() {
        assert_eq!(display_name("", "Hopper"), "Hopper");
        assert_eq!(display_name("Grace", ""), "Grace");
        assert_eq!(display_name("", ""), "");
    }
}
