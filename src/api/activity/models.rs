use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Job,
    Candidate,
    User,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Job => "job",
            EntityType::Candidate => "candidate",
            EntityType::User => "user",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "job" => Ok(EntityType::Job),
            "candidate" => Ok(EntityType::Candidate),
            // older entries were written against the employees collection
            "user" | "employee" => Ok(EntityType::User),
            other => Err(format!("unknown entity type: {}", other)),
        }
    }
}

/// Name/email snapshot of whoever performed an action
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct ActorSnapshot {
    pub name: String,
    pub email: String,
}

fn default_action_label() -> String {
    "created".to_string()
}

/// Activity entry as submitted for appending
#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    #[serde(default)]
    pub actor: ActorSnapshot,
    #[validate(length(min = 1, message = "entityId is required"))]
    pub entity_id: String,
    pub entity_type: EntityType,
    #[serde(default)]
    pub entity_name: String,
    #[serde(default = "default_action_label")]
    pub action_label: String,
}

/// Stored activity entry
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: Uuid,
    pub actor: ActorSnapshot,
    pub entity_id: String,
    pub entity_type: EntityType,
    pub entity_name: String,
    pub action_label: String,
    pub timestamp: DateTime<Utc>,
}

/// Live state of the record an entry points at: `title` for jobs, `name` for
/// candidates and users, `label` once the record is gone
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct EntityRef {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl EntityRef {
    pub fn available(entity_type: EntityType, display: impl Into<String>) -> Self {
        let display = Some(display.into());
        let (title, name) = match entity_type {
            EntityType::Job => (display, None),
            EntityType::Candidate | EntityType::User => (None, display),
        };
        EntityRef {
            available: true,
            title,
            name,
            label: None,
        }
    }

    pub fn unavailable(entity_type: EntityType) -> Self {
        let label = match entity_type {
            EntityType::Job => "Job unavailable",
            EntityType::Candidate => "Candidate unavailable",
            EntityType::User => "User unavailable",
        };
        EntityRef {
            available: false,
            title: None,
            name: None,
            label: Some(label.to_string()),
        }
    }
}

/// Activity entry joined against the live record it refers to
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ActivityView {
    #[serde(flatten)]
    pub entry: ActivityEntry,
    pub entity: EntityRef,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entity_refs_use_title_for_jobs_and_name_otherwise() {
        assert_eq!(
            serde_json::to_value(EntityRef::available(EntityType::Job, "QA Lead")).unwrap(),
            json!({ "available": true, "title": "QA Lead" })
        );
        assert_eq!(
            serde_json::to_value(EntityRef::available(EntityType::User, "Alan Turing")).unwrap(),
            json!({ "available": true, "name": "Alan Turing" })
        );
        assert_eq!(
            serde_json::to_value(EntityRef::unavailable(EntityType::Candidate)).unwrap(),
            json!({ "available": false, "label": "Candidate unavailable" })
        );
    }
}
