use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::api::validation::not_blank;

use crate::api::job::models::FormFieldType;

/// Position of a candidate in the hiring funnel
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Applied,
    Shortlisted,
    Interview,
    Offer,
    Hired,
    Rejected,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Applied,
        Stage::Shortlisted,
        Stage::Interview,
        Stage::Offer,
        Stage::Hired,
        Stage::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Applied => "Applied",
            Stage::Shortlisted => "Shortlisted",
            Stage::Interview => "Interview",
            Stage::Offer => "Offer",
            Stage::Hired => "Hired",
            Stage::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    /// Accepts the canonical labels plus the older pipeline vocabulary
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "applied" => Ok(Stage::Applied),
            "shortlisted" | "qualified" => Ok(Stage::Shortlisted),
            "interview" | "phone screen" | "testing" => Ok(Stage::Interview),
            "offer" => Ok(Stage::Offer),
            "hired" => Ok(Stage::Hired),
            "rejected" => Ok(Stage::Rejected),
            _ => Err(format!(
                "Unknown stage \"{}\". Expected one of: {}",
                s,
                Stage::ALL.map(|stage| stage.as_str()).join(", ")
            )),
        }
    }
}

impl<'de> Deserialize<'de> for Stage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    #[default]
    Active,
    Rejected,
}

impl CandidateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateStatus::Active => "active",
            CandidateStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for CandidateStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(CandidateStatus::Active),
            "rejected" => Ok(CandidateStatus::Rejected),
            other => Err(format!("unknown candidate status: {}", other)),
        }
    }
}

/// Applicant's response to one job form field
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub label: String,
    #[serde(default)]
    pub input_type: FormFieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub school: String,
    pub field_of_study: String,
    pub degree: String,
    pub start_date: String,
    pub end_date: String,
}

impl Education {
    pub fn is_blank(&self) -> bool {
        [
            &self.school,
            &self.field_of_study,
            &self.degree,
            &self.start_date,
            &self.end_date,
        ]
        .iter()
        .all(|v| v.trim().is_empty())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub industry: String,
    pub summary: String,
    pub start_date: String,
    pub end_date: String,
}

impl Experience {
    pub fn is_blank(&self) -> bool {
        [
            &self.title,
            &self.company,
            &self.industry,
            &self.summary,
            &self.start_date,
            &self.end_date,
        ]
        .iter()
        .all(|v| v.trim().is_empty())
    }
}

/// What happened in a timeline entry
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimelineEvent {
    StageChange { stage: Stage },
    Comment { text: String },
    Email { subject: String, body: String },
    Reject { reason: String },
    UndoReject,
}

/// Append-only record of an action taken on a candidate
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TimelineEntry {
    #[serde(flatten)]
    pub event: TimelineEvent,
    pub admin: String,
    pub date: DateTime<Utc>,
}

impl TimelineEntry {
    pub fn new(event: TimelineEvent, admin: &str) -> Self {
        TimelineEntry {
            event,
            admin: admin.to_string(),
            date: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Comment {
    pub text: String,
    pub admin: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EmailLog {
    pub subject: String,
    pub body: String,
    pub admin: String,
    pub date: DateTime<Utc>,
}

/// A stored application
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub name: String,
    pub email: String,
    pub contact: String,
    pub headline: String,
    pub address: String,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub resume: Option<String>,
    pub profile_summary: String,
    pub cover_letter: String,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub answers: Vec<Answer>,
    pub stage: Stage,
    pub status: CandidateStatus,
    pub rejection_reason: Option<String>,
    pub rejected_by: Option<String>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub comments: Vec<Comment>,
    pub email_logs: Vec<EmailLog>,
    pub timeline: Vec<TimelineEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Candidate {
    /// Apply an update in memory the same way the database statement does
    pub fn apply(&mut self, update: &CandidateUpdate) {
        match update {
            CandidateUpdate::Stage { stage, entry } => {
                self.stage = *stage;
                self.timeline.push(entry.clone());
            }
            CandidateUpdate::Comment { comment, entry } => {
                self.comments.push(comment.clone());
                self.timeline.push(entry.clone());
            }
            CandidateUpdate::Reject { reason, by, at, entry } => {
                self.status = CandidateStatus::Rejected;
                self.rejection_reason = Some(reason.clone());
                self.rejected_by = Some(by.clone());
                self.rejected_at = Some(*at);
                self.timeline.push(entry.clone());
            }
            CandidateUpdate::UndoReject { entry } => {
                self.status = CandidateStatus::Active;
                self.rejection_reason = None;
                self.rejected_by = None;
                self.rejected_at = None;
                self.timeline.push(entry.clone());
            }
            CandidateUpdate::Email { log, entry } => {
                self.email_logs.push(log.clone());
                self.timeline.push(entry.clone());
            }
        }
        self.updated_at = Utc::now();
    }
}

/// Single-row write performed by a pipeline action
#[derive(Debug, Clone)]
pub enum CandidateUpdate {
    Stage {
        stage: Stage,
        entry: TimelineEntry,
    },
    Comment {
        comment: Comment,
        entry: TimelineEntry,
    },
    Reject {
        reason: String,
        by: String,
        at: DateTime<Utc>,
        entry: TimelineEntry,
    },
    UndoReject {
        entry: TimelineEntry,
    },
    Email {
        log: EmailLog,
        entry: TimelineEntry,
    },
}

/// Application submitted by a job seeker
#[derive(Deserialize, Serialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[validate(
        custom(function = "not_blank", message = "First name is required"),
        length(max = 100, message = "First name must be at most 100 characters")
    )]
    pub first_name: String,
    #[validate(
        custom(function = "not_blank", message = "Last name is required"),
        length(max = 100, message = "Last name must be at most 100 characters")
    )]
    pub last_name: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub resume: Option<String>,
    #[serde(default)]
    pub profile_summary: String,
    #[serde(default)]
    pub cover_letter: String,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

impl Application {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct StageChange {
    pub stage: Stage,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct CommentRequest {
    pub text: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct RejectRequest {
    pub reason: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CandidateFilter {
    pub job_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Applied", Stage::Applied)]
    #[case("shortlisted", Stage::Shortlisted)]
    #[case("Qualified", Stage::Shortlisted)]
    #[case("Phone Screen", Stage::Interview)]
    #[case("Testing", Stage::Interview)]
    #[case(" Hired ", Stage::Hired)]
    fn parses_stage_labels(#[case] raw: &str, #[case] expected: Stage) {
        assert_eq!(raw.parse::<Stage>().unwrap(), expected);
    }

    #[test]
    fn unknown_stage_lists_the_vocabulary() {
        let err = "Onboarding".parse::<Stage>().unwrap_err();
        assert!(err.contains("Applied, Shortlisted, Interview, Offer, Hired, Rejected"));
    }

    #[test]
    fn timeline_entry_serializes_with_type_tag() {
        let entry = TimelineEntry::new(
            TimelineEvent::StageChange {
                stage: Stage::Interview,
            },
            "Ada",
        );
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "stage_change");
        assert_eq!(value["stage"], "Interview");
        assert_eq!(value["admin"], "Ada");

        let undo = serde_json::to_value(TimelineEntry::new(TimelineEvent::UndoReject, "Ada")).unwrap();
        assert_eq!(undo["type"], "undo_reject");
    }

    #[test]
    fn blank_rows_are_detected() {
        assert!(Education::default().is_blank());
        let experience = Experience {
            company: "Acme".to_string(),
            ..Experience::default()
        };
        assert!(!experience.is_blank());
    }
}
