//! Goal records: time-scoped units of intent.
//!
//! A [`Goal`] lives in exactly one period bucket at one granularity and
//! carries two mirrored adjacency sets: `parent_links` (ids of goals one
//! granularity coarser it contributes to, serialized as `linkedGoalIds`) and
//! `child_links` (ids of goals one granularity finer contributing to it,
//! serialized as `childGoalIds`). The serialized field names match the
//! planner document shape, so exports from older builds import unchanged.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::academics::ChapterId;
use crate::period::Granularity;

/// Unique string identifier for a goal.
///
/// Generated ids are 128 random bits in lowercase hex. Imported documents may
/// carry arbitrary non-empty strings; uniqueness is enforced by the engine at
/// creation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalId(String);

impl GoalId {
    /// Wrap an existing identifier.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        let bytes: [u8; 16] = rand::thread_rng().r#gen();
        let mut hex = String::with_capacity(32);
        for b in bytes {
            hex.push_str(&format!("{b:02x}"));
        }
        Self(hex)
    }

    /// The underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GoalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GoalId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// A unit of intent scoped to one time period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    /// Unique identifier.
    pub id: GoalId,
    /// Non-empty display title.
    pub title: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Time-bucket size (document field `type`).
    #[serde(rename = "type")]
    pub granularity: Granularity,
    /// Canonical period identifier this goal belongs to.
    pub period_id: String,
    /// Completion percentage, 0..=100. Derived for goals with children.
    pub progress: u8,
    /// Optional resource URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_url: Option<String>,
    /// Ids of goals one granularity coarser that this goal contributes to.
    #[serde(rename = "linkedGoalIds", default)]
    pub parent_links: Vec<GoalId>,
    /// Ids of goals one granularity finer that contribute to this goal.
    #[serde(rename = "childGoalIds", default)]
    pub child_links: Vec<GoalId>,
    /// Loose reference to an academic chapter; never owned, never validated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_chapter_id: Option<ChapterId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Display rank within the (granularity, periodId) bucket.
    pub order: u32,
}

impl Goal {
    /// Whether this goal has no children (progress is directly settable).
    pub fn is_leaf(&self) -> bool {
        self.child_links.is_empty()
    }

    /// Whether this goal contributes to at least one coarser goal.
    pub fn has_parents(&self) -> bool {
        !self.parent_links.is_empty()
    }
}

/// Caller-supplied fields for goal creation.
///
/// Identifier, progress, link sets, order, and timestamps are assigned by the
/// engine.
#[derive(Debug, Clone)]
pub struct GoalDraft {
    pub title: String,
    pub description: String,
    pub granularity: Granularity,
    pub period_id: String,
    pub resource_url: Option<String>,
    pub class_chapter_id: Option<ChapterId>,
}

impl GoalDraft {
    /// Draft with just a title, granularity and period; the rest empty.
    pub fn new(title: impl Into<String>, granularity: Granularity, period_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            granularity,
            period_id: period_id.into(),
            resource_url: None,
            class_chapter_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_hex_and_distinct() {
        let a = GoalId::generate();
        let b = GoalId::generate();
        assert_eq!(a.as_str().len(), 32);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn goal_serializes_with_document_field_names() {
        let goal = Goal {
            id: GoalId::new("g1"),
            title: "Read chapter 4".into(),
            description: String::new(),
            granularity: Granularity::Daily,
            period_id: "2024-06-12".into(),
            progress: 25,
            resource_url: None,
            parent_links: vec![GoalId::new("w1")],
            child_links: Vec::new(),
            class_chapter_id: None,
            created_at: DateTime::UNIX_EPOCH,
            updated_at: DateTime::UNIX_EPOCH,
            order: 0,
        };
        let json = serde_json::to_value(&goal).unwrap();
        assert_eq!(json["type"], "daily");
        assert_eq!(json["periodId"], "2024-06-12");
        assert_eq!(json["linkedGoalIds"][0], "w1");
        assert_eq!(json["childGoalIds"].as_array().unwrap().len(), 0);
        // Optional references are omitted entirely when unset.
        assert!(json.get("resourceUrl").is_none());
        assert!(json.get("classChapterId").is_none());
    }

    #[test]
    fn goal_deserializes_with_missing_optional_fields() {
        let json = r#"{
            "id": "g1",
            "title": "t",
            "type": "weekly",
            "periodId": "2024-W24",
            "progress": 0,
            "createdAt": "2024-06-10T00:00:00Z",
            "updatedAt": "2024-06-10T00:00:00Z",
            "order": 0
        }"#;
        let goal: Goal = serde_json::from_str(json).unwrap();
        assert_eq!(goal.granularity, Granularity::Weekly);
        assert!(goal.description.is_empty());
        assert!(goal.parent_links.is_empty());
        assert!(goal.child_links.is_empty());
        assert!(goal.is_leaf());
    }
}
