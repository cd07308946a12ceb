//! Assignment domain type
//!
//! An Assignment is the top-level work unit: a description, a deadline and
//! the ordered milestones that break it down.

use serde::{Deserialize, Serialize};

use super::milestone::{MilestoneDraft, MilestoneView};

/// A stored assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,

    /// Owner reference (opaque to this crate)
    pub owner: String,

    pub title: String,

    /// Free-text description, may be empty
    pub description: String,

    /// Calendar date as entered by the user
    pub deadline: String,

    /// Completion percentage (0-100), maintained by the service layer
    pub progress: u8,

    pub archived: bool,

    /// Creation timestamp (RFC 3339)
    pub created_at: String,
}

impl Assignment {
    /// Check if the description gives the generator anything to work with
    pub fn has_description(&self) -> bool {
        !self.description.trim().is_empty()
    }
}

/// Input for creating an assignment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewAssignment {
    pub owner: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub deadline: String,
    /// Explicit milestone list; takes precedence over generation
    #[serde(default)]
    pub milestones: Option<Vec<MilestoneDraft>>,
}

impl NewAssignment {
    pub fn new(owner: impl Into<String>, title: impl Into<String>, deadline: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            title: title.into(),
            deadline: deadline.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_milestones(mut self, milestones: Vec<MilestoneDraft>) -> Self {
        self.milestones = Some(milestones);
        self
    }
}

/// Partial update of an assignment
///
/// A supplied milestone list replaces the whole set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub milestones: Option<Vec<MilestoneDraft>>,
}

/// Where the milestones of a new assignment came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneSource {
    /// Supplied by the client
    Client,
    /// Produced by the generator
    Generated,
    /// Generic plan used after generation trouble
    Fallback,
    /// No description and no list, so nothing to plan
    None,
}

impl std::fmt::Display for MilestoneSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Client => write!(f, "client"),
            Self::Generated => write!(f, "generated"),
            Self::Fallback => write!(f, "fallback"),
            Self::None => write!(f, "none"),
        }
    }
}

/// An assignment together with its ordered milestones
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentDetail {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub milestones: Vec<MilestoneView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Assignment {
        Assignment {
            id: 1,
            owner: "alice".to_string(),
            title: "Essay".to_string(),
            description: "  ".to_string(),
            deadline: "2030-01-01".to_string(),
            progress: 0,
            archived: false,
            created_at: "2029-12-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_has_description() {
        let mut a = sample();
        assert!(!a.has_description());
        a.description = "Write 2000 words".to_string();
        assert!(a.has_description());
    }

    #[test]
    fn test_new_assignment_builder() {
        let input = NewAssignment::new("bob", "Lab report", "2030-02-02")
            .with_description("Chemistry lab")
            .with_milestones(vec![MilestoneDraft::new("Collect data")]);
        assert_eq!(input.owner, "bob");
        assert_eq!(input.description, "Chemistry lab");
        assert_eq!(input.milestones.unwrap().len(), 1);
    }

    #[test]
    fn test_new_assignment_deserialize_defaults() {
        let input: NewAssignment =
            serde_json::from_str(r#"{"owner": "o", "title": "t", "deadline": "2030-01-01"}"#).unwrap();
        assert!(input.description.is_empty());
        assert!(input.milestones.is_none());
    }

    #[test]
    fn test_milestone_source_display() {
        assert_eq!(MilestoneSource::Fallback.to_string(), "fallback");
        assert_eq!(MilestoneSource::Client.to_string(), "client");
    }

    #[test]
    fn test_detail_flattens_assignment() {
        let detail = AssignmentDetail {
            assignment: sample(),
            milestones: vec![],
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["title"], "Essay");
        assert!(json["milestones"].as_array().unwrap().is_empty());
    }
}
