//! Milestone domain types
//!
//! A Milestone is one ordered checklist step of an Assignment. A
//! GeneratedMilestone is the richer transient record produced by the
//! decomposition pipeline before it is projected into display text.

use serde::{Deserialize, Serialize};

/// Longest description fragment embedded in milestone display text
pub const DESCRIPTION_PREVIEW_CHARS: usize = 120;

/// A persisted checklist step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: i64,

    /// Owning assignment; immutable after insert
    pub assignment_id: i64,

    /// Display text (title, optionally followed by a truncated description)
    pub text: String,

    pub completed: bool,

    /// Position within the assignment, always one of `0..n`
    pub order: u32,
}

/// Client-facing projection of a Milestone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneView {
    pub id: i64,
    pub text: String,
    pub completed: bool,
    pub order: u32,
}

impl From<&Milestone> for MilestoneView {
    fn from(m: &Milestone) -> Self {
        Self {
            id: m.id,
            text: m.text.clone(),
            completed: m.completed,
            order: m.order,
        }
    }
}

/// A milestone about to be inserted; its order comes from list position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneDraft {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl MilestoneDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            completed: false,
        }
    }
}

/// Point update of one milestone
///
/// Only text and completion can change here; order and owner cannot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestonePatch {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl MilestonePatch {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.completed.is_none()
    }
}

/// Reorder request body: a permutation of the assignment's milestone ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub order: Vec<i64>,
}

/// Reorder acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderAck {
    pub status: String,
}

impl ReorderAck {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Milestone as produced by the generator (or the fallback plan)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedMilestone {
    /// 1-based id within the batch
    pub id: u32,
    pub title: String,
    pub description: String,
    pub suggested_start_date: String,
    pub suggested_end_date: String,
    /// Ids of other milestones in the same batch
    pub dependencies: Vec<u32>,
}

impl GeneratedMilestone {
    /// Text shown in the checklist: the title, then a description preview
    pub fn display_text(&self) -> String {
        let description = self.description.trim();
        if description.is_empty() {
            return self.title.clone();
        }

        let mut preview: String = description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
        if description.chars().count() > DESCRIPTION_PREVIEW_CHARS {
            preview = preview.trim_end().to_string();
            preview.push('…');
        }
        format!("{}: {}", self.title, preview)
    }

    pub fn to_draft(&self) -> MilestoneDraft {
        MilestoneDraft::new(self.display_text())
    }
}

/// Percentage of completed milestones, rounded down
///
/// An empty set is 0% done.
pub fn progress_percent(milestones: &[Milestone]) -> u8 {
    if milestones.is_empty() {
        return 0;
    }
    let done = milestones.iter().filter(|m| m.completed).count();
    ((done * 100) / milestones.len()) as u8
}
