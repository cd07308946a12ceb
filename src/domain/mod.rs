//! Domain types for assignplan
//!
//! Core domain types: Assignment, Milestone and the transient
//! GeneratedMilestone produced by the decomposition pipeline.

mod assignment;
mod milestone;

pub use assignment::{Assignment, AssignmentDetail, AssignmentUpdate, MilestoneSource, NewAssignment};
pub use milestone::{
    DESCRIPTION_PREVIEW_CHARS, GeneratedMilestone, Milestone, MilestoneDraft, MilestonePatch, MilestoneView,
    ReorderAck, ReorderRequest, progress_percent,
};
