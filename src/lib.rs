//! assignplan - assignment milestone planner
//!
//! Turns a free-text assignment description and a deadline into an ordered,
//! actionable checklist, and keeps that checklist's order consistent through
//! later edits.
//!
//! # Modules
//!
//! - [`planning`] - decomposition pipeline (window, prompt, parse, normalize, fallback)
//! - [`llm`] - text-generation boundary and Anthropic implementation
//! - [`ordering`] - permutation checks and order repair
//! - [`state`] - SQLite store behind an actor
//! - [`service`] - assignment lifecycle
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod llm;
pub mod ordering;
pub mod planning;
pub mod service;
pub mod state;

// Re-export commonly used types
pub use config::{Config, LlmConfig, PlannerConfig, StorageConfig};
pub use domain::{
    Assignment, AssignmentDetail, AssignmentUpdate, GeneratedMilestone, Milestone, MilestoneDraft, MilestonePatch,
    MilestoneSource, MilestoneView, NewAssignment, ReorderAck, ReorderRequest,
};
pub use llm::{AnthropicClient, LlmError, MockGenerator, MockReply, TextGenerator};
pub use ordering::{OrderMismatch, repair_orders, validate_permutation};
pub use planning::{Decomposer, DecomposerConfig, FallbackReason, PlanOutcome, PlanningError};
pub use service::{AssignmentService, CreatedAssignment, ServiceError};
pub use state::{StateError, StateManager};
