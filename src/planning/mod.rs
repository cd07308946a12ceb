//! Planning module - milestone decomposition pipeline
//!
//! ```text
//! due date → DateWindow ─┐
//! description ───────────┴→ PromptBuilder → TextGenerator
//!                                                 ↓
//!        PlanOutcome ← MilestoneNormalizer ← ResponseParser
//!             ↑
//!        FallbackPlanner (on any generation-side failure)
//! ```
//!
//! The Decomposer drives the pipeline and is the only piece that talks to
//! the generator.

mod decomposer;
mod error;
mod fallback;
mod normalizer;
mod parser;
mod prompt;
mod window;

pub use decomposer::{Decomposer, DecomposerConfig, FallbackReason, PlanOutcome};
pub use error::PlanningError;
pub use fallback::{FALLBACK_STEPS, fallback_plan};
pub use normalizer::{DefectKind, FieldDefect, NormalizedMilestone, ValidatedEntry, normalize, validate_entry};
pub use parser::{balanced_array_span, extract_json_array};
pub use prompt::{MAX_MILESTONES, MIN_MILESTONES, PromptBuilder, SYSTEM_PROMPT};
pub use window::{DATE_FORMATS, DateWindow, compute_window, parse_due_date};
