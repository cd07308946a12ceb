//! Decomposer - turns an assignment description into milestones
//!
//! Runs the whole pipeline: window, prompt, one generation call, parse,
//! normalize. Any generation-side failure becomes a fallback plan, so only
//! input validation errors reach the caller.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{
    DateWindow, NormalizedMilestone, PlanningError, PromptBuilder, SYSTEM_PROMPT, compute_window, extract_json_array,
    fallback_plan, normalize,
};
use crate::config::Config;
use crate::domain::{GeneratedMilestone, MilestoneDraft};
use crate::llm::{CompletionRequest, LlmError, TextGenerator};

/// Configuration for decomposition
#[derive(Debug, Clone)]
pub struct DecomposerConfig {
    pub min_milestones: u32,
    pub max_milestones: u32,
    /// Upper bound on the single generation call
    pub timeout: Duration,
    pub max_tokens: u32,
}

impl Default for DecomposerConfig {
    fn default() -> Self {
        Self {
            min_milestones: 4,
            max_milestones: 6,
            timeout: Duration::from_millis(90_000),
            max_tokens: 4096,
        }
    }
}

impl From<&Config> for DecomposerConfig {
    fn from(config: &Config) -> Self {
        Self {
            min_milestones: config.planner.min_milestones,
            max_milestones: config.planner.max_milestones,
            timeout: config.planner.generation_timeout(),
            max_tokens: config.llm.max_tokens,
        }
    }
}

/// Why the fallback plan was used
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    GenerationUnavailable(String),
    GenerationFailed(String),
    GenerationEmpty,
    MalformedGeneration(String),
    NoMilestones,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::GenerationUnavailable(why) => write!(f, "generation unavailable: {}", why),
            FallbackReason::GenerationFailed(why) => write!(f, "generation failed: {}", why),
            FallbackReason::GenerationEmpty => write!(f, "generation returned no content"),
            FallbackReason::MalformedGeneration(why) => write!(f, "malformed generation: {}", why),
            FallbackReason::NoMilestones => write!(f, "generation produced no milestones"),
        }
    }
}

/// Result of one decomposition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PlanOutcome {
    Generated {
        milestones: Vec<NormalizedMilestone>,
    },
    Fallback {
        milestones: Vec<GeneratedMilestone>,
        reason: FallbackReason,
    },
}

impl PlanOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, PlanOutcome::Fallback { .. })
    }

    /// Milestones in checklist order
    pub fn milestones(&self) -> Vec<&GeneratedMilestone> {
        match self {
            PlanOutcome::Generated { milestones } => milestones.iter().map(|m| &m.milestone).collect(),
            PlanOutcome::Fallback { milestones, .. } => milestones.iter().collect(),
        }
    }

    /// Project into insertable drafts, all incomplete
    pub fn into_drafts(self) -> Vec<MilestoneDraft> {
        match self {
            PlanOutcome::Generated { milestones } => milestones.iter().map(|m| m.milestone.to_draft()).collect(),
            PlanOutcome::Fallback { milestones, .. } => milestones.iter().map(GeneratedMilestone::to_draft).collect(),
        }
    }
}

/// Decomposer runs the milestone pipeline for one assignment at a time
pub struct Decomposer {
    generator: Option<Arc<dyn TextGenerator>>,
    prompts: PromptBuilder,
    config: DecomposerConfig,
}

impl Decomposer {
    /// Create a decomposer; without a generator every call falls back
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, config: DecomposerConfig) -> Self {
        let prompts = PromptBuilder::new(config.min_milestones, config.max_milestones);
        Self {
            generator,
            prompts,
            config,
        }
    }

    /// Decompose an assignment into milestones
    ///
    /// Makes at most one generation call and never retries.
    pub async fn decompose(
        &self,
        description: &str,
        due_date: &str,
        today: NaiveDate,
    ) -> Result<PlanOutcome, PlanningError> {
        debug!(description_len = description.len(), %due_date, %today, "decompose: called");
        if description.trim().is_empty() {
            return Err(PlanningError::EmptyDescription);
        }
        let window = compute_window(due_date, today)?;

        let text = match self.generate(description, &window).await {
            Ok(text) => text,
            Err(reason) => return Ok(self.fall_back(&window, today, reason)),
        };

        let raw = match extract_json_array(&text) {
            Ok(raw) => raw,
            Err(e) => {
                let detail = match e {
                    PlanningError::MalformedGeneration(detail) => detail,
                    other => other.to_string(),
                };
                return Ok(self.fall_back(&window, today, FallbackReason::MalformedGeneration(detail)));
            }
        };

        let milestones = normalize(&raw);
        if milestones.is_empty() {
            return Ok(self.fall_back(&window, today, FallbackReason::NoMilestones));
        }

        let repaired = milestones.iter().filter(|m| !m.defects.is_empty()).count();
        info!(count = milestones.len(), repaired, "Generated milestones");
        Ok(PlanOutcome::Generated { milestones })
    }

    /// The single outbound call, bounded by the configured timeout
    async fn generate(&self, description: &str, window: &DateWindow) -> Result<String, FallbackReason> {
        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| FallbackReason::GenerationUnavailable("no generator configured".to_string()))?;

        let prompt = self
            .prompts
            .build(description, &window.due_date.to_string(), window.total_days)
            .map_err(|e| FallbackReason::GenerationFailed(e.to_string()))?;
        let request = CompletionRequest::single(SYSTEM_PROMPT, prompt, self.config.max_tokens);

        let result = match tokio::time::timeout(self.config.timeout, generator.generate(request)).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(self.config.timeout)),
        };

        match result {
            Ok(text) if text.trim().is_empty() => Err(FallbackReason::GenerationEmpty),
            Ok(text) => Ok(text),
            Err(e) if e.is_call_failure() => Err(FallbackReason::GenerationFailed(e.to_string())),
            Err(LlmError::Unavailable(why)) => Err(FallbackReason::GenerationUnavailable(why)),
            Err(_) => Err(FallbackReason::GenerationEmpty),
        }
    }

    fn fall_back(&self, window: &DateWindow, today: NaiveDate, reason: FallbackReason) -> PlanOutcome {
        warn!(%reason, "Using fallback milestone plan");
        PlanOutcome::Fallback {
            milestones: fallback_plan(Some(window), today),
            reason,
        }
    }
}
