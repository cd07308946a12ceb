//! Milestone prompt rendering
//!
//! Renders the embedded decomposition template with Handlebars. Rendering is
//! pure: the same inputs always produce the same prompt.

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

/// System prompt sent alongside every decomposition request
pub const SYSTEM_PROMPT: &str = "You are an expert task-analysis researcher. Always output valid JSON only.";

/// Fewest milestones any prompt asks for
pub const MIN_MILESTONES: u32 = 4;

/// Most milestones any prompt asks for
pub const MAX_MILESTONES: u32 = 6;

/// Decomposition template
const MILESTONE_TEMPLATE: &str = r#"You are an expert task-analysis researcher. Break down this assignment into {{min_milestones}}-{{max_milestones}} actionable milestones.

Assignment: {{description}}
Due Date: {{due_date}}
Total Days: {{total_days}}

Output ONLY a JSON array with this structure:
[
  {
    "id": 1,
    "title": "Milestone Title",
    "description": "What needs to be done in this milestone (2-4 sentences).",
    "suggested_start_date": "YYYY-MM-DD",
    "suggested_end_date": "YYYY-MM-DD",
    "dependencies": []
  }
]

Requirements:
- {{min_milestones}}-{{max_milestones}} milestones only
- Each milestone should be actionable and specific
- Distribute days evenly across milestones
- First milestone has no dependencies, every later milestone depends on the previous one
- Include: research, planning, drafting, revision, submission phases

Output JSON only, no other text."#;

/// Values substituted into the template
#[derive(Debug, Clone, Serialize)]
struct PromptContext<'a> {
    description: &'a str,
    due_date: &'a str,
    total_days: i64,
    min_milestones: u32,
    max_milestones: u32,
}

/// Builds the decomposition prompt
pub struct PromptBuilder {
    hbs: Handlebars<'static>,
    min_milestones: u32,
    max_milestones: u32,
}

impl PromptBuilder {
    /// Create a builder asking for between `min` and `max` milestones
    ///
    /// Both bounds are clamped to `MIN_MILESTONES..=MAX_MILESTONES`, so
    /// configuration can narrow the range but never widen it.
    pub fn new(min_milestones: u32, max_milestones: u32) -> Self {
        let mut hbs = Handlebars::new();
        // The description goes in verbatim; HTML escaping would mangle quotes
        hbs.register_escape_fn(handlebars::no_escape);
        let min = min_milestones.clamp(MIN_MILESTONES, MAX_MILESTONES);
        let max = max_milestones.clamp(MIN_MILESTONES, MAX_MILESTONES);
        Self {
            hbs,
            min_milestones: min.min(max),
            max_milestones: max.max(min),
        }
    }

    /// Render the prompt for one assignment
    pub fn build(&self, description: &str, due_date: &str, total_days: i64) -> Result<String> {
        debug!(description_len = description.len(), %due_date, total_days, "build: called");
        let context = PromptContext {
            description: description.trim(),
            due_date: due_date.trim(),
            total_days,
            min_milestones: self.min_milestones,
            max_milestones: self.max_milestones,
        };

        self.hbs
            .render_template(MILESTONE_TEMPLATE, &context)
            .map_err(|e| eyre!("Failed to render milestone prompt: {}", e))
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(MIN_MILESTONES, MAX_MILESTONES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_inputs() {
        let prompt = PromptBuilder::default()
            .build("Write a 3000-word paper on AI", "2030-05-01", 30)
            .unwrap();

        assert!(prompt.contains("Assignment: Write a 3000-word paper on AI"));
        assert!(prompt.contains("Due Date: 2030-05-01"));
        assert!(prompt.contains("Total Days: 30"));
    }

    #[test]
    fn test_prompt_requests_four_to_six() {
        let prompt = PromptBuilder::default().build("x", "2030-05-01", 3).unwrap();
        assert!(prompt.contains("into 4-6 actionable milestones"));
        assert!(prompt.contains("- 4-6 milestones only"));
    }

    #[test]
    fn test_prompt_specifies_schema() {
        let prompt = PromptBuilder::default().build("x", "2030-05-01", 3).unwrap();
        for key in [
            "\"id\"",
            "\"title\"",
            "\"description\"",
            "\"suggested_start_date\"",
            "\"suggested_end_date\"",
            "\"dependencies\"",
        ] {
            assert!(prompt.contains(key), "missing {}", key);
        }
        assert!(prompt.contains("Output ONLY a JSON array"));
        assert!(prompt.contains("First milestone has no dependencies"));
        assert!(prompt.ends_with("Output JSON only, no other text."));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let builder = PromptBuilder::default();
        let a = builder.build("Essay on \"rivers\" & <lakes>", "2030-05-01", 12).unwrap();
        let b = builder.build("Essay on \"rivers\" & <lakes>", "2030-05-01", 12).unwrap();
        assert_eq!(a, b);
        // No HTML escaping
        assert!(a.contains("Essay on \"rivers\" & <lakes>"));
    }

    #[test]
    fn test_inverted_bounds_are_normalized() {
        let prompt = PromptBuilder::new(6, 4).build("x", "2030-05-01", 3).unwrap();
        assert!(prompt.contains("4-6 milestones only"));
    }

    #[test]
    fn test_bounds_clamped_to_four_to_six() {
        let prompt = PromptBuilder::new(3, 8).build("x", "2030-05-01", 3).unwrap();
        assert!(prompt.contains("into 4-6 actionable milestones"));
        assert!(prompt.contains("- 4-6 milestones only"));

        let prompt = PromptBuilder::new(1, 2).build("x", "2030-05-01", 3).unwrap();
        assert!(prompt.contains("- 4-4 milestones only"));

        let prompt = PromptBuilder::new(5, 5).build("x", "2030-05-01", 3).unwrap();
        assert!(prompt.contains("- 5-5 milestones only"));
    }
}
