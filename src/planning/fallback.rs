//! Fixed fallback plan
//!
//! Used whenever generation is unavailable or produces nothing usable, so a
//! described assignment always ends up with a checklist.

use chrono::NaiveDate;

use super::DateWindow;
use crate::domain::GeneratedMilestone;

/// Phases of the fallback plan, in order
pub const FALLBACK_STEPS: [(&str, &str); 6] = [
    ("Research", "Gather sources and background material on the topic."),
    ("Outline", "Organize the main points and structure of the work."),
    ("Draft", "Write a complete first draft following the outline."),
    ("Review", "Revise the draft for content, argument and structure."),
    ("Proofread", "Check spelling, grammar, formatting and citations."),
    ("Submit", "Make final checks and submit before the deadline."),
];

/// Build the fallback plan
///
/// Each step depends on the one before it. With a known window the steps get
/// an even split of the days up to the due date; otherwise dates are left empty.
pub fn fallback_plan(window: Option<&DateWindow>, today: NaiveDate) -> Vec<GeneratedMilestone> {
    let ranges = window.map(|w| w.even_split(today, FALLBACK_STEPS.len()));

    FALLBACK_STEPS
        .iter()
        .enumerate()
        .map(|(idx, (title, description))| {
            let id = idx as u32 + 1;
            let (start, end) = match ranges.as_ref().and_then(|r| r.get(idx)) {
                Some((s, e)) => (s.to_string(), e.to_string()),
                None => (String::new(), String::new()),
            };
            GeneratedMilestone {
                id,
                title: title.to_string(),
                description: description.to_string(),
                suggested_start_date: start,
                suggested_end_date: end,
                dependencies: if id == 1 { Vec::new() } else { vec![id - 1] },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::compute_window;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 4, 1).unwrap()
    }

    #[test]
    fn test_six_chained_steps() {
        let plan = fallback_plan(None, today());
        let titles: Vec<&str> = plan.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Research", "Outline", "Draft", "Review", "Proofread", "Submit"]);

        assert!(plan[0].dependencies.is_empty());
        for pair in plan.windows(2) {
            assert_eq!(pair[1].dependencies, vec![pair[0].id]);
        }
        assert!(plan.iter().all(|m| m.suggested_start_date.is_empty()));
    }

    #[test]
    fn test_dates_follow_window() {
        let window = compute_window("2030-04-19", today()).unwrap();
        let plan = fallback_plan(Some(&window), today());

        assert_eq!(plan[0].suggested_start_date, "2030-04-01");
        assert_eq!(plan[5].suggested_end_date, "2030-04-19");
        for m in &plan {
            assert!(m.suggested_start_date <= m.suggested_end_date);
        }
    }

    #[test]
    fn test_display_text_includes_description() {
        let plan = fallback_plan(None, today());
        assert_eq!(
            plan[0].display_text(),
            "Research: Gather sources and background material on the topic."
        );
    }
}
