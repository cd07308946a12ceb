//! Due-date parsing and planning window

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use super::PlanningError;

/// Accepted due-date layouts, tried in order; the first match wins
pub const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y"];

/// Validated due date and the number of whole days until it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub due_date: NaiveDate,
    /// Informational planning horizon; the generator may ignore it
    pub total_days: i64,
}

impl DateWindow {
    /// Split the window into `parts` consecutive date ranges
    ///
    /// Days are shared out evenly from `today`; earlier parts absorb the
    /// remainder. No range extends past the due date, and the last one ends
    /// on it. Windows shorter than `parts` days pile the tail onto the due date.
    pub fn even_split(&self, today: NaiveDate, parts: usize) -> Vec<(NaiveDate, NaiveDate)> {
        if parts == 0 {
            return Vec::new();
        }
        let total = self.total_days.max(parts as i64);
        let base = total / parts as i64;
        let extra = total % parts as i64;

        let mut ranges = Vec::with_capacity(parts);
        let mut start = today;
        for idx in 0..parts as i64 {
            let len = base + i64::from(idx < extra);
            let end = start + chrono::Days::new((len - 1).max(0) as u64);
            ranges.push((start.min(self.due_date), end.min(self.due_date)));
            start = end + chrono::Days::new(1);
        }
        if let Some(last) = ranges.last_mut() {
            last.1 = self.due_date;
        }
        ranges
    }
}

/// Parse a due-date string in any of the accepted layouts
pub fn parse_due_date(input: &str) -> Result<NaiveDate, PlanningError> {
    let trimmed = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| PlanningError::InvalidDate(trimmed.to_string()))
}

/// Compute the planning window for a due date relative to `today`
pub fn compute_window(due_date: &str, today: NaiveDate) -> Result<DateWindow, PlanningError> {
    debug!(%due_date, %today, "compute_window: called");
    let due = parse_due_date(due_date)?;

    if due < today {
        return Err(PlanningError::PastDeadline(due.to_string()));
    }

    let total_days = (due - today).num_days();
    if total_days < 1 {
        return Err(PlanningError::WindowTooShort {
            due_date: due.to_string(),
            total_days,
        });
    }

    Ok(DateWindow {
        due_date: due,
        total_days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_all_formats_agree() {
        let today = date(2030, 3, 1);
        for input in ["2030-03-25", "2030/03/25", "25/03/2030", "03/25/2030"] {
            let window = compute_window(input, today).unwrap();
            assert_eq!(window.due_date, date(2030, 3, 25), "{}", input);
            assert_eq!(window.total_days, 24, "{}", input);
        }
    }

    #[test]
    fn test_first_matching_format_wins() {
        // 04/05/2030 is valid as DD/MM and MM/DD; DD/MM is tried first
        assert_eq!(parse_due_date("04/05/2030").unwrap(), date(2030, 5, 4));
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        assert_eq!(parse_due_date("  2030-01-02\n").unwrap(), date(2030, 1, 2));
    }

    #[test]
    fn test_invalid_date() {
        let today = date(2030, 1, 1);
        assert!(matches!(compute_window("next friday", today), Err(PlanningError::InvalidDate(_))));
        assert!(matches!(compute_window("2030-02-30", today), Err(PlanningError::InvalidDate(_))));
        assert!(matches!(compute_window("", today), Err(PlanningError::InvalidDate(_))));
    }

    #[test]
    fn test_past_deadline() {
        let today = date(2030, 1, 10);
        assert_eq!(
            compute_window("2030-01-09", today),
            Err(PlanningError::PastDeadline("2030-01-09".to_string()))
        );
    }

    #[test]
    fn test_due_today_is_too_short() {
        let today = date(2030, 1, 10);
        assert_eq!(
            compute_window("2030-01-10", today),
            Err(PlanningError::WindowTooShort {
                due_date: "2030-01-10".to_string(),
                total_days: 0
            })
        );
    }

    #[test]
    fn test_tomorrow_is_one_day() {
        let window = compute_window("2030-01-11", date(2030, 1, 10)).unwrap();
        assert_eq!(window.total_days, 1);
    }

    #[test]
    fn test_even_split_covers_window() {
        let today = date(2030, 1, 1);
        let window = compute_window("2030-01-13", today).unwrap();
        let ranges = window.even_split(today, 6);

        assert_eq!(ranges.len(), 6);
        assert_eq!(ranges[0].0, today);
        assert_eq!(ranges[5].1, window.due_date);
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].1 + chrono::Days::new(1), pair[1].0);
        }
    }

    #[test]
    fn test_even_split_short_window() {
        let today = date(2030, 1, 1);
        let window = compute_window("2030-01-03", today).unwrap();
        let ranges = window.even_split(today, 6);

        assert_eq!(ranges.len(), 6);
        for (start, end) in &ranges {
            assert!(start <= end);
            assert!(*end <= window.due_date);
        }
        assert_eq!(ranges[5], (window.due_date, window.due_date));
    }
}
