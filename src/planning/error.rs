//! Planning error types

use thiserror::Error;

/// Errors raised by the decomposition pipeline
///
/// The first four are input validation failures and surface to the caller.
/// `MalformedGeneration` is absorbed by the decomposer and turned into a
/// fallback plan.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanningError {
    #[error("Description cannot be empty")]
    EmptyDescription,

    #[error("Invalid date '{0}'. Use YYYY-MM-DD, YYYY/MM/DD, DD/MM/YYYY or MM/DD/YYYY")]
    InvalidDate(String),

    #[error("Due date {0} is in the past")]
    PastDeadline(String),

    #[error("Due date {due_date} leaves {total_days} day(s); at least 1 is needed")]
    WindowTooShort { due_date: String, total_days: i64 },

    #[error("Generator output is not a JSON array: {0}")]
    MalformedGeneration(String),
}

impl PlanningError {
    /// Check if this error should be reported to the client as bad input
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PlanningError::EmptyDescription
                | PlanningError::InvalidDate(_)
                | PlanningError::PastDeadline(_)
                | PlanningError::WindowTooShort { .. }
        )
    }
}
