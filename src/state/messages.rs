//! State manager messages
//!
//! Commands and responses for the actor pattern.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::oneshot;

use crate::domain::{Assignment, AssignmentUpdate, Milestone, MilestoneDraft, MilestonePatch};
use crate::ordering::OrderMismatch;

/// Errors from state operations
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    OrderMismatch(#[from] OrderMismatch),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Channel error")]
    ChannelError,
}

impl From<rusqlite::Error> for StateError {
    fn from(e: rusqlite::Error) -> Self {
        StateError::Store(e.to_string())
    }
}

/// Response from state operations
pub type StateResponse<T> = Result<T, StateError>;

/// Everything needed to insert an assignment with its milestones
#[derive(Debug, Clone)]
pub struct NewAssignmentRecord {
    pub owner: String,
    pub title: String,
    pub description: String,
    pub deadline: String,
    pub milestones: Vec<MilestoneDraft>,
}

/// Filters for listing assignments; `None` matches anything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentFilter {
    pub owner: Option<String>,
    pub archived: Option<bool>,
}

/// Commands sent to the StateManager actor
#[derive(Debug)]
pub enum StateCommand {
    // Assignment operations
    CreateAssignment {
        record: NewAssignmentRecord,
        reply: oneshot::Sender<StateResponse<i64>>,
    },
    GetAssignment {
        id: i64,
        reply: oneshot::Sender<StateResponse<Option<Assignment>>>,
    },
    ListAssignments {
        filter: AssignmentFilter,
        reply: oneshot::Sender<StateResponse<Vec<Assignment>>>,
    },
    UpdateAssignment {
        id: i64,
        update: AssignmentUpdate,
        reply: oneshot::Sender<StateResponse<()>>,
    },
    DeleteAssignment {
        id: i64,
        reply: oneshot::Sender<StateResponse<()>>,
    },
    SetArchived {
        id: i64,
        archived: bool,
        reply: oneshot::Sender<StateResponse<()>>,
    },

    // Milestone operations
    ListMilestones {
        assignment_id: i64,
        reply: oneshot::Sender<StateResponse<Vec<Milestone>>>,
    },
    PatchMilestone {
        id: i64,
        patch: MilestonePatch,
        reply: oneshot::Sender<StateResponse<Milestone>>,
    },
    ReorderMilestones {
        assignment_id: i64,
        order: Vec<i64>,
        reply: oneshot::Sender<StateResponse<()>>,
    },
    RepairOrder {
        assignment_id: i64,
        reply: oneshot::Sender<StateResponse<usize>>,
    },

    // Shutdown
    Shutdown,
}
