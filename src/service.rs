//! AssignmentService - assignment lifecycle on top of the pipeline and store
//!
//! Decides where a new assignment's milestones come from (client list,
//! generator, fallback, or nothing) and routes every later change through
//! the StateManager.

use chrono::{Local, NaiveDate};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{
    Assignment, AssignmentDetail, AssignmentUpdate, Milestone, MilestonePatch, MilestoneSource, MilestoneView,
    NewAssignment, ReorderAck, ReorderRequest,
};
use crate::planning::{Decomposer, FallbackReason, PlanOutcome, PlanningError, compute_window, parse_due_date};
use crate::state::{AssignmentFilter, NewAssignmentRecord, StateError, StateManager};

/// Errors surfaced to callers of the service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Planning(#[from] PlanningError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("Invalid input: {0}")]
    Validation(String),
}

impl ServiceError {
    /// Check if the caller sent something unacceptable (a 400, not a 500)
    pub fn is_client_error(&self) -> bool {
        match self {
            ServiceError::Planning(e) => e.is_input_error(),
            ServiceError::State(StateError::OrderMismatch(_)) => true,
            ServiceError::Validation(_) => true,
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::State(StateError::NotFound(_)))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// A freshly created assignment and how its milestones were chosen
#[derive(Debug, Clone, Serialize)]
pub struct CreatedAssignment {
    #[serde(flatten)]
    pub detail: AssignmentDetail,
    pub source: MilestoneSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
}

/// Assignment lifecycle operations
pub struct AssignmentService {
    state: StateManager,
    decomposer: Decomposer,
}

impl AssignmentService {
    pub fn new(state: StateManager, decomposer: Decomposer) -> Self {
        Self { state, decomposer }
    }

    /// Create an assignment, dating the window from the local calendar
    pub async fn create(&self, input: NewAssignment) -> ServiceResult<CreatedAssignment> {
        self.create_at(input, Local::now().date_naive()).await
    }

    /// Create an assignment relative to `today`
    ///
    /// A client-supplied list always wins. Otherwise a non-empty description
    /// goes through the decomposer; an empty one yields no milestones and no
    /// generation call. Generation trouble never fails creation.
    pub async fn create_at(&self, input: NewAssignment, today: NaiveDate) -> ServiceResult<CreatedAssignment> {
        debug!(owner = %input.owner, %today, "create_at: called");
        let title = input.title.trim();
        if title.is_empty() {
            return Err(ServiceError::Validation("title must not be empty".to_string()));
        }
        compute_window(&input.deadline, today)?;

        let (drafts, source, fallback_reason) = match input.milestones {
            Some(drafts) => (drafts, MilestoneSource::Client, None),
            None if !input.description.trim().is_empty() => {
                let outcome = self.decomposer.decompose(&input.description, &input.deadline, today).await?;
                let reason = match &outcome {
                    PlanOutcome::Fallback { reason, .. } => Some(reason.clone()),
                    PlanOutcome::Generated { .. } => None,
                };
                let source = if reason.is_some() {
                    MilestoneSource::Fallback
                } else {
                    MilestoneSource::Generated
                };
                (outcome.into_drafts(), source, reason)
            }
            None => (Vec::new(), MilestoneSource::None, None),
        };

        let record = NewAssignmentRecord {
            owner: input.owner,
            title: title.to_string(),
            description: input.description,
            deadline: input.deadline.trim().to_string(),
            milestones: drafts,
        };
        let id = self.state.create_assignment(record).await?;
        info!(%id, %source, "Created assignment");

        Ok(CreatedAssignment {
            detail: self.get(id).await?,
            source,
            fallback_reason,
        })
    }

    /// Preview a decomposition without storing anything
    ///
    /// A blank description is rejected before any generation call.
    pub async fn split(&self, description: &str, due_date: &str, today: NaiveDate) -> ServiceResult<PlanOutcome> {
        debug!(%due_date, "split: called");
        Ok(self.decomposer.decompose(description, due_date, today).await?)
    }

    /// Fetch an assignment with its ordered milestones
    pub async fn get(&self, id: i64) -> ServiceResult<AssignmentDetail> {
        let assignment = self
            .state
            .get_assignment(id)
            .await?
            .ok_or_else(|| StateError::NotFound(format!("assignment {}", id)))?;
        let milestones = self.state.list_milestones(id).await?;
        Ok(AssignmentDetail {
            assignment,
            milestones: milestones.iter().map(MilestoneView::from).collect(),
        })
    }

    pub async fn list(&self, owner: Option<String>, archived: Option<bool>) -> ServiceResult<Vec<Assignment>> {
        Ok(self.state.list_assignments(AssignmentFilter { owner, archived }).await?)
    }

    /// Patch assignment fields; a supplied milestone list replaces the set
    pub async fn update(&self, id: i64, update: AssignmentUpdate) -> ServiceResult<AssignmentDetail> {
        debug!(%id, "update: called");
        if update.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(ServiceError::Validation("title must not be empty".to_string()));
        }
        if let Some(deadline) = &update.deadline {
            parse_due_date(deadline)?;
        }
        self.state.update_assignment(id, update).await?;
        self.get(id).await
    }

    /// Update one milestone's text or completion
    ///
    /// The owning assignment's progress is recomputed in the same transaction.
    pub async fn patch_milestone(&self, id: i64, patch: MilestonePatch) -> ServiceResult<Milestone> {
        debug!(%id, "patch_milestone: called");
        if patch.is_empty() {
            return Err(ServiceError::Validation("nothing to update".to_string()));
        }
        if patch.text.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(ServiceError::Validation("milestone text must not be empty".to_string()));
        }
        Ok(self.state.patch_milestone(id, patch).await?)
    }

    /// Apply a full permutation of the assignment's milestone ids
    pub async fn reorder(&self, assignment_id: i64, request: ReorderRequest) -> ServiceResult<ReorderAck> {
        debug!(%assignment_id, "reorder: called");
        self.state.reorder_milestones(assignment_id, request.order).await?;
        info!(%assignment_id, "Milestones reordered successfully");
        Ok(ReorderAck::ok())
    }

    /// Renumber orders to `0..n`; returns how many milestones moved
    pub async fn repair(&self, assignment_id: i64) -> ServiceResult<usize> {
        Ok(self.state.repair_order(assignment_id).await?)
    }

    pub async fn archive(&self, id: i64, archived: bool) -> ServiceResult<()> {
        Ok(self.state.set_archived(id, archived).await?)
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        self.state.delete_assignment(id).await?;
        info!(%id, "Deleted assignment");
        Ok(())
    }
}
