//! StateManager - actor that owns the Store
//!
//! Processes commands via channels for thread-safe access to persistent state.
//! Commands run one at a time, so concurrent edits to the same assignment
//! resolve as last-writer-wins.

use std::path::Path;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use super::messages::{AssignmentFilter, NewAssignmentRecord, StateCommand, StateError, StateResponse};
use super::store::Store;
use crate::domain::{Assignment, AssignmentUpdate, Milestone, MilestonePatch};

/// Handle to send commands to the StateManager
#[derive(Clone)]
pub struct StateManager {
    tx: mpsc::Sender<StateCommand>,
}

impl StateManager {
    /// Spawn a new StateManager actor backed by a database file
    pub fn spawn(store_path: impl AsRef<Path>) -> eyre::Result<Self> {
        debug!(store_path = %store_path.as_ref().display(), "spawn: called");
        let store = Store::open(store_path.as_ref())?;
        Ok(Self::with_store(store))
    }

    /// Spawn a StateManager over an in-memory database
    pub fn spawn_in_memory() -> eyre::Result<Self> {
        debug!("spawn_in_memory: called");
        Ok(Self::with_store(Store::open_in_memory()?))
    }

    fn with_store(store: Store) -> Self {
        let (tx, rx) = mpsc::channel(256);
        tokio::spawn(actor_loop(store, rx));
        info!("StateManager spawned");
        Self { tx }
    }

    /// Send one command and wait for its reply
    async fn call<T>(&self, make: impl FnOnce(oneshot::Sender<StateResponse<T>>) -> StateCommand) -> StateResponse<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| StateError::ChannelError)?;
        reply_rx.await.map_err(|_| StateError::ChannelError)?
    }

    // === Assignment operations ===

    /// Insert an assignment and bulk-assign its milestones atomically
    pub async fn create_assignment(&self, record: NewAssignmentRecord) -> StateResponse<i64> {
        debug!(owner = %record.owner, "create_assignment: called");
        self.call(|reply| StateCommand::CreateAssignment { record, reply }).await
    }

    pub async fn get_assignment(&self, id: i64) -> StateResponse<Option<Assignment>> {
        debug!(%id, "get_assignment: called");
        self.call(|reply| StateCommand::GetAssignment { id, reply }).await
    }

    pub async fn list_assignments(&self, filter: AssignmentFilter) -> StateResponse<Vec<Assignment>> {
        debug!(?filter, "list_assignments: called");
        self.call(|reply| StateCommand::ListAssignments { filter, reply }).await
    }

    /// Patch fields; a milestone list bulk-replaces the set in the same transaction
    pub async fn update_assignment(&self, id: i64, update: AssignmentUpdate) -> StateResponse<()> {
        debug!(%id, "update_assignment: called");
        self.call(|reply| StateCommand::UpdateAssignment { id, update, reply })
            .await
    }

    pub async fn delete_assignment(&self, id: i64) -> StateResponse<()> {
        debug!(%id, "delete_assignment: called");
        self.call(|reply| StateCommand::DeleteAssignment { id, reply }).await
    }

    pub async fn set_archived(&self, id: i64, archived: bool) -> StateResponse<()> {
        debug!(%id, archived, "set_archived: called");
        self.call(|reply| StateCommand::SetArchived { id, archived, reply })
            .await
    }

    // === Milestone operations ===

    pub async fn list_milestones(&self, assignment_id: i64) -> StateResponse<Vec<Milestone>> {
        debug!(%assignment_id, "list_milestones: called");
        self.call(|reply| StateCommand::ListMilestones { assignment_id, reply })
            .await
    }

    pub async fn patch_milestone(&self, id: i64, patch: MilestonePatch) -> StateResponse<Milestone> {
        debug!(%id, "patch_milestone: called");
        self.call(|reply| StateCommand::PatchMilestone { id, patch, reply })
            .await
    }

    pub async fn reorder_milestones(&self, assignment_id: i64, order: Vec<i64>) -> StateResponse<()> {
        debug!(%assignment_id, count = order.len(), "reorder_milestones: called");
        self.call(|reply| StateCommand::ReorderMilestones {
            assignment_id,
            order,
            reply,
        })
        .await
    }

    pub async fn repair_order(&self, assignment_id: i64) -> StateResponse<usize> {
        debug!(%assignment_id, "repair_order: called");
        self.call(|reply| StateCommand::RepairOrder { assignment_id, reply })
            .await
    }

    /// Shutdown the StateManager
    pub async fn shutdown(&self) -> Result<(), StateError> {
        debug!("shutdown: called");
        self.tx
            .send(StateCommand::Shutdown)
            .await
            .map_err(|_| StateError::ChannelError)
    }
}

/// The actor loop that processes commands
async fn actor_loop(mut store: Store, mut rx: mpsc::Receiver<StateCommand>) {
    debug!("StateManager actor started");

    while let Some(cmd) = rx.recv().await {
        match cmd {
            StateCommand::CreateAssignment { record, reply } => {
                let _ = reply.send(store.create_assignment(&record));
            }
            StateCommand::GetAssignment { id, reply } => {
                let _ = reply.send(store.get_assignment(id));
            }
            StateCommand::ListAssignments { filter, reply } => {
                let _ = reply.send(store.list_assignments(&filter));
            }
            StateCommand::UpdateAssignment { id, update, reply } => {
                let _ = reply.send(store.update_assignment(id, &update));
            }
            StateCommand::DeleteAssignment { id, reply } => {
                let _ = reply.send(store.delete_assignment(id));
            }
            StateCommand::SetArchived { id, archived, reply } => {
                let _ = reply.send(store.set_archived(id, archived));
            }
            StateCommand::ListMilestones { assignment_id, reply } => {
                let _ = reply.send(store.list_milestones(assignment_id));
            }
            StateCommand::PatchMilestone { id, patch, reply } => {
                let _ = reply.send(store.patch_milestone(id, &patch));
            }
            StateCommand::ReorderMilestones {
                assignment_id,
                order,
                reply,
            } => {
                let _ = reply.send(store.reorder_milestones(assignment_id, &order));
            }
            StateCommand::RepairOrder { assignment_id, reply } => {
                let _ = reply.send(store.repair_order(assignment_id));
            }
            StateCommand::Shutdown => {
                info!("StateManager shutting down");
                break;
            }
        }
    }

    debug!("StateManager actor stopped");
}
