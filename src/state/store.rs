//! SQLite store for assignments and milestones
//!
//! Owned by the StateManager actor; nothing else touches the connection.
//! Every change to one assignment's milestone set runs in a single transaction.

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, Transaction, params};
use tracing::{debug, info};

use super::messages::{AssignmentFilter, NewAssignmentRecord, StateError, StateResponse};
use crate::domain::{Assignment, AssignmentUpdate, Milestone, MilestoneDraft, MilestonePatch};
use crate::ordering::{assign_positions, repair_orders, validate_permutation};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS assignments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    deadline TEXT NOT NULL,
    progress INTEGER NOT NULL DEFAULT 0,
    archived INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS milestones (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    assignment_id INTEGER NOT NULL,
    text TEXT NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    position INTEGER NOT NULL,
    FOREIGN KEY (assignment_id) REFERENCES assignments(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_milestones_assignment
    ON milestones(assignment_id, position);

CREATE INDEX IF NOT EXISTS idx_assignments_owner
    ON assignments(owner, archived);
";

const ASSIGNMENT_COLUMNS: &str = "id, owner, title, description, deadline, progress, archived, created_at";
const MILESTONE_COLUMNS: &str = "id, assignment_id, text, completed, position";

/// Persistent storage backed by one SQLite connection
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database file, creating parent directories
    pub fn open(path: impl AsRef<Path>) -> StateResponse<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Store::open: called");
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| StateError::Store(format!("Failed to create {}: {}", parent.display(), e)))?;
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open a throwaway in-memory database
    pub fn open_in_memory() -> StateResponse<Self> {
        debug!("Store::open_in_memory: called");
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StateResponse<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.execute_batch(SCHEMA)?;
        info!("Store schema ready");
        Ok(Self { conn })
    }

    // === Assignments ===

    /// Insert an assignment and its milestones together
    pub fn create_assignment(&mut self, record: &NewAssignmentRecord) -> StateResponse<i64> {
        debug!(owner = %record.owner, milestone_count = record.milestones.len(), "create_assignment: called");
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO assignments (owner, title, description, deadline, progress, archived, created_at)
             VALUES (?1, ?2, ?3, ?4, 0, 0, ?5)",
            params![
                record.owner,
                record.title,
                record.description,
                record.deadline,
                Utc::now().to_rfc3339()
            ],
        )?;
        let id = tx.last_insert_rowid();
        assign_milestones(&tx, id, &record.milestones)?;
        tx.commit()?;
        Ok(id)
    }

    pub fn get_assignment(&self, id: i64) -> StateResponse<Option<Assignment>> {
        let sql = format!("SELECT {} FROM assignments WHERE id = ?1", ASSIGNMENT_COLUMNS);
        Ok(self.conn.query_row(&sql, params![id], assignment_from_row).optional()?)
    }

    /// List assignments, newest first
    pub fn list_assignments(&self, filter: &AssignmentFilter) -> StateResponse<Vec<Assignment>> {
        debug!(?filter, "list_assignments: called");
        let sql = format!(
            "SELECT {} FROM assignments
             WHERE (?1 IS NULL OR owner = ?1) AND (?2 IS NULL OR archived = ?2)
             ORDER BY created_at DESC, id DESC",
            ASSIGNMENT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![filter.owner, filter.archived], assignment_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Apply field changes; a milestone list replaces the whole set
    pub fn update_assignment(&mut self, id: i64, update: &AssignmentUpdate) -> StateResponse<()> {
        debug!(%id, replace_milestones = update.milestones.is_some(), "update_assignment: called");
        let tx = self.conn.transaction()?;
        ensure_assignment(&tx, id)?;
        tx.execute(
            "UPDATE assignments SET
                title = COALESCE(?2, title),
                description = COALESCE(?3, description),
                deadline = COALESCE(?4, deadline)
             WHERE id = ?1",
            params![id, update.title, update.description, update.deadline],
        )?;
        if let Some(drafts) = &update.milestones {
            assign_milestones(&tx, id, drafts)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Delete an assignment; its milestones go with it
    pub fn delete_assignment(&mut self, id: i64) -> StateResponse<()> {
        debug!(%id, "delete_assignment: called");
        let deleted = self.conn.execute("DELETE FROM assignments WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StateError::NotFound(format!("assignment {}", id)));
        }
        Ok(())
    }

    pub fn set_archived(&mut self, id: i64, archived: bool) -> StateResponse<()> {
        debug!(%id, archived, "set_archived: called");
        let changed = self
            .conn
            .execute("UPDATE assignments SET archived = ?2 WHERE id = ?1", params![id, archived])?;
        if changed == 0 {
            return Err(StateError::NotFound(format!("assignment {}", id)));
        }
        Ok(())
    }

    // === Milestones ===

    /// Milestones of one assignment in checklist order
    pub fn list_milestones(&self, assignment_id: i64) -> StateResponse<Vec<Milestone>> {
        select_milestones(&self.conn, assignment_id)
    }

    /// Change text and/or completion; order and owner stay put
    pub fn patch_milestone(&mut self, id: i64, patch: &MilestonePatch) -> StateResponse<Milestone> {
        debug!(%id, ?patch, "patch_milestone: called");
        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "UPDATE milestones SET
                text = COALESCE(?2, text),
                completed = COALESCE(?3, completed)
             WHERE id = ?1",
            params![id, patch.text, patch.completed],
        )?;
        if changed == 0 {
            return Err(StateError::NotFound(format!("milestone {}", id)));
        }
        let sql = format!("SELECT {} FROM milestones WHERE id = ?1", MILESTONE_COLUMNS);
        let milestone = tx.query_row(&sql, params![id], milestone_from_row)?;
        write_progress(&tx, milestone.assignment_id)?;
        tx.commit()?;
        Ok(milestone)
    }

    /// Set order = position for each id in `order`
    ///
    /// Rejects anything that is not a permutation of the current ids; nothing
    /// is written in that case.
    pub fn reorder_milestones(&mut self, assignment_id: i64, order: &[i64]) -> StateResponse<()> {
        debug!(%assignment_id, ?order, "reorder_milestones: called");
        let tx = self.conn.transaction()?;
        ensure_assignment(&tx, assignment_id)?;
        let current: Vec<i64> = select_milestones(&tx, assignment_id)?.iter().map(|m| m.id).collect();
        validate_permutation(&current, order)?;

        for (id, position) in assign_positions(order) {
            tx.execute(
                "UPDATE milestones SET position = ?3 WHERE id = ?1 AND assignment_id = ?2",
                params![id, assignment_id, position],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Renumber orders to `0..n`; returns how many rows moved
    pub fn repair_order(&mut self, assignment_id: i64) -> StateResponse<usize> {
        debug!(%assignment_id, "repair_order: called");
        let tx = self.conn.transaction()?;
        ensure_assignment(&tx, assignment_id)?;
        let entries: Vec<(i64, u32)> = select_milestones(&tx, assignment_id)?
            .iter()
            .map(|m| (m.id, m.order))
            .collect();
        let changed = repair_orders(&entries);
        for (id, position) in &changed {
            tx.execute("UPDATE milestones SET position = ?2 WHERE id = ?1", params![id, position])?;
        }
        tx.commit()?;
        if !changed.is_empty() {
            info!(%assignment_id, moved = changed.len(), "Repaired milestone order");
        }
        Ok(changed.len())
    }

    /// Write a raw order value, bypassing the permutation rules
    #[cfg(test)]
    pub(crate) fn force_order(&mut self, milestone_id: i64, position: u32) -> StateResponse<()> {
        self.conn.execute(
            "UPDATE milestones SET position = ?2 WHERE id = ?1",
            params![milestone_id, position],
        )?;
        Ok(())
    }
}

fn ensure_assignment(conn: &Connection, id: i64) -> StateResponse<()> {
    let found: Option<i64> = conn
        .query_row("SELECT id FROM assignments WHERE id = ?1", params![id], |row| row.get(0))
        .optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(StateError::NotFound(format!("assignment {}", id))),
    }
}

/// Bulk assign: drop the current set, insert `drafts` with order = index,
/// then refresh progress. Runs inside the caller's transaction.
fn assign_milestones(tx: &Transaction<'_>, assignment_id: i64, drafts: &[MilestoneDraft]) -> StateResponse<()> {
    debug!(%assignment_id, count = drafts.len(), "assign_milestones: called");
    tx.execute("DELETE FROM milestones WHERE assignment_id = ?1", params![assignment_id])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO milestones (assignment_id, text, completed, position) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (position, draft) in drafts.iter().enumerate() {
            stmt.execute(params![assignment_id, draft.text, draft.completed, position as u32])?;
        }
    }
    write_progress(tx, assignment_id)
}

fn select_milestones(conn: &Connection, assignment_id: i64) -> StateResponse<Vec<Milestone>> {
    let sql = format!(
        "SELECT {} FROM milestones WHERE assignment_id = ?1 ORDER BY position, id",
        MILESTONE_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![assignment_id], milestone_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Recompute the stored progress from the current milestone set
fn write_progress(conn: &Connection, assignment_id: i64) -> StateResponse<()> {
    let milestones = select_milestones(conn, assignment_id)?;
    let progress = crate::domain::progress_percent(&milestones);
    conn.execute(
        "UPDATE assignments SET progress = ?2 WHERE id = ?1",
        params![assignment_id, progress],
    )?;
    Ok(())
}

fn assignment_from_row(row: &Row<'_>) -> rusqlite::Result<Assignment> {
    Ok(Assignment {
        id: row.get(0)?,
        owner: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        deadline: row.get(4)?,
        progress: row.get(5)?,
        archived: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn milestone_from_row(row: &Row<'_>) -> rusqlite::Result<Milestone> {
    Ok(Milestone {
        id: row.get(0)?,
        assignment_id: row.get(1)?,
        text: row.get(2)?,
        completed: row.get(3)?,
        order: row.get(4)?,
    })
}
