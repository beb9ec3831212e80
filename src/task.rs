//! Task data structure and the typed field patch.
//!
//! This module defines the core `Task` struct representing a single ticket
//! on the schedule, plus `TaskPatch`, the fixed-shape partial update the
//! store's `update_task` accepts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A schedulable ticket with hierarchy and timing metadata.
///
/// Tasks form a forest via `parent`. A task with children is a *container*:
/// its `start`/`due` are derived from its children by rollup and any direct
/// edit is rejected or overwritten. A task with no children is a *leaf*:
/// its dates are authoritative and `estimated_days` drives its due date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub subject: String,
    pub description: Option<String>,
    pub status_id: Option<String>,
    pub priority_id: Option<String>,
    pub version_id: Option<String>,
    pub assignee_id: Option<String>,
    pub parent: Option<String>,
    pub start: NaiveDate,
    pub due: NaiveDate,
    /// Completion percentage, 0-100.
    pub progress: u8,
    /// Working-day duration for leaf tasks; derived for containers.
    pub estimated_days: f64,
    pub created_at_utc: i64,
    pub updated_at_utc: i64,
}

/// A partial update to a single task.
///
/// Every field is optional; `None` means "leave unchanged". Clearable
/// references use a nested `Option` where `Some(None)` clears the field.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub subject: Option<String>,
    pub description: Option<Option<String>>,
    pub status_id: Option<Option<String>>,
    pub priority_id: Option<Option<String>>,
    pub version_id: Option<Option<String>>,
    pub assignee_id: Option<Option<String>>,
    /// `Some(None)` detaches the task and makes it a root.
    pub parent: Option<Option<String>>,
    pub start: Option<NaiveDate>,
    pub due: Option<NaiveDate>,
    pub progress: Option<u8>,
    pub estimated_days: Option<f64>,
}

impl TaskPatch {
    /// True when no field is set; applying it would be a no-op.
    pub fn is_empty(&self) -> bool {
        self.subject.is_none()
            && self.description.is_none()
            && self.status_id.is_none()
            && self.priority_id.is_none()
            && self.version_id.is_none()
            && self.assignee_id.is_none()
            && self.parent.is_none()
            && self.start.is_none()
            && self.due.is_none()
            && self.progress.is_none()
            && self.estimated_days.is_none()
    }
}
