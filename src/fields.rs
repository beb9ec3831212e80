//! Reference lists and field types for scheduling.
//!
//! Statuses, priorities, versions and users are opaque lookup rows owned by
//! the plan file; tasks reference them by id and the scheduling core never
//! dereferences them. Holidays feed the working-day calendar.

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A workflow status row (e.g. New, In Progress, Closed).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Status {
    pub id: String,
    pub name: String,
}

/// A priority row (e.g. Low, Normal, High).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Priority {
    pub id: String,
    pub name: String,
}

/// A target version / milestone row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Version {
    pub id: String,
    pub name: String,
}

/// An assignable user row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
}

/// A non-working date with a display label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Holiday {
    pub date: NaiveDate,
    pub label: String,
}

/// The reference lists a plan ships with. Tasks point into these by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceLists {
    pub statuses: Vec<Status>,
    pub priorities: Vec<Priority>,
    pub versions: Vec<Version>,
    pub users: Vec<User>,
    #[serde(default)]
    pub holidays: Vec<Holiday>,
}

impl Default for ReferenceLists {
    fn default() -> Self {
        let status = |id: &str, name: &str| Status { id: id.into(), name: name.into() };
        let priority = |id: &str, name: &str| Priority { id: id.into(), name: name.into() };
        ReferenceLists {
            statuses: vec![
                status("new", "New"),
                status("in-progress", "In Progress"),
                status("closed", "Closed"),
            ],
            priorities: vec![
                priority("low", "Low"),
                priority("normal", "Normal"),
                priority("high", "High"),
            ],
            versions: Vec::new(),
            users: Vec::new(),
            holidays: Vec::new(),
        }
    }
}

impl ReferenceLists {
    /// Default status id for newly created tasks (first row, if any).
    pub fn default_status(&self) -> Option<String> {
        self.statuses.first().map(|s| s.id.clone())
    }

    /// Default priority id for newly created tasks.
    pub fn default_priority(&self) -> Option<String> {
        self.priorities
            .iter()
            .find(|p| p.id == "normal")
            .or_else(|| self.priorities.first())
            .map(|p| p.id.clone())
    }

    /// Resolve a user id to a display name, if known.
    pub fn user_name(&self, id: &str) -> Option<&str> {
        self.users.iter().find(|u| u.id == id).map(|u| u.name.as_str())
    }
}

/// Available sorting options applied at each sibling level of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    Id,
    Due,
    Assignee,
}

/// Which edge of a task bar a resize gesture grabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResizeEdge {
    Start,
    End,
}
