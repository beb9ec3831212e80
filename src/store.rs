//! The task store: authoritative task collection and the sanctioned
//! mutation path.
//!
//! All edits funnel through `create_task` / `update_task` / `delete_task`
//! so the two structural invariants hold at every return: the parent graph
//! is a forest, and every container's date range is exactly the min/max
//! envelope of its direct children (transitively, via `rollup`).
//!
//! The store is single-threaded and synchronous; operations validate first
//! and only then mutate, so a failed call leaves the collection untouched.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::error::{Error, Result};
use crate::fields::{ReferenceLists, ResizeEdge};
use crate::hierarchy;
use crate::task::{Task, TaskPatch};

/// Largest accepted working-day duration (ten years). The calendar walks
/// day by day, so an unbounded or non-finite duration would never return.
pub const MAX_WORK_DAYS: f64 = 3650.0;

/// In-memory store for a single plan: tasks plus reference lists.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskStore {
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub refs: ReferenceLists,
    /// Parent id -> direct child ids, kept current by every mutation.
    #[serde(skip)]
    children: HashMap<String, Vec<String>>,
}

impl TaskStore {
    /// Load a store from a JSON plan file, starting empty if the file does
    /// not exist or cannot be parsed.
    pub fn load(path: &Path) -> Self {
        let mut store = if !path.exists() {
            TaskStore::default()
        } else {
            let mut buf = String::new();
            match File::open(path).and_then(|mut f| f.read_to_string(&mut buf)) {
                Ok(_) => match serde_json::from_str(&buf) {
                    Ok(store) => store,
                    Err(e) => {
                        eprintln!("Error parsing plan, starting fresh: {e}");
                        TaskStore::default()
                    }
                },
                Err(e) => {
                    eprintln!("Error reading plan, starting fresh: {e}");
                    TaskStore::default()
                }
            }
        };
        store.rebuild_children_index();
        store
    }

    /// Save the store to a JSON plan file using atomic write (temp + rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        let data = serde_json::to_string_pretty(self)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    /// Generate the next available task id (numeric ids, as strings).
    pub fn next_id(&self) -> String {
        let max = self
            .tasks
            .iter()
            .filter_map(|t| t.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        (max + 1).to_string()
    }

    /// Get a task by id.
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Direct child ids of a task (empty for leaves and unknown ids).
    pub fn children_of(&self, id: &str) -> &[String] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the task is a container (has at least one direct child).
    /// Role is derived on demand, never stored.
    pub fn is_container(&self, id: &str) -> bool {
        !self.children_of(id).is_empty()
    }

    /// Root tasks in collection order.
    pub fn roots(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.parent.is_none()).collect()
    }

    /// The holiday date set the calendar functions consume.
    pub fn holiday_dates(&self) -> HashSet<NaiveDate> {
        self.refs.holidays.iter().map(|h| h.date).collect()
    }

    fn rebuild_children_index(&mut self) {
        self.children.clear();
        for t in &self.tasks {
            if let Some(p) = &t.parent {
                self.children.entry(p.clone()).or_default().push(t.id.clone());
            }
        }
    }

    fn index_attach(&mut self, parent: &str, child: &str) {
        self.children
            .entry(parent.to_string())
            .or_default()
            .push(child.to_string());
    }

    fn index_detach(&mut self, parent: &str, child: &str) {
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.retain(|id| id != child);
            if siblings.is_empty() {
                self.children.remove(parent);
            }
        }
    }

    /// Build a new leaf task from reference-list defaults. The caller may
    /// adjust fields before handing it to `create_task`.
    pub fn new_task(&self, subject: &str, start: NaiveDate, estimated_days: f64) -> Task {
        let holidays = self.holiday_dates();
        let now = Utc::now().timestamp();
        let estimated_days = estimated_days.ceil().max(1.0).min(MAX_WORK_DAYS);
        Task {
            id: self.next_id(),
            subject: subject.to_string(),
            description: None,
            status_id: self.refs.default_status(),
            priority_id: self.refs.default_priority(),
            version_id: None,
            assignee_id: None,
            parent: None,
            start,
            due: calendar::advance_working_days(start, estimated_days, &holidays),
            progress: 0,
            estimated_days,
            created_at_utc: now,
            updated_at_utc: now,
        }
    }

    /// Insert a new task. The parent, if any, must already exist; rollup
    /// runs only when the task attaches to a parent chain.
    pub fn create_task(&mut self, task: Task) -> Result<()> {
        if self.get(&task.id).is_some() {
            return Err(Error::InvalidOperation(format!(
                "duplicate task id: {}",
                task.id
            )));
        }
        if !task.estimated_days.is_finite() || task.estimated_days > MAX_WORK_DAYS {
            return Err(Error::InvalidOperation(format!(
                "duration {} exceeds the {MAX_WORK_DAYS} working-day limit",
                task.estimated_days
            )));
        }
        if let Some(p) = &task.parent {
            if self.get(p).is_none() {
                return Err(Error::NotFound(p.clone()));
            }
        }
        let parent = task.parent.clone();
        let id = task.id.clone();
        self.tasks.push(task);
        if let Some(p) = parent {
            self.index_attach(&p, &id);
            self.rollup()?;
        }
        Ok(())
    }

    /// Apply a partial field patch to the task with `id`.
    ///
    /// Validation happens before any mutation: an unknown id fails with
    /// `NotFound`, a cycle-inducing reparent or a date/duration edit on a
    /// container fails with `InvalidOperation`, and in both cases the
    /// collection is left unchanged. On success the full rollup runs.
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<()> {
        let task = self.get(id).ok_or_else(|| Error::NotFound(id.to_string()))?;
        let old_parent = task.parent.clone();

        // Reparent validation against the current forest.
        let new_parent = match &patch.parent {
            Some(Some(p)) => {
                if self.get(p).is_none() {
                    return Err(Error::NotFound(p.clone()));
                }
                if p.as_str() == id || hierarchy::is_strict_ancestor(&self.tasks, id, p) {
                    return Err(Error::InvalidOperation(format!(
                        "reparenting {id} under {p} would create a cycle"
                    )));
                }
                Some(Some(p.clone()))
            }
            Some(None) => Some(None),
            None => None,
        };

        if let Some(days) = patch.estimated_days {
            if !days.is_finite() || days > MAX_WORK_DAYS {
                return Err(Error::InvalidOperation(format!(
                    "duration {days} exceeds the {MAX_WORK_DAYS} working-day limit"
                )));
            }
        }

        // Date and duration edits only make sense on leaves; a container's
        // range is derived from its children.
        let touches_schedule =
            patch.start.is_some() || patch.due.is_some() || patch.estimated_days.is_some();
        if touches_schedule && self.is_container(id) {
            return Err(Error::InvalidOperation(format!(
                "{id} is a container; its dates are derived from its children"
            )));
        }

        // Compute the prospective leaf schedule up front so an invalid span
        // rejects the whole patch.
        let schedule = if self.is_container(id) {
            None
        } else {
            let task = self.get(id).unwrap();
            let holidays = self.holiday_dates();
            let start = patch.start.unwrap_or(task.start);
            if let Some(due) = patch.due {
                // Due set directly: re-derive the duration from the span.
                if due < start {
                    return Err(Error::InvalidOperation(format!(
                        "due {due} precedes start {start}"
                    )));
                }
                let mut eff = start;
                while !calendar::is_working_day(eff, &holidays) {
                    eff = calendar::add_calendar_days(eff, 1);
                }
                let span = calendar::count_working_days(eff, due, &holidays);
                if span < 1 {
                    return Err(Error::InvalidOperation(format!(
                        "range {start}..{due} contains no working days"
                    )));
                }
                let days = span as f64;
                Some((start, calendar::advance_working_days(start, days, &holidays), days))
            } else {
                let days = patch
                    .estimated_days
                    .unwrap_or(task.estimated_days)
                    .ceil()
                    .max(1.0);
                Some((start, calendar::advance_working_days(start, days, &holidays), days))
            }
        };

        let task = self.get_mut(id).unwrap();
        if let Some(subject) = patch.subject {
            task.subject = subject;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(status_id) = patch.status_id {
            task.status_id = status_id;
        }
        if let Some(priority_id) = patch.priority_id {
            task.priority_id = priority_id;
        }
        if let Some(version_id) = patch.version_id {
            task.version_id = version_id;
        }
        if let Some(assignee_id) = patch.assignee_id {
            task.assignee_id = assignee_id;
        }
        if let Some(progress) = patch.progress {
            task.progress = progress.min(100);
        }
        if let Some((start, due, days)) = schedule {
            task.start = start;
            task.due = due;
            task.estimated_days = days;
        }
        if let Some(parent) = new_parent.clone() {
            task.parent = parent;
        }
        task.updated_at_utc = Utc::now().timestamp();

        if let Some(parent) = new_parent {
            if parent != old_parent {
                if let Some(old) = &old_parent {
                    let old = old.clone();
                    self.index_detach(&old, id);
                }
                if let Some(new) = parent {
                    self.index_attach(&new, id);
                }
            }
        }

        self.rollup()
    }

    /// Remove the task with `id`. Children are promoted to roots rather
    /// than cascade-deleted; callers wanting a cascade delete descendants
    /// first, explicitly.
    pub fn delete_task(&mut self, id: &str) -> Result<()> {
        let task = self.get(id).ok_or_else(|| Error::NotFound(id.to_string()))?;
        let parent = task.parent.clone();
        self.tasks.retain(|t| t.id != id);
        for t in self.tasks.iter_mut() {
            if t.parent.as_deref() == Some(id) {
                t.parent = None;
            }
        }
        if let Some(p) = parent {
            self.index_detach(&p, id);
        }
        self.children.remove(id);
        self.rollup()
    }

    /// Recursively collect descendant ids of `root` into `out`.
    pub fn collect_descendants(&self, root: &str, out: &mut HashSet<String>) {
        for child in self.children_of(root).to_vec() {
            if out.insert(child.clone()) {
                self.collect_descendants(&child, out);
            }
        }
    }

    /// Fixed-point recomputation of every container's date envelope.
    ///
    /// Each pass sets every container's `start`/`due` to the min/max over
    /// its direct children; leaves-to-root propagation stabilises in at
    /// most (tree depth) passes, so the pass cap is a safety bound only.
    /// Even a hand-corrupted parent cycle settles within the cap, because
    /// each pass only shuffles dates already present in the collection and
    /// min/max propagation is monotone over that finite set; the cap is a
    /// hard termination guarantee, not an expected exit.
    pub fn rollup(&mut self) -> Result<()> {
        let holidays = self.holiday_dates();
        for _ in 0..=self.tasks.len() {
            let mut changed = false;
            let container_ids: Vec<String> = self.children.keys().cloned().collect();
            for id in container_ids {
                let mut min_start: Option<NaiveDate> = None;
                let mut max_due: Option<NaiveDate> = None;
                for child_id in self.children_of(&id) {
                    if let Some(child) = self.get(child_id) {
                        min_start = Some(min_start.map_or(child.start, |s| s.min(child.start)));
                        max_due = Some(max_due.map_or(child.due, |d| d.max(child.due)));
                    }
                }
                let (Some(start), Some(due)) = (min_start, max_due) else {
                    continue;
                };
                if let Some(task) = self.get_mut(&id) {
                    if task.start != start || task.due != due {
                        task.start = start;
                        task.due = due;
                        task.estimated_days =
                            calendar::count_working_days(start, due, &holidays).max(1) as f64;
                        changed = true;
                    }
                }
            }
            if !changed {
                return Ok(());
            }
        }
        Err(Error::MalformedTree)
    }

    /// Move a task by `delta` calendar days, keeping its working-day
    /// duration. On a container this shifts every leaf in the subtree by
    /// the same delta and lets rollup re-derive the ancestors.
    pub fn apply_date_shift(&mut self, id: &str, delta: i64) -> Result<()> {
        if self.get(id).is_none() {
            return Err(Error::NotFound(id.to_string()));
        }
        if delta == 0 {
            return Ok(());
        }
        if self.is_container(id) {
            let holidays = self.holiday_dates();
            let mut subtree = HashSet::new();
            self.collect_descendants(id, &mut subtree);
            for leaf_id in subtree {
                if self.is_container(&leaf_id) {
                    continue;
                }
                let task = self.get_mut(&leaf_id).unwrap();
                let start = calendar::add_calendar_days(task.start, delta);
                task.start = start;
                task.due =
                    calendar::advance_working_days(start, task.estimated_days, &holidays);
                task.updated_at_utc = Utc::now().timestamp();
            }
            return self.rollup();
        }
        let start = calendar::add_calendar_days(self.get(id).unwrap().start, delta);
        self.update_task(
            id,
            TaskPatch {
                start: Some(start),
                ..TaskPatch::default()
            },
        )
    }

    /// Resize one edge of a leaf task's bar by `delta` calendar days.
    /// Moving the start keeps the due date and re-derives the duration;
    /// moving the end sets a new due date (snapped to the nearest earlier
    /// working day) and re-derives the duration.
    pub fn apply_range_resize(&mut self, id: &str, edge: ResizeEdge, delta: i64) -> Result<()> {
        let task = self.get(id).ok_or_else(|| Error::NotFound(id.to_string()))?;
        if self.is_container(id) {
            return Err(Error::InvalidOperation(format!(
                "{id} is a container; resize its children instead"
            )));
        }
        if delta == 0 {
            return Ok(());
        }
        let patch = match edge {
            ResizeEdge::Start => {
                let start = calendar::add_calendar_days(task.start, delta);
                if start > task.due {
                    return Err(Error::InvalidOperation(
                        "start would pass the due date".to_string(),
                    ));
                }
                TaskPatch {
                    start: Some(start),
                    due: Some(task.due),
                    ..TaskPatch::default()
                }
            }
            ResizeEdge::End => {
                let due = calendar::add_calendar_days(task.due, delta);
                if due < task.start {
                    return Err(Error::InvalidOperation(
                        "due would pass the start date".to_string(),
                    ));
                }
                TaskPatch {
                    due: Some(due),
                    ..TaskPatch::default()
                }
            }
        };
        self.update_task(id, patch)
    }

    /// Grow or shrink a leaf task's working-day duration by `delta` days.
    pub fn apply_duration_change(&mut self, id: &str, delta: i64) -> Result<()> {
        let task = self.get(id).ok_or_else(|| Error::NotFound(id.to_string()))?;
        if self.is_container(id) {
            return Err(Error::InvalidOperation(format!(
                "{id} is a container; its duration is derived"
            )));
        }
        let days = task.estimated_days.ceil() as i64 + delta;
        if days < 1 {
            return Err(Error::InvalidOperation(
                "duration must be at least one working day".to_string(),
            ));
        }
        self.update_task(
            id,
            TaskPatch {
                estimated_days: Some(days as f64),
                ..TaskPatch::default()
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Holiday;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn store_with(tasks: Vec<(&str, Option<&str>, NaiveDate, f64)>) -> TaskStore {
        let mut store = TaskStore::default();
        for (id, parent, start, days) in tasks {
            let mut task = store.new_task(id, start, days);
            task.id = id.to_string();
            task.parent = parent.map(|p| p.to_string());
            store.create_task(task).unwrap();
        }
        store
    }

    fn assert_envelopes(store: &TaskStore) {
        for t in &store.tasks {
            let children = store.children_of(&t.id);
            if children.is_empty() {
                continue;
            }
            let min = children.iter().map(|c| store.get(c).unwrap().start).min().unwrap();
            let max = children.iter().map(|c| store.get(c).unwrap().due).max().unwrap();
            assert_eq!(t.start, min, "start envelope broken for {}", t.id);
            assert_eq!(t.due, max, "due envelope broken for {}", t.id);
        }
    }

    #[test]
    fn test_rollup_parent_envelope() {
        // A contains B (Feb 1-5 window) and C (Feb 3 + 6 working days).
        let mut store = store_with(vec![
            ("a", None, d(2025, 2, 3), 1.0),
            ("b", Some("a"), d(2025, 2, 3), 3.0),
            ("c", Some("a"), d(2025, 2, 3), 6.0),
        ]);
        store
            .update_task(
                "b",
                TaskPatch {
                    start: Some(d(2025, 2, 1)),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        let a = store.get("a").unwrap();
        assert_eq!(a.start, d(2025, 2, 1));
        assert_eq!(a.due, d(2025, 2, 10)); // c: Feb 3 + 6 working days
        assert_envelopes(&store);
    }

    #[test]
    fn test_rollup_transitive_ancestors() {
        let mut store = store_with(vec![
            ("root", None, d(2025, 3, 3), 1.0),
            ("mid", Some("root"), d(2025, 3, 3), 1.0),
            ("leaf", Some("mid"), d(2025, 3, 3), 2.0),
        ]);
        store.apply_duration_change("leaf", 5).unwrap();
        let leaf_due = store.get("leaf").unwrap().due;
        assert_eq!(store.get("mid").unwrap().due, leaf_due);
        assert_eq!(store.get("root").unwrap().due, leaf_due);
        assert_envelopes(&store);
    }

    #[test]
    fn test_reparent_cycle_rejected_unchanged() {
        let mut store = store_with(vec![
            ("x", None, d(2025, 4, 7), 2.0),
            ("y", Some("x"), d(2025, 4, 7), 2.0),
        ]);
        let before: Vec<(String, Option<String>)> = store
            .tasks
            .iter()
            .map(|t| (t.id.clone(), t.parent.clone()))
            .collect();
        let err = store
            .update_task(
                "x",
                TaskPatch {
                    parent: Some(Some("y".to_string())),
                    ..TaskPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidOperation(_)));
        let self_err = store
            .update_task(
                "x",
                TaskPatch {
                    parent: Some(Some("x".to_string())),
                    ..TaskPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(self_err, Error::InvalidOperation(_)));
        let after: Vec<(String, Option<String>)> = store
            .tasks
            .iter()
            .map(|t| (t.id.clone(), t.parent.clone()))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_delete_container_promotes_children() {
        let mut store = store_with(vec![
            ("p", None, d(2025, 5, 5), 1.0),
            ("c1", Some("p"), d(2025, 5, 5), 2.0),
            ("c2", Some("p"), d(2025, 5, 7), 2.0),
        ]);
        let c1_dates = {
            let c1 = store.get("c1").unwrap();
            (c1.start, c1.due)
        };
        store.delete_task("p").unwrap();
        assert!(store.get("p").is_none());
        let c1 = store.get("c1").unwrap();
        assert_eq!(c1.parent, None);
        assert_eq!((c1.start, c1.due), c1_dates);
        assert_eq!(store.get("c2").unwrap().parent, None);
        assert!(store.tasks.iter().all(|t| t.parent.is_none()));
    }

    #[test]
    fn test_container_schedule_edit_rejected() {
        let mut store = store_with(vec![
            ("p", None, d(2025, 5, 5), 1.0),
            ("c", Some("p"), d(2025, 5, 5), 2.0),
        ]);
        for patch in [
            TaskPatch { start: Some(d(2025, 5, 1)), ..TaskPatch::default() },
            TaskPatch { due: Some(d(2025, 5, 30)), ..TaskPatch::default() },
            TaskPatch { estimated_days: Some(9.0), ..TaskPatch::default() },
        ] {
            let err = store.update_task("p", patch).unwrap_err();
            assert!(matches!(err, Error::InvalidOperation(_)));
        }
        assert!(matches!(
            store.apply_range_resize("p", ResizeEdge::End, 2),
            Err(Error::InvalidOperation(_))
        ));
        assert!(matches!(
            store.apply_duration_change("p", 1),
            Err(Error::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_resize_end_round_trip() {
        let mut store = store_with(vec![("t", None, d(2025, 6, 2), 2.0)]);
        // Mon Jun 2 + 2wd = Tue Jun 3; push the end out past a weekend.
        store.apply_range_resize("t", ResizeEdge::End, 6).unwrap();
        let task = store.get("t").unwrap();
        let holidays = store.holiday_dates();
        assert_eq!(
            calendar::advance_working_days(task.start, task.estimated_days, &holidays),
            task.due
        );
        assert_eq!(task.estimated_days, 6.0); // Jun 2..9 spans six working days
    }

    #[test]
    fn test_resize_start_keeps_due() {
        let mut store = store_with(vec![("t", None, d(2025, 6, 2), 5.0)]);
        let due = store.get("t").unwrap().due;
        store.apply_range_resize("t", ResizeEdge::Start, 2).unwrap();
        let task = store.get("t").unwrap();
        assert_eq!(task.start, d(2025, 6, 4));
        assert_eq!(task.due, due);
        assert_eq!(task.estimated_days, 3.0);
    }

    #[test]
    fn test_resize_rejects_collapsed_span() {
        let mut store = store_with(vec![("t", None, d(2025, 6, 2), 2.0)]);
        assert!(matches!(
            store.apply_range_resize("t", ResizeEdge::End, -10),
            Err(Error::InvalidOperation(_))
        ));
        assert!(matches!(
            store.apply_duration_change("t", -5),
            Err(Error::InvalidOperation(_))
        ));
        let task = store.get("t").unwrap();
        assert_eq!(task.start, d(2025, 6, 2));
    }

    #[test]
    fn test_shift_leaf_respects_holidays() {
        let mut store = store_with(vec![("t", None, d(2024, 12, 27), 3.0)]);
        store.refs.holidays.push(Holiday {
            date: d(2025, 1, 1),
            label: "New Year".to_string(),
        });
        // Fri Dec 27 -> Mon Dec 30; three working days skipping Jan 1.
        store.apply_date_shift("t", 3).unwrap();
        let task = store.get("t").unwrap();
        assert_eq!(task.start, d(2024, 12, 30));
        assert_eq!(task.due, d(2025, 1, 2));
    }

    #[test]
    fn test_shift_container_moves_subtree() {
        let mut store = store_with(vec![
            ("p", None, d(2025, 7, 7), 1.0),
            ("c1", Some("p"), d(2025, 7, 7), 2.0),
            ("c2", Some("p"), d(2025, 7, 9), 1.0),
        ]);
        store.apply_date_shift("p", 7).unwrap();
        assert_eq!(store.get("c1").unwrap().start, d(2025, 7, 14));
        assert_eq!(store.get("c2").unwrap().start, d(2025, 7, 16));
        assert_envelopes(&store);
    }

    #[test]
    fn test_update_unknown_task() {
        let mut store = TaskStore::default();
        assert!(matches!(
            store.update_task("ghost", TaskPatch::default()),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(store.delete_task("ghost"), Err(Error::NotFound(_))));
        assert!(matches!(
            store.apply_date_shift("ghost", 1),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_create_with_parent_rolls_up() {
        let mut store = store_with(vec![("p", None, d(2025, 8, 4), 1.0)]);
        let mut child = store.new_task("child", d(2025, 8, 11), 5.0);
        child.parent = Some("p".to_string());
        store.create_task(child).unwrap();
        assert_envelopes(&store);
        assert_eq!(store.get("p").unwrap().due, store.get("1").unwrap().due);
    }

    #[test]
    fn test_rejects_unbounded_durations() {
        let mut store = store_with(vec![("a", None, d(2025, 1, 6), 2.0)]);
        for days in [f64::INFINITY, f64::NAN, 1e18] {
            let err = store.update_task(
                "a",
                TaskPatch { estimated_days: Some(days), ..TaskPatch::default() },
            );
            assert!(matches!(err, Err(Error::InvalidOperation(_))));
        }
        assert_eq!(store.get("a").unwrap().estimated_days, 2.0);
        // A raw task with an unbounded duration is rejected at insert.
        let mut task = store.new_task("big", d(2025, 1, 6), 1.0);
        task.estimated_days = f64::INFINITY;
        assert!(matches!(store.create_task(task), Err(Error::InvalidOperation(_))));
        // The constructor clamps, so it can never walk the calendar forever.
        let clamped = store.new_task("clamped", d(2025, 1, 6), f64::INFINITY);
        assert_eq!(clamped.estimated_days, MAX_WORK_DAYS);
    }

    #[test]
    fn test_rollup_terminates_on_corrupted_cycle() {
        let mut store = store_with(vec![
            ("a", None, d(2025, 1, 6), 2.0),
            ("b", Some("a"), d(2025, 1, 13), 2.0),
        ]);
        // Wire a parent cycle behind the sanctioned API.
        store
            .tasks
            .iter_mut()
            .find(|t| t.id == "a")
            .unwrap()
            .parent = Some("b".to_string());
        store.rebuild_children_index();
        // Both members settle on a common envelope instead of exhausting
        // the pass cap.
        store.rollup().unwrap();
        let a = store.get("a").unwrap();
        let b = store.get("b").unwrap();
        assert_eq!((a.start, a.due), (b.start, b.due));
    }

    #[test]
    fn test_load_save_round_trip() {
        let dir = std::env::temp_dir().join("gantt_store_test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("roundtrip_plan.json");
        let store = store_with(vec![
            ("p", None, d(2025, 9, 1), 1.0),
            ("c", Some("p"), d(2025, 9, 1), 4.0),
        ]);
        store.save(&path).unwrap();
        let loaded = TaskStore::load(&path);
        assert_eq!(loaded.tasks.len(), 2);
        assert!(loaded.is_container("p"));
        assert_eq!(loaded.get("c").unwrap().due, store.get("c").unwrap().due);
        fs::remove_file(&path).unwrap();
    }
}
