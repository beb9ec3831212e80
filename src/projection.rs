//! Timeline projection: pure, read-only mapping between tasks and their
//! rendered placement on a day-scaled timeline, plus the visible row order
//! for a collapsible tree view.
//!
//! The interactive layer uses `delta_days` to turn a drag distance back
//! into a signed day delta, which it then feeds to the store's
//! `apply_date_shift` / `apply_range_resize` operations.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::calendar;
use crate::fields::SortKey;
use crate::store::TaskStore;
use crate::task::Task;

/// A task bar's position on the timeline, in day units from the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Days from the timeline anchor to the bar's first day (may be negative).
    pub offset: i64,
    /// Inclusive width of the bar in days (always >= 1 for a valid range).
    pub width: i64,
}

/// Project a task's date range onto a timeline anchored at `anchor`.
pub fn bar_placement(task: &Task, anchor: NaiveDate) -> Placement {
    Placement {
        offset: calendar::days_between(anchor, task.start),
        width: calendar::days_between(task.start, task.due) + 1,
    }
}

/// Convert a day placement to (column, width) cell coordinates.
pub fn to_cells(placement: Placement, day_width: u16) -> (i64, i64) {
    let w = day_width as i64;
    (placement.offset * w, placement.width * w)
}

/// Inverse of the cell projection: translate a horizontal drag distance
/// into a signed whole-day delta, rounding to the nearest day.
pub fn delta_days(cell_delta: i64, day_width: u16) -> i64 {
    (cell_delta as f64 / day_width.max(1) as f64).round() as i64
}

/// The working-day span a task's bar currently implies.
pub fn working_day_span(task: &Task, holidays: &HashSet<NaiveDate>) -> i64 {
    calendar::count_working_days(task.start, task.due, holidays)
}

/// One row of the rendered task tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    pub id: String,
    pub depth: usize,
}

/// Depth-first visible row order for the forest: siblings sorted by `sort`
/// at each level independently, and subtrees of collapsed tasks omitted.
pub fn visible_rows(
    store: &TaskStore,
    collapsed: &HashSet<String>,
    sort: SortKey,
) -> Vec<VisibleRow> {
    let mut rows = Vec::new();
    let mut roots = store.roots();
    sort_siblings(store, &mut roots, sort);
    for root in roots {
        push_subtree(store, &root.id, 0, collapsed, sort, &mut rows);
    }
    rows
}

fn push_subtree(
    store: &TaskStore,
    id: &str,
    depth: usize,
    collapsed: &HashSet<String>,
    sort: SortKey,
    rows: &mut Vec<VisibleRow>,
) {
    rows.push(VisibleRow {
        id: id.to_string(),
        depth,
    });
    if collapsed.contains(id) {
        return;
    }
    let mut children: Vec<&Task> = store
        .children_of(id)
        .iter()
        .filter_map(|c| store.get(c))
        .collect();
    sort_siblings(store, &mut children, sort);
    for child in children {
        push_subtree(store, &child.id, depth + 1, collapsed, sort, rows);
    }
}

fn sort_siblings(store: &TaskStore, siblings: &mut [&Task], sort: SortKey) {
    match sort {
        SortKey::Id => siblings.sort_by(|a, b| id_order(&a.id).cmp(&id_order(&b.id))),
        SortKey::Due => {
            siblings.sort_by(|a, b| a.due.cmp(&b.due).then(id_order(&a.id).cmp(&id_order(&b.id))))
        }
        SortKey::Assignee => siblings.sort_by(|a, b| {
            let name = |t: &Task| {
                t.assignee_id
                    .as_deref()
                    .and_then(|id| store.refs.user_name(id))
                    .map(str::to_string)
            };
            // Unassigned tasks sort after assigned ones.
            match (name(a), name(b)) {
                (Some(na), Some(nb)) => na.cmp(&nb),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
            .then(id_order(&a.id).cmp(&id_order(&b.id)))
        }),
    }
}

/// Numeric ids compare numerically, everything else lexically after them.
fn id_order(id: &str) -> (u8, u64, &str) {
    match id.parse::<u64>() {
        Ok(n) => (0, n, ""),
        Err(_) => (1, 0, id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::User;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample_store() -> TaskStore {
        let mut store = TaskStore::default();
        for (id, parent, start, days) in [
            ("1", None, d(2025, 3, 3), 1.0),
            ("2", Some("1"), d(2025, 3, 10), 2.0),
            ("3", Some("1"), d(2025, 3, 3), 2.0),
            ("4", None, d(2025, 3, 5), 1.0),
        ] {
            let mut task = store.new_task(id, start, days);
            task.id = id.to_string();
            task.parent = parent.map(|p| p.to_string());
            store.create_task(task).unwrap();
        }
        store
    }

    #[test]
    fn test_bar_placement_and_cells() {
        let store = sample_store();
        let anchor = d(2025, 3, 1);
        let p = bar_placement(store.get("3").unwrap(), anchor);
        assert_eq!(p, Placement { offset: 2, width: 2 });
        assert_eq!(to_cells(p, 3), (6, 6));
        // A task starting before the anchor projects to a negative offset.
        let before = bar_placement(store.get("3").unwrap(), d(2025, 3, 10));
        assert_eq!(before.offset, -7);
    }

    #[test]
    fn test_delta_days_rounds() {
        assert_eq!(delta_days(7, 3), 2);
        assert_eq!(delta_days(-7, 3), -2);
        assert_eq!(delta_days(1, 3), 0);
        assert_eq!(delta_days(5, 1), 5);
    }

    #[test]
    fn test_visible_rows_depth_first() {
        let store = sample_store();
        let rows = visible_rows(&store, &HashSet::new(), SortKey::Id);
        let flat: Vec<(&str, usize)> = rows.iter().map(|r| (r.id.as_str(), r.depth)).collect();
        assert_eq!(flat, vec![("1", 0), ("2", 1), ("3", 1), ("4", 0)]);
    }

    #[test]
    fn test_visible_rows_collapse_hides_subtree() {
        let store = sample_store();
        let collapsed: HashSet<String> = ["1".to_string()].into_iter().collect();
        let rows = visible_rows(&store, &collapsed, SortKey::Id);
        let flat: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(flat, vec!["1", "4"]);
    }

    #[test]
    fn test_sibling_sort_by_due() {
        let store = sample_store();
        let rows = visible_rows(&store, &HashSet::new(), SortKey::Due);
        let flat: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        // Root 4 (due Mar 5) precedes the container 1 (rolled-up due Mar 11);
        // under 1, task 3 (Mar 4) precedes task 2 (Mar 11).
        assert_eq!(flat, vec!["4", "1", "3", "2"]);
    }

    #[test]
    fn test_sibling_sort_by_assignee_name() {
        let mut store = sample_store();
        store.refs.users = vec![
            User { id: "u1".into(), name: "Zoe".into() },
            User { id: "u2".into(), name: "Ari".into() },
        ];
        for (id, user) in [("2", "u1"), ("3", "u2")] {
            store
                .update_task(
                    id,
                    crate::task::TaskPatch {
                        assignee_id: Some(Some(user.to_string())),
                        ..Default::default()
                    },
                )
                .unwrap();
        }
        let rows = visible_rows(&store, &HashSet::new(), SortKey::Assignee);
        let flat: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(flat, vec!["1", "3", "2", "4"]);
    }

    #[test]
    fn test_working_day_span() {
        let store = sample_store();
        let holidays = HashSet::new();
        // Task 2: Mon Mar 10 + 2wd -> Tue Mar 11.
        assert_eq!(working_day_span(store.get("2").unwrap(), &holidays), 2);
    }
}
