//! Ancestor-chain traversal and the reparent cycle guard.
//!
//! The parent graph must stay a forest. Walks are bounded by the collection
//! size so a corrupted (cyclic) collection cannot hang the caller.

use std::collections::HashMap;

use crate::task::Task;

fn index(tasks: &[Task]) -> HashMap<&str, &Task> {
    tasks.iter().map(|t| (t.id.as_str(), t)).collect()
}

/// True when `ancestor_id` appears strictly above `task_id` in the tree.
/// A task is never its own strict ancestor.
pub fn is_strict_ancestor(tasks: &[Task], ancestor_id: &str, task_id: &str) -> bool {
    let by_id = index(tasks);
    let mut current = by_id.get(task_id).and_then(|t| t.parent.as_deref());
    // Bound the walk by collection size in case the tree is corrupted.
    for _ in 0..tasks.len() {
        match current {
            Some(id) if id == ancestor_id => return true,
            Some(id) => current = by_id.get(id).and_then(|t| t.parent.as_deref()),
            None => return false,
        }
    }
    false
}

/// Ancestor ids of `id`, nearest first, ending at the root.
pub fn ancestor_chain(tasks: &[Task], id: &str) -> Vec<String> {
    let by_id = index(tasks);
    let mut chain = Vec::new();
    let mut current = by_id.get(id).and_then(|t| t.parent.as_deref());
    for _ in 0..tasks.len() {
        match current {
            Some(pid) => {
                chain.push(pid.to_string());
                current = by_id.get(pid).and_then(|t| t.parent.as_deref());
            }
            None => break,
        }
    }
    chain
}

/// Tasks that `id` may legally be reparented under: everything except the
/// task itself and its own descendants.
pub fn eligible_parents<'a>(tasks: &'a [Task], id: &str) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| t.id != id && !is_strict_ancestor(tasks, id, &t.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(id: &str, parent: Option<&str>) -> Task {
        let d = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        Task {
            id: id.to_string(),
            subject: id.to_string(),
            description: None,
            status_id: None,
            priority_id: None,
            version_id: None,
            assignee_id: None,
            parent: parent.map(|p| p.to_string()),
            start: d,
            due: d,
            progress: 0,
            estimated_days: 1.0,
            created_at_utc: 0,
            updated_at_utc: 0,
        }
    }

    #[test]
    fn test_strict_ancestor_chain() {
        let tasks = vec![task("a", None), task("b", Some("a")), task("c", Some("b"))];
        assert!(is_strict_ancestor(&tasks, "a", "c"));
        assert!(is_strict_ancestor(&tasks, "b", "c"));
        assert!(!is_strict_ancestor(&tasks, "c", "a"));
        assert!(!is_strict_ancestor(&tasks, "c", "c"));
        assert_eq!(ancestor_chain(&tasks, "c"), vec!["b", "a"]);
        assert!(ancestor_chain(&tasks, "a").is_empty());
    }

    #[test]
    fn test_walk_terminates_on_corrupted_tree() {
        // Hand-built cycle that could never arise through the store.
        let mut tasks = vec![task("a", Some("b")), task("b", Some("a"))];
        assert!(!is_strict_ancestor(&tasks, "x", "a"));
        tasks.push(task("c", Some("c")));
        assert!(!is_strict_ancestor(&tasks, "x", "c"));
    }

    #[test]
    fn test_eligible_parents_excludes_self_and_descendants() {
        let tasks = vec![
            task("a", None),
            task("b", Some("a")),
            task("c", Some("b")),
            task("d", None),
        ];
        let ids: Vec<&str> = eligible_parents(&tasks, "b")
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "d"]);
    }
}
