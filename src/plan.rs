//! Plan discovery and file management for multi-plan support.
//!
//! Each plan is a standalone JSON file named `<slug>_plan.json` inside the
//! data directory; the slug is derived from the display name.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::store::TaskStore;

/// A plan with its display name and backing file path.
#[derive(Debug, Clone)]
pub struct Plan {
    pub name: String,
    pub display_name: String,
    pub file_path: PathBuf,
}

impl Plan {
    /// Create a plan handle for the given display name.
    pub fn new(display_name: &str, data_dir: &Path) -> Self {
        let name = slugify(display_name);
        let file_path = data_dir.join(format!("{}_plan.json", name));
        Plan {
            name,
            display_name: display_name.to_string(),
            file_path,
        }
    }

    /// Recognise a plan from an existing `<slug>_plan.json` path.
    pub fn from_file(file_path: PathBuf) -> Option<Self> {
        let stem = file_path.file_stem()?.to_str()?;
        let name = stem.strip_suffix("_plan")?;
        if name.is_empty() {
            return None;
        }
        Some(Plan {
            name: name.to_string(),
            display_name: name.replace('_', " "),
            file_path,
        })
    }

    /// Write an empty store to this plan's file if it does not exist yet.
    pub fn create_if_not_exists(&self) -> Result<()> {
        if !self.file_path.exists() {
            TaskStore::default().save(&self.file_path)?;
        }
        Ok(())
    }
}

/// Reduce a display name to a lowercase, underscore-separated slug.
pub fn slugify(display_name: &str) -> String {
    display_name
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Discover all plans in the data directory, sorted by display name.
pub fn discover_plans(data_dir: &Path) -> Result<Vec<Plan>> {
    let mut plans = Vec::new();
    if !data_dir.exists() {
        return Ok(plans);
    }
    for entry in fs::read_dir(data_dir)? {
        let path = entry?.path();
        if path.is_file() {
            if let Some(plan) = Plan::from_file(path) {
                plans.push(plan);
            }
        }
    }
    plans.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    Ok(plans)
}

/// The plan whose file was most recently modified, if any.
pub fn most_recent_plan(data_dir: &Path) -> Result<Option<Plan>> {
    let plans = discover_plans(data_dir)?;
    let mut best: Option<(Plan, std::time::SystemTime)> = None;
    for plan in plans {
        let Ok(modified) = fs::metadata(&plan.file_path).and_then(|m| m.modified()) else {
            continue;
        };
        let newer = best
            .as_ref()
            .map(|(_, current)| modified > *current)
            .unwrap_or(true);
        if newer {
            best = Some((plan, modified));
        }
    }
    Ok(best.map(|(plan, _)| plan))
}
