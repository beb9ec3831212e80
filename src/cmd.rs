//! Command implementations for the CLI interface.
//!
//! Every handler loads the plan through `main`, invokes the task store's
//! sanctioned operations, prints a short confirmation and saves. Validation
//! errors from the core are surfaced verbatim and exit non-zero.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::{Local, NaiveDate, Utc};
use clap::Subcommand;
use clap_complete::{generate, Shell};

use crate::calendar;
use crate::error::Error;
use crate::fields::{Holiday, ResizeEdge, SortKey, User};
use crate::hierarchy;
use crate::plan::most_recent_plan;
use crate::projection;
use crate::store::{TaskStore, MAX_WORK_DAYS};
use crate::task::{Task, TaskPatch};
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive Gantt board.
    Ui,

    /// Add a new task.
    Add {
        /// Short subject line for the task.
        subject: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Start date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        start: Option<String>,
        /// Working-day duration.
        #[arg(long, default_value_t = 1.0, value_parser = parse_days)]
        days: f64,
        /// Parent task id.
        #[arg(long)]
        parent: Option<String>,
        /// Assignee user id.
        #[arg(long)]
        assignee: Option<String>,
        /// Status id (defaults to the plan's first status).
        #[arg(long)]
        status: Option<String>,
        /// Priority id.
        #[arg(long)]
        priority: Option<String>,
        /// Target version id.
        #[arg(long)]
        version: Option<String>,
    },

    /// List tasks, flat or as a tree.
    List {
        /// Render the parent-child hierarchy with indentation.
        #[arg(long)]
        tree: bool,
        /// Sort key, applied per sibling level in tree mode.
        #[arg(long, value_enum, default_value_t = SortKey::Id)]
        sort: SortKey,
        /// Filter by assignee user id.
        #[arg(long)]
        assignee: Option<String>,
        /// Filter by status id.
        #[arg(long)]
        status: Option<String>,
    },

    /// View a single task with its ancestors and children.
    View {
        /// Task id to view.
        id: String,
    },

    /// Update fields of an existing task.
    Update {
        /// Task id to update.
        id: String,
        /// New subject.
        #[arg(long)]
        subject: Option<String>,
        /// New description.
        #[arg(long)]
        desc: Option<String>,
        /// New start date (YYYY-MM-DD); the due date is re-derived.
        #[arg(long)]
        start: Option<String>,
        /// New due date (YYYY-MM-DD); the duration is re-derived.
        #[arg(long)]
        due: Option<String>,
        /// New working-day duration; the due date is re-derived.
        #[arg(long, value_parser = parse_days)]
        days: Option<f64>,
        /// New parent task id.
        #[arg(long)]
        parent: Option<String>,
        /// Detach from the current parent and become a root task.
        #[arg(long)]
        clear_parent: bool,
        /// Progress percentage, 0-100.
        #[arg(long)]
        progress: Option<u8>,
        /// Status id.
        #[arg(long)]
        status: Option<String>,
        /// Priority id.
        #[arg(long)]
        priority: Option<String>,
        /// Target version id.
        #[arg(long)]
        version: Option<String>,
        /// Assignee user id.
        #[arg(long)]
        assignee: Option<String>,
    },

    /// Move a task by a number of calendar days, keeping its duration.
    Shift {
        /// Task id to move. Containers move their whole subtree.
        id: String,
        /// Signed day delta.
        days: i64,
    },

    /// Drag one edge of a leaf task's bar by a number of days.
    Resize {
        /// Task id to resize.
        id: String,
        /// Which edge moves.
        #[arg(value_enum)]
        edge: ResizeEdge,
        /// Signed day delta.
        days: i64,
    },

    /// Delete a task. Children become root tasks unless --cascade is given.
    Delete {
        /// Task id to delete.
        id: String,
        /// Also delete all descendants, deepest first.
        #[arg(long)]
        cascade: bool,
    },

    /// Manage the holiday calendar.
    Holiday {
        #[command(subcommand)]
        action: HolidayAction,
    },

    /// Manage the assignee list.
    Assignee {
        #[command(subcommand)]
        action: AssigneeAction,
    },

    /// Export tasks to CSV.
    Export {
        /// Output file path (default: plan.csv).
        #[arg(long)]
        output: Option<String>,
    },

    /// Import tasks from CSV with automatic backup.
    Import {
        /// Input CSV file path.
        input: String,
        /// Skip the automatic pre-import backup.
        #[arg(long)]
        no_backup: bool,
    },

    /// Create a timestamped backup of the plan file.
    Backup,

    /// Generate shell completions.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum HolidayAction {
    /// Register a non-working date.
    Add {
        /// Date (YYYY-MM-DD).
        date: String,
        /// Display label.
        label: String,
    },
    /// Remove a holiday by date.
    Rm {
        /// Date (YYYY-MM-DD).
        date: String,
    },
    /// List registered holidays.
    List,
}

#[derive(Subcommand)]
pub enum AssigneeAction {
    /// Add a user to the assignee list.
    Add {
        /// User id.
        id: String,
        /// Display name.
        name: String,
    },
    /// List known assignees.
    List,
}

/// Accept a working-day duration from the command line. Non-finite values
/// and absurd spans would otherwise walk the calendar one day at a time.
fn parse_days(s: &str) -> std::result::Result<f64, String> {
    let days: f64 = s
        .parse()
        .map_err(|_| format!("invalid duration: {s}"))?;
    if !days.is_finite() || days <= 0.0 || days > MAX_WORK_DAYS {
        return Err(format!(
            "duration must be between 0 and {MAX_WORK_DAYS} working days"
        ));
    }
    Ok(days)
}

fn parse_date(s: &str) -> NaiveDate {
    match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        Ok(d) => d,
        Err(_) => {
            eprintln!("Invalid date '{s}', expected YYYY-MM-DD");
            std::process::exit(1);
        }
    }
}

fn save_or_exit(store: &TaskStore, path: &Path) {
    if let Err(e) = store.save(path) {
        eprintln!("Failed to save plan: {e}");
        std::process::exit(1);
    }
}

fn fail(e: Error) -> ! {
    eprintln!("{e}");
    std::process::exit(1);
}

/// Resolve a reference-list id to its display name, falling back to the id.
fn named<'a>(rows: &'a [(String, String)], id: Option<&'a str>) -> &'a str {
    let Some(id) = id else { return "-" };
    rows.iter()
        .find(|(row_id, _)| row_id == id)
        .map(|(_, name)| name.as_str())
        .unwrap_or(id)
}

fn status_rows(store: &TaskStore) -> Vec<(String, String)> {
    store.refs.statuses.iter().map(|s| (s.id.clone(), s.name.clone())).collect()
}

fn user_rows(store: &TaskStore) -> Vec<(String, String)> {
    store.refs.users.iter().map(|u| (u.id.clone(), u.name.clone())).collect()
}

/// Add a new task built from reference-list defaults.
pub fn cmd_add(
    store: &mut TaskStore,
    path: &Path,
    subject: String,
    desc: Option<String>,
    start: Option<String>,
    days: f64,
    parent: Option<String>,
    assignee: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    version: Option<String>,
) {
    let start = start
        .map(|s| parse_date(&s))
        .unwrap_or_else(|| Local::now().date_naive());
    let mut task = store.new_task(&subject, start, days);
    task.description = desc;
    task.parent = parent;
    if assignee.is_some() {
        task.assignee_id = assignee;
    }
    if status.is_some() {
        task.status_id = status;
    }
    if priority.is_some() {
        task.priority_id = priority;
    }
    if version.is_some() {
        task.version_id = version;
    }
    let id = task.id.clone();
    let due = task.due;
    if let Err(e) = store.create_task(task) {
        fail(e);
    }
    save_or_exit(store, path);
    println!("Added task {id}: {subject} ({start} .. {due})");
}

/// Print tasks in a formatted table with optional tree indentation.
pub fn cmd_list(
    store: &TaskStore,
    tree: bool,
    sort: SortKey,
    assignee: Option<String>,
    status: Option<String>,
) {
    let statuses = status_rows(store);
    let users = user_rows(store);
    println!(
        "{:<6} {:<12} {:<11} {:<11} {:>5} {:>5} {:<12} Subject",
        "ID", "Status", "Start", "Due", "Days", "Prog", "Assignee"
    );
    let matches = |t: &Task| {
        assignee.as_deref().map_or(true, |a| t.assignee_id.as_deref() == Some(a))
            && status.as_deref().map_or(true, |s| t.status_id.as_deref() == Some(s))
    };
    let print_row = |t: &Task, depth: usize| {
        let indent = "  ".repeat(depth);
        println!(
            "{:<6} {:<12} {:<11} {:<11} {:>5} {:>4}% {:<12} {}{}",
            t.id,
            named(&statuses, t.status_id.as_deref()),
            t.start.to_string(),
            t.due.to_string(),
            t.estimated_days,
            t.progress,
            named(&users, t.assignee_id.as_deref()),
            indent,
            t.subject
        );
    };
    if tree {
        for row in projection::visible_rows(store, &HashSet::new(), sort) {
            if let Some(t) = store.get(&row.id) {
                if matches(t) {
                    print_row(t, row.depth);
                }
            }
        }
    } else {
        let mut tasks: Vec<&Task> = store.tasks.iter().filter(|t| matches(t)).collect();
        match sort {
            SortKey::Id => tasks.sort_by(|a, b| a.id.cmp(&b.id)),
            SortKey::Due => tasks.sort_by(|a, b| a.due.cmp(&b.due)),
            SortKey::Assignee => tasks.sort_by(|a, b| a.assignee_id.cmp(&b.assignee_id)),
        }
        for t in tasks {
            print_row(t, 0);
        }
    }
}

/// View a single task with its ancestor chain and direct children.
pub fn cmd_view(store: &TaskStore, id: String) {
    let Some(task) = store.get(&id) else {
        fail(Error::NotFound(id));
    };
    let statuses = status_rows(store);
    let users = user_rows(store);
    let role = if store.is_container(&id) { "container" } else { "leaf" };
    println!("Task {} ({role})", task.id);
    println!("  Subject:   {}", task.subject);
    if let Some(desc) = &task.description {
        println!("  Details:   {desc}");
    }
    println!("  Status:    {}", named(&statuses, task.status_id.as_deref()));
    println!("  Assignee:  {}", named(&users, task.assignee_id.as_deref()));
    println!(
        "  Schedule:  {} .. {} ({} working days)",
        task.start,
        task.due,
        projection::working_day_span(task, &store.holiday_dates())
    );
    println!("  Progress:  {}%", task.progress);
    let ancestors = hierarchy::ancestor_chain(&store.tasks, &id);
    if !ancestors.is_empty() {
        println!("  Ancestors: {}", ancestors.join(" -> "));
    }
    let children = store.children_of(&id);
    if !children.is_empty() {
        println!("  Children:  {}", children.join(", "));
    }
}

/// Apply a field patch to a task.
#[allow(clippy::too_many_arguments)]
pub fn cmd_update(
    store: &mut TaskStore,
    path: &Path,
    id: String,
    subject: Option<String>,
    desc: Option<String>,
    start: Option<String>,
    due: Option<String>,
    days: Option<f64>,
    parent: Option<String>,
    clear_parent: bool,
    progress: Option<u8>,
    status: Option<String>,
    priority: Option<String>,
    version: Option<String>,
    assignee: Option<String>,
) {
    let patch = TaskPatch {
        subject,
        description: desc.map(Some),
        status_id: status.map(Some),
        priority_id: priority.map(Some),
        version_id: version.map(Some),
        assignee_id: assignee.map(Some),
        parent: if clear_parent {
            Some(None)
        } else {
            parent.map(Some)
        },
        start: start.map(|s| parse_date(&s)),
        due: due.map(|s| parse_date(&s)),
        progress,
        estimated_days: days,
    };
    if patch.is_empty() {
        println!("Nothing to update.");
        return;
    }
    if let Err(e) = store.update_task(&id, patch) {
        fail(e);
    }
    save_or_exit(store, path);
    let task = store.get(&id).unwrap();
    println!("Updated {id}: {} .. {}", task.start, task.due);
}

/// Shift a task (or a container's whole subtree) by calendar days.
pub fn cmd_shift(store: &mut TaskStore, path: &Path, id: String, days: i64) {
    if let Err(e) = store.apply_date_shift(&id, days) {
        fail(e);
    }
    save_or_exit(store, path);
    let task = store.get(&id).unwrap();
    println!("Shifted {id} to {} .. {}", task.start, task.due);
}

/// Resize one edge of a leaf task's bar.
pub fn cmd_resize(store: &mut TaskStore, path: &Path, id: String, edge: ResizeEdge, days: i64) {
    if let Err(e) = store.apply_range_resize(&id, edge, days) {
        fail(e);
    }
    save_or_exit(store, path);
    let task = store.get(&id).unwrap();
    println!(
        "Resized {id} to {} .. {} ({} working days)",
        task.start, task.due, task.estimated_days
    );
}

/// Delete a task, optionally cascading to all descendants.
pub fn cmd_delete(store: &mut TaskStore, path: &Path, id: String, cascade: bool) {
    if store.get(&id).is_none() {
        fail(Error::NotFound(id));
    }
    let mut removed = 1;
    if cascade {
        let mut descendants = HashSet::new();
        store.collect_descendants(&id, &mut descendants);
        // Deepest first so no delete ever orphans a child mid-cascade.
        let mut ordered: Vec<String> = descendants.into_iter().collect();
        ordered.sort_by_key(|d| {
            std::cmp::Reverse(hierarchy::ancestor_chain(&store.tasks, d).len())
        });
        for d in ordered {
            if let Err(e) = store.delete_task(&d) {
                fail(e);
            }
            removed += 1;
        }
    }
    if let Err(e) = store.delete_task(&id) {
        fail(e);
    }
    save_or_exit(store, path);
    println!("Deleted {removed} task(s).");
}

/// Re-derive every leaf's due date from its duration under the current
/// holiday set. Must run after any change to the holiday list.
fn rederive_leaf_schedules(store: &mut TaskStore) {
    let ids: Vec<String> = store.tasks.iter().map(|t| t.id.clone()).collect();
    for id in ids {
        if !store.is_container(&id) {
            let days = store.get(&id).unwrap().estimated_days;
            if let Err(e) = store.update_task(
                &id,
                TaskPatch { estimated_days: Some(days), ..TaskPatch::default() },
            ) {
                fail(e);
            }
        }
    }
}

/// Manage the plan's holiday calendar.
pub fn cmd_holiday(store: &mut TaskStore, path: &Path, action: HolidayAction) {
    match action {
        HolidayAction::Add { date, label } => {
            let date = parse_date(&date);
            if store.refs.holidays.iter().any(|h| h.date == date) {
                eprintln!("Holiday on {date} already registered");
                std::process::exit(1);
            }
            store.refs.holidays.push(Holiday { date, label });
            store.refs.holidays.sort_by_key(|h| h.date);
            rederive_leaf_schedules(store);
            save_or_exit(store, path);
            println!("Added holiday {date}.");
        }
        HolidayAction::Rm { date } => {
            let date = parse_date(&date);
            let before = store.refs.holidays.len();
            store.refs.holidays.retain(|h| h.date != date);
            if store.refs.holidays.len() == before {
                eprintln!("No holiday on {date}");
                std::process::exit(1);
            }
            rederive_leaf_schedules(store);
            save_or_exit(store, path);
            println!("Removed holiday {date}.");
        }
        HolidayAction::List => {
            for h in &store.refs.holidays {
                println!("{}  {}", h.date, h.label);
            }
        }
    }
}

/// Manage the plan's assignee list.
pub fn cmd_assignee(store: &mut TaskStore, path: &Path, action: AssigneeAction) {
    match action {
        AssigneeAction::Add { id, name } => {
            if store.refs.users.iter().any(|u| u.id == id) {
                eprintln!("Assignee '{id}' already exists");
                std::process::exit(1);
            }
            store.refs.users.push(User { id: id.clone(), name });
            save_or_exit(store, path);
            println!("Added assignee {id}.");
        }
        AssigneeAction::List => {
            for u in &store.refs.users {
                println!("{:<12} {}", u.id, u.name);
            }
        }
    }
}

const CSV_HEADER: &str =
    "ID,Subject,Status,Priority,Assignee,Version,Start,Due,EstimatedDays,Progress,Parent,Description";

/// Export tasks to CSV for external analysis.
pub fn cmd_export(store: &TaskStore, output: Option<String>) {
    let output_path = output.unwrap_or_else(|| "plan.csv".to_string());
    let mut csv = String::new();
    csv.push_str(CSV_HEADER);
    csv.push('\n');
    for t in &store.tasks {
        let opt = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".into());
        let fields = [
            t.id.clone(),
            t.subject.clone(),
            opt(&t.status_id),
            opt(&t.priority_id),
            opt(&t.assignee_id),
            opt(&t.version_id),
            t.start.to_string(),
            t.due.to_string(),
            t.estimated_days.to_string(),
            t.progress.to_string(),
            opt(&t.parent),
            opt(&t.description),
        ];
        let row: Vec<String> = fields.iter().map(|f| escape_csv(f)).collect();
        csv.push_str(&row.join(","));
        csv.push('\n');
    }
    match fs::write(&output_path, csv) {
        Ok(_) => println!("Exported {} task(s) to {output_path}", store.tasks.len()),
        Err(e) => {
            eprintln!("Failed to write CSV file: {e}");
            std::process::exit(1);
        }
    }
}

/// Quote a CSV field when it contains a delimiter, doubling inner quotes.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Split one CSV line into fields, honouring quoted fields and doubled quotes.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
            }
            _ => field.push(ch),
        }
    }
    fields.push(field);
    fields
}

/// Create a timestamped backup of the plan file under `<dir>/backup/`.
pub fn create_backup(path: &Path) -> std::io::Result<String> {
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "plan file does not exist",
        ));
    }
    let parent_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let backup_dir = parent_dir.join("backup");
    fs::create_dir_all(&backup_dir)?;
    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("plan.json");
    let backup_path = backup_dir.join(format!("{timestamp}_{file_name}"));
    fs::copy(path, &backup_path)?;
    Ok(backup_path.to_string_lossy().to_string())
}

/// Create a backup of the current plan file.
pub fn cmd_backup(path: &Path) {
    match create_backup(path) {
        Ok(backup_path) => println!("Created backup: {backup_path}"),
        Err(e) => {
            eprintln!("Backup failed: {e}");
            std::process::exit(1);
        }
    }
}

/// Import tasks from CSV, preserving ids and parent links where possible.
pub fn cmd_import(store: &mut TaskStore, path: &Path, input: String, no_backup: bool) {
    if !no_backup {
        match create_backup(path) {
            Ok(backup_path) => println!("Created backup: {backup_path}"),
            Err(e) => eprintln!("Warning: failed to create backup: {e}"),
        }
    }
    let content = match fs::read_to_string(&input) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Failed to read CSV file '{input}': {e}");
            std::process::exit(1);
        }
    };
    let lines: Vec<&str> = content.lines().collect();
    if lines.first().map(|l| l.trim()) != Some(CSV_HEADER) {
        eprintln!("Invalid CSV header. Expected:\n{CSV_HEADER}");
        std::process::exit(1);
    }

    let mut imported = 0;
    let mut skipped = 0;
    let mut parents: Vec<(String, String)> = Vec::new();
    let holidays = store.holiday_dates();
    for (i, line) in lines.iter().skip(1).enumerate() {
        let line_num = i + 2;
        let fields = parse_csv_line(line);
        if fields.len() != 12 {
            eprintln!(
                "Warning: line {line_num} has {} fields, expected 12. Skipping.",
                fields.len()
            );
            skipped += 1;
            continue;
        }
        let opt = |s: &str| if s == "-" { None } else { Some(s.to_string()) };
        let id = fields[0].clone();
        let subject = fields[1].clone();
        let (Ok(start), Ok(due)) = (
            NaiveDate::parse_from_str(&fields[6], "%Y-%m-%d"),
            NaiveDate::parse_from_str(&fields[7], "%Y-%m-%d"),
        ) else {
            eprintln!("Warning: line {line_num} has unparseable dates. Skipping.");
            skipped += 1;
            continue;
        };
        if id.is_empty() || subject.is_empty() || due < start {
            eprintln!("Warning: line {line_num} is malformed. Skipping.");
            skipped += 1;
            continue;
        }
        if store.get(&id).is_some() {
            eprintln!("Warning: task id '{id}' already exists. Skipping.");
            skipped += 1;
            continue;
        }
        // The duration column is advisory; the imported range is the source
        // of truth, and due is snapped onto the working-day grid so a later
        // field edit never moves the schedule.
        let estimated_days =
            calendar::count_working_days(start, due, &holidays).max(1) as f64;
        let due = calendar::advance_working_days(start, estimated_days, &holidays);
        let now = Utc::now().timestamp();
        let task = Task {
            id: id.clone(),
            subject,
            description: opt(&fields[11]),
            status_id: opt(&fields[2]),
            priority_id: opt(&fields[3]),
            version_id: opt(&fields[5]),
            assignee_id: opt(&fields[4]),
            parent: None, // linked in a second pass, once every row exists
            start,
            due,
            progress: fields[9].parse().unwrap_or(0),
            estimated_days,
            created_at_utc: now,
            updated_at_utc: now,
        };
        if let Err(e) = store.create_task(task) {
            eprintln!("Warning: line {line_num}: {e}. Skipping.");
            skipped += 1;
            continue;
        }
        if let Some(parent) = opt(&fields[10]) {
            parents.push((id, parent));
        }
        imported += 1;
    }

    // Second pass: parent links, so row order never matters.
    for (id, parent) in parents {
        let patch = TaskPatch {
            parent: Some(Some(parent.clone())),
            ..TaskPatch::default()
        };
        if let Err(e) = store.update_task(&id, patch) {
            eprintln!("Warning: could not attach {id} under {parent}: {e}");
        }
    }

    // Self-heal envelopes across whatever the file contained.
    if let Err(e) = store.rollup() {
        fail(e);
    }
    save_or_exit(store, path);
    println!("Import completed. {imported} task(s) imported, {skipped} skipped.");
}

/// Generate shell completion script on stdout.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    let mut cmd = crate::cli::Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}

/// Launch the interactive Gantt board for a plan file.
pub fn cmd_ui(path: &Path) {
    if let Err(e) = run_tui(path) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

/// Launch the board against the most recently edited plan in the data dir.
pub fn cmd_ui_recent(data_dir: &Path) {
    match most_recent_plan(data_dir) {
        Ok(Some(plan)) => {
            println!("Opening recent plan: {}", plan.display_name);
            cmd_ui(&plan.file_path);
        }
        Ok(None) => {
            eprintln!("No plans found in {}; create one with `gantt add`", data_dir.display());
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to scan {}: {e}", data_dir.display());
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_days_bounds() {
        assert_eq!(parse_days("2.5").unwrap(), 2.5);
        assert!(parse_days("0").is_err());
        assert!(parse_days("-1").is_err());
        assert!(parse_days("inf").is_err());
        assert!(parse_days("nan").is_err());
        assert!(parse_days("1e18").is_err());
        assert!(parse_days("three").is_err());
    }

    #[test]
    fn test_holiday_rm_rederives_leaf_due() {
        let dir = std::env::temp_dir().join("gantt_cmd_holiday_test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("holiday_plan.json");
        let mut store = TaskStore::default();
        store.refs.holidays.push(Holiday {
            date: d(2025, 1, 1),
            label: "New Year".into(),
        });
        // Mon Dec 30 + 3 working days lands past the Jan 1 holiday.
        let task = store.new_task("spans the holiday", d(2024, 12, 30), 3.0);
        let id = task.id.clone();
        store.create_task(task).unwrap();
        assert_eq!(store.get(&id).unwrap().due, d(2025, 1, 2));
        cmd_holiday(&mut store, &path, HolidayAction::Rm { date: "2025-01-01".into() });
        assert_eq!(store.get(&id).unwrap().due, d(2025, 1, 1));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_import_derives_duration_from_range() {
        let dir = std::env::temp_dir().join("gantt_cmd_import_test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("import_plan.json");
        let input = dir.join("tasks.csv");
        // The duration column disagrees with the Mon-Fri range on purpose.
        fs::write(
            &input,
            format!("{CSV_HEADER}\n7,Imported,-,-,-,-,2025-01-06,2025-01-10,2,0,-,-\n"),
        )
        .unwrap();
        let mut store = TaskStore::default();
        cmd_import(&mut store, &path, input.to_string_lossy().into_owned(), true);
        assert_eq!(store.get("7").unwrap().estimated_days, 5.0);
        assert_eq!(store.get("7").unwrap().due, d(2025, 1, 10));
        // An unrelated field edit must leave the schedule where it was.
        store
            .update_task(
                "7",
                TaskPatch { subject: Some("Renamed".into()), ..TaskPatch::default() },
            )
            .unwrap();
        assert_eq!(store.get("7").unwrap().due, d(2025, 1, 10));
        fs::remove_file(&input).unwrap();
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_parse_csv_line_plain() {
        assert_eq!(parse_csv_line("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(parse_csv_line("a,,c"), vec!["a", "", "c"]);
    }

    #[test]
    fn test_parse_csv_line_quoted() {
        assert_eq!(
            parse_csv_line("1,\"hello, world\",\"say \"\"hi\"\"\""),
            vec!["1", "hello, world", "say \"hi\""]
        );
    }

    #[test]
    fn test_escape_round_trip() {
        for original in ["plain", "with, comma", "with \"quotes\"", "both, \"of\" them"] {
            let line = format!("{},tail", escape_csv(original));
            assert_eq!(parse_csv_line(&line), vec![original.to_string(), "tail".into()]);
        }
    }
}
