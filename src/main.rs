//! # Gantt - Working-Day-Aware Scheduling CLI
//!
//! A project-scheduling tool that renders a hierarchical task list as a
//! Gantt chart, with parent/child date rollups and working-day arithmetic.
//!
//! ## Key Features
//!
//! - **Hierarchical Tickets**: tasks form a forest; a parent's date range is
//!   always the envelope of its children's ranges.
//! - **Working-Day Scheduling**: due dates derive from a start date plus a
//!   working-day duration, skipping weekends and a per-plan holiday list.
//! - **Interactive Gantt Board**: a TUI timeline where tasks are moved,
//!   resized and reparented with the keyboard.
//! - **Multi-Plan Support**: each plan is a local JSON file; CSV
//!   export/import and timestamped backups included.
//!
//! ## Quick Start
//!
//! ```bash
//! # Add a task starting today with a three working-day duration
//! gantt add "Ship the importer" --days 3
//!
//! # Nest it under task 1 and push it out a week
//! gantt update 2 --parent 1
//! gantt shift 2 7
//!
//! # Open the interactive board
//! gantt ui
//! ```
//!
//! Data is stored locally in `~/.gantt/` with each plan as a separate JSON
//! file. Source control the folder if you want history.

use std::path::PathBuf;

use clap::Parser;

pub mod calendar;
pub mod cli;
pub mod cmd;
pub mod error;
pub mod fields;
pub mod hierarchy;
pub mod plan;
pub mod projection;
pub mod store;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod run;
}

use cli::Cli;
use cmd::*;
use plan::{discover_plans, Plan};
use store::TaskStore;

fn main() {
    let cli = Cli::parse();

    // Determine the data directory.
    let data_dir = if let Some(db_path) = cli.db.as_ref() {
        db_path
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .to_path_buf()
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let dir = PathBuf::from(home).join(".gantt");
        if let Err(e) = std::fs::create_dir_all(&dir) {
            eprintln!("Failed to create data directory {}: {}", dir.display(), e);
            std::process::exit(1);
        }
        dir
    };

    // Commands that pick their own plan file.
    if let Commands::Completions { shell } = &cli.command {
        cmd_completions(*shell);
        return;
    }
    if let Commands::Ui = cli.command {
        match cli.db {
            Some(db_path) => cmd_ui(&db_path),
            None => cmd_ui_recent(&data_dir),
        }
        return;
    }

    // Everything else resolves a single plan file up front.
    let db_path = cli.db.unwrap_or_else(|| {
        match discover_plans(&data_dir) {
            Ok(plans) if !plans.is_empty() => plans[0].file_path.clone(),
            _ => {
                let default_plan = Plan::new("default", &data_dir);
                if let Err(e) = default_plan.create_if_not_exists() {
                    eprintln!("Failed to create default plan: {e}");
                    std::process::exit(1);
                }
                default_plan.file_path
            }
        }
    });

    let mut store = TaskStore::load(&db_path);
    // Self-heal container envelopes after loading external data.
    if let Err(e) = store.rollup() {
        eprintln!("Plan file {} is damaged: {e}", db_path.display());
        std::process::exit(1);
    }

    match cli.command {
        Commands::Ui | Commands::Completions { .. } => unreachable!("handled above"),

        Commands::Add {
            subject, desc, start, days, parent, assignee, status, priority, version,
        } => cmd_add(
            &mut store, &db_path, subject, desc, start, days, parent, assignee, status, priority,
            version,
        ),

        Commands::List { tree, sort, assignee, status } => {
            cmd_list(&store, tree, sort, assignee, status)
        }

        Commands::View { id } => cmd_view(&store, id),

        Commands::Update {
            id, subject, desc, start, due, days, parent, clear_parent, progress, status,
            priority, version, assignee,
        } => cmd_update(
            &mut store, &db_path, id, subject, desc, start, due, days, parent, clear_parent,
            progress, status, priority, version, assignee,
        ),

        Commands::Shift { id, days } => cmd_shift(&mut store, &db_path, id, days),

        Commands::Resize { id, edge, days } => cmd_resize(&mut store, &db_path, id, edge, days),

        Commands::Delete { id, cascade } => cmd_delete(&mut store, &db_path, id, cascade),

        Commands::Holiday { action } => cmd_holiday(&mut store, &db_path, action),

        Commands::Assignee { action } => cmd_assignee(&mut store, &db_path, action),

        Commands::Export { output } => cmd_export(&store, output),

        Commands::Import { input, no_backup } => cmd_import(&mut store, &db_path, input, no_backup),

        Commands::Backup => cmd_backup(&db_path),
    }
}
