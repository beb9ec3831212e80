use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// File-backed Gantt scheduling CLI.
/// Storage defaults to plan files under ~/.gantt or a path passed via --db.
#[derive(Parser)]
#[command(name = "gantt", version, about = "Working-day-aware Gantt scheduling CLI")]
pub struct Cli {
    /// Path to the JSON plan file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
