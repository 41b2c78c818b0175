//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use madrasa_core::MonthFilter;

/// Madrasa attendance reports.
///
/// Reconciles exported AM/PM attendance records into daily credit and
/// prints attendance summaries for a student, a teacher, or a whole class.
#[derive(Debug, Parser)]
#[command(name = "madrasa", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Summarize attendance for one student or teacher.
    Summary {
        #[command(flatten)]
        window: WindowArgs,

        /// Only use records for this subject.
        #[arg(long)]
        subject: Option<String>,

        /// Include the per-day timeline in text output.
        #[arg(long)]
        days: bool,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Summarize attendance for every subject in the input.
    Class {
        #[command(flatten)]
        window: WindowArgs,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Input and reporting window shared by all report commands.
#[derive(Debug, Clone, Args)]
pub struct WindowArgs {
    /// Records file (JSON lines or a JSON array); `-` reads stdin.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Calendar year to report on (defaults to the current year).
    #[arg(long)]
    pub year: Option<i32>,

    /// Month to report on: `all` or 1-12.
    #[arg(long)]
    pub month: Option<MonthFilter>,
}
