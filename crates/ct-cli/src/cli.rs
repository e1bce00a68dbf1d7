//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use ct_core::event::sanitize;

/// Personal time tracker.
///
/// Clock in to a project, clock out, and summarize where the time went.
#[derive(Debug, Parser)]
#[command(name = "ct", version, about, long_about = None)]
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
    /// Start tracking time in a working directory.
    Init(InitArgs),

    /// Start logging hours to a project.
    Clockin(ClockinArgs),

    /// Stop logging hours to a project.
    Clockout(ClockArgs),

    /// Clock in or out of the most recent project.
    Toggle(ClockArgs),

    /// Show whether you are clocked in.
    Status(StatusArgs),

    /// Count hours spent on projects.
    Summary(SummaryArgs),
}

#[derive(Debug, Clone, Args)]
pub struct InitArgs {
    /// Your name in filesystem-legal characters.
    #[arg(long)]
    pub name: Option<String>,

    /// Where you are working from (defaults to the host name).
    #[arg(long)]
    pub location: Option<String>,

    /// Change Adium status on clockin/clockout (macOS only).
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub adium: Option<bool>,
}

/// Options shared by commands that write to the log.
#[derive(Debug, Clone, Default, Args)]
pub struct ClockArgs {
    /// Time to log instead of now (e.g. "9:30am", "2020-01-31 17:00", "10 minutes ago").
    #[arg(short, long)]
    pub time: Option<String>,

    /// Set Adium status to Away in addition to changing the message.
    #[arg(long)]
    pub away: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ClockinArgs {
    /// Project to clock into; defaults to the most recent one.
    pub project: Vec<String>,

    #[command(flatten)]
    pub clock: ClockArgs,
}

impl ClockinArgs {
    /// The project words joined with single spaces, if any were given.
    pub fn project(&self) -> Option<String> {
        let joined = self.project.join(" ");
        if joined.trim().is_empty() { None } else { Some(joined) }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct StatusArgs {
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// How summary results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SummaryFormat {
    /// Per-project totals and a grand total.
    #[default]
    Plain,
    /// Per-user, per-project daily breakdown grouped by month.
    Pretty,
    /// Per-week project hours rounded to the quarter hour.
    Weekly,
    /// One row per user, day and project.
    Csv,
    /// Machine-readable totals.
    Json,
}

#[derive(Debug, Clone, Default, Args)]
pub struct SummaryArgs {
    /// Project to count (words are joined with spaces); all projects if omitted.
    pub project: Vec<String>,

    /// Additional projects to count.
    #[arg(short = 'm', long = "more-projects", num_args = 1..)]
    pub more_projects: Vec<String>,

    /// When to start counting.
    #[arg(short, long)]
    pub from: Option<String>,

    /// When to stop counting (defaults to now).
    #[arg(short, long)]
    pub to: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = SummaryFormat::Plain)]
    pub format: SummaryFormat,
}

impl SummaryArgs {
    /// Every project named on the command line, sanitized like clockin names.
    pub fn project_names(&self) -> Vec<String> {
        let joined = self.project.join(" ");
        std::iter::once(joined.as_str())
            .chain(self.more_projects.iter().map(String::as_str))
            .map(sanitize)
            .filter(|name| !name.is_empty())
            .collect()
    }
}
