//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    cache::CacheCommands, completions::CompletionsArgs, goal::GoalCommands, init::InitArgs,
    project::ProjectCommands, shell::ShellArgs, task::TaskCommands,
};

#[derive(Parser, Debug)]
#[command(name = "tw")]
#[command(author, version, about = "Trackwise goal, project and task tracker")]
#[command(
    long_about = "Track goals, the projects that serve them and the tasks inside those projects, stored in a local SQLite database."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose (debug) logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Workspace root (default: auto-detect by finding .trackwise/)
    #[arg(long, global = true, env = "TRACKWISE_WORKSPACE")]
    pub workspace: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new workspace
    Init(InitArgs),

    /// Goal management
    #[command(subcommand)]
    Goal(GoalCommands),

    /// Project management
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Inspect or clear the query cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Interactive session sharing one query cache across commands
    Shell(ShellArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned table for lists, YAML for single records
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["tw", "task", "list", "--format", "json", "-q"]).unwrap();
        assert_eq!(cli.global.format, OutputFormat::Json);
        assert!(cli.global.quiet);
    }
}
