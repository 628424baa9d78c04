//! CLI command implementations

pub mod cache;
pub mod completions;
pub mod goal;
pub mod init;
pub mod project;
pub mod shell;
pub mod task;

use miette::Result;

use crate::cli::{Commands, GlobalOpts, Session};

/// Run a command that works on an opened workspace
///
/// Used both for one-shot invocations and for every line of `tw shell`.
pub fn dispatch(command: Commands, session: &Session, global: &GlobalOpts) -> Result<()> {
    match command {
        Commands::Goal(cmd) => goal::run(cmd, session, global),
        Commands::Project(cmd) => project::run(cmd, session, global),
        Commands::Task(cmd) => task::run(cmd, session, global),
        Commands::Cache(cmd) => cache::run(cmd, session, global),
        Commands::Completions(args) => completions::run(args),
        Commands::Init(_) => Err(miette::miette!(
            "workspace already open at {}",
            session.workspace.root().display()
        )),
        Commands::Shell(_) => Err(miette::miette!("already in a shell")),
    }
}
