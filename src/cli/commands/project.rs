//! `tw project` command - Project management

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{confirm, format_short_id, ListOpts};
use crate::cli::output::{print_list, print_record};
use crate::cli::{GlobalOpts, OutputFormat, Session};
use crate::core::entity::Status;
use crate::core::repository::QueryPage;
use crate::entities::Project;

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// List projects
    List(ListArgs),

    /// Create a new project
    New(NewArgs),

    /// Show a project's details
    Show(ShowArgs),

    /// Change fields of a project
    Set(SetArgs),

    /// Delete a project (it must have no tasks)
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub opts: ListOpts,

    /// Only projects serving this goal (ID or prefix)
    #[arg(long, short = 'g')]
    pub goal: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Title
    pub title: String,

    /// Goal this project serves (ID or prefix)
    #[arg(long, short = 'g')]
    pub goal: Option<String>,

    /// Longer description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<NaiveDate>,

    /// Initial status
    #[arg(long, default_value = "not_started")]
    pub status: Status,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Project ID or unique ID prefix
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Project ID or unique ID prefix
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    /// Move under another goal (ID or prefix)
    #[arg(long, short = 'g', conflicts_with = "no_goal")]
    pub goal: Option<String>,

    /// Detach from its goal
    #[arg(long)]
    pub no_goal: bool,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<NaiveDate>,

    #[arg(long)]
    pub status: Option<Status>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Project ID or unique ID prefix
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: ProjectCommands, session: &Session, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProjectCommands::List(args) => run_list(args, session, global),
        ProjectCommands::New(args) => run_new(args, session, global),
        ProjectCommands::Show(args) => run_show(args, session, global),
        ProjectCommands::Set(args) => run_set(args, session, global),
        ProjectCommands::Delete(args) => run_delete(args, session, global),
    }
}

fn run_list(args: ListArgs, session: &Session, global: &GlobalOpts) -> Result<()> {
    let projects = &session.tracker.projects;

    let page = match args.goal {
        Some(ref query) => {
            let goal = session.tracker.goals.resolve(query).into_diagnostic()?;
            let items = projects.for_goal(&goal.id).into_diagnostic()?;
            QueryPage {
                total: items.len(),
                items,
                page: None,
            }
        }
        None => {
            let request = args.opts.to_request(&session.config);
            projects.list(&request).into_diagnostic()?
        }
    };

    if args.opts.count {
        println!("{}", page.total);
        return Ok(());
    }
    print_list(&page, session.format(global))
}

fn run_new(args: NewArgs, session: &Session, global: &GlobalOpts) -> Result<()> {
    let mut project = Project::new(args.title, session.author());
    if let Some(ref query) = args.goal {
        project.goal_id = Some(session.tracker.goals.resolve(query).into_diagnostic()?.id);
    }
    project.description = args.description.unwrap_or_default();
    project.due_date = args.due;
    project.status = args.status;

    let project = session.tracker.projects.add(project).into_diagnostic()?;
    report_id("Created project", &project, global);
    Ok(())
}

fn run_show(args: ShowArgs, session: &Session, global: &GlobalOpts) -> Result<()> {
    let project = session.tracker.projects.resolve(&args.id).into_diagnostic()?;
    print_record(&project, session.format(global))
}

fn run_set(args: SetArgs, session: &Session, global: &GlobalOpts) -> Result<()> {
    let mut project = session.tracker.projects.resolve(&args.id).into_diagnostic()?;

    if let Some(title) = args.title {
        project.title = title;
    }
    if let Some(ref query) = args.goal {
        project.goal_id = Some(session.tracker.goals.resolve(query).into_diagnostic()?.id);
    }
    if args.no_goal {
        project.goal_id = None;
    }
    if let Some(description) = args.description {
        project.description = description;
    }
    if let Some(due) = args.due {
        project.due_date = Some(due);
    }
    if let Some(status) = args.status {
        project.status = status;
    }

    session.tracker.projects.update(&project).into_diagnostic()?;
    report_id("Updated project", &project, global);
    Ok(())
}

fn run_delete(args: DeleteArgs, session: &Session, global: &GlobalOpts) -> Result<()> {
    let project = session.tracker.projects.resolve(&args.id).into_diagnostic()?;

    let prompt = format!(
        "Delete project {} \"{}\"?",
        format_short_id(&project.id),
        project.title
    );
    if !confirm(&prompt, args.yes)? {
        return Ok(());
    }

    session.tracker.projects.delete(&project.id).into_diagnostic()?;
    report_id("Deleted project", &project, global);
    Ok(())
}

fn report_id(action: &str, project: &Project, global: &GlobalOpts) {
    if global.quiet || global.format == OutputFormat::Id {
        println!("{}", project.id);
    } else {
        println!(
            "{} {} {} {}",
            style("✓").green(),
            action,
            style(&project.id).cyan(),
            style(&project.title).yellow()
        );
    }
}
