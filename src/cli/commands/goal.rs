//! `tw goal` command - Goal management

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{confirm, format_short_id, ListOpts};
use crate::cli::output::{print_list, print_record};
use crate::cli::{GlobalOpts, OutputFormat, Session};
use crate::core::entity::Status;
use crate::entities::Goal;

#[derive(Subcommand, Debug)]
pub enum GoalCommands {
    /// List goals
    List(ListArgs),

    /// Create a new goal
    New(NewArgs),

    /// Show a goal's details
    Show(ShowArgs),

    /// Change fields of a goal
    Set(SetArgs),

    /// Delete a goal (it must have no projects)
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub opts: ListOpts,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Title
    pub title: String,

    /// Longer description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Category (free text, e.g. "health")
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Target date (YYYY-MM-DD)
    #[arg(long)]
    pub target: Option<NaiveDate>,

    /// Initial status
    #[arg(long, default_value = "not_started")]
    pub status: Status,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Goal ID or unique ID prefix
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Goal ID or unique ID prefix
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Target date (YYYY-MM-DD)
    #[arg(long)]
    pub target: Option<NaiveDate>,

    #[arg(long)]
    pub status: Option<Status>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Goal ID or unique ID prefix
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: GoalCommands, session: &Session, global: &GlobalOpts) -> Result<()> {
    match cmd {
        GoalCommands::List(args) => run_list(args, session, global),
        GoalCommands::New(args) => run_new(args, session, global),
        GoalCommands::Show(args) => run_show(args, session, global),
        GoalCommands::Set(args) => run_set(args, session, global),
        GoalCommands::Delete(args) => run_delete(args, session, global),
    }
}

fn run_list(args: ListArgs, session: &Session, global: &GlobalOpts) -> Result<()> {
    let request = args.opts.to_request(&session.config);
    let page = session.tracker.goals.list(&request).into_diagnostic()?;

    if args.opts.count {
        println!("{}", page.total);
        return Ok(());
    }
    print_list(&page, session.format(global))
}

fn run_new(args: NewArgs, session: &Session, global: &GlobalOpts) -> Result<()> {
    let mut goal = Goal::new(args.title, session.author());
    goal.description = args.description.unwrap_or_default();
    goal.category = args.category;
    goal.target_date = args.target;
    goal.status = args.status;

    let goal = session.tracker.goals.add(goal).into_diagnostic()?;
    report_id("Created goal", &goal, global);
    Ok(())
}

fn run_show(args: ShowArgs, session: &Session, global: &GlobalOpts) -> Result<()> {
    let goal = session.tracker.goals.resolve(&args.id).into_diagnostic()?;
    print_record(&goal, session.format(global))
}

fn run_set(args: SetArgs, session: &Session, global: &GlobalOpts) -> Result<()> {
    let mut goal = session.tracker.goals.resolve(&args.id).into_diagnostic()?;

    if let Some(title) = args.title {
        goal.title = title;
    }
    if let Some(description) = args.description {
        goal.description = description;
    }
    if let Some(category) = args.category {
        goal.category = Some(category).filter(|c| !c.is_empty());
    }
    if let Some(target) = args.target {
        goal.target_date = Some(target);
    }
    if let Some(status) = args.status {
        goal.status = status;
    }

    session.tracker.goals.update(&goal).into_diagnostic()?;
    report_id("Updated goal", &goal, global);
    Ok(())
}

fn run_delete(args: DeleteArgs, session: &Session, global: &GlobalOpts) -> Result<()> {
    let goal = session.tracker.goals.resolve(&args.id).into_diagnostic()?;

    let prompt = format!("Delete goal {} \"{}\"?", format_short_id(&goal.id), goal.title);
    if !confirm(&prompt, args.yes)? {
        return Ok(());
    }

    session.tracker.goals.delete(&goal.id).into_diagnostic()?;
    report_id("Deleted goal", &goal, global);
    Ok(())
}

fn report_id(action: &str, goal: &Goal, global: &GlobalOpts) {
    if global.quiet || global.format == OutputFormat::Id {
        println!("{}", goal.id);
    } else {
        println!(
            "{} {} {} {}",
            style("✓").green(),
            action,
            style(&goal.id).cyan(),
            style(&goal.title).yellow()
        );
    }
}
