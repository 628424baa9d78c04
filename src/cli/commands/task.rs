//! `tw task` command - Task management

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{confirm, format_short_id, ListOpts};
use crate::cli::output::{print_list, print_record};
use crate::cli::{GlobalOpts, OutputFormat, Session};
use crate::core::entity::{Priority, Status};
use crate::entities::Task;

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// List tasks
    List(ListArgs),

    /// Create a new task
    New(NewArgs),

    /// Show a task's details
    Show(ShowArgs),

    /// Change fields of a task
    Set(SetArgs),

    /// Mark a task completed
    Done(IdArgs),

    /// Move a task to a new position in the active list
    Move(MoveArgs),

    /// Delete a task
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub opts: ListOpts,

    /// Only tasks that are not completed or abandoned, in list order
    #[arg(long, short = 'a')]
    pub active: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Title
    pub title: String,

    /// Project this task belongs to (ID or prefix)
    #[arg(long)]
    pub project: Option<String>,

    /// Free-form notes
    #[arg(long, short = 'n')]
    pub notes: Option<String>,

    /// Priority (low/medium/high/critical)
    #[arg(long, default_value = "medium")]
    pub priority: Priority,

    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<NaiveDate>,

    /// Initial status
    #[arg(long, default_value = "not_started")]
    pub status: Status,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Task ID or unique ID prefix
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct IdArgs {
    /// Task ID or unique ID prefix
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Task ID or unique ID prefix
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    /// Move under another project (ID or prefix)
    #[arg(long)]
    pub project: Option<String>,

    #[arg(long, short = 'n')]
    pub notes: Option<String>,

    #[arg(long)]
    pub priority: Option<Priority>,

    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<NaiveDate>,

    #[arg(long)]
    pub status: Option<Status>,
}

#[derive(clap::Args, Debug)]
pub struct MoveArgs {
    /// Task ID or unique ID prefix
    pub id: String,

    /// New position (lower comes first)
    #[arg(long)]
    pub to: i64,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Task ID or unique ID prefix
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: TaskCommands, session: &Session, global: &GlobalOpts) -> Result<()> {
    match cmd {
        TaskCommands::List(args) => run_list(args, session, global),
        TaskCommands::New(args) => run_new(args, session, global),
        TaskCommands::Show(args) => run_show(args, session, global),
        TaskCommands::Set(args) => run_set(args, session, global),
        TaskCommands::Done(args) => run_done(args, session, global),
        TaskCommands::Move(args) => run_move(args, session, global),
        TaskCommands::Delete(args) => run_delete(args, session, global),
    }
}

fn run_list(args: ListArgs, session: &Session, global: &GlobalOpts) -> Result<()> {
    let request = args.opts.to_request(&session.config);
    let tasks = &session.tracker.tasks;
    let page = if args.active {
        tasks.list_active(&request)
    } else {
        tasks.list(&request)
    }
    .into_diagnostic()?;

    if args.opts.count {
        println!("{}", page.total);
        return Ok(());
    }
    print_list(&page, session.format(global))
}

fn run_new(args: NewArgs, session: &Session, global: &GlobalOpts) -> Result<()> {
    let mut task = Task::new(args.title, session.author());
    if let Some(ref query) = args.project {
        task.project_id = Some(session.tracker.projects.resolve(query).into_diagnostic()?.id);
    }
    task.notes = args.notes.unwrap_or_default();
    task.priority = args.priority;
    task.due_date = args.due;
    if args.status == Status::Completed {
        task.mark_completed();
    } else {
        task.status = args.status;
    }

    let task = session.tracker.tasks.add(task).into_diagnostic()?;
    report_id("Created task", &task, global);
    Ok(())
}

fn run_show(args: ShowArgs, session: &Session, global: &GlobalOpts) -> Result<()> {
    let task = session.tracker.tasks.resolve(&args.id).into_diagnostic()?;
    print_record(&task, session.format(global))
}

fn run_set(args: SetArgs, session: &Session, global: &GlobalOpts) -> Result<()> {
    let mut task = session.tracker.tasks.resolve(&args.id).into_diagnostic()?;

    if let Some(title) = args.title {
        task.title = title;
    }
    if let Some(ref query) = args.project {
        task.project_id = Some(session.tracker.projects.resolve(query).into_diagnostic()?.id);
    }
    if let Some(notes) = args.notes {
        task.notes = notes;
    }
    if let Some(priority) = args.priority {
        task.priority = priority;
    }
    if let Some(due) = args.due {
        task.due_date = Some(due);
    }
    match args.status {
        Some(Status::Completed) => task.mark_completed(),
        Some(status) => {
            task.status = status;
            task.completed = None;
        }
        None => {}
    }

    session.tracker.tasks.update(&task).into_diagnostic()?;
    report_id("Updated task", &task, global);
    Ok(())
}

fn run_done(args: IdArgs, session: &Session, global: &GlobalOpts) -> Result<()> {
    let task = session.tracker.tasks.resolve(&args.id).into_diagnostic()?;
    let task = session.tracker.tasks.complete(&task.id).into_diagnostic()?;
    report_id("Completed task", &task, global);
    Ok(())
}

fn run_move(args: MoveArgs, session: &Session, global: &GlobalOpts) -> Result<()> {
    let task = session.tracker.tasks.resolve(&args.id).into_diagnostic()?;
    let task = session
        .tracker
        .tasks
        .reorder(&task.id, args.to)
        .into_diagnostic()?;
    report_id(&format!("Moved to #{}", task.sort_order), &task, global);
    Ok(())
}

fn run_delete(args: DeleteArgs, session: &Session, global: &GlobalOpts) -> Result<()> {
    let task = session.tracker.tasks.resolve(&args.id).into_diagnostic()?;

    let prompt = format!("Delete task {} \"{}\"?", format_short_id(&task.id), task.title);
    if !confirm(&prompt, args.yes)? {
        return Ok(());
    }

    session.tracker.tasks.delete(&task.id).into_diagnostic()?;
    report_id("Deleted task", &task, global);
    Ok(())
}

fn report_id(action: &str, task: &Task, global: &GlobalOpts) {
    if global.quiet || global.format == OutputFormat::Id {
        println!("{}", task.id);
    } else {
        println!(
            "{} {} {} {}",
            style("✓").green(),
            action,
            style(&task.id).cyan(),
            style(&task.title).yellow()
        );
    }
}
