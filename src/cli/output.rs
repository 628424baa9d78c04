//! Rendering of records in the supported output formats

use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{format_short_id, truncate_str};
use crate::cli::OutputFormat;
use crate::core::entity::Entity;
use crate::core::repository::QueryPage;
use crate::entities::{Goal, Project, Task};

/// A record that can be shown as a table row and as a detail view
pub trait Tabular: Entity {
    /// Noun for summaries ("task")
    const NOUN: &'static str;

    /// Column headers with their width in the terminal listing
    fn columns() -> &'static [(&'static str, usize)];

    /// One cell per column, untruncated
    fn cells(&self) -> Vec<String>;

    /// Labelled fields for `show`
    fn details(&self) -> Vec<(&'static str, String)>;
}

fn date_or_dash<T: std::fmt::Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}

impl Tabular for Goal {
    const NOUN: &'static str = "goal";

    fn columns() -> &'static [(&'static str, usize)] {
        &[
            ("ID", 16),
            ("TITLE", 36),
            ("STATUS", 12),
            ("CATEGORY", 14),
            ("TARGET", 10),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            self.status.to_string(),
            self.category.clone().unwrap_or_default(),
            date_or_dash(&self.target_date),
        ]
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", self.id.to_string()),
            ("Title", self.title.clone()),
            ("Status", self.status.description().to_string()),
            ("Category", self.category.clone().unwrap_or_default()),
            ("Target", date_or_dash(&self.target_date)),
            ("Description", self.description.clone()),
        ]
    }
}

impl Tabular for Project {
    const NOUN: &'static str = "project";

    fn columns() -> &'static [(&'static str, usize)] {
        &[
            ("ID", 16),
            ("TITLE", 36),
            ("STATUS", 12),
            ("GOAL", 16),
            ("DUE", 10),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            self.status.to_string(),
            self.goal_id.as_ref().map(|g| g.to_string()).unwrap_or_default(),
            date_or_dash(&self.due_date),
        ]
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", self.id.to_string()),
            ("Title", self.title.clone()),
            ("Status", self.status.description().to_string()),
            ("Goal", date_or_dash(&self.goal_id)),
            ("Due", date_or_dash(&self.due_date)),
            ("Description", self.description.clone()),
        ]
    }
}

impl Tabular for Task {
    const NOUN: &'static str = "task";

    fn columns() -> &'static [(&'static str, usize)] {
        &[
            ("ID", 16),
            ("#", 4),
            ("TITLE", 36),
            ("STATUS", 12),
            ("PRIORITY", 9),
            ("DUE", 10),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.sort_order.to_string(),
            self.title.clone(),
            self.status.to_string(),
            self.priority.to_string(),
            date_or_dash(&self.due_date),
        ]
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", self.id.to_string()),
            ("Title", self.title.clone()),
            ("Status", self.status.description().to_string()),
            ("Priority", self.priority.to_string()),
            ("Order", self.sort_order.to_string()),
            ("Project", date_or_dash(&self.project_id)),
            ("Due", date_or_dash(&self.due_date)),
            (
                "Completed",
                date_or_dash(&self.completed.map(|c| c.format("%Y-%m-%d %H:%M"))),
            ),
            ("Notes", self.notes.clone()),
        ]
    }
}

/// Print one page of a list query
pub fn print_list<T: Tabular>(page: &QueryPage<T>, format: OutputFormat) -> Result<()> {
    let items = &page.items;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            if items.is_empty() {
                println!("[]");
            } else {
                print!("{}", serde_yml::to_string(items).into_diagnostic()?);
            }
        }
        OutputFormat::Csv => write_delimited(items, b',')?,
        OutputFormat::Tsv => write_delimited(items, b'\t')?,
        OutputFormat::Md => {
            let mut builder = Builder::default();
            builder.push_record(T::columns().iter().map(|(h, _)| h.to_string()));
            for item in items {
                builder.push_record(item.cells());
            }
            println!("{}", builder.build().with(Style::markdown()));
        }
        OutputFormat::Id => {
            for item in items {
                println!("{}", item.id());
            }
        }
        OutputFormat::Auto => print_aligned(page)?,
    }

    Ok(())
}

fn write_delimited<T: Tabular>(items: &[T], delimiter: u8) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(std::io::stdout());
    writer
        .write_record(T::columns().iter().map(|(h, _)| h.to_lowercase()))
        .into_diagnostic()?;
    for item in items {
        writer.write_record(item.cells()).into_diagnostic()?;
    }
    writer.flush().into_diagnostic()?;
    Ok(())
}

fn print_aligned<T: Tabular>(page: &QueryPage<T>) -> Result<()> {
    if page.total == 0 {
        println!("No {}s found.", T::NOUN);
        return Ok(());
    }

    let columns = T::columns();
    let header: Vec<String> = columns
        .iter()
        .map(|(h, w)| format!("{:<w$}", style(h).bold(), w = *w))
        .collect();
    println!("{}", header.join(" "));
    let rule: usize = columns.iter().map(|(_, w)| w + 1).sum();
    println!("{}", "-".repeat(rule.saturating_sub(1)));

    for item in &page.items {
        let row: Vec<String> = item
            .cells()
            .into_iter()
            .zip(columns)
            .enumerate()
            .map(|(i, (cell, (_, w)))| {
                let cell = if i == 0 {
                    format_short_id(item.id())
                } else {
                    truncate_str(&cell, *w)
                };
                format!("{:<w$}", cell, w = *w)
            })
            .collect();
        println!("{}", row.join(" ").trim_end());
    }

    println!();
    match page.page {
        Some(p) => println!(
            "page {} of {} ({} {}(s) total)",
            style(p.number.max(1)).cyan(),
            p.page_count(page.total).max(1),
            page.total,
            T::NOUN
        ),
        None => println!("{} {}(s) found", style(page.total).cyan(), T::NOUN),
    }
    Ok(())
}

/// Print a single record
pub fn print_record<T: Tabular>(record: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(record).into_diagnostic()?);
        }
        OutputFormat::Yaml | OutputFormat::Auto => {
            print!("{}", serde_yml::to_string(record).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", record.id()),
        OutputFormat::Csv | OutputFormat::Tsv | OutputFormat::Md => {
            println!("{}", style("─".repeat(60)).dim());
            for (label, value) in record.details() {
                if value.is_empty() {
                    continue;
                }
                println!("{}: {}", style(label).bold(), value);
            }
            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {} | {}: {}",
                style("Author").dim(),
                record.author(),
                style("Created").dim(),
                record.created().format("%Y-%m-%d %H:%M")
            );
        }
    }
    Ok(())
}
