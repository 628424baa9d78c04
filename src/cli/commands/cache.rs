//! `tw cache` command - Inspect the query cache
//!
//! The cache holds materialized list results keyed by query name and
//! filter term. It lives in memory for the life of a session, so these
//! commands are mostly useful inside `tw shell`.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::{GlobalOpts, OutputFormat, Session};

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cached queries and hit/miss/patch counters
    Status,

    /// Drop every cached result
    Clear,
}

pub fn run(cmd: CacheCommands, session: &Session, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CacheCommands::Status => run_status(session, global),
        CacheCommands::Clear => run_clear(session, global),
    }
}

fn run_status(session: &Session, global: &GlobalOpts) -> Result<()> {
    let cache = session.tracker.cache();
    let stats = cache.stats();
    let format = session.format(global);

    match format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let entries: Vec<serde_json::Value> = cache
                .entries()
                .map(|e| {
                    serde_json::json!({
                        "name": e.name(),
                        "filter_term": e.filter_term(),
                        "sort_column": e.sort_column(),
                        "records": e.value().len(),
                    })
                })
                .collect();
            let report = serde_json::json!({
                "hits": stats.hits,
                "misses": stats.misses,
                "patches": stats.patches,
                "entries": entries,
            });
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
            } else {
                print!("{}", serde_yml::to_string(&report).into_diagnostic()?);
            }
        }
        _ => {
            println!("{}", style("Query Cache").bold());
            println!("{}", style("─".repeat(40)).dim());
            println!("  Entries: {}", style(cache.len()).cyan());
            println!("  Hits:    {}", style(stats.hits).cyan());
            println!("  Misses:  {}", style(stats.misses).cyan());
            println!("  Patches: {}", style(stats.patches).cyan());

            if !cache.is_empty() {
                println!();
                let mut builder = Builder::default();
                builder.push_record(["Query", "Filter", "Sort", "Records"]);
                for entry in cache.entries() {
                    builder.push_record([
                        entry.name().to_string(),
                        entry.filter_term().to_string(),
                        entry.sort_column().unwrap_or("default").to_string(),
                        entry.value().len().to_string(),
                    ]);
                }
                println!("{}", builder.build().with(Style::markdown()));
            }
        }
    }

    Ok(())
}

fn run_clear(session: &Session, global: &GlobalOpts) -> Result<()> {
    let count = session.tracker.cache().len();
    session.tracker.clear_cache();

    if !global.quiet {
        println!(
            "{} Cleared {} cached {}",
            style("✓").green(),
            count,
            if count == 1 { "query" } else { "queries" }
        );
    }
    Ok(())
}
