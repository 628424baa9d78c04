//! `tw shell` command - Interactive session
//!
//! Every line is parsed as a `tw` command line and run against one
//! [`Session`], so list results stay cached between commands and are
//! patched as records change.

use clap::Parser;
use console::style;
use miette::{IntoDiagnostic, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use tracing::debug;

use crate::cli::commands::dispatch;
use crate::cli::{Cli, GlobalOpts, Session};
use crate::core::Workspace;

#[derive(clap::Args, Debug)]
pub struct ShellArgs {
    /// Don't read or write the history file
    #[arg(long)]
    pub no_history: bool,
}

pub fn run(args: ShellArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let mut editor = DefaultEditor::new().into_diagnostic()?;

    let history: Option<PathBuf> =
        (!args.no_history).then(|| session.workspace.dir().join("shell_history"));
    if let Some(ref path) = history {
        let _ = editor.load_history(path);
    }

    if !global.quiet {
        println!("{}", style("Trackwise shell").green().bold());
        println!(
            "Type commands without the leading {}, e.g. {}. {} to leave.",
            style("tw").yellow(),
            style("task list --active").cyan(),
            style("exit").cyan()
        );
        println!(
            "The session stays on {}; --workspace cannot switch it.",
            style(session.workspace.root().display()).cyan()
        );
        println!();
    }

    loop {
        let prompt = format!("{} ", style("tw>").green().bold());
        match editor.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line);

                if matches!(line, "exit" | "quit" | ".q") {
                    break;
                }
                if let Err(e) = run_line(line, &session) {
                    eprintln!("{:?}", e);
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", style("^C").yellow());
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(miette::miette!("{}", err)),
        }
    }

    if let Some(ref path) = history {
        if let Err(e) = editor.save_history(path) {
            debug!(error = %e, "could not save shell history");
        }
    }
    Ok(())
}

fn run_line(line: &str, session: &Session) -> Result<()> {
    let mut words = split_line(line)?;
    if words.first().map(String::as_str) == Some("tw") {
        words.remove(0);
    }

    let argv = std::iter::once("tw".to_string()).chain(words);
    match Cli::try_parse_from(argv) {
        Ok(cli) => {
            ensure_same_workspace(&cli.global, session)?;
            dispatch(cli.command, session, &cli.global)
        }
        Err(e) => {
            // Help and version requests come through here as well.
            e.print().into_diagnostic()?;
            Ok(())
        }
    }
}

/// A shell is bound to the workspace it was opened on
fn ensure_same_workspace(global: &GlobalOpts, session: &Session) -> Result<()> {
    let Some(ref root) = global.workspace else {
        return Ok(());
    };
    let requested = Workspace::discover_from(root).map_err(|e| miette::miette!("{}", e))?;
    if requested.root() != session.workspace.root() {
        return Err(miette::miette!(
            "this shell is bound to {}; --workspace cannot switch workspaces (start another `tw shell`)",
            session.workspace.root().display()
        ));
    }
    Ok(())
}

/// Split a command line into words, honouring single and double quotes
/// and backslash escapes
pub fn split_line(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') | (None, '\\') => match chars.next() {
                Some(next) => {
                    current.push(next);
                    in_word = true;
                }
                None => return Err(miette::miette!("trailing backslash")),
            },
            (Some(_), c) => current.push(c),
            (None, '"') | (None, '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(miette::miette!("unterminated {} quote", q));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    #[test]
    fn test_split_plain_words() {
        assert_eq!(
            split_line("task list  --active").unwrap(),
            vec!["task", "list", "--active"]
        );
    }

    #[test]
    fn test_split_quoted_title() {
        assert_eq!(
            split_line(r#"task new "Buy milk" --notes 'two litres'"#).unwrap(),
            vec!["task", "new", "Buy milk", "--notes", "two litres"]
        );
    }

    #[test]
    fn test_split_empty_quotes_make_empty_word() {
        assert_eq!(
            split_line(r#"goal set G1 --category """#).unwrap(),
            vec!["goal", "set", "G1", "--category", ""]
        );
    }

    #[test]
    fn test_split_escapes() {
        assert_eq!(
            split_line(r#"task new say\ \"hi\""#).unwrap(),
            vec!["task", "new", "say \"hi\""]
        );
    }

    #[test]
    fn test_split_unterminated_quote_fails() {
        assert!(split_line("task new \"oops").is_err());
    }

    fn session_on(root: &std::path::Path) -> Session {
        let global = GlobalOpts {
            format: OutputFormat::Auto,
            quiet: true,
            verbose: false,
            workspace: Some(root.to_path_buf()),
        };
        Session::open(&global).unwrap()
    }

    #[test]
    fn test_line_with_other_workspace_is_rejected() {
        let home = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        Workspace::init(home.path()).unwrap();
        Workspace::init(other.path()).unwrap();
        let session = session_on(home.path());

        let line = format!("cache status --workspace {}", other.path().display());
        let err = run_line(&line, &session).unwrap_err();
        assert!(err.to_string().contains("cannot switch workspaces"));

        let line = format!("cache status -q --workspace {}", home.path().display());
        assert!(run_line(&line, &session).is_ok());
    }
}

