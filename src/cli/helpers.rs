//! Shared helper functions for CLI commands
//!
//! Id formatting, list options shared by every `list` subcommand, and the
//! delete confirmation prompt.

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::config::Config;
use crate::core::identity::EntityId;
use crate::core::repository::{ListRequest, Page};

/// Format an EntityId for display, truncating if too long
///
/// IDs longer than 16 characters are truncated to 13 chars with "..." suffix.
pub fn format_short_id(id: &EntityId) -> String {
    let s = id.to_string();
    if s.len() > 16 {
        format!("{}...", &s[..13])
    } else {
        s
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Options shared by `goal list`, `project list` and `task list`
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ListOpts {
    /// Search title and text (case-insensitive substring)
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Sort column (title, status, created, ...); unknown columns use the default order
    #[arg(long)]
    pub sort: Option<String>,

    /// Page number, starting at 1
    #[arg(long, short = 'p')]
    pub page: Option<usize>,

    /// Records per page (default from config `page_size`)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Show count only, not the items
    #[arg(long)]
    pub count: bool,
}

impl ListOpts {
    pub fn to_request(&self, config: &Config) -> ListRequest {
        let mut request = ListRequest::all();
        if let Some(ref term) = self.search {
            request = request.filtered(term.clone());
        }
        if let Some(ref column) = self.sort {
            request = request.sorted_by(column.clone());
        }
        if self.page.is_some() || self.page_size.is_some() {
            let size = self.page_size.unwrap_or_else(|| config.page_size());
            request.page = Some(Page::new(self.page.unwrap_or(1), size));
        }
        request
    }
}

/// Ask before a destructive action unless `yes` was given
pub fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .into_diagnostic()?;
    if !confirmed {
        println!("{}", style("Aborted.").yellow());
    }
    Ok(confirmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityPrefix;

    #[test]
    fn test_format_short_id() {
        let id = EntityId::new(EntityPrefix::Task);
        let formatted = format_short_id(&id);
        assert_eq!(formatted.len(), 16);
        assert!(formatted.starts_with("TASK-"));
        assert!(formatted.ends_with("..."));
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("héllo wörld", 8), "héllo...");
    }

    #[test]
    fn test_list_opts_without_paging() {
        let opts = ListOpts {
            search: Some("milk".to_string()),
            sort: Some("due".to_string()),
            ..ListOpts::default()
        };
        let request = opts.to_request(&Config::default());
        assert_eq!(request.filter_term, "milk");
        assert_eq!(request.sort.as_deref(), Some("due"));
        assert!(request.page.is_none());
    }

    #[test]
    fn test_list_opts_page_uses_config_size() {
        let config = Config {
            page_size: Some(3),
            ..Config::default()
        };
        let opts = ListOpts {
            page: Some(2),
            ..ListOpts::default()
        };
        assert_eq!(opts.to_request(&config).page, Some(Page::new(2, 3)));

        let opts = ListOpts {
            page_size: Some(5),
            ..ListOpts::default()
        };
        assert_eq!(opts.to_request(&config).page, Some(Page::new(1, 5)));
    }
}
