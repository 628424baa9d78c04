//! State shared by the commands of one invocation or one shell session

use clap::ValueEnum;
use miette::{IntoDiagnostic, Result};
use tracing::debug;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, Tracker, Workspace};

/// An opened workspace: its config and its tracker (store, events, cache)
pub struct Session {
    pub workspace: Workspace,
    pub config: Config,
    pub tracker: Tracker,
}

impl Session {
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let workspace = match global.workspace {
            Some(ref root) => Workspace::discover_from(root),
            None => Workspace::discover(),
        }
        .map_err(|e| miette::miette!("{}", e))?;

        debug!(root = %workspace.root().display(), "opening workspace");
        let config = Config::load(Some(&workspace));
        let tracker = Tracker::open(&workspace).into_diagnostic()?;

        Ok(Self {
            workspace,
            config,
            tracker,
        })
    }

    /// The format requested on the command line, else the configured default
    pub fn format(&self, global: &GlobalOpts) -> OutputFormat {
        if global.format != OutputFormat::Auto {
            return global.format;
        }
        self.config
            .default_format
            .as_deref()
            .and_then(|f| OutputFormat::from_str(f, true).ok())
            .unwrap_or(OutputFormat::Auto)
    }

    pub fn author(&self) -> String {
        self.config.author()
    }
}
