//! CLI module - argument parsing and command dispatch

pub mod args;
pub mod commands;
pub mod helpers;
pub mod output;
pub mod session;

pub use args::{Cli, Commands, GlobalOpts, OutputFormat};
pub use session::Session;
